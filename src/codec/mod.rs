//! 通用选项编解码
//!
//! 类型化选项与字符串键 map 之间的转换。每个协议结构通过 serde derive 声明
//! 自己的字段名和零值策略, 这里只负责按 `type` 分派。

pub mod base64;
pub mod weak;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::option::{ProxyOption, ProxyType};

/// 配置 map (键有序)
pub type OptionMap = serde_json::Map<String, Value>;

/// 零值判断, 供 `skip_serializing_if` 使用
pub(crate) fn is_default<T: Default + PartialEq>(v: &T) -> bool {
    *v == T::default()
}

/// 自由格式字段 (插件参数等) 的字符串形式
pub fn value_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// 弱类型规则下的零值
fn is_zero_value(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => matches!(s.trim(), "" | "0" | "false"),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// `raw` 中没有进入类型化选项的键
///
/// `normalized` 是同一选项的 [`ProxyOption::to_map`] 结果。零值键视为已被
/// 选项吸收, 因为 `encode` 本来就会省略零值。
pub fn extra_keys<'a>(raw: &'a OptionMap, normalized: &OptionMap) -> Vec<&'a str> {
    raw.iter()
        .filter(|(k, v)| {
            !matches!(k.as_str(), "type" | "unique_id")
                && !normalized.contains_key(k.as_str())
                && !is_zero_value(v)
        })
        .map(|(k, _)| k.as_str())
        .collect()
}

/// 将类型化选项编码为 map, 零值字段被省略
pub fn encode<T: Serialize>(src: &T) -> Result<OptionMap> {
    match serde_json::to_value(src)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::InvalidOption(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

/// 将 map 解码为指定的选项结构 (弱类型)
pub fn decode<T: DeserializeOwned>(map: &OptionMap) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(map.clone()))?)
}

/// [`to_option`] 的结果
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// 识别出的协议选项
    Option(ProxyOption),
    /// 没有 `type` 字段, 原样返回
    Untyped(OptionMap),
    /// 无法识别的 `type` 值, 原样返回
    Unknown(Value),
}

/// 按 `type` 字段把 map 分派到对应的选项结构
///
/// 缺少 `type` 不是错误, 由调用方决定如何处理
pub fn to_option(map: &OptionMap) -> Result<Decoded> {
    let raw_type = match map.get("type") {
        None | Some(Value::Null) => return Ok(Decoded::Untyped(map.clone())),
        Some(v) => v,
    };

    let proxy_type = match raw_type.as_str().and_then(ProxyType::from_alias) {
        Some(t) => t,
        None => return Ok(Decoded::Unknown(raw_type.clone())),
    };

    let option = match proxy_type {
        ProxyType::Shadowsocks => ProxyOption::Shadowsocks(decode(map)?),
        ProxyType::ShadowsocksR => ProxyOption::ShadowsocksR(decode(map)?),
        ProxyType::Snell => ProxyOption::Snell(decode(map)?),
        ProxyType::Socks5 => ProxyOption::Socks5(decode(map)?),
        ProxyType::Http => ProxyOption::Http(decode(map)?),
        ProxyType::Vmess => ProxyOption::Vmess(decode(map)?),
        ProxyType::Vless => ProxyOption::Vless(decode(map)?),
        ProxyType::Trojan => ProxyOption::Trojan(decode(map)?),
        ProxyType::Hysteria => ProxyOption::Hysteria(decode(map)?),
        ProxyType::Hysteria2 => ProxyOption::Hysteria2(decode(map)?),
        ProxyType::WireGuard => ProxyOption::WireGuard(decode(map)?),
        ProxyType::Tuic => ProxyOption::Tuic(decode(map)?),
        ProxyType::Direct => ProxyOption::Direct(decode(map)?),
        ProxyType::Reject => ProxyOption::Reject(decode(map)?),
    };

    debug!("Decoded {} option {:?}", proxy_type, option.name());
    if let Ok(normalized) = option.to_map() {
        let extra = extra_keys(map, &normalized);
        if !extra.is_empty() {
            debug!("Unknown {} keys kept as-is: {:?}", proxy_type, extra);
        }
    }
    Ok(Decoded::Option(option))
}

impl ProxyOption {
    /// 编码为带规范 `type` 的 map
    pub fn to_map(&self) -> Result<OptionMap> {
        let mut map = crate::option::each_variant!(self, o => encode(o)?);
        map.insert(
            "type".to_string(),
            Value::String(self.proxy_type().as_str().to_string()),
        );
        Ok(map)
    }

    /// 从 map 解码; 缺少或无法识别 `type` 时返回错误
    pub fn from_map(map: &OptionMap) -> Result<Self> {
        match to_option(map)? {
            Decoded::Option(opt) => Ok(opt),
            Decoded::Untyped(_) => Err(Error::MissingType),
            Decoded::Unknown(v) => Err(Error::UnsupportedType(match v {
                Value::String(s) => s,
                other => other.to_string(),
            })),
        }
    }
}
