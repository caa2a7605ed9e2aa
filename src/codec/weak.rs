//! 弱类型反序列化辅助函数
//!
//! 订阅里的字段类型并不可靠: 端口可能是 `"443"`, 布尔值可能是 `"true"` 或 `1`,
//! 列表可能只写了一个字符串。这些函数配合 `#[serde(deserialize_with = ...)]` 使用。

use std::collections::BTreeMap;

use serde::de::{self, Deserializer};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(String),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Bool(b) => b.to_string(),
            Scalar::Int(n) => n.to_string(),
            Scalar::Uint(n) => n.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Str(s) => s,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<Option<Scalar>>),
    One(Scalar),
}

/// 字符串: 接受数字与布尔值, null 视为空串
pub fn string<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(d)?
        .map(Scalar::into_string)
        .unwrap_or_default())
}

/// 布尔值: 接受 `"true"`/`"1"`/`"yes"` 等字符串以及非零数字
pub fn bool<'de, D>(d: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<Scalar>::deserialize(d)? {
        None => false,
        Some(Scalar::Bool(b)) => b,
        Some(Scalar::Int(n)) => n != 0,
        Some(Scalar::Uint(n)) => n != 0,
        Some(Scalar::Float(f)) => f != 0.0,
        Some(Scalar::Str(s)) => parse_bool(&s).map_err(de::Error::custom)?,
    };
    Ok(value)
}

/// 整数: 接受数字字符串, 空串与 null 视为 0
pub fn int<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i128> + Default,
{
    let raw: i128 = match Option::<Scalar>::deserialize(d)? {
        None => return Ok(T::default()),
        Some(Scalar::Bool(b)) => i128::from(b),
        Some(Scalar::Int(n)) => i128::from(n),
        Some(Scalar::Uint(n)) => i128::from(n),
        Some(Scalar::Float(f)) if f.fract() == 0.0 => f as i128,
        Some(Scalar::Float(f)) => {
            return Err(de::Error::custom(format!("expected integer, got {}", f)))
        }
        Some(Scalar::Str(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(T::default());
            }
            s.parse::<i128>()
                .map_err(|_| de::Error::custom(format!("invalid integer: {:?}", s)))?
        }
    };
    T::try_from(raw).map_err(|_| de::Error::custom(format!("integer out of range: {}", raw)))
}

/// 字符串列表: 接受单个字符串, 列表中的 null 会被跳过
pub fn string_list<'de, D>(d: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let list = match Option::<OneOrMany>::deserialize(d)? {
        None => Vec::new(),
        Some(OneOrMany::One(s)) => {
            let s = s.into_string();
            if s.is_empty() {
                Vec::new()
            } else {
                vec![s]
            }
        }
        Some(OneOrMany::Many(items)) => items
            .into_iter()
            .flatten()
            .map(Scalar::into_string)
            .collect(),
    };
    Ok(list)
}

/// 整数列表: 接受列表或逗号分隔的字符串 (wireguard reserved)
pub fn int_list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
{
    string_list(d)?
        .iter()
        .flat_map(|item| item.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<T>()
                .map_err(|_| de::Error::custom(format!("invalid integer: {:?}", s)))
        })
        .collect()
}

/// `map<string, string>`: 值接受任意标量
pub fn string_map<'de, D>(d: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Option<Scalar>>>::deserialize(d)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .map(|(k, v)| (k, v.map(Scalar::into_string).unwrap_or_default()))
        .collect())
}

/// `map<string, [string]>`: 值可以是单个字符串或列表
pub fn string_list_map<'de, D>(d: D) -> Result<BTreeMap<String, Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Option<OneOrMany>>>::deserialize(d)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .map(|(k, v)| {
            let values = match v {
                None => Vec::new(),
                Some(OneOrMany::One(s)) => vec![s.into_string()],
                Some(OneOrMany::Many(items)) => items
                    .into_iter()
                    .flatten()
                    .map(Scalar::into_string)
                    .collect(),
            };
            (k, values)
        })
        .collect())
}

/// 解析宽松的布尔字符串
pub fn parse_bool(s: &str) -> Result<bool, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "f" | "no" | "off" | "none" => Ok(false),
        "1" | "true" | "t" | "yes" | "on" => Ok(true),
        other => Err(format!("invalid bool: {:?}", other)),
    }
}
