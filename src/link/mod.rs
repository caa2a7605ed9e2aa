//! 订阅链接解析与生成
//!
//! 解析只负责把链接变成 [`ProxyOption`], 构造拨号器和计算身份由
//! [`crate::adapter`] 完成。

pub mod builder;
mod encode;
mod http;
mod hysteria;
mod misc;
mod shadowsocks;
mod trojan;
mod vless;
mod vmess;

use std::collections::HashMap;

use percent_encoding::percent_decode_str;
use tracing::debug;
use url::Url;

pub use encode::to_link;

use crate::error::{Error, Result};
use crate::option::ProxyOption;

/// 取出 `scheme://` 前缀 (小写), 没有合法 scheme 时返回 `None`
pub fn split_scheme(link: &str) -> Option<(String, &str)> {
    let (scheme, rest) = link.split_once("://")?;
    let valid = !scheme.is_empty()
        && scheme
            .chars()
            .next()
            .map(|c| c.is_ascii_alphabetic())
            .unwrap_or(false)
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if valid {
        Some((scheme.to_ascii_lowercase(), rest))
    } else {
        None
    }
}

/// 去掉末尾换行后判断是否为空
pub fn trim_link(link: &str) -> Result<&str> {
    let link = link.trim_end_matches(['\n', '\r']).trim();
    if link.is_empty() {
        return Err(Error::EmptyInput);
    }
    Ok(link)
}

/// 解析单条分享链接
pub fn decode(link: &str) -> Result<ProxyOption> {
    let link = trim_link(link)?;
    let (scheme, _) = split_scheme(link)
        .ok_or_else(|| Error::parse_link("missing scheme"))?;

    debug!("Decoding {} link", scheme);

    let option = match scheme.as_str() {
        "http" | "https" => ProxyOption::Http(http::parse_http(link)?),
        "socks" | "socks4" | "socks5" | "socket" | "socket4" | "socket5" => {
            ProxyOption::Socks5(http::parse_socks5(link)?)
        }
        "ss" | "shadowsocks" => ProxyOption::Shadowsocks(shadowsocks::parse_ss(link)?),
        "ssr" => ProxyOption::ShadowsocksR(shadowsocks::parse_ssr(link)?),
        "trojan" | "trojan-go" => ProxyOption::Trojan(trojan::parse_trojan(link)?),
        "vless" => ProxyOption::Vless(vless::parse_vless(link)?),
        "vmess" => ProxyOption::Vmess(vmess::parse_vmess(link)?),
        "hysteria" | "hy" => ProxyOption::Hysteria(hysteria::parse_hysteria(link)?),
        "hysteria2" | "hy2" => ProxyOption::Hysteria2(hysteria::parse_hysteria2(link)?),
        "tuic" => ProxyOption::Tuic(misc::parse_tuic(link)?),
        "snell" => ProxyOption::Snell(misc::parse_snell(link)?),
        "wireguard" | "wg" => ProxyOption::WireGuard(misc::parse_wireguard(link)?),
        _ => return Err(Error::UnsupportedType(scheme)),
    };
    Ok(option)
}

/// 解析 URL 形式的链接
pub(crate) fn parse_url(link: &str) -> Result<Url> {
    Url::parse(link).map_err(|e| Error::parse_link(format!("{}: {}", e, link)))
}

/// 取出 host 和端口; 端口缺失时使用 `default_port`
pub(crate) fn host_port(url: &Url, default_port: Option<u16>) -> Result<(String, u16)> {
    let host = url
        .host_str()
        .map(|h| h.trim_start_matches('[').trim_end_matches(']').to_string())
        .filter(|h| !h.is_empty())
        .ok_or_else(|| Error::parse_link("missing host"))?;
    let port = url
        .port_or_known_default()
        .or(default_port)
        .ok_or_else(|| Error::parse_link("missing port"))?;
    if port == 0 {
        return Err(Error::parse_link("invalid port 0"));
    }
    Ok((host, port))
}

/// 拆分 `host:port`, 支持 `[ipv6]:port`
pub(crate) fn split_host_port(s: &str) -> Result<(String, u16)> {
    let s = s.trim().trim_end_matches('/');
    let (host, port) = if let Some(rest) = s.strip_prefix('[') {
        let (host, port) = rest
            .split_once("]:")
            .ok_or_else(|| Error::parse_link(format!("missing port: {}", s)))?;
        (host, port)
    } else {
        s.rsplit_once(':')
            .ok_or_else(|| Error::parse_link(format!("missing port: {}", s)))?
    };
    if host.is_empty() {
        return Err(Error::parse_link("missing host"));
    }
    let port: u16 = port
        .parse()
        .map_err(|_| Error::parse_link(format!("invalid port: {:?}", port)))?;
    if port == 0 {
        return Err(Error::parse_link("invalid port 0"));
    }
    Ok((host.to_string(), port))
}

pub(crate) fn unescape(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

/// 链接的 fragment (节点名)
pub(crate) fn fragment(url: &Url) -> String {
    url.fragment().map(unescape).unwrap_or_default()
}

/// userinfo 用户名部分
pub(crate) fn username(url: &Url) -> String {
    unescape(url.username())
}

/// userinfo 密码部分
pub(crate) fn password(url: &Url) -> String {
    url.password().map(unescape).unwrap_or_default()
}

/// 完整 userinfo; 某些协议的凭据本身可能包含 `:`
pub(crate) fn userinfo(url: &Url) -> String {
    match url.password() {
        Some(pass) => format!("{}:{}", username(url), unescape(pass)),
        None => username(url),
    }
}

/// 查询参数, 同名参数取第一个
pub(crate) fn query_map(url: &Url) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for (k, v) in url.query_pairs() {
        map.entry(k.into_owned()).or_insert_with(|| v.into_owned());
    }
    map
}

/// 查询参数取值, 缺失时返回空串
pub(crate) fn param<'a>(query: &'a HashMap<String, String>, key: &str) -> &'a str {
    query.get(key).map(String::as_str).unwrap_or_default()
}

/// 逗号分隔的列表, 去除空项
pub(crate) fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// 数字参数, 缺失时为 0
pub(crate) fn number<T>(query: &HashMap<String, String>, key: &str) -> Result<T>
where
    T: std::str::FromStr + Default,
{
    match param(query, key).trim() {
        "" => Ok(T::default()),
        v => v
            .parse()
            .map_err(|_| Error::parse_link(format!("invalid {}: {:?}", key, v))),
    }
}

pub(crate) fn truthy(s: &str) -> bool {
    crate::codec::weak::parse_bool(s).unwrap_or(false)
}
