//! ss:// 与 ssr:// 链接

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;
use url::form_urlencoded;

use super::{split_host_port, unescape};
use crate::codec::{base64, value_string};
use crate::error::{Error, Result};
use crate::option::{ShadowsocksOption, ShadowsocksROption};

/// 这些加密方式配合 origin/plain 就是普通 shadowsocks, ssr 链接不应使用
const PLAIN_SS_CIPHERS: &[&str] = &[
    "aes-128-gcm",
    "aes-192-gcm",
    "aes-256-gcm",
    "aes-128-cfb",
    "aes-192-cfb",
    "aes-256-cfb",
    "aes-128-ctr",
    "aes-192-ctr",
    "aes-256-ctr",
    "rc4-md5",
    "chacha20",
    "chacha20-ietf",
    "xchacha20",
    "chacha20-ietf-poly1305",
    "xchacha20-ietf-poly1305",
];

/// 解析 ss 链接, 支持 SIP002 与整体 base64 两种形式
///
/// ```text
/// ss://base64(method:password)@host:port/?plugin=...#name
/// ss://base64(method:password@host:port)#name
/// ```
pub fn parse_ss(link: &str) -> Result<ShadowsocksOption> {
    let (_, rest) = link
        .split_once("://")
        .ok_or_else(|| Error::parse_link("missing scheme"))?;

    let (rest, name) = match rest.split_once('#') {
        Some((body, fragment)) => (body, unescape(fragment)),
        None => (rest, String::new()),
    };
    let (body, query) = match rest.split_once('?') {
        Some((body, query)) => (body.trim_end_matches('/'), query),
        None => (rest.trim_end_matches('/'), ""),
    };

    let body = if body.contains('@') {
        body.to_string()
    } else {
        base64::decode_lossy(body)
    };

    let (userinfo, host_port) = body
        .rsplit_once('@')
        .ok_or_else(|| Error::parse_link("ss: missing userinfo"))?;
    let userinfo = base64::decode_lossy(&unescape(userinfo));
    let (cipher, password) = userinfo
        .split_once(':')
        .ok_or_else(|| Error::parse_link("ss: userinfo must be method:password"))?;
    let (server, port) = split_host_port(host_port)?;

    let mut opt = ShadowsocksOption {
        name,
        server,
        port,
        cipher: cipher.to_string(),
        password: password.to_string(),
        udp: true,
        ..Default::default()
    };

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if key == "plugin" {
            let (plugin, opts) = parse_plugin(&value);
            opt.plugin = plugin;
            opt.plugin_opts = opts;
        }
    }

    debug!("ss option: {}:{} cipher={}", opt.server, opt.port, opt.cipher);
    Ok(opt)
}

/// SIP002 插件参数: `obfs-local;obfs=http;obfs-host=example.com`
fn parse_plugin(raw: &str) -> (String, BTreeMap<String, Value>) {
    let mut parts = raw.split(';');
    let name = parts.next().unwrap_or_default().trim();

    let mut args = BTreeMap::new();
    for part in parts.filter(|p| !p.is_empty()) {
        match part.split_once('=') {
            Some((k, v)) => args.insert(k.to_string(), v.to_string()),
            None => args.insert(part.to_string(), String::new()),
        };
    }

    let mut opts = BTreeMap::new();
    match name {
        "obfs-local" | "simple-obfs" | "obfs" => {
            if let Some(mode) = args.get("obfs") {
                opts.insert("mode".to_string(), Value::String(mode.clone()));
            }
            if let Some(host) = args.get("obfs-host") {
                opts.insert("host".to_string(), Value::String(host.clone()));
            }
            ("obfs".to_string(), opts)
        }
        "v2ray-plugin" => {
            let mode = args.get("mode").cloned().unwrap_or_else(|| "websocket".to_string());
            opts.insert("mode".to_string(), Value::String(mode));
            for key in ["host", "path"] {
                if let Some(v) = args.get(key) {
                    opts.insert(key.to_string(), Value::String(v.clone()));
                }
            }
            if args.contains_key("tls") {
                opts.insert("tls".to_string(), Value::Bool(true));
            }
            ("v2ray-plugin".to_string(), opts)
        }
        other => {
            for (k, v) in args {
                opts.insert(k, Value::String(v));
            }
            (other.to_string(), opts)
        }
    }
}

/// 生成 SIP002 插件参数, 与 [`parse_plugin`] 互逆
pub(crate) fn format_plugin(plugin: &str, opts: &BTreeMap<String, Value>) -> String {
    let get = |k: &str| opts.get(k).map(value_string).unwrap_or_default();
    let mut parts = Vec::new();
    match plugin {
        "obfs" => {
            parts.push("obfs-local".to_string());
            let mode = get("mode");
            if !mode.is_empty() {
                parts.push(format!("obfs={}", mode));
            }
            let host = get("host");
            if !host.is_empty() {
                parts.push(format!("obfs-host={}", host));
            }
        }
        "v2ray-plugin" => {
            parts.push(plugin.to_string());
            for key in ["mode", "host", "path"] {
                let v = get(key);
                if !v.is_empty() {
                    parts.push(format!("{}={}", key, v));
                }
            }
            if get("tls") == "true" {
                parts.push("tls".to_string());
            }
        }
        other => {
            parts.push(other.to_string());
            for (k, v) in opts {
                parts.push(format!("{}={}", k, value_string(v)));
            }
        }
    }
    parts.join(";")
}

/// 解析 ssr 链接
///
/// ```text
/// ssr://base64(server:port:protocol:method:obfs:base64(password)/?obfsparam=..&protoparam=..&remarks=..)
/// ```
pub fn parse_ssr(link: &str) -> Result<ShadowsocksROption> {
    let (_, rest) = link
        .split_once("://")
        .ok_or_else(|| Error::parse_link("missing scheme"))?;
    let decoded = base64::decode_lossy(rest.trim());

    let (main, params) = match decoded.split_once("/?") {
        Some((main, params)) => (main, params),
        None => (decoded.trim_end_matches('/'), ""),
    };

    // 从右侧切分, 服务器地址可能是 IPv6
    let parts: Vec<&str> = main.rsplitn(6, ':').collect();
    if parts.len() != 6 {
        return Err(Error::parse_link(format!(
            "ssr: expected 6 fields, got {}",
            parts.len()
        )));
    }
    let (password, obfs, cipher, protocol, port, server) =
        (parts[0], parts[1], parts[2], parts[3], parts[4], parts[5]);

    let port: u16 = port
        .parse()
        .map_err(|_| Error::parse_link(format!("ssr: invalid port {:?}", port)))?;
    let server = server.trim_start_matches('[').trim_end_matches(']');
    if server.is_empty() || port == 0 {
        return Err(Error::parse_link("ssr: missing server"));
    }

    if protocol == "origin" && obfs == "plain" && PLAIN_SS_CIPHERS.contains(&cipher) {
        return Err(Error::parse_link(
            "ssr: origin/plain with a shadowsocks cipher is a plain ss server",
        ));
    }

    let mut opt = ShadowsocksROption {
        server: server.to_string(),
        port,
        password: base64::decode_lossy(password),
        cipher: cipher.to_string(),
        obfs: obfs.to_string(),
        protocol: protocol.to_string(),
        udp: true,
        ..Default::default()
    };

    for (key, value) in form_urlencoded::parse(params.as_bytes()) {
        let value = base64::decode_lossy(&value);
        match key.as_ref() {
            "obfsparam" => opt.obfs_param = value,
            "protoparam" => opt.protocol_param = value,
            "remarks" => opt.name = value,
            _ => {}
        }
    }

    debug!("ssr option: {}:{} protocol={} obfs={}", opt.server, opt.port, opt.protocol, opt.obfs);
    Ok(opt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::base64::{encode_std, encode_url};

    #[test]
    fn test_ss_sip002() {
        let link = format!("ss://{}@1.2.3.4:8388#node1", encode_std("aes-128-gcm:password"));
        let opt = parse_ss(&link).unwrap();
        assert_eq!(opt.name, "node1");
        assert_eq!(opt.server, "1.2.3.4");
        assert_eq!(opt.port, 8388);
        assert_eq!(opt.cipher, "aes-128-gcm");
        assert_eq!(opt.password, "password");
        assert!(opt.udp);
    }

    #[test]
    fn test_ss_whole_body_base64() {
        let link = format!(
            "ss://{}#%E8%8A%82%E7%82%B9",
            encode_std("chacha20-ietf-poly1305:p@ss@example.com:443")
        );
        let opt = parse_ss(&link).unwrap();
        assert_eq!(opt.name, "节点");
        assert_eq!(opt.server, "example.com");
        assert_eq!(opt.port, 443);
        assert_eq!(opt.password, "p@ss");
    }

    #[test]
    fn test_ss_plain_userinfo() {
        let opt = parse_ss("ss://2022-blake3-aes-128-gcm:a%2Bb@[::1]:8388").unwrap();
        assert_eq!(opt.cipher, "2022-blake3-aes-128-gcm");
        assert_eq!(opt.password, "a+b");
        assert_eq!(opt.server, "::1");
    }

    #[test]
    fn test_ss_plugin() {
        let link = format!(
            "ss://{}@a.com:8388/?plugin=obfs-local%3Bobfs%3Dhttp%3Bobfs-host%3Dbing.com#n",
            encode_url("aes-256-gcm:pw")
        );
        let opt = parse_ss(&link).unwrap();
        assert_eq!(opt.plugin, "obfs");
        assert_eq!(opt.plugin_opts["mode"], "http");
        assert_eq!(opt.plugin_opts["host"], "bing.com");
        assert_eq!(
            format_plugin(&opt.plugin, &opt.plugin_opts),
            "obfs-local;obfs=http;obfs-host=bing.com"
        );
    }

    #[test]
    fn test_ss_missing_port() {
        let link = format!("ss://{}@1.2.3.4#x", encode_std("aes-128-gcm:password"));
        assert!(matches!(parse_ss(&link), Err(Error::ParseLink(_))));
    }

    fn ssr_link(protocol: &str, cipher: &str, obfs: &str) -> String {
        let body = format!(
            "1.2.3.4:443:{}:{}:{}:{}/?obfsparam={}&remarks={}",
            protocol,
            cipher,
            obfs,
            encode_url("secret"),
            encode_url("cdn.com"),
            encode_url("ssr node")
        );
        format!("ssr://{}", encode_url(&body))
    }

    #[test]
    fn test_ssr() {
        let opt = parse_ssr(&ssr_link("auth_aes128_md5", "aes-256-cfb", "tls1.2_ticket_auth")).unwrap();
        assert_eq!(opt.server, "1.2.3.4");
        assert_eq!(opt.port, 443);
        assert_eq!(opt.password, "secret");
        assert_eq!(opt.protocol, "auth_aes128_md5");
        assert_eq!(opt.obfs_param, "cdn.com");
        assert_eq!(opt.name, "ssr node");
    }

    #[test]
    fn test_ssr_rejects_plain_ss() {
        let err = parse_ssr(&ssr_link("origin", "aes-128-gcm", "plain")).unwrap_err();
        assert!(matches!(err, Error::ParseLink(_)));
        assert!(parse_ssr(&ssr_link("origin", "none", "plain")).is_ok());
    }

    #[test]
    fn test_ssr_field_count() {
        let link = format!("ssr://{}", encode_url("1.2.3.4:443:origin:plain"));
        assert!(parse_ssr(&link).is_err());
    }
}
