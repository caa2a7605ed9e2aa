//! 代理选项数据模型
//!
//! `ProxyOption` 是封闭的枚举, 每种协议一个变体。所有按协议分派的逻辑
//! (类型名、身份规范化、链接编码) 都通过穷尽匹配完成。

mod outbound;
pub mod transport;

use std::fmt;

pub use outbound::{
    BasicOption, HttpOption, Hysteria2Option, HysteriaOption, NamedOption, ShadowsocksOption,
    ShadowsocksROption, SnellOption, Socks5Option, TrojanOption, TuicOption, VlessOption,
    VmessOption, WireGuardOption,
};
pub use transport::{GrpcOptions, Http2Options, HttpOptions, RealityOptions, WsOptions};

use crate::error::{Error, Result};

/// 代理协议类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyType {
    Shadowsocks,
    ShadowsocksR,
    Snell,
    Socks5,
    Http,
    Vmess,
    Vless,
    Trojan,
    Hysteria,
    Hysteria2,
    WireGuard,
    Tuic,
    Direct,
    Reject,
}

impl ProxyType {
    /// 规范的小写协议名 (同时用作链接 scheme 和 map 中的 `type`)
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyType::Shadowsocks => "ss",
            ProxyType::ShadowsocksR => "ssr",
            ProxyType::Snell => "snell",
            ProxyType::Socks5 => "socks5",
            ProxyType::Http => "http",
            ProxyType::Vmess => "vmess",
            ProxyType::Vless => "vless",
            ProxyType::Trojan => "trojan",
            ProxyType::Hysteria => "hysteria",
            ProxyType::Hysteria2 => "hysteria2",
            ProxyType::WireGuard => "wireguard",
            ProxyType::Tuic => "tuic",
            ProxyType::Direct => "direct",
            ProxyType::Reject => "reject",
        }
    }

    /// 解析配置 map 中的 `type` 字段, 接受常见别名 (大小写不敏感)
    pub fn from_alias(s: &str) -> Option<Self> {
        let t = match s.trim().to_ascii_lowercase().as_str() {
            "ss" | "shadowsocks" => ProxyType::Shadowsocks,
            "ssr" | "shadowsocksr" => ProxyType::ShadowsocksR,
            "snell" => ProxyType::Snell,
            "socks" | "socks4" | "socks5" => ProxyType::Socks5,
            "http" | "https" => ProxyType::Http,
            "vmess" => ProxyType::Vmess,
            "vless" => ProxyType::Vless,
            "trojan" => ProxyType::Trojan,
            "hysteria" => ProxyType::Hysteria,
            "hysteria2" | "hy2" => ProxyType::Hysteria2,
            "wireguard" | "wg" => ProxyType::WireGuard,
            "tuic" => ProxyType::Tuic,
            "direct" => ProxyType::Direct,
            "reject" => ProxyType::Reject,
            _ => return None,
        };
        Some(t)
    }
}

impl fmt::Display for ProxyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单个代理节点的完整选项
#[derive(Debug, Clone, PartialEq)]
pub enum ProxyOption {
    Shadowsocks(ShadowsocksOption),
    ShadowsocksR(ShadowsocksROption),
    Snell(SnellOption),
    Socks5(Socks5Option),
    Http(HttpOption),
    Vmess(VmessOption),
    Vless(VlessOption),
    Trojan(TrojanOption),
    Hysteria(HysteriaOption),
    Hysteria2(Hysteria2Option),
    WireGuard(WireGuardOption),
    Tuic(TuicOption),
    Direct(NamedOption),
    Reject(NamedOption),
}

/// 对每个变体执行同一表达式 (字段名在所有选项结构中一致)
macro_rules! each_variant {
    ($opt:expr, $o:ident => $body:expr) => {
        match $opt {
            ProxyOption::Shadowsocks($o) => $body,
            ProxyOption::ShadowsocksR($o) => $body,
            ProxyOption::Snell($o) => $body,
            ProxyOption::Socks5($o) => $body,
            ProxyOption::Http($o) => $body,
            ProxyOption::Vmess($o) => $body,
            ProxyOption::Vless($o) => $body,
            ProxyOption::Trojan($o) => $body,
            ProxyOption::Hysteria($o) => $body,
            ProxyOption::Hysteria2($o) => $body,
            ProxyOption::WireGuard($o) => $body,
            ProxyOption::Tuic($o) => $body,
            ProxyOption::Direct($o) => $body,
            ProxyOption::Reject($o) => $body,
        }
    };
}

/// 只对有服务器地址的变体执行表达式, direct/reject 返回 `$default`
macro_rules! remote_variant {
    ($opt:expr, $o:ident => $body:expr, $default:expr) => {
        match $opt {
            ProxyOption::Shadowsocks($o) => $body,
            ProxyOption::ShadowsocksR($o) => $body,
            ProxyOption::Snell($o) => $body,
            ProxyOption::Socks5($o) => $body,
            ProxyOption::Http($o) => $body,
            ProxyOption::Vmess($o) => $body,
            ProxyOption::Vless($o) => $body,
            ProxyOption::Trojan($o) => $body,
            ProxyOption::Hysteria($o) => $body,
            ProxyOption::Hysteria2($o) => $body,
            ProxyOption::WireGuard($o) => $body,
            ProxyOption::Tuic($o) => $body,
            ProxyOption::Direct(_) | ProxyOption::Reject(_) => $default,
        }
    };
}

pub(crate) use each_variant;

impl ProxyOption {
    pub fn proxy_type(&self) -> ProxyType {
        match self {
            ProxyOption::Shadowsocks(_) => ProxyType::Shadowsocks,
            ProxyOption::ShadowsocksR(_) => ProxyType::ShadowsocksR,
            ProxyOption::Snell(_) => ProxyType::Snell,
            ProxyOption::Socks5(_) => ProxyType::Socks5,
            ProxyOption::Http(_) => ProxyType::Http,
            ProxyOption::Vmess(_) => ProxyType::Vmess,
            ProxyOption::Vless(_) => ProxyType::Vless,
            ProxyOption::Trojan(_) => ProxyType::Trojan,
            ProxyOption::Hysteria(_) => ProxyType::Hysteria,
            ProxyOption::Hysteria2(_) => ProxyType::Hysteria2,
            ProxyOption::WireGuard(_) => ProxyType::WireGuard,
            ProxyOption::Tuic(_) => ProxyType::Tuic,
            ProxyOption::Direct(_) => ProxyType::Direct,
            ProxyOption::Reject(_) => ProxyType::Reject,
        }
    }

    pub fn name(&self) -> &str {
        each_variant!(self, o => o.name.as_str())
    }

    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        let name = name.into();
        each_variant!(self, o => o.name = name)
    }

    pub fn server(&self) -> &str {
        remote_variant!(self, o => o.server.as_str(), "")
    }

    pub fn port(&self) -> u16 {
        remote_variant!(self, o => o.port, 0)
    }

    pub fn basic(&self) -> Option<&BasicOption> {
        remote_variant!(self, o => Some(&o.basic), None)
    }

    /// 选项声明的 UDP 支持; 基于 QUIC/UDP 的协议总是支持
    pub fn udp(&self) -> bool {
        match self {
            ProxyOption::Shadowsocks(o) => o.udp,
            ProxyOption::ShadowsocksR(o) => o.udp,
            ProxyOption::Snell(o) => o.udp,
            ProxyOption::Socks5(o) => o.udp,
            ProxyOption::Http(_) => false,
            ProxyOption::Vmess(o) => o.udp,
            ProxyOption::Vless(o) => o.udp,
            ProxyOption::Trojan(o) => o.udp,
            ProxyOption::Hysteria(_)
            | ProxyOption::Hysteria2(_)
            | ProxyOption::WireGuard(_)
            | ProxyOption::Tuic(_)
            | ProxyOption::Direct(_) => true,
            ProxyOption::Reject(_) => false,
        }
    }

    pub fn xudp(&self) -> bool {
        match self {
            ProxyOption::Vmess(o) => o.xudp,
            ProxyOption::Vless(o) => o.xudp,
            _ => false,
        }
    }

    pub fn tfo(&self) -> bool {
        self.basic().map(|b| b.tfo).unwrap_or(false)
    }

    /// 检查构造拨号器所必需的字段
    pub fn validate(&self) -> Result<()> {
        if matches!(self, ProxyOption::Direct(_) | ProxyOption::Reject(_)) {
            return Ok(());
        }
        if self.server().is_empty() {
            return Err(Error::InvalidOption(format!("{}: missing server", self.proxy_type())));
        }
        if self.port() == 0 {
            return Err(Error::InvalidOption(format!("{}: missing port", self.proxy_type())));
        }
        match self {
            ProxyOption::Shadowsocks(o) => {
                if !SS_CIPHERS.contains(&o.cipher.to_ascii_lowercase().as_str()) {
                    return Err(Error::InvalidOption(format!(
                        "ss: unsupported cipher {:?}",
                        o.cipher
                    )));
                }
            }
            ProxyOption::ShadowsocksR(o) if o.cipher.is_empty() => {
                return Err(Error::InvalidOption("ssr: missing cipher".into()));
            }
            ProxyOption::Vmess(o) if o.uuid.is_empty() => {
                return Err(Error::InvalidOption("vmess: missing uuid".into()));
            }
            ProxyOption::Vless(o) if o.uuid.is_empty() => {
                return Err(Error::InvalidOption("vless: missing uuid".into()));
            }
            ProxyOption::Trojan(o) if o.password.is_empty() => {
                return Err(Error::InvalidOption("trojan: missing password".into()));
            }
            ProxyOption::Tuic(o) if o.uuid.is_empty() && o.token.is_empty() => {
                return Err(Error::InvalidOption("tuic: missing uuid or token".into()));
            }
            ProxyOption::WireGuard(o) if o.private_key.is_empty() || o.public_key.is_empty() => {
                return Err(Error::InvalidOption("wireguard: missing key".into()));
            }
            _ => {}
        }
        Ok(())
    }
}

/// 受支持的 shadowsocks 加密方式
pub const SS_CIPHERS: &[&str] = &[
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
    "2022-blake3-aes-128-gcm",
    "2022-blake3-aes-256-gcm",
    "2022-blake3-chacha20-poly1305",
    "none",
];
