//! 出站拨号器
//!
//! [`ProxyDialer`] 是适配器与具体协议实现之间的接缝。内置实现只覆盖
//! direct / reject / socks5 / http, 其余协议由 [`ConfigOnlyDialer`] 占位,
//! 可以通过自定义 [`OutboundFactory`] 接入真正的传输实现。

mod direct;
mod http;
mod socks5;

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

pub use direct::{DirectDialer, RejectDialer};
pub use http::{parse_status, HttpConnectDialer};
pub use socks5::Socks5Dialer;

use crate::error::{Error, Result};
use crate::link::builder::join_host_port;
use crate::net::{BoxedConn, Network};
use crate::option::{ProxyOption, ProxyType};

/// 默认连接超时
pub const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(10);

/// 一次连接的目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub network: Network,
    /// 目标域名; 已解析为 IP 时为空
    pub host: String,
    pub dst_ip: Option<IpAddr>,
    pub dst_port: u16,
    /// 域名已由适配器映射为 IP
    pub dns_mapped: bool,
}

impl Metadata {
    pub fn new<S: Into<String>>(network: Network, host: S, port: u16) -> Self {
        let host = host.into();
        match host.trim_start_matches('[').trim_end_matches(']').parse::<IpAddr>() {
            Ok(ip) => Self {
                network,
                host: String::new(),
                dst_ip: Some(ip),
                dst_port: port,
                dns_mapped: false,
            },
            Err(_) => Self {
                network,
                host,
                dst_ip: None,
                dst_port: port,
                dns_mapped: false,
            },
        }
    }

    /// 用于连接的主机: 优先使用域名, 没有时使用 IP
    pub fn target_host(&self) -> String {
        match (&self.host, self.dst_ip) {
            (h, _) if !h.is_empty() => h.clone(),
            (_, Some(ip)) => ip.to_string(),
            _ => String::new(),
        }
    }

    /// `host:port` 形式的目标地址
    pub fn remote_address(&self) -> String {
        join_host_port(&self.target_host(), self.dst_port)
    }

    pub fn is_valid(&self) -> bool {
        self.dst_port != 0 && (!self.host.is_empty() || self.dst_ip.is_some())
    }
}

/// 拨号参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialOptions {
    pub prefer_ipv4: bool,
    pub timeout: Duration,
}

impl Default for DialOptions {
    fn default() -> Self {
        Self {
            prefer_ipv4: false,
            timeout: DEFAULT_DIAL_TIMEOUT,
        }
    }
}

/// 出站拨号器
#[async_trait]
pub trait ProxyDialer: Send + Sync {
    fn name(&self) -> &str;

    fn proxy_type(&self) -> ProxyType;

    /// 服务器地址 `host:port`; direct / reject 为空
    fn addr(&self) -> &str;

    fn support_udp(&self) -> bool;

    fn support_xudp(&self) -> bool {
        false
    }

    fn support_tfo(&self) -> bool {
        false
    }

    async fn dial_context(&self, metadata: &Metadata, opts: &DialOptions) -> Result<BoxedConn>;
}

/// 根据选项构造拨号器
pub trait OutboundFactory: Send + Sync {
    fn build(&self, option: &ProxyOption) -> Result<Arc<dyn ProxyDialer>>;
}

/// 内置工厂
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinFactory;

impl OutboundFactory for BuiltinFactory {
    fn build(&self, option: &ProxyOption) -> Result<Arc<dyn ProxyDialer>> {
        option.validate()?;

        let dialer: Arc<dyn ProxyDialer> = match option {
            ProxyOption::Direct(o) => Arc::new(DirectDialer::new(&o.name)),
            ProxyOption::Reject(o) => Arc::new(RejectDialer::new(&o.name)),
            ProxyOption::Socks5(o) => Arc::new(Socks5Dialer::new(o)),
            ProxyOption::Http(o) => Arc::new(HttpConnectDialer::new(o)),
            other => Arc::new(ConfigOnlyDialer::new(other)),
        };

        debug!(
            "Built {} dialer for {:?} ({})",
            dialer.proxy_type(),
            dialer.name(),
            dialer.addr()
        );
        Ok(dialer)
    }
}

/// 只描述节点能力, 不提供传输实现
#[derive(Debug, Clone)]
pub struct ConfigOnlyDialer {
    name: String,
    proxy_type: ProxyType,
    addr: String,
    udp: bool,
    xudp: bool,
    tfo: bool,
}

impl ConfigOnlyDialer {
    pub fn new(option: &ProxyOption) -> Self {
        Self {
            name: option.name().to_string(),
            proxy_type: option.proxy_type(),
            addr: join_host_port(option.server(), option.port()),
            udp: option.udp(),
            xudp: option.xudp(),
            tfo: option.tfo(),
        }
    }
}

#[async_trait]
impl ProxyDialer for ConfigOnlyDialer {
    fn name(&self) -> &str {
        &self.name
    }

    fn proxy_type(&self) -> ProxyType {
        self.proxy_type
    }

    fn addr(&self) -> &str {
        &self.addr
    }

    fn support_udp(&self) -> bool {
        self.udp
    }

    fn support_xudp(&self) -> bool {
        self.xudp
    }

    fn support_tfo(&self) -> bool {
        self.tfo
    }

    async fn dial_context(&self, metadata: &Metadata, _opts: &DialOptions) -> Result<BoxedConn> {
        debug!(
            "No {} transport available for {} (node {:?})",
            self.proxy_type,
            metadata.remote_address(),
            self.name
        );
        Err(Error::UnsupportedProtocol(format!("{} transport", self.proxy_type)))
    }
}
