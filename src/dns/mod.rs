//! 多上游 DNS 解析
//!
//! 上游地址格式:
//!
//! | 地址 | 协议 | 默认端口 |
//! |---|---|---|
//! | `1.1.1.1` / `udp://1.1.1.1` | UDP | 53 |
//! | `tcp://1.1.1.1` | TCP | 53 |
//! | `tls://dns.google` / `tcp-tls://dns.google` | DoT | 853 |
//! | `https://dns.google/dns-query` | DoH | 443 |
//! | `system` | 系统解析器 | - |

mod cache;
mod dial;
mod message;
mod registry;
mod system;
mod transport;

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

pub use cache::DnsCache;
pub use dial::{Dial, DefaultDial, DEFAULT_DIAL_TIMEOUT};
pub use registry::ResolverRegistry;
pub use system::SystemResolver;
pub use transport::{
    DnsTransport, DohClient, DohTransport, DotClient, DotTransport, StubResolver, TcpClient, TcpTransport,
    UdpClient, UdpTransport,
};

use crate::error::{Error, Result};
use crate::link::builder::join_host_port;
use crate::link::split_scheme;
use crate::net::split_addr;

/// 单次查询超时
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

#[async_trait]
pub trait Resolver: Send + Sync {
    /// 上游名称, 即创建时使用的地址
    fn name(&self) -> &str;

    /// A 与 AAAA
    async fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>>;

    async fn lookup_ipv4(&self, host: &str) -> Result<Vec<IpAddr>>;

    async fn lookup_ipv6(&self, host: &str) -> Result<Vec<IpAddr>>;
}

/// 使用默认拨号器创建解析器
pub fn new_resolver(addr: &str) -> Result<Arc<dyn Resolver>> {
    new_resolver_with_dial(addr, Arc::new(DefaultDial::default()))
}

/// 使用自定义拨号器创建解析器 (例如经由代理节点)
pub fn new_resolver_with_dial(addr: &str, dial: Arc<dyn Dial>) -> Result<Arc<dyn Resolver>> {
    build_resolver(addr, dial, DEFAULT_QUERY_TIMEOUT)
}

pub(crate) fn build_resolver(addr: &str, dial: Arc<dyn Dial>, timeout: Duration) -> Result<Arc<dyn Resolver>> {
    let addr = addr.trim();
    if addr.is_empty() {
        return Err(Error::EmptyInput);
    }
    if addr.eq_ignore_ascii_case("system") {
        return Ok(Arc::new(SystemResolver::new()));
    }

    let (scheme, rest) = match split_scheme(addr) {
        Some((scheme, rest)) => (scheme, rest),
        None => (String::new(), addr),
    };

    let resolver: Arc<dyn Resolver> = match scheme.as_str() {
        "" | "udp" => {
            let transport = UdpTransport::new(addr, authority(rest, 53)?, dial);
            Arc::new(UdpClient::new(transport).with_timeout(timeout))
        }
        "tcp" => {
            let transport = TcpTransport::new(addr, authority(rest, 53)?, dial);
            Arc::new(TcpClient::new(transport).with_timeout(timeout))
        }
        "tls" | "tcp-tls" => {
            let transport = DotTransport::new(addr, authority(rest, 853)?, dial)?;
            Arc::new(DotClient::new(transport).with_timeout(timeout))
        }
        "https" => {
            let transport = DohTransport::new(addr, dial)?;
            Arc::new(DohClient::new(transport).with_timeout(timeout))
        }
        other => return Err(Error::UnsupportedProtocol(other.to_string())),
    };

    debug!("Created {} resolver {}", if scheme.is_empty() { "udp" } else { &scheme }, addr);
    Ok(resolver)
}

/// `host[:port][/path]` -> `host:port`
fn authority(rest: &str, default_port: u16) -> Result<String> {
    let rest = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let (host, port) = split_addr(rest, default_port)?;
    if host.is_empty() {
        return Err(Error::Dns(format!("missing host in {:?}", rest)));
    }
    Ok(join_host_port(&host, port))
}

/// IP 字面量直接返回, 不发起查询
pub(crate) fn ip_literal(host: &str) -> Option<IpAddr> {
    host.trim_start_matches('[').trim_end_matches(']').parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authority_defaults() {
        assert_eq!(authority("1.1.1.1", 53).unwrap(), "1.1.1.1:53");
        assert_eq!(authority("1.1.1.1:5353", 53).unwrap(), "1.1.1.1:5353");
        assert_eq!(authority("dns.google/", 853).unwrap(), "dns.google:853");
        assert_eq!(authority("[2001:4860:4860::8888]", 53).unwrap(), "[2001:4860:4860::8888]:53");
    }

    #[test]
    fn test_new_resolver_schemes() {
        for addr in [
            "8.8.8.8",
            "8.8.8.8:53",
            "udp://8.8.8.8",
            "tcp://8.8.8.8:53",
            "tls://dns.google",
            "tcp-tls://dns.google:853",
            "https://dns.google/dns-query",
            "system",
        ] {
            let resolver = new_resolver(addr).unwrap();
            assert_eq!(resolver.name(), addr);
        }
    }

    #[test]
    fn test_new_resolver_unsupported() {
        assert!(matches!(
            new_resolver("quic://dns.adguard.com"),
            Err(Error::UnsupportedProtocol(s)) if s == "quic"
        ));
        assert!(matches!(new_resolver("  "), Err(Error::EmptyInput)));
    }

    #[test]
    fn test_ip_literal() {
        assert_eq!(ip_literal("1.2.3.4"), Some("1.2.3.4".parse().unwrap()));
        assert_eq!(ip_literal("[::1]"), Some("::1".parse().unwrap()));
        assert_eq!(ip_literal("example.com"), None);
    }
}
