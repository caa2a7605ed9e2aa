//! 经由适配器拨号
//!
//! `http_dial_context` 按适配器的 DNS 策略先解析目标域名, 再交给拨号器;
//! `dial_for_dns` 供 remote 模式的上游使用, 不做解析且有固定超时。

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{Adapter, DnsPolicy};
use crate::dns::Dial;
use crate::error::{Error, Result};
use crate::net::{split_addr, BoxedConn, Network};
use crate::outbound::{DialOptions, Metadata, ProxyDialer};

/// 经由节点访问 DNS 上游时的拨号超时
pub const DNS_DIAL_TIMEOUT: Duration = Duration::from_secs(3);

fn metadata_for(network: Network, addr: &str) -> Result<Metadata> {
    let (host, port) = split_addr(addr, 0)?;
    if host.is_empty() || port == 0 {
        return Err(Error::Dial(format!("invalid address {:?}", addr)));
    }
    Ok(Metadata::new(network, host, port))
}

async fn dial_via(dialer: &dyn ProxyDialer, network: Network, addr: &str) -> Result<BoxedConn> {
    let metadata = metadata_for(network, addr)?;
    let opts = DialOptions {
        prefer_ipv4: true,
        timeout: DNS_DIAL_TIMEOUT,
    };
    match tokio::time::timeout(DNS_DIAL_TIMEOUT, dialer.dial_context(&metadata, &opts)).await {
        Ok(conn) => conn,
        Err(_) => Err(Error::Timeout("dial for dns")),
    }
}

impl Adapter {
    /// 按 DNS 策略解析后拨号; 解析失败时保留域名交给拨号器
    pub async fn http_dial_context(&self, network: Network, addr: &str) -> Result<BoxedConn> {
        let mut metadata = metadata_for(network, addr)?;

        if metadata.dst_ip.is_none() {
            match self.resolve(&metadata.host).await {
                Ok(Some(ip)) => {
                    debug!("[{}] {} -> {}", self.short_id(), metadata.host, ip);
                    metadata.dst_ip = Some(ip);
                    metadata.host.clear();
                    metadata.dns_mapped = true;
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(
                        "[{}] Resolve {} failed, dialing by name: {}",
                        self.short_id(),
                        metadata.host,
                        e
                    );
                }
            }
        }

        let opts = DialOptions {
            prefer_ipv4: true,
            ..Default::default()
        };
        self.dialer.dial_context(&metadata, &opts).await
    }

    /// 不经过 DNS 策略的拨号, 固定超时
    pub async fn dial_for_dns(&self, network: Network, addr: &str) -> Result<BoxedConn> {
        dial_via(self.dialer.as_ref(), network, addr).await
    }

    /// `Ok(None)` 表示当前模式不做解析
    ///
    /// direct 走注册表的 `lookup_host`, remote 只查 A 记录
    async fn resolve(&self, host: &str) -> Result<Option<IpAddr>> {
        match &self.dns {
            DnsPolicy::Disable => Ok(None),
            DnsPolicy::Direct(registry) => Ok(Some(registry.lookup_host(host).await?)),
            DnsPolicy::Remote(resolvers) => {
                for resolver in resolvers {
                    match resolver.lookup_ipv4(host).await {
                        Ok(ips) if !ips.is_empty() => return Ok(ips.first().copied()),
                        Ok(_) => debug!("{} returned nothing for {}", resolver.name(), host),
                        Err(e) => debug!("{} failed for {}: {}", resolver.name(), host, e),
                    }
                }
                Err(Error::EmptyResponse)
            }
        }
    }
}

/// 让 DNS 上游经由节点拨号
///
/// 只持有拨号器而不是适配器本身, 避免适配器与其解析器互相引用。
#[derive(Clone)]
pub struct AdapterDial {
    dialer: Arc<dyn ProxyDialer>,
}

impl AdapterDial {
    pub fn new(dialer: Arc<dyn ProxyDialer>) -> Self {
        Self { dialer }
    }
}

impl From<&Adapter> for AdapterDial {
    fn from(adapter: &Adapter) -> Self {
        Self::new(adapter.dialer.clone())
    }
}

#[async_trait]
impl Dial for AdapterDial {
    async fn dial(&self, network: Network, addr: &str) -> Result<BoxedConn> {
        dial_via(self.dialer.as_ref(), network, addr).await
    }
}
