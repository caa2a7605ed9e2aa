use std::net::IpAddr;

use async_trait::async_trait;
use tracing::debug;

use super::{ip_literal, Resolver};
use crate::error::Result;

/// 操作系统解析器 (getaddrinfo)
#[derive(Debug, Clone, Default)]
pub struct SystemResolver;

impl SystemResolver {
    pub fn new() -> Self {
        Self
    }

    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>> {
        if let Some(ip) = ip_literal(host) {
            return Ok(vec![ip]);
        }
        let mut ips: Vec<IpAddr> = Vec::new();
        for addr in tokio::net::lookup_host((host, 0)).await? {
            if !ips.contains(&addr.ip()) {
                ips.push(addr.ip());
            }
        }
        debug!("system {} -> {:?}", host, ips);
        Ok(ips)
    }
}

#[async_trait]
impl Resolver for SystemResolver {
    fn name(&self) -> &str {
        "system"
    }

    async fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>> {
        self.lookup(host).await
    }

    async fn lookup_ipv4(&self, host: &str) -> Result<Vec<IpAddr>> {
        Ok(self.lookup(host).await?.into_iter().filter(IpAddr::is_ipv4).collect())
    }

    async fn lookup_ipv6(&self, host: &str) -> Result<Vec<IpAddr>> {
        Ok(self.lookup(host).await?.into_iter().filter(IpAddr::is_ipv6).collect())
    }
}
