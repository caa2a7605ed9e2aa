use async_trait::async_trait;
use std::net::SocketAddr;
use tracing::{debug, info};

use super::{DialOptions, Metadata, ProxyDialer};
use crate::error::{Error, Result};
use crate::net::{connect_tcp, resolve_socket_addrs, BoxedConn, Network, UdpConn};
use crate::option::ProxyType;

/// 直连
#[derive(Debug, Clone)]
pub struct DirectDialer {
    name: String,
}

impl DirectDialer {
    pub fn new(name: &str) -> Self {
        let name = if name.is_empty() { "DIRECT" } else { name };
        Self { name: name.to_string() }
    }

    async fn target_addrs(metadata: &Metadata, opts: &DialOptions) -> Result<Vec<SocketAddr>> {
        match metadata.dst_ip {
            Some(ip) if metadata.host.is_empty() => Ok(vec![SocketAddr::new(ip, metadata.dst_port)]),
            _ => resolve_socket_addrs(&metadata.host, metadata.dst_port, opts.prefer_ipv4).await,
        }
    }
}

#[async_trait]
impl ProxyDialer for DirectDialer {
    fn name(&self) -> &str {
        &self.name
    }

    fn proxy_type(&self) -> ProxyType {
        ProxyType::Direct
    }

    fn addr(&self) -> &str {
        ""
    }

    fn support_udp(&self) -> bool {
        true
    }

    async fn dial_context(&self, metadata: &Metadata, opts: &DialOptions) -> Result<BoxedConn> {
        if !metadata.is_valid() {
            return Err(Error::Dial(format!("invalid target {:?}", metadata.remote_address())));
        }
        let addrs = Self::target_addrs(metadata, opts).await?;

        match metadata.network {
            Network::Tcp => {
                let stream = connect_tcp(&addrs, opts.timeout).await?;
                info!("Direct TCP connection to {} established", metadata.remote_address());
                Ok(Box::new(stream))
            }
            Network::Udp => {
                let addr = addrs[0];
                let conn = UdpConn::connect(addr).await?;
                debug!("Direct UDP socket to {} ready", addr);
                Ok(Box::new(conn))
            }
        }
    }
}

/// 拒绝所有连接: 返回的连接读到 EOF, 写入失败
#[derive(Debug, Clone)]
pub struct RejectDialer {
    name: String,
}

impl RejectDialer {
    pub fn new(name: &str) -> Self {
        let name = if name.is_empty() { "REJECT" } else { name };
        Self { name: name.to_string() }
    }
}

#[async_trait]
impl ProxyDialer for RejectDialer {
    fn name(&self) -> &str {
        &self.name
    }

    fn proxy_type(&self) -> ProxyType {
        ProxyType::Reject
    }

    fn addr(&self) -> &str {
        ""
    }

    fn support_udp(&self) -> bool {
        false
    }

    async fn dial_context(&self, metadata: &Metadata, _opts: &DialOptions) -> Result<BoxedConn> {
        debug!("Rejecting connection to {}", metadata.remote_address());
        let (conn, _peer) = tokio::io::duplex(1);
        Ok(Box::new(conn))
    }
}
