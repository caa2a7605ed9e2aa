use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::net::{connect_tcp, resolve_socket_addrs, split_addr, BoxedConn, Network, UdpConn};

/// 上游连接超时
pub const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(3);

/// DNS 上游使用的拨号器
#[async_trait]
pub trait Dial: Send + Sync {
    async fn dial(&self, network: Network, addr: &str) -> Result<BoxedConn>;
}

/// 直接连接上游, 固定超时
#[derive(Debug, Clone)]
pub struct DefaultDial {
    timeout: Duration,
}

impl DefaultDial {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for DefaultDial {
    fn default() -> Self {
        Self::new(DEFAULT_DIAL_TIMEOUT)
    }
}

#[async_trait]
impl Dial for DefaultDial {
    async fn dial(&self, network: Network, addr: &str) -> Result<BoxedConn> {
        let (host, port) = split_addr(addr, 0)?;
        if port == 0 {
            return Err(Error::Dial(format!("missing port in {:?}", addr)));
        }
        let addrs = tokio::time::timeout(self.timeout, resolve_socket_addrs(&host, port, true))
            .await
            .map_err(|_| Error::Timeout("resolve upstream"))??;

        match network {
            Network::Tcp => Ok(Box::new(connect_tcp(&addrs, self.timeout).await?)),
            Network::Udp => Ok(Box::new(UdpConn::connect(addrs[0]).await?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_default_dial_tcp() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut s, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 3];
            s.read_exact(&mut buf).await.unwrap();
            s.write_all(&buf).await.unwrap();
        });

        let mut conn = DefaultDial::default().dial(Network::Tcp, &addr.to_string()).await.unwrap();
        conn.write_all(b"abc").await.unwrap();
        let mut buf = [0u8; 3];
        conn.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"abc");
    }

    #[tokio::test]
    async fn test_default_dial_requires_port() {
        let err = DefaultDial::default().dial(Network::Udp, "127.0.0.1").await.err().unwrap();
        assert!(matches!(err, Error::Dial(_)));
    }
}
