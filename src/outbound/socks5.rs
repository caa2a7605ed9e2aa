use async_trait::async_trait;
use fast_socks5::client::{Config, Socks5Stream};
use tracing::{debug, info};

use super::{DialOptions, Metadata, ProxyDialer};
use crate::error::{Error, Result};
use crate::link::builder::join_host_port;
use crate::net::{BoxedConn, Network};
use crate::option::{ProxyType, Socks5Option};

/// SOCKS5 拨号器 (使用 fast-socks5 库, 仅 TCP CONNECT)
#[derive(Debug, Clone)]
pub struct Socks5Dialer {
    name: String,
    proxy_addr: String,
    /// 可选的认证信息
    auth: Option<(String, String)>,
    tls: bool,
    udp: bool,
    tfo: bool,
}

impl Socks5Dialer {
    pub fn new(option: &Socks5Option) -> Self {
        let auth = if option.username.is_empty() && option.password.is_empty() {
            None
        } else {
            Some((option.username.clone(), option.password.clone()))
        };
        Self {
            name: option.name.clone(),
            proxy_addr: join_host_port(&option.server, option.port),
            auth,
            tls: option.tls,
            udp: option.udp,
            tfo: option.basic.tfo,
        }
    }

    /// 通过代理连接目标
    async fn connect(&self, target: String, port: u16) -> Result<BoxedConn> {
        debug!("SOCKS5 CONNECT to {}:{} via proxy {}", target, port, self.proxy_addr);

        // Config 不实现 Clone, 每次使用 default
        let stream = match &self.auth {
            Some((username, password)) => {
                Socks5Stream::connect_with_password(
                    &self.proxy_addr,
                    target.clone(),
                    port,
                    username.clone(),
                    password.clone(),
                    Config::default(),
                )
                .await
            }
            None => Socks5Stream::connect(&self.proxy_addr, target.clone(), port, Config::default()).await,
        }
        .map_err(|e| Error::Dial(format!("SOCKS5 connection failed: {}", e)))?;

        info!("SOCKS5 CONNECT established: {}:{} via {}", target, port, self.proxy_addr);
        Ok(Box::new(stream))
    }
}

#[async_trait]
impl ProxyDialer for Socks5Dialer {
    fn name(&self) -> &str {
        &self.name
    }

    fn proxy_type(&self) -> ProxyType {
        ProxyType::Socks5
    }

    fn addr(&self) -> &str {
        &self.proxy_addr
    }

    fn support_udp(&self) -> bool {
        self.udp
    }

    fn support_tfo(&self) -> bool {
        self.tfo
    }

    async fn dial_context(&self, metadata: &Metadata, opts: &DialOptions) -> Result<BoxedConn> {
        if metadata.network == Network::Udp {
            return Err(Error::UnsupportedProtocol("socks5 udp associate".into()));
        }
        if self.tls {
            return Err(Error::UnsupportedProtocol("socks5 over tls".into()));
        }
        if !metadata.is_valid() {
            return Err(Error::Dial(format!("invalid target {:?}", metadata.remote_address())));
        }

        tokio::time::timeout(opts.timeout, self.connect(metadata.target_host(), metadata.dst_port))
            .await
            .map_err(|_| Error::Timeout("socks5 connect"))?
    }
}
