//! HTTP CONNECT 代理

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info};

use super::{DialOptions, Metadata, ProxyDialer};
use crate::codec::base64::encode_std;
use crate::error::{Error, Result};
use crate::link::builder::join_host_port;
use crate::net::{connect_tcp, resolve_socket_addrs, BoxedConn, Network};
use crate::option::{HttpOption, ProxyType};
use crate::tls;

/// 响应头上限
const MAX_RESPONSE_HEAD: usize = 8192;

#[derive(Debug, Clone)]
pub struct HttpConnectDialer {
    option: HttpOption,
    addr: String,
}

impl HttpConnectDialer {
    pub fn new(option: &HttpOption) -> Self {
        Self {
            addr: join_host_port(&option.server, option.port),
            option: option.clone(),
        }
    }

    /// CONNECT 请求头
    fn request(&self, target: &str) -> String {
        let mut req = format!("CONNECT {} HTTP/1.1\r\nHost: {}\r\n", target, target);
        if !self.option.username.is_empty() || !self.option.password.is_empty() {
            let token = encode_std(&format!("{}:{}", self.option.username, self.option.password));
            req.push_str(&format!("Proxy-Authorization: Basic {}\r\n", token));
        }
        for (k, v) in &self.option.headers {
            if k.eq_ignore_ascii_case("host") {
                continue;
            }
            req.push_str(&format!("{}: {}\r\n", k, v));
        }
        req.push_str("\r\n");
        req
    }

    async fn connect(&self, metadata: &Metadata, opts: &DialOptions) -> Result<BoxedConn> {
        let addrs = resolve_socket_addrs(&self.option.server, self.option.port, opts.prefer_ipv4).await?;
        let stream = connect_tcp(&addrs, opts.timeout).await?;

        let mut conn: BoxedConn = if self.option.tls {
            let server_name = if self.option.sni.is_empty() {
                &self.option.server
            } else {
                &self.option.sni
            };
            let config = tls::client_config(&["http/1.1"], self.option.skip_cert_verify)?;
            Box::new(tls::connect(stream, server_name, config).await?)
        } else {
            Box::new(stream)
        };

        let target = metadata.remote_address();
        conn.write_all(self.request(&target).as_bytes()).await?;

        let head = read_response_head(&mut conn).await?;
        let status = parse_status(&head)?;
        if status != 200 {
            return Err(Error::Dial(format!("proxy {} refused CONNECT {}: status {}", self.addr, target, status)));
        }

        info!("HTTP CONNECT established: {} via {}", target, self.addr);
        Ok(conn)
    }
}

#[async_trait]
impl ProxyDialer for HttpConnectDialer {
    fn name(&self) -> &str {
        &self.option.name
    }

    fn proxy_type(&self) -> ProxyType {
        ProxyType::Http
    }

    fn addr(&self) -> &str {
        &self.addr
    }

    fn support_udp(&self) -> bool {
        false
    }

    fn support_tfo(&self) -> bool {
        self.option.basic.tfo
    }

    async fn dial_context(&self, metadata: &Metadata, opts: &DialOptions) -> Result<BoxedConn> {
        if metadata.network == Network::Udp {
            return Err(Error::UnsupportedProtocol("http proxy udp".into()));
        }
        if !metadata.is_valid() {
            return Err(Error::Dial(format!("invalid target {:?}", metadata.remote_address())));
        }
        debug!("HTTP CONNECT to {} via {}", metadata.remote_address(), self.addr);

        tokio::time::timeout(opts.timeout, self.connect(metadata, opts))
            .await
            .map_err(|_| Error::Timeout("http connect"))?
    }
}

/// 逐字节读取直到 `\r\n\r\n`, 不多读隧道数据
async fn read_response_head(conn: &mut BoxedConn) -> Result<Vec<u8>> {
    let mut head = Vec::with_capacity(256);
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        if head.len() >= MAX_RESPONSE_HEAD {
            return Err(Error::Dial("proxy response header too large".into()));
        }
        if conn.read(&mut byte).await? == 0 {
            return Err(Error::Dial("proxy closed connection during CONNECT".into()));
        }
        head.push(byte[0]);
    }
    Ok(head)
}

/// 从响应头中取出状态码
///
/// ```
/// use vanilla_ng::outbound::parse_status;
/// assert_eq!(parse_status(b"HTTP/1.1 200 Connection established\r\n\r\n").unwrap(), 200);
/// ```
pub fn parse_status(buf: &[u8]) -> Result<u16> {
    let head = std::str::from_utf8(buf).map_err(|e| Error::Dial(format!("invalid proxy response: {}", e)))?;
    let line = head.lines().next().unwrap_or_default().trim();

    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(version), Some(code)) if version.starts_with("HTTP/") => code
            .parse()
            .map_err(|_| Error::Dial(format!("malformed status line: {:?}", line))),
        _ => Err(Error::Dial(format!("malformed status line: {:?}", line))),
    }
}
