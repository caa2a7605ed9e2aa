//! 上游传输: UDP / TCP / DoT / DoH
//!
//! 每种传输只负责把一个查询报文换成一个应答报文, 报文构造和解析由
//! [`StubResolver`] 统一完成。

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use hickory_proto::rr::RecordType;
use http_body_util::{BodyExt, Full};
use hyper::header::{ACCEPT, CONTENT_TYPE, HOST};
use hyper::{Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use rustls::ClientConfig;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;
use url::Url;

use super::message::{build_query, next_id, parse_response};
use super::{ip_literal, Dial, Resolver, DEFAULT_QUERY_TIMEOUT};
use crate::error::{Error, Result};
use crate::link::builder::join_host_port;
use crate::net::{split_addr, Network};
use crate::tls;

/// UDP 应答缓冲区
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

const DNS_MESSAGE: &str = "application/dns-message";

#[async_trait]
pub trait DnsTransport: Send + Sync {
    fn name(&self) -> &str;

    /// 发送查询报文, 返回应答报文
    async fn exchange(&self, query: &[u8]) -> Result<Vec<u8>>;

    /// 固定的查询 ID; DoH 使用 0 以便缓存
    fn fixed_id(&self) -> Option<u16> {
        None
    }
}

/// 基于某种传输的存根解析器
pub struct StubResolver<T> {
    transport: T,
    timeout: Duration,
}

pub type UdpClient = StubResolver<UdpTransport>;
pub type TcpClient = StubResolver<TcpTransport>;
pub type DotClient = StubResolver<DotTransport>;
pub type DohClient = StubResolver<DohTransport>;

impl<T: DnsTransport> StubResolver<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn query(&self, host: &str, record_type: RecordType) -> Result<Vec<IpAddr>> {
        let id = self.transport.fixed_id().unwrap_or_else(next_id);
        let packet = build_query(id, host, record_type)?;

        let resp = tokio::time::timeout(self.timeout, self.transport.exchange(&packet))
            .await
            .map_err(|_| Error::Timeout("dns query"))??;
        let ips = parse_response(id, &resp, record_type)?;

        debug!("{} {:?} {} -> {:?}", self.transport.name(), record_type, host, ips);
        Ok(ips)
    }
}

#[async_trait]
impl<T: DnsTransport> Resolver for StubResolver<T> {
    fn name(&self) -> &str {
        self.transport.name()
    }

    async fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>> {
        if let Some(ip) = ip_literal(host) {
            return Ok(vec![ip]);
        }

        let (v4, v6) = tokio::join!(self.query(host, RecordType::A), self.query(host, RecordType::AAAA));
        match (v4, v6) {
            (Ok(mut v4), Ok(v6)) => {
                v4.extend(v6);
                Ok(v4)
            }
            (Ok(ips), Err(e)) | (Err(e), Ok(ips)) => {
                if ips.is_empty() {
                    Err(e)
                } else {
                    debug!("{}: partial answer for {}: {}", self.name(), host, e);
                    Ok(ips)
                }
            }
            (Err(e), Err(_)) => Err(e),
        }
    }

    async fn lookup_ipv4(&self, host: &str) -> Result<Vec<IpAddr>> {
        match ip_literal(host) {
            Some(ip) if ip.is_ipv4() => Ok(vec![ip]),
            Some(_) => Ok(Vec::new()),
            None => self.query(host, RecordType::A).await,
        }
    }

    async fn lookup_ipv6(&self, host: &str) -> Result<Vec<IpAddr>> {
        match ip_literal(host) {
            Some(ip) if ip.is_ipv6() => Ok(vec![ip]),
            Some(_) => Ok(Vec::new()),
            None => self.query(host, RecordType::AAAA).await,
        }
    }
}

/// TCP / DoT 的两字节长度前缀帧
async fn exchange_framed<S>(stream: &mut S, query: &[u8]) -> Result<Vec<u8>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let len = u16::try_from(query.len()).map_err(|_| Error::Dns("query too large".into()))?;
    let mut frame = Vec::with_capacity(query.len() + 2);
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(query);
    stream.write_all(&frame).await?;
    stream.flush().await?;

    let mut len = [0u8; 2];
    stream.read_exact(&mut len).await?;
    let mut resp = vec![0u8; u16::from_be_bytes(len) as usize];
    stream.read_exact(&mut resp).await?;
    Ok(resp)
}

pub struct UdpTransport {
    name: String,
    addr: String,
    dial: Arc<dyn Dial>,
}

impl UdpTransport {
    pub fn new<S: Into<String>>(name: S, addr: String, dial: Arc<dyn Dial>) -> Self {
        Self {
            name: name.into(),
            addr,
            dial,
        }
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exchange(&self, query: &[u8]) -> Result<Vec<u8>> {
        let mut conn = self.dial.dial(Network::Udp, &self.addr).await?;
        conn.write_all(query).await?;

        let mut buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        let n = conn.read(&mut buf).await?;
        if n == 0 {
            return Err(Error::Dns(format!("empty datagram from {}", self.addr)));
        }
        buf.truncate(n);
        Ok(buf)
    }
}

pub struct TcpTransport {
    name: String,
    addr: String,
    dial: Arc<dyn Dial>,
}

impl TcpTransport {
    pub fn new<S: Into<String>>(name: S, addr: String, dial: Arc<dyn Dial>) -> Self {
        Self {
            name: name.into(),
            addr,
            dial,
        }
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exchange(&self, query: &[u8]) -> Result<Vec<u8>> {
        let mut conn = self.dial.dial(Network::Tcp, &self.addr).await?;
        exchange_framed(&mut conn, query).await
    }
}

/// DNS over TLS, SNI 为上游主机名
pub struct DotTransport {
    name: String,
    addr: String,
    server_name: String,
    dial: Arc<dyn Dial>,
    tls_config: Arc<ClientConfig>,
}

impl DotTransport {
    pub fn new<S: Into<String>>(name: S, addr: String, dial: Arc<dyn Dial>) -> Result<Self> {
        let (server_name, _) = split_addr(&addr, 853)?;
        Ok(Self {
            name: name.into(),
            addr,
            server_name,
            dial,
            tls_config: tls::client_config(&[], false)?,
        })
    }
}

#[async_trait]
impl DnsTransport for DotTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exchange(&self, query: &[u8]) -> Result<Vec<u8>> {
        let conn = self.dial.dial(Network::Tcp, &self.addr).await?;
        let mut stream = tls::connect(conn, &self.server_name, self.tls_config.clone()).await?;
        exchange_framed(&mut stream, query).await
    }
}

/// DNS over HTTPS (RFC 8484 POST, HTTP/1.1)
pub struct DohTransport {
    name: String,
    host: String,
    addr: String,
    path: String,
    dial: Arc<dyn Dial>,
    tls_config: Arc<ClientConfig>,
}

impl DohTransport {
    pub fn new<S: Into<String>>(uri: S, dial: Arc<dyn Dial>) -> Result<Self> {
        let uri = uri.into();
        let url = Url::parse(&uri).map_err(|e| Error::Dns(format!("invalid DoH url {:?}: {}", uri, e)))?;
        let host = url
            .host_str()
            .map(|h| h.trim_start_matches('[').trim_end_matches(']').to_string())
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::Dns(format!("missing host in {:?}", uri)))?;
        let port = url.port_or_known_default().unwrap_or(443);

        let mut path = url.path().to_string();
        if let Some(query) = url.query() {
            path.push('?');
            path.push_str(query);
        }

        Ok(Self {
            addr: join_host_port(&host, port),
            host,
            path,
            name: uri,
            dial,
            tls_config: tls::client_config(&["http/1.1"], false)?,
        })
    }
}

#[async_trait]
impl DnsTransport for DohTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn fixed_id(&self) -> Option<u16> {
        Some(0)
    }

    async fn exchange(&self, query: &[u8]) -> Result<Vec<u8>> {
        let conn = self.dial.dial(Network::Tcp, &self.addr).await?;
        let stream = tls::connect(conn, &self.host, self.tls_config.clone()).await?;

        let (mut sender, connection) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
            .await
            .map_err(Error::dns)?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                debug!("DoH connection closed: {}", e);
            }
        });

        let req = Request::builder()
            .method(Method::POST)
            .uri(self.path.as_str())
            .header(HOST, self.host.as_str())
            .header(CONTENT_TYPE, DNS_MESSAGE)
            .header(ACCEPT, DNS_MESSAGE)
            .body(Full::new(Bytes::copy_from_slice(query)))
            .map_err(Error::dns)?;

        let resp = sender.send_request(req).await.map_err(Error::dns)?;
        if resp.status() != StatusCode::OK {
            return Err(Error::Dns(format!("{} returned HTTP {}", self.name, resp.status())));
        }
        let body = resp.into_body().collect().await.map_err(Error::dns)?.to_bytes();
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::message::tests::answer;
    use crate::dns::DefaultDial;
    use hickory_proto::op::ResponseCode;
    use std::net::{Ipv4Addr, Ipv6Addr};
    use tokio::net::{TcpListener, UdpSocket};

    /// 本地 UDP 上游, 对 A 返回 1.2.3.4, 对 AAAA 返回 ::1
    async fn udp_upstream() -> String {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let mut buf = [0u8; 512];
            loop {
                let (n, peer) = socket.recv_from(&mut buf).await.unwrap();
                let resp = answer(&buf[..n], &[Ipv4Addr::new(1, 2, 3, 4)], &[Ipv6Addr::LOCALHOST], ResponseCode::NoError);
                socket.send_to(&resp, peer).await.unwrap();
            }
        });
        addr
    }

    async fn tcp_upstream() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            loop {
                let (mut s, _) = listener.accept().await.unwrap();
                let mut len = [0u8; 2];
                s.read_exact(&mut len).await.unwrap();
                let mut query = vec![0u8; u16::from_be_bytes(len) as usize];
                s.read_exact(&mut query).await.unwrap();
                let resp = answer(&query, &[Ipv4Addr::new(5, 6, 7, 8)], &[], ResponseCode::NoError);
                s.write_all(&(resp.len() as u16).to_be_bytes()).await.unwrap();
                s.write_all(&resp).await.unwrap();
            }
        });
        addr
    }

    #[tokio::test]
    async fn test_udp_lookup() {
        let addr = udp_upstream().await;
        let client = UdpClient::new(UdpTransport::new("local", addr, Arc::new(DefaultDial::default())));

        assert_eq!(client.lookup_ipv4("example.com").await.unwrap(), vec![IpAddr::from([1, 2, 3, 4])]);
        assert_eq!(client.lookup_ipv6("example.com").await.unwrap(), vec![IpAddr::V6(Ipv6Addr::LOCALHOST)]);

        let all = client.lookup_ip("example.com").await.unwrap();
        assert_eq!(all, vec![IpAddr::from([1, 2, 3, 4]), IpAddr::V6(Ipv6Addr::LOCALHOST)]);
    }

    #[tokio::test]
    async fn test_tcp_lookup() {
        let addr = tcp_upstream().await;
        let client = TcpClient::new(TcpTransport::new("local", addr, Arc::new(DefaultDial::default())));
        assert_eq!(client.lookup_ipv4("example.com").await.unwrap(), vec![IpAddr::from([5, 6, 7, 8])]);
    }

    #[tokio::test]
    async fn test_ip_literal_skips_query() {
        // 端口 9 没有上游, 字面量不应触发查询
        let client = UdpClient::new(UdpTransport::new("none", "127.0.0.1:9".into(), Arc::new(DefaultDial::default())));
        assert_eq!(client.lookup_ip("10.0.0.1").await.unwrap(), vec![IpAddr::from([10, 0, 0, 1])]);
        assert!(client.lookup_ipv4("::1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_timeout() {
        // 只接收不应答的上游
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap().to_string();
        let client = UdpClient::new(UdpTransport::new("silent", addr, Arc::new(DefaultDial::default())))
            .with_timeout(Duration::from_millis(200));
        let err = client.lookup_ipv4("example.com").await.unwrap_err();
        assert!(matches!(err, Error::Timeout(_)));
        drop(socket);
    }

    #[test]
    fn test_doh_transport_parts() {
        let t = DohTransport::new("https://dns.google/dns-query?ct", Arc::new(DefaultDial::default())).unwrap();
        assert_eq!(t.addr, "dns.google:443");
        assert_eq!(t.host, "dns.google");
        assert_eq!(t.path, "/dns-query?ct");
        assert_eq!(t.fixed_id(), Some(0));

        let t = DohTransport::new("https://1.1.1.1:8443/", Arc::new(DefaultDial::default())).unwrap();
        assert_eq!(t.addr, "1.1.1.1:8443");
        assert_eq!(t.path, "/");
    }

    #[test]
    fn test_dot_server_name() {
        let t = DotTransport::new("tls://dns.google", "dns.google:853".into(), Arc::new(DefaultDial::default())).unwrap();
        assert_eq!(t.server_name, "dns.google");
    }
}
