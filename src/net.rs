//! 连接抽象与底层拨号工具

use std::fmt;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::pin::Pin;
use std::str::FromStr;
use std::task::{Context, Poll};
use std::time::Duration;

use socket2::{SockRef, TcpKeepalive};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::{TcpStream, UdpSocket};
use tracing::debug;

use crate::error::{Error, Result};

/// TCP keep-alive 间隔
const KEEPALIVE: Duration = Duration::from_secs(30);

/// 可读写的双向连接
pub trait AsyncConn: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> AsyncConn for T {}

/// 装箱后的连接, 拨号器统一返回这个类型
pub type BoxedConn = Box<dyn AsyncConn>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    Tcp,
    Udp,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Tcp => "tcp",
            Network::Udp => "udp",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" | "tcp4" | "tcp6" => Ok(Network::Tcp),
            "udp" | "udp4" | "udp6" => Ok(Network::Udp),
            other => Err(Error::UnsupportedProtocol(other.to_string())),
        }
    }
}

/// 解析 host:port 为地址列表; `prefer_ipv4` 时 IPv4 排在前面
pub async fn resolve_socket_addrs(host: &str, port: u16, prefer_ipv4: bool) -> Result<Vec<SocketAddr>> {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(vec![SocketAddr::new(ip, port)]);
    }

    let mut addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, port)).await?.collect();
    if prefer_ipv4 {
        // 稳定排序, 同族内保持系统返回的顺序
        addrs.sort_by_key(|a| !a.is_ipv4());
    }
    if addrs.is_empty() {
        return Err(Error::Dial(format!("no address for {}", host)));
    }
    Ok(addrs)
}

/// 带超时的 TCP 连接, 依次尝试每个地址, 成功后开启 keep-alive
pub async fn connect_tcp(addrs: &[SocketAddr], timeout: Duration) -> Result<TcpStream> {
    let mut last_err = None;
    for addr in addrs {
        match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => {
                stream.set_nodelay(true)?;
                let keepalive = TcpKeepalive::new().with_time(KEEPALIVE);
                if let Err(e) = SockRef::from(&stream).set_tcp_keepalive(&keepalive) {
                    debug!("Failed to enable keep-alive on {}: {}", addr, e);
                }
                return Ok(stream);
            }
            Ok(Err(e)) => {
                debug!("Connect to {} failed: {}", addr, e);
                last_err = Some(Error::Io(e));
            }
            Err(_) => {
                debug!("Connect to {} timed out", addr);
                last_err = Some(Error::Timeout("tcp connect"));
            }
        }
    }
    Err(last_err.unwrap_or_else(|| Error::Dial("no address to connect".into())))
}

/// 已 connect 的 UDP socket, 每次读写对应一个数据报
#[derive(Debug)]
pub struct UdpConn {
    socket: UdpSocket,
}

impl UdpConn {
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let bind: SocketAddr = if addr.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };
        let socket = UdpSocket::bind(bind).await?;
        socket.connect(addr).await?;
        Ok(Self { socket })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

impl AsyncRead for UdpConn {
    fn poll_read(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        self.socket.poll_recv(cx, buf)
    }
}

impl AsyncWrite for UdpConn {
    fn poll_write(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        self.socket.poll_send(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// 拆分 `host:port`, 端口缺失时使用 `default_port`
pub fn split_addr(addr: &str, default_port: u16) -> Result<(String, u16)> {
    if let Ok(sa) = addr.parse::<SocketAddr>() {
        return Ok((sa.ip().to_string(), sa.port()));
    }
    if let Ok(ip) = addr.trim_start_matches('[').trim_end_matches(']').parse::<IpAddr>() {
        return Ok((ip.to_string(), default_port));
    }
    match addr.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse()
                .map_err(|_| Error::Dial(format!("invalid port in {:?}", addr)))?;
            Ok((host.to_string(), port))
        }
        None => Ok((addr.to_string(), default_port)),
    }
}
