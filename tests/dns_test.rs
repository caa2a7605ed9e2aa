//! DNS 集成测试: 缓存不被空结果污染、UDP 上游的超时上界

use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tokio_test::assert_ok;

use vanilla_ng::dns::{new_resolver, Resolver, ResolverRegistry};
use vanilla_ng::{Error, Result};

/// 开关控制是否有结果的上游
struct Switch {
    on: AtomicBool,
    calls: AtomicUsize,
}

impl Switch {
    fn new(on: bool) -> Arc<Self> {
        Arc::new(Self {
            on: AtomicBool::new(on),
            calls: AtomicUsize::new(0),
        })
    }

    fn set(&self, on: bool) {
        self.on.store(on, Ordering::SeqCst);
    }
}

#[async_trait]
impl Resolver for Switch {
    fn name(&self) -> &str {
        "switch"
    }

    async fn lookup_ip(&self, _host: &str) -> Result<Vec<IpAddr>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.on.load(Ordering::SeqCst) {
            Ok(vec!["192.0.2.7".parse().unwrap(), "2001:db8::7".parse().unwrap()])
        } else {
            Ok(Vec::new())
        }
    }

    async fn lookup_ipv4(&self, host: &str) -> Result<Vec<IpAddr>> {
        Ok(self.lookup_ip(host).await?.into_iter().filter(IpAddr::is_ipv4).collect())
    }

    async fn lookup_ipv6(&self, host: &str) -> Result<Vec<IpAddr>> {
        Ok(self.lookup_ip(host).await?.into_iter().filter(IpAddr::is_ipv6).collect())
    }
}

#[tokio::test]
async fn test_cache_not_polluted_by_empty_answers() {
    let upstream = Switch::new(false);
    let registry = ResolverRegistry::new();
    registry.add_resolver(upstream.clone());

    // 空结果不缓存, 每次都重新询问上游
    assert!(matches!(registry.lookup_ip("a.example").await, Err(Error::EmptyResponse)));
    assert!(matches!(registry.lookup_ip("a.example").await, Err(Error::EmptyResponse)));
    assert_eq!(upstream.calls.load(Ordering::SeqCst), 2);

    upstream.set(true);
    let ips = assert_ok!(registry.lookup_ip("a.example").await);
    assert_eq!(ips.len(), 2);
    assert_eq!(upstream.calls.load(Ordering::SeqCst), 3);

    // 命中缓存, 上游变空也不影响
    upstream.set(false);
    assert_eq!(assert_ok!(registry.lookup_ip("a.example").await), ips);
    assert_eq!(upstream.calls.load(Ordering::SeqCst), 3);

    // 不同族使用独立的键
    assert!(matches!(registry.lookup_ipv6("a.example").await, Err(Error::EmptyResponse)));
}

/// 记录同时在途的查询数
struct Slow {
    name: String,
    ip: IpAddr,
    delay: Duration,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

#[async_trait]
impl Resolver for Slow {
    fn name(&self) -> &str {
        &self.name
    }

    async fn lookup_ip(&self, _host: &str) -> Result<Vec<IpAddr>> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(vec![self.ip])
    }

    async fn lookup_ipv4(&self, host: &str) -> Result<Vec<IpAddr>> {
        self.lookup_ip(host).await
    }

    async fn lookup_ipv6(&self, _host: &str) -> Result<Vec<IpAddr>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_fan_out_is_bounded_and_ordered() {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let registry = ResolverRegistry::new();

    // 越早注册的上游越慢, 合并结果仍按注册顺序
    for i in 0..12u64 {
        registry.add_resolver(Arc::new(Slow {
            name: format!("slow-{}", i),
            ip: IpAddr::from([192, 0, 2, i as u8 + 1]),
            delay: Duration::from_millis(120 - i * 10),
            in_flight: in_flight.clone(),
            peak: peak.clone(),
        }));
    }

    let ips = assert_ok!(registry.lookup_ip("fan.example").await);
    let expected: Vec<IpAddr> = (0..12u8).map(|i| IpAddr::from([192, 0, 2, i + 1])).collect();
    assert_eq!(ips, expected);
    assert_eq!(peak.load(Ordering::SeqCst), 5);
    assert_eq!(in_flight.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_lookup_host_prefers_ipv4() {
    let registry = ResolverRegistry::new();
    registry.add_resolver(Switch::new(true));
    let ip = assert_ok!(registry.lookup_host("b.example").await);
    assert_eq!(ip, "192.0.2.7".parse::<IpAddr>().unwrap());
}

#[tokio::test]
async fn test_silent_udp_upstream_is_bounded() {
    // 只收不回的上游
    let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = silent.local_addr().unwrap();

    let resolver = new_resolver(&format!("udp://{}", addr)).unwrap();
    assert_eq!(resolver.name(), format!("udp://{}", addr));

    let started = Instant::now();
    let result = resolver.lookup_ipv4("example.com").await;
    assert!(result.is_err());
    assert!(started.elapsed() < Duration::from_secs(8));
}

#[tokio::test]
async fn test_public_udp_upstream_never_hangs() {
    let resolver = new_resolver("udp://119.29.29.29").unwrap();

    let started = Instant::now();
    // 有网络时返回地址, 不可达时返回错误, 两种情况都在超时内结束
    let _ = resolver.lookup_ip("example.com").await;
    assert!(started.elapsed() < Duration::from_secs(8));
}

#[test]
fn test_unsupported_upstream() {
    assert!(matches!(new_resolver("quic://dns.example"), Err(Error::UnsupportedProtocol(_))));
    assert!(matches!(new_resolver("  "), Err(Error::EmptyInput)));
}

#[test]
fn test_ip_literal_needs_no_upstream() {
    let registry = ResolverRegistry::new();
    let ips = tokio_test::block_on(registry.lookup_ip("10.1.2.3")).unwrap();
    assert_eq!(ips, vec!["10.1.2.3".parse::<IpAddr>().unwrap()]);
    assert!(matches!(
        tokio_test::block_on(registry.lookup_ipv6("10.1.2.3")),
        Err(Error::EmptyResponse)
    ));
}
