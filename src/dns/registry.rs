//! 解析器注册表
//!
//! 未命中缓存时并发询问所有上游 (并发上限默认 5), 按注册顺序合并去重,
//! 非空结果写入缓存。单个上游出错只记录日志。

use std::collections::{BTreeMap, HashSet};
use std::net::IpAddr;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use super::cache::{DnsCache, DEFAULT_CACHE_AGE, DEFAULT_CACHE_SIZE};
use super::{build_resolver, ip_literal, DefaultDial, Resolver, SystemResolver};
use crate::config::DnsConfig;
use crate::error::{Error, Result};

/// 默认并发上限
pub const DEFAULT_CONCURRENCY: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Any,
    V4,
    V6,
}

impl Family {
    fn prefix(self) -> &'static str {
        match self {
            Family::Any => "ip",
            Family::V4 => "ip4",
            Family::V6 => "ip6",
        }
    }

    fn accepts(self, ip: &IpAddr) -> bool {
        match self {
            Family::Any => true,
            Family::V4 => ip.is_ipv4(),
            Family::V6 => ip.is_ipv6(),
        }
    }

    async fn lookup(self, resolver: &dyn Resolver, host: &str) -> Result<Vec<IpAddr>> {
        match self {
            Family::Any => resolver.lookup_ip(host).await,
            Family::V4 => resolver.lookup_ipv4(host).await,
            Family::V6 => resolver.lookup_ipv6(host).await,
        }
    }
}

pub struct ResolverRegistry {
    resolvers: RwLock<Vec<Arc<dyn Resolver>>>,
    cache: Mutex<DnsCache>,
    concurrency: usize,
}

impl ResolverRegistry {
    pub fn new() -> Self {
        Self::with_options(DEFAULT_CACHE_SIZE, DEFAULT_CACHE_AGE, DEFAULT_CONCURRENCY)
    }

    pub fn with_options(cache_size: usize, cache_age: Duration, concurrency: usize) -> Self {
        Self {
            resolvers: RwLock::new(Vec::new()),
            cache: Mutex::new(DnsCache::new(cache_size, cache_age)),
            concurrency: concurrency.max(1),
        }
    }

    /// 按配置创建注册表及上游
    pub fn from_config(config: &DnsConfig) -> Result<Self> {
        let registry = Self::with_options(
            config.cache_size,
            Duration::from_secs(config.cache_age_secs),
            config.concurrency,
        );
        let timeout = Duration::from_secs(config.timeout_secs);

        for addr in &config.nameservers {
            let resolver = build_resolver(addr, Arc::new(DefaultDial::default()), timeout)?;
            registry.add_resolver(resolver);
        }
        if config.system {
            registry.add_resolver(Arc::new(SystemResolver::new()));
        }

        info!(
            "DNS registry ready: {} resolvers, cache {} entries / {}s",
            registry.len(),
            config.cache_size,
            config.cache_age_secs
        );
        Ok(registry)
    }

    pub fn add_resolver(&self, resolver: Arc<dyn Resolver>) {
        debug!("Adding resolver {}", resolver.name());
        self.resolvers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(resolver);
    }

    /// 当前上游的快照
    pub fn resolvers(&self) -> Vec<Arc<dyn Resolver>> {
        self.resolvers.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.resolvers.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub async fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>> {
        self.lookup(Family::Any, host).await
    }

    pub async fn lookup_ipv4(&self, host: &str) -> Result<Vec<IpAddr>> {
        self.lookup(Family::V4, host).await
    }

    pub async fn lookup_ipv6(&self, host: &str) -> Result<Vec<IpAddr>> {
        self.lookup(Family::V6, host).await
    }

    /// 第一个 IPv4 地址
    pub async fn lookup_host(&self, host: &str) -> Result<IpAddr> {
        self.lookup_ipv4(host)
            .await?
            .into_iter()
            .next()
            .ok_or(Error::EmptyResponse)
    }

    /// 每个上游各自的结果 (排序后), 用于诊断; 空结果和错误被省略
    pub async fn query_a(&self, host: &str) -> BTreeMap<String, Vec<IpAddr>> {
        let results: Vec<(String, Result<Vec<IpAddr>>)> = stream::iter(self.resolvers())
            .map(|resolver| async move {
                let result = resolver.lookup_ip(host).await;
                (resolver.name().to_string(), result)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut breakdown = BTreeMap::new();
        for (name, result) in results {
            match result {
                Ok(mut ips) if !ips.is_empty() => {
                    ips.sort_by_key(|ip| ip.to_string());
                    breakdown.insert(name, ips);
                }
                Ok(_) => {}
                Err(e) => warn!("Resolver {} failed for {}: {}", name, host, e),
            }
        }
        breakdown
    }

    async fn lookup(&self, family: Family, host: &str) -> Result<Vec<IpAddr>> {
        if let Some(ip) = ip_literal(host) {
            return if family.accepts(&ip) {
                Ok(vec![ip])
            } else {
                Err(Error::EmptyResponse)
            };
        }

        let key = format!("{}:{}", family.prefix(), host);
        if let Some(ips) = self.cache.lock().unwrap_or_else(|e| e.into_inner()).get(&key) {
            debug!("DNS cache hit for {}", key);
            return Ok(ips);
        }

        // buffered 保持注册顺序
        let results: Vec<(String, Result<Vec<IpAddr>>)> = stream::iter(self.resolvers())
            .map(|resolver| async move {
                let result = family.lookup(resolver.as_ref(), host).await;
                (resolver.name().to_string(), result)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        for (name, result) in results {
            match result {
                Ok(ips) => {
                    for ip in ips {
                        if seen.insert(ip.to_string()) {
                            merged.push(ip);
                        }
                    }
                }
                Err(e) => warn!("Resolver {} failed for {}: {}", name, host, e),
            }
        }

        if merged.is_empty() {
            debug!("No resolver answered {}", key);
            return Err(Error::EmptyResponse);
        }

        debug!("DNS cache miss for {}, caching {} addresses", key, merged.len());
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .put(key, merged.clone());
        Ok(merged)
    }
}

impl Default for ResolverRegistry {
    fn default() -> Self {
        Self::new()
    }
}
