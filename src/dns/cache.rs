//! 解析结果缓存
//!
//! LRU 容量上限 + 按存活时间过期, 命中时刷新时间。空结果不入缓存。

use std::net::IpAddr;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;

/// 默认容量
pub const DEFAULT_CACHE_SIZE: usize = 50;

/// 默认存活时间
pub const DEFAULT_CACHE_AGE: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct CacheEntry {
    ips: Vec<IpAddr>,
    touched: Instant,
}

#[derive(Debug)]
pub struct DnsCache {
    entries: LruCache<String, CacheEntry>,
    max_age: Duration,
}

impl DnsCache {
    pub fn new(size: usize, max_age: Duration) -> Self {
        Self {
            entries: LruCache::new(NonZeroUsize::new(size).unwrap_or(NonZeroUsize::MIN)),
            max_age,
        }
    }

    /// 命中且未过期时返回副本并刷新时间; 过期条目被移除
    pub fn get(&mut self, key: &str) -> Option<Vec<IpAddr>> {
        let expired = match self.entries.get_mut(key) {
            Some(entry) if entry.touched.elapsed() < self.max_age => {
                entry.touched = Instant::now();
                return Some(entry.ips.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.pop(key);
        }
        None
    }

    /// 写入非空结果
    pub fn put(&mut self, key: String, ips: Vec<IpAddr>) {
        if ips.is_empty() {
            return;
        }
        self.entries.put(
            key,
            CacheEntry {
                ips,
                touched: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for DnsCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE, DEFAULT_CACHE_AGE)
    }
}
