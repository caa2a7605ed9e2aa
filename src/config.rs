use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapter::DnsMode;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub dns: DnsConfig,
    #[serde(default)]
    pub subscription: SubscriptionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
    /// 日志格式: json, pretty
    #[serde(default = "default_log_format")]
    pub format: String,
    /// 可选: 同时写入的日志文件
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnsConfig {
    /// 上游地址, 例如 "8.8.8.8", "tls://dns.google", "https://1.1.1.1/dns-query"
    #[serde(default)]
    pub nameservers: Vec<String>,
    /// 是否追加系统解析器
    #[serde(default = "default_true")]
    pub system: bool,
    /// 缓存条目上限
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,
    /// 缓存存活时间(秒)
    #[serde(default = "default_cache_age")]
    pub cache_age_secs: u64,
    /// 并发询问上游的数量
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// 单次查询超时(秒)
    #[serde(default = "default_query_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionConfig {
    /// 订阅文件 (YAML 或 base64 链接列表)
    #[serde(default)]
    pub files: Vec<String>,
    /// 单独的分享链接
    #[serde(default)]
    pub links: Vec<String>,
    /// 节点拨号前的域名解析方式
    #[serde(default)]
    pub dns_mode: DnsMode,
    /// remote 模式下经由节点访问的上游
    #[serde(default)]
    pub remote_nameservers: Vec<String>,
    /// 可选: 启动后解析一次的域名, 用于检查 DNS 配置
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_host: Option<String>,
}

// 默认值函数
fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_true() -> bool {
    true
}

fn default_cache_size() -> usize {
    50
}

fn default_cache_age() -> u64 {
    60
}

fn default_concurrency() -> usize {
    5
}

fn default_query_timeout() -> u64 {
    5
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            nameservers: Vec::new(),
            system: default_true(),
            cache_size: default_cache_size(),
            cache_age_secs: default_cache_age(),
            concurrency: default_concurrency(),
            timeout_secs: default_query_timeout(),
        }
    }
}

impl Config {
    /// 从文件加载配置
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        Ok(config)
    }

    /// 保存配置到文件
    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parsing() {
        let toml_str = r#"
[log]
level = "debug"
format = "json"

[dns]
nameservers = ["8.8.8.8", "tls://dns.google", "https://1.1.1.1/dns-query"]
system = false
cache_size = 100

[subscription]
files = ["sub.yaml"]
links = ["trojan://pw@a.com:443#t"]
dns_mode = "remote"
remote_nameservers = ["tcp://8.8.8.8"]
probe_host = "www.google.com"
"#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.format, "json");
        assert!(config.log.file.is_none());
        assert_eq!(config.dns.nameservers.len(), 3);
        assert!(!config.dns.system);
        assert_eq!(config.dns.cache_size, 100);
        assert_eq!(config.dns.cache_age_secs, 60);
        assert_eq!(config.subscription.dns_mode, DnsMode::Remote);
        assert_eq!(config.subscription.probe_host.as_deref(), Some("www.google.com"));
    }

    #[test]
    fn test_default_values() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.log.level, "info");
        assert_eq!(config.log.format, "pretty");
        assert!(config.dns.system);
        assert_eq!(config.dns.cache_size, 50);
        assert_eq!(config.dns.concurrency, 5);
        assert_eq!(config.dns.timeout_secs, 5);
        assert_eq!(config.subscription.dns_mode, DnsMode::Disable);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_dns_mode() {
        let toml_str = r#"
[subscription]
dns_mode = "sometimes"
"#;
        assert!(toml::from_str::<Config>(toml_str).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let mut config = Config::default();
        config.dns.nameservers = vec!["1.1.1.1".into()];
        config.subscription.dns_mode = DnsMode::Direct;

        let path = std::env::temp_dir().join(format!("vanilla-ng-config-{}.toml", std::process::id()));
        let path = path.to_string_lossy().to_string();
        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/vanilla-ng.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
