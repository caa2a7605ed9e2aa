//! 订阅内容解析
//!
//! 先按带 `proxies:` 列表的 YAML 解析; 否则视为 (可能 base64 编码的) 逐行链接。
//! 单个节点失败只记录日志并跳过。

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{Adapter, Parser};
use crate::codec::base64;

#[derive(Deserialize)]
struct ClashDocument {
    #[serde(default)]
    proxies: Vec<Value>,
}

impl Parser {
    pub fn parse_subscription(&self, data: &[u8]) -> Vec<Adapter> {
        let text = String::from_utf8_lossy(data);

        if let Some(adapters) = self.parse_clash_document(&text) {
            return adapters;
        }

        let compact: String = text.split_whitespace().collect();
        let body = base64::try_decode(&compact).unwrap_or_else(|| text.to_string());

        let adapters: Vec<Adapter> = body
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match self.parse_link(line) {
                Ok(adapter) => Some(adapter),
                Err(e) => {
                    warn!("Skipping subscription line: {}", e);
                    None
                }
            })
            .collect();
        debug!("Parsed {} nodes from link list", adapters.len());
        adapters
    }

    /// 不是带非空 `proxies` 的 YAML 文档时返回 `None`
    fn parse_clash_document(&self, text: &str) -> Option<Vec<Adapter>> {
        let doc: ClashDocument = serde_yaml::from_str(text).ok()?;
        if doc.proxies.is_empty() {
            return None;
        }

        let total = doc.proxies.len();
        let adapters: Vec<Adapter> = doc
            .proxies
            .into_iter()
            .filter_map(|value| {
                let result = match value {
                    Value::Object(map) => self.parse_clash(&map),
                    other => self.parse_link(&crate::codec::value_string(&other)),
                };
                result
                    .map_err(|e| warn!("Skipping proxy entry: {}", e))
                    .ok()
            })
            .collect();
        debug!("Parsed {}/{} proxies from YAML", adapters.len(), total);
        Some(adapters)
    }
}

pub fn parse_subscription(data: &[u8]) -> Vec<Adapter> {
    Parser::default().parse_subscription(data)
}

/// 按 `unique_id` 去重, 保留第一次出现的节点
pub fn dedup_by_unique_id(adapters: Vec<Adapter>) -> Vec<Adapter> {
    let mut seen = HashSet::new();
    adapters
        .into_iter()
        .filter(|a| seen.insert(a.unique_id().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::ProxyType;

    const LINKS: &str = "ss://YWVzLTI1Ni1nY206c2VjcmV0@1.2.3.4:8388#a\n\
                         trojan://pw@t.example.com:443#b\n\
                         not-a-link\n\
                         \n\
                         socks5://5.6.7.8:1080#c\n";

    #[test]
    fn test_plain_link_list() {
        let nodes = parse_subscription(LINKS.as_bytes());
        let names: Vec<&str> = nodes.iter().map(|n| n.name()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_base64_link_list() {
        use ::base64::Engine;
        let blob = ::base64::engine::general_purpose::STANDARD.encode(LINKS);
        // 订阅服务常按 76 列折行
        let wrapped: Vec<String> = blob
            .as_bytes()
            .chunks(76)
            .map(|c| String::from_utf8_lossy(c).to_string())
            .collect();
        let nodes = parse_subscription(wrapped.join("\n").as_bytes());
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[1].proxy_type(), ProxyType::Trojan);
    }

    #[test]
    fn test_yaml_skips_bad_entries() {
        let yaml = r#"
port: 7890
proxies:
  - {name: a, type: ss, server: 1.2.3.4, port: 8388, cipher: aes-256-gcm, password: p}
  - {name: bad, type: ss, server: 1.2.3.4, port: 8388, cipher: rot13, password: p}
  - {name: unknown, type: carrier-pigeon, server: 1.2.3.4, port: 1}
  - name: b
    type: vmess
    server: v.example.com
    port: 443
    uuid: b831381d-6324-4d53-ad4f-8cda48b30811
    alterId: 0
    cipher: auto
"#;
        let nodes = parse_subscription(yaml.as_bytes());
        let names: Vec<&str> = nodes.iter().map(|n| n.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_garbage() {
        assert!(parse_subscription(b"").is_empty());
        assert!(parse_subscription(b"hello world").is_empty());
        assert!(parse_subscription(&[0xff, 0xfe, 0x00]).is_empty());
    }

    #[test]
    fn test_dedup_keeps_first() {
        let nodes = parse_subscription(
            "trojan://pw@t.example.com:443#first\ntrojan://pw@t.example.com:443#second\n".as_bytes(),
        );
        assert_eq!(nodes.len(), 2);
        let nodes = dedup_by_unique_id(nodes);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].name(), "first");
    }
}
