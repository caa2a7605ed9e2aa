//! vanilla-ng 库
//!
//! 代理节点适配层: 分享链接 / 配置 map 解析、节点身份 (unique id)、
//! 出站拨号器接缝, 以及带缓存的多上游 DNS 解析

pub mod adapter;
pub mod codec;
pub mod config;
pub mod dns;
pub mod error;
pub mod identity;
pub mod link;
pub mod net;
pub mod option;
pub mod outbound;
pub mod tls;

// 重新导出常用类型
pub use adapter::{
    dedup_by_unique_id, parse_clash, parse_clash_with_yaml, parse_link, parse_subscription, Adapter,
    DnsMode, OptionSource, Parser,
};
pub use codec::OptionMap;
pub use config::Config;
pub use dns::{new_resolver, new_resolver_with_dial, Resolver, ResolverRegistry};
pub use error::{Error, Result};
pub use option::{ProxyOption, ProxyType};
pub use outbound::{BuiltinFactory, OutboundFactory, ProxyDialer};
