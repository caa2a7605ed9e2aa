//! 代理适配器
//!
//! [`Adapter`] 把拨号器、类型化选项、配置 map、节点身份和 DNS 策略组合在一起。
//! 构造完成后只有 DNS 策略可以通过消费式构建方法修改。

mod http;
mod parse;
mod subscription;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

pub use http::{AdapterDial, DNS_DIAL_TIMEOUT};
pub use parse::{parse_clash, parse_clash_with_yaml, parse_link, Parser};
pub use subscription::{dedup_by_unique_id, parse_subscription};

use crate::codec::{self, OptionMap};
use crate::dns::{build_resolver, Resolver, ResolverRegistry, DEFAULT_QUERY_TIMEOUT};
use crate::error::{Error, Result};
use crate::identity::{self, DIRECT_ID, REJECT_ID};
use crate::option::{NamedOption, ProxyOption, ProxyType};
use crate::outbound::{DirectDialer, ProxyDialer};

/// 拨号前的域名解析方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DnsMode {
    /// 交给拨号器处理
    #[default]
    Disable,
    /// 使用共享的解析器注册表
    Direct,
    /// 经由节点自身访问的上游
    Remote,
}

impl fmt::Display for DnsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DnsMode::Disable => "disable",
            DnsMode::Direct => "direct",
            DnsMode::Remote => "remote",
        })
    }
}

#[derive(Clone)]
enum DnsPolicy {
    Disable,
    Direct(Arc<ResolverRegistry>),
    Remote(Vec<Arc<dyn Resolver>>),
}

/// 构造适配器时的选项来源
#[derive(Debug, Clone)]
pub enum OptionSource {
    Typed(ProxyOption),
    Map(OptionMap),
}

impl From<ProxyOption> for OptionSource {
    fn from(option: ProxyOption) -> Self {
        OptionSource::Typed(option)
    }
}

impl From<OptionMap> for OptionSource {
    fn from(map: OptionMap) -> Self {
        OptionSource::Map(map)
    }
}

#[derive(Clone)]
pub struct Adapter {
    dialer: Arc<dyn ProxyDialer>,
    option: ProxyOption,
    opt: OptionMap,
    unique_id: String,
    vanilla_link: String,
    dns: DnsPolicy,
}

impl Adapter {
    pub fn new(dialer: Arc<dyn ProxyDialer>, source: OptionSource) -> Result<Self> {
        let (option, mut opt) = match source {
            OptionSource::Typed(option) => {
                let opt = option.to_map()?;
                (option, opt)
            }
            OptionSource::Map(map) => {
                let option = ProxyOption::from_map(&map)?;
                // 以类型化选项为准, 只保留选项不认识的键
                let mut opt = option.to_map()?;
                for key in codec::extra_keys(&map, &opt) {
                    if let Some(v) = map.get(key) {
                        opt.insert(key.to_string(), v.clone());
                    }
                }
                (option, opt)
            }
        };

        if option.proxy_type() != dialer.proxy_type() {
            return Err(Error::InvalidOptionType {
                expected: dialer.proxy_type(),
                actual: option.proxy_type(),
            });
        }

        let (vanilla_link, unique_id) = match identity::canonical_link(&option) {
            Some(link) => {
                sync_flag(&mut opt, "udp", dialer.support_udp());
                sync_flag(&mut opt, "xudp", dialer.support_xudp());
                sync_flag(&mut opt, "tfo", dialer.support_tfo());
                let id = identity::unique_id(&link);
                (link, id)
            }
            None => {
                let id = match option.proxy_type() {
                    ProxyType::Reject => REJECT_ID,
                    _ => DIRECT_ID,
                };
                opt.clear();
                (String::new(), id.to_string())
            }
        };

        opt.insert("type".into(), Value::String(option.proxy_type().as_str().into()));

        let adapter = Self {
            dialer,
            option,
            opt,
            unique_id,
            vanilla_link,
            dns: DnsPolicy::Disable,
        };
        debug!(
            "New adapter {} {} {:?}",
            adapter.short_id(),
            adapter.proxy_type(),
            adapter.name()
        );
        Ok(adapter)
    }

    /// 直连适配器
    pub fn new_direct() -> Self {
        let dialer: Arc<dyn ProxyDialer> = Arc::new(DirectDialer::new("DIRECT"));
        let mut opt = OptionMap::new();
        opt.insert("type".into(), Value::String(ProxyType::Direct.as_str().into()));
        Self {
            dialer,
            option: ProxyOption::Direct(NamedOption {
                name: "DIRECT".into(),
            }),
            opt,
            unique_id: DIRECT_ID.to_string(),
            vanilla_link: String::new(),
            dns: DnsPolicy::Disable,
        }
    }

    /// 拨号前通过共享注册表解析
    pub fn with_dns_direct(mut self, registry: Arc<ResolverRegistry>) -> Self {
        self.dns = DnsPolicy::Direct(registry);
        self
    }

    /// 拨号前经由本节点访问给定上游解析; 任一地址无效时失败
    pub fn with_dns_remote<S: AsRef<str>>(self, nameservers: &[S]) -> Result<Self> {
        let dial = Arc::new(AdapterDial::new(self.dialer.clone()));
        let resolvers = nameservers
            .iter()
            .map(|ns| build_resolver(ns.as_ref(), dial.clone(), DEFAULT_QUERY_TIMEOUT))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.with_dns_resolvers(resolvers))
    }

    /// remote 模式, 使用已构造好的解析器
    pub fn with_dns_resolvers(mut self, resolvers: Vec<Arc<dyn Resolver>>) -> Self {
        self.dns = DnsPolicy::Remote(resolvers);
        self
    }

    /// 配置 map: `opt` 加上 `name` 与 `unique_id`
    pub fn to_clash(&self) -> OptionMap {
        let mut map = self.opt.clone();
        map.insert("name".into(), Value::String(self.name().to_string()));
        map.insert("unique_id".into(), Value::String(self.unique_id.clone()));
        map
    }

    /// 可分享的链接; direct / reject 没有
    pub fn to_link(&self) -> Option<String> {
        crate::link::to_link(&self.option)
    }

    pub fn name(&self) -> &str {
        self.option.name()
    }

    pub fn proxy_type(&self) -> ProxyType {
        self.option.proxy_type()
    }

    pub fn type_string(&self) -> &'static str {
        self.proxy_type().as_str()
    }

    pub fn addr(&self) -> &str {
        self.dialer.addr()
    }

    pub fn hostname(&self) -> &str {
        self.option.server()
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn short_id(&self) -> &str {
        identity::short_id(&self.unique_id)
    }

    pub fn vanilla_link(&self) -> &str {
        &self.vanilla_link
    }

    pub fn option(&self) -> &ProxyOption {
        &self.option
    }

    pub fn opt(&self) -> &OptionMap {
        &self.opt
    }

    pub fn dialer(&self) -> &Arc<dyn ProxyDialer> {
        &self.dialer
    }

    pub fn dns_mode(&self) -> DnsMode {
        match self.dns {
            DnsPolicy::Disable => DnsMode::Disable,
            DnsPolicy::Direct(_) => DnsMode::Direct,
            DnsPolicy::Remote(_) => DnsMode::Remote,
        }
    }

    pub fn support_udp(&self) -> bool {
        self.dialer.support_udp()
    }

    pub fn support_xudp(&self) -> bool {
        self.dialer.support_xudp()
    }

    pub fn support_tfo(&self) -> bool {
        self.dialer.support_tfo()
    }
}

impl fmt::Debug for Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Adapter")
            .field("name", &self.name())
            .field("type", &self.proxy_type())
            .field("unique_id", &self.short_id())
            .field("dns_mode", &self.dns_mode())
            .finish()
    }
}

fn sync_flag(opt: &mut OptionMap, key: &str, enabled: bool) {
    if enabled {
        opt.insert(key.to_string(), Value::Bool(true));
    } else {
        opt.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::{ShadowsocksOption, Socks5Option, VmessOption};
    use crate::outbound::{BuiltinFactory, OutboundFactory};
    use serde_json::json;

    fn map(v: Value) -> OptionMap {
        match v {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    fn ss_option() -> ProxyOption {
        ProxyOption::Shadowsocks(ShadowsocksOption {
            name: "hk-01".into(),
            server: "1.2.3.4".into(),
            port: 8388,
            cipher: "aes-256-gcm".into(),
            password: "secret".into(),
            udp: true,
            ..Default::default()
        })
    }

    fn build(option: ProxyOption) -> Adapter {
        let dialer = BuiltinFactory.build(&option).unwrap();
        Adapter::new(dialer, option.into()).unwrap()
    }

    #[test]
    fn test_typed_source() {
        let a = build(ss_option());
        assert_eq!(a.name(), "hk-01");
        assert_eq!(a.type_string(), "ss");
        assert_eq!(a.addr(), "1.2.3.4:8388");
        assert_eq!(a.hostname(), "1.2.3.4");
        assert_eq!(a.unique_id().len(), 128);
        assert_eq!(a.short_id(), &a.unique_id()[..8]);
        assert!(a.vanilla_link().starts_with("ss://"));
        assert_eq!(a.opt()["port"], json!(8388));
        assert_eq!(a.opt()["udp"], json!(true));
        assert_eq!(a.opt()["type"], json!("ss"));
        assert_eq!(a.dns_mode(), DnsMode::Disable);
    }

    #[test]
    fn test_map_source_sanitized() {
        let m = map(json!({
            "name": "hk-01",
            "type": "Shadowsocks",
            "server": "1.2.3.4",
            "port": "8388",
            "cipher": "aes-256-gcm",
            "password": "secret",
            "udp": true,
            "tfo": true,
            "unique_id": "stale",
        }));
        let option = ProxyOption::from_map(&m).unwrap();
        let dialer = BuiltinFactory.build(&option).unwrap();
        let a = Adapter::new(dialer, m.into()).unwrap();

        assert!(a.opt().get("unique_id").is_none());
        assert_eq!(a.opt()["type"], json!("ss"));
        assert_eq!(a.opt()["port"], json!(8388));
        assert_eq!(a.to_clash()["port"], json!(8388));
        // 配置 map 声明了 tfo, 但 ConfigOnlyDialer 以选项为准
        assert_eq!(a.support_tfo(), a.opt().contains_key("tfo"));
        assert_eq!(a.unique_id(), build(ss_option()).unique_id());
    }

    #[test]
    fn test_map_source_keeps_unknown_keys() {
        let m = map(json!({
            "name": "hk-01",
            "type": "ss",
            "server": "1.2.3.4",
            "port": 8388,
            "cipher": "aes-256-gcm",
            "password": "secret",
            "udp-over-tcp": "yes",
            "smux": {"enabled": true},
        }));
        let option = ProxyOption::from_map(&m).unwrap();
        let dialer = BuiltinFactory.build(&option).unwrap();
        let a = Adapter::new(dialer, m.into()).unwrap();

        assert_eq!(a.opt()["smux"], json!({"enabled": true}));
        assert_eq!(a.opt()["udp-over-tcp"], json!(true));
        assert_eq!(a.opt()["cipher"], json!("aes-256-gcm"));
        assert_eq!(a.unique_id(), build(ss_option()).unique_id());
    }

    #[test]
    fn test_map_source_errors() {
        let dialer = BuiltinFactory.build(&ss_option()).unwrap();

        let untyped = map(json!({"name": "x", "server": "1.2.3.4"}));
        assert!(matches!(
            Adapter::new(dialer.clone(), untyped.into()),
            Err(Error::MissingType)
        ));

        let unknown = map(json!({"name": "x", "type": "carrier-pigeon"}));
        assert!(matches!(
            Adapter::new(dialer, unknown.into()),
            Err(Error::UnsupportedType(t)) if t == "carrier-pigeon"
        ));
    }

    #[test]
    fn test_type_mismatch() {
        let dialer = BuiltinFactory.build(&ss_option()).unwrap();
        let socks = ProxyOption::Socks5(Socks5Option {
            name: "s".into(),
            server: "1.2.3.4".into(),
            port: 1080,
            ..Default::default()
        });
        match Adapter::new(dialer, socks.into()) {
            Err(Error::InvalidOptionType { expected, actual }) => {
                assert_eq!(expected, ProxyType::Shadowsocks);
                assert_eq!(actual, ProxyType::Socks5);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_direct_and_reject_ids() {
        let direct = Adapter::new_direct();
        assert_eq!(direct.unique_id(), DIRECT_ID);
        assert_eq!(direct.short_id(), "direct");
        assert_eq!(direct.vanilla_link(), "");
        assert_eq!(direct.opt()["type"], json!("direct"));
        assert!(direct.support_udp());
        assert!(direct.to_link().is_none());

        let reject = build(ProxyOption::Reject(NamedOption { name: "no".into() }));
        assert_eq!(reject.unique_id(), REJECT_ID);
        assert_eq!(reject.name(), "no");
        assert!(!reject.opt().contains_key("name"));
    }

    #[test]
    fn test_to_clash_round_trip() {
        let a = build(ProxyOption::Vmess(VmessOption {
            name: "jp".into(),
            server: "v.example.com".into(),
            port: 443,
            uuid: "b831381d-6324-4d53-ad4f-8cda48b30811".into(),
            cipher: "auto".into(),
            tls: true,
            ..Default::default()
        }));
        let clash = a.to_clash();
        assert_eq!(clash["name"], json!("jp"));
        assert_eq!(clash["unique_id"], json!(a.unique_id()));

        let again = parse_clash(&clash).unwrap();
        assert_eq!(again.unique_id(), a.unique_id());
        assert_eq!(again.name(), "jp");
    }

    #[test]
    fn test_name_does_not_change_identity() {
        let a = build(ss_option());
        let mut renamed = ss_option();
        renamed.set_name("another name");
        assert_eq!(build(renamed).unique_id(), a.unique_id());
    }

    #[test]
    fn test_with_dns_remote_invalid_address() {
        let a = build(ss_option());
        assert!(matches!(
            a.clone().with_dns_remote(&["quic://1.1.1.1"]),
            Err(Error::UnsupportedProtocol(_))
        ));
        let remote = a.with_dns_remote(&["tcp://8.8.8.8", "1.1.1.1"]).unwrap();
        assert_eq!(remote.dns_mode(), DnsMode::Remote);
    }

    #[test]
    fn test_dns_mode_serde() {
        assert_eq!(serde_json::to_value(DnsMode::Remote).unwrap(), json!("remote"));
        let mode: DnsMode = serde_json::from_value(json!("direct")).unwrap();
        assert_eq!(mode, DnsMode::Direct);
        assert_eq!(DnsMode::default(), DnsMode::Disable);
        assert_eq!(DnsMode::Disable.to_string(), "disable");
    }
}
