use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::{Adapter, OptionSource};
use crate::codec::OptionMap;
use crate::error::{Error, Result};
use crate::link::{self, split_scheme, trim_link};
use crate::option::ProxyOption;
use crate::outbound::{BuiltinFactory, OutboundFactory};

/// 从链接或配置 map 构造适配器
///
/// 拨号器由 [`OutboundFactory`] 创建, 默认使用 [`BuiltinFactory`]。
#[derive(Clone)]
pub struct Parser {
    factory: Arc<dyn OutboundFactory>,
}

impl Parser {
    pub fn new(factory: Arc<dyn OutboundFactory>) -> Self {
        Self { factory }
    }

    /// 解析分享链接; 没有 scheme 时按 YAML/JSON 配置 map 解析
    pub fn parse_link(&self, link: &str) -> Result<Adapter> {
        let link = trim_link(link)?;
        if split_scheme(link).is_none() {
            debug!("No scheme, trying proxy map");
            return self.parse_clash_with_yaml(link);
        }
        self.build(link::decode(link)?)
    }

    pub fn parse_clash(&self, map: &OptionMap) -> Result<Adapter> {
        let option = ProxyOption::from_map(map)?;
        let dialer = self.factory.build(&option)?;
        Adapter::new(dialer, OptionSource::Map(map.clone()))
    }

    /// 单个代理的 YAML (或 JSON) 文本
    pub fn parse_clash_with_yaml(&self, text: &str) -> Result<Adapter> {
        match serde_yaml::from_str::<Value>(text)? {
            Value::Object(map) => self.parse_clash(&map),
            _ => Err(Error::parse_link("not a proxy map")),
        }
    }

    /// 由类型化选项构造
    pub fn build(&self, option: ProxyOption) -> Result<Adapter> {
        let dialer = self.factory.build(&option)?;
        Adapter::new(dialer, OptionSource::Typed(option))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new(Arc::new(BuiltinFactory))
    }
}

pub fn parse_link(link: &str) -> Result<Adapter> {
    Parser::default().parse_link(link)
}

pub fn parse_clash(map: &OptionMap) -> Result<Adapter> {
    Parser::default().parse_clash(map)
}

pub fn parse_clash_with_yaml(text: &str) -> Result<Adapter> {
    Parser::default().parse_clash_with_yaml(text)
}
