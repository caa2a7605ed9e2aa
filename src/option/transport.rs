//! 传输层子选项 (ws / grpc / h2 / http / reality)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::codec::{is_default, weak};

/// WebSocket 传输选项
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WsOptions {
    #[serde(default, skip_serializing_if = "String::is_empty", deserialize_with = "weak::string")]
    pub path: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty", deserialize_with = "weak::string_map")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int")]
    pub max_early_data: u32,
    #[serde(default, skip_serializing_if = "String::is_empty", deserialize_with = "weak::string")]
    pub early_data_header_name: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub v2ray_http_upgrade: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub v2ray_http_upgrade_fast_open: bool,
}

impl WsOptions {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Host 头 (大小写不敏感)
    pub fn host(&self) -> &str {
        header_value(&self.headers, "host").unwrap_or_default()
    }
}

/// gRPC 传输选项
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrpcOptions {
    #[serde(
        rename = "grpc-service-name",
        default,
        skip_serializing_if = "String::is_empty",
        deserialize_with = "weak::string"
    )]
    pub service_name: String,
}

impl GrpcOptions {
    pub fn is_empty(&self) -> bool {
        self.service_name.is_empty()
    }
}

/// HTTP/2 传输选项
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Http2Options {
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "weak::string_list")]
    pub host: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty", deserialize_with = "weak::string")]
    pub path: String,
}

impl Http2Options {
    pub fn is_empty(&self) -> bool {
        self.host.is_empty() && self.path.is_empty()
    }
}

/// HTTP 伪装传输选项
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpOptions {
    #[serde(default, skip_serializing_if = "String::is_empty", deserialize_with = "weak::string")]
    pub method: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "weak::string_list")]
    pub path: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty", deserialize_with = "weak::string_list_map")]
    pub headers: BTreeMap<String, Vec<String>>,
}

impl HttpOptions {
    pub fn is_empty(&self) -> bool {
        self.method.is_empty() && self.path.is_empty() && self.headers.is_empty()
    }

    /// Host 头列表 (大小写不敏感)
    pub fn hosts(&self) -> &[String] {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("host"))
            .map(|(_, v)| v.as_slice())
            .unwrap_or_default()
    }
}

/// REALITY 选项
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RealityOptions {
    #[serde(default, skip_serializing_if = "String::is_empty", deserialize_with = "weak::string")]
    pub public_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty", deserialize_with = "weak::string")]
    pub short_id: String,
}

impl RealityOptions {
    pub fn is_empty(&self) -> bool {
        self.public_key.is_empty() && self.short_id.is_empty()
    }
}

/// 按名称查找头部值 (大小写不敏感)
pub fn header_value<'a>(headers: &'a BTreeMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
