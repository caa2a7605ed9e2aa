//! 各协议的出站选项
//!
//! 字段名与 clash 配置保持一致。零值字段在编码时省略, 只有 `alterId` 这类
//! 零值本身有意义的字段不带 `skip_serializing_if`。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::transport::{GrpcOptions, Http2Options, HttpOptions, RealityOptions, WsOptions};
use crate::codec::{is_default, weak};

/// 所有协议共享的拨号选项
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BasicOption {
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub tfo: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub mptcp: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub interface_name: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int")]
    pub routing_mark: i32,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub ip_version: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub dialer_proxy: String,
}

/// Shadowsocks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ShadowsocksOption {
    #[serde(flatten)]
    pub basic: BasicOption,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub name: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub server: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int")]
    pub port: u16,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub password: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub cipher: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub udp: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub plugin: String,
    #[serde(default, skip_serializing_if = "is_default")]
    pub plugin_opts: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub udp_over_tcp: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int")]
    pub udp_over_tcp_version: u32,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub client_fingerprint: String,
}

/// ShadowsocksR
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ShadowsocksROption {
    #[serde(flatten)]
    pub basic: BasicOption,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub name: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub server: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int")]
    pub port: u16,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub password: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub cipher: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub obfs: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub obfs_param: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub protocol: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub protocol_param: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub udp: bool,
}

/// Snell
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SnellOption {
    #[serde(flatten)]
    pub basic: BasicOption,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub name: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub server: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int")]
    pub port: u16,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub psk: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int")]
    pub version: u32,
    #[serde(default, skip_serializing_if = "is_default")]
    pub obfs_opts: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub udp: bool,
}

/// SOCKS5
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Socks5Option {
    #[serde(flatten)]
    pub basic: BasicOption,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub name: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub server: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int")]
    pub port: u16,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub username: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub password: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub tls: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub udp: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub skip_cert_verify: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub fingerprint: String,
}

/// HTTP(S) 代理
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HttpOption {
    #[serde(flatten)]
    pub basic: BasicOption,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub name: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub server: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int")]
    pub port: u16,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub username: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub password: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub tls: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub sni: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub skip_cert_verify: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub fingerprint: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string_map")]
    pub headers: BTreeMap<String, String>,
}

/// VMess
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct VmessOption {
    #[serde(flatten)]
    pub basic: BasicOption,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub name: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub server: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int")]
    pub port: u16,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub uuid: String,
    /// 0 表示 AEAD, 必须保留
    #[serde(rename = "alterId", default, deserialize_with = "weak::int")]
    pub alter_id: u32,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub cipher: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub udp: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub network: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub tls: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string_list")]
    pub alpn: Vec<String>,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub skip_cert_verify: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub fingerprint: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub servername: String,
    #[serde(default, skip_serializing_if = "RealityOptions::is_empty")]
    pub reality_opts: RealityOptions,
    #[serde(default, skip_serializing_if = "HttpOptions::is_empty")]
    pub http_opts: HttpOptions,
    #[serde(default, skip_serializing_if = "Http2Options::is_empty")]
    pub h2_opts: Http2Options,
    #[serde(default, skip_serializing_if = "GrpcOptions::is_empty")]
    pub grpc_opts: GrpcOptions,
    #[serde(default, skip_serializing_if = "WsOptions::is_empty")]
    pub ws_opts: WsOptions,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub packet_addr: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub xudp: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub packet_encoding: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub global_padding: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub authenticated_length: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub client_fingerprint: String,
}

/// VLESS
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct VlessOption {
    #[serde(flatten)]
    pub basic: BasicOption,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub name: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub server: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int")]
    pub port: u16,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub uuid: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub flow: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub tls: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string_list")]
    pub alpn: Vec<String>,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub udp: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub packet_addr: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub xudp: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub packet_encoding: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub encryption: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub network: String,
    #[serde(default, skip_serializing_if = "RealityOptions::is_empty")]
    pub reality_opts: RealityOptions,
    #[serde(default, skip_serializing_if = "HttpOptions::is_empty")]
    pub http_opts: HttpOptions,
    #[serde(default, skip_serializing_if = "Http2Options::is_empty")]
    pub h2_opts: Http2Options,
    #[serde(default, skip_serializing_if = "GrpcOptions::is_empty")]
    pub grpc_opts: GrpcOptions,
    #[serde(default, skip_serializing_if = "WsOptions::is_empty")]
    pub ws_opts: WsOptions,
    /// 旧版配置的 ws 路径
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub ws_path: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string_map")]
    pub ws_headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub skip_cert_verify: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub fingerprint: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub servername: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub client_fingerprint: String,
}

/// Trojan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TrojanOption {
    #[serde(flatten)]
    pub basic: BasicOption,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub name: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub server: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int")]
    pub port: u16,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub password: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string_list")]
    pub alpn: Vec<String>,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub sni: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub skip_cert_verify: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub fingerprint: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub udp: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub network: String,
    #[serde(default, skip_serializing_if = "RealityOptions::is_empty")]
    pub reality_opts: RealityOptions,
    #[serde(default, skip_serializing_if = "GrpcOptions::is_empty")]
    pub grpc_opts: GrpcOptions,
    #[serde(default, skip_serializing_if = "WsOptions::is_empty")]
    pub ws_opts: WsOptions,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub client_fingerprint: String,
}

/// Hysteria (v1)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HysteriaOption {
    #[serde(flatten)]
    pub basic: BasicOption,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub name: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub server: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int")]
    pub port: u16,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub ports: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub protocol: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub obfs_protocol: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub up: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub down: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub auth: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub auth_str: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub obfs: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub sni: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub skip_cert_verify: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub fingerprint: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string_list")]
    pub alpn: Vec<String>,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub ca: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub ca_str: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int")]
    pub recv_window_conn: u64,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int")]
    pub recv_window: u64,
    #[serde(
        rename = "disable_mtu_discovery",
        default,
        skip_serializing_if = "is_default",
        deserialize_with = "weak::bool"
    )]
    pub disable_mtu_discovery: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub fast_open: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int")]
    pub hop_interval: u32,
}

/// Hysteria2
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Hysteria2Option {
    #[serde(flatten)]
    pub basic: BasicOption,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub name: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub server: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int")]
    pub port: u16,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub ports: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int")]
    pub hop_interval: u32,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub up: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub down: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub password: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub obfs: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub obfs_password: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub sni: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub skip_cert_verify: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub fingerprint: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string_list")]
    pub alpn: Vec<String>,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub ca: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub ca_str: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int")]
    pub cwnd: u32,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int")]
    pub udp_mtu: u32,
}

/// WireGuard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WireGuardOption {
    #[serde(flatten)]
    pub basic: BasicOption,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub name: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub server: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int")]
    pub port: u16,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub ip: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub ipv6: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub private_key: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub public_key: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub pre_shared_key: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int_list")]
    pub reserved: Vec<u8>,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int")]
    pub workers: u32,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int")]
    pub mtu: u32,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub udp: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int")]
    pub persistent_keepalive: u32,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string_list")]
    pub dns: Vec<String>,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub remote_dns_resolve: bool,
}

/// TUIC
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TuicOption {
    #[serde(flatten)]
    pub basic: BasicOption,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub name: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub server: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int")]
    pub port: u16,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub token: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub uuid: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub password: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub ip: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int")]
    pub heartbeat_interval: u32,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string_list")]
    pub alpn: Vec<String>,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub reduce_rtt: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int")]
    pub request_timeout: u32,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub udp_relay_mode: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub congestion_controller: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub disable_sni: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int")]
    pub max_udp_relay_packet_size: u32,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub fast_open: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int")]
    pub max_open_streams: u32,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int")]
    pub cwnd: u32,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub skip_cert_verify: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub fingerprint: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub ca: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub ca_str: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int")]
    pub recv_window_conn: u64,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int")]
    pub recv_window: u64,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub disable_mtu_discovery: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int")]
    pub max_datagram_frame_size: u32,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub sni: String,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::bool")]
    pub udp_over_stream: bool,
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::int")]
    pub udp_over_stream_version: u32,
}

/// 直连 / 拒绝只有名称
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedOption {
    #[serde(default, skip_serializing_if = "is_default", deserialize_with = "weak::string")]
    pub name: String,
}
