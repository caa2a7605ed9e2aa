//! 节点身份
//!
//! 只用与连接目标相关的字段构造规范 URL (vanilla link), 再取 SHA-512。
//! 节点名、证书校验开关、udp/xudp/tfo 等不影响身份。

use sha2::{Digest, Sha512};

use crate::codec::value_string;
use crate::link::builder::LinkBuilder;
use crate::option::transport::header_value;
use crate::option::ProxyOption;

/// direct 节点的固定 ID
pub const DIRECT_ID: &str = "direct";
/// reject 节点的固定 ID
pub const REJECT_ID: &str = "reject";

/// 短 ID 长度
pub const SHORT_ID_LEN: usize = 8;

/// 生成规范 URL; direct / reject 没有规范 URL
pub fn canonical_link(opt: &ProxyOption) -> Option<String> {
    let link = match opt {
        ProxyOption::Direct(_) | ProxyOption::Reject(_) => return None,

        ProxyOption::Shadowsocks(o) => {
            let mut b = LinkBuilder::new("ss", &o.server, o.port).user(&o.password);
            b.set("cipher", &o.cipher).set("plugin", &o.plugin);
            for (k, v) in &o.plugin_opts {
                b.set(&format!("plugin-{}", k), &value_string(v));
            }
            b.build()
        }

        ProxyOption::ShadowsocksR(o) => {
            let mut b = LinkBuilder::new("ssr", &o.server, o.port).user(&o.password);
            b.set("cipher", &o.cipher)
                .set("protocol", &o.protocol)
                .set("protocol-param", &o.protocol_param)
                .set("obfs", &o.obfs)
                .set("obfs-param", &o.obfs_param);
            b.build()
        }

        ProxyOption::Snell(o) => {
            let mut b = LinkBuilder::new("snell", &o.server, o.port).user(&o.psk);
            b.number("version", o.version);
            for (k, v) in &o.obfs_opts {
                b.set(&format!("obfs-{}", k), &value_string(v));
            }
            b.build()
        }

        ProxyOption::Socks5(o) => {
            let mut b = LinkBuilder::new("socks5", &o.server, o.port)
                .user_password(&o.username, &o.password);
            b.flag("tls", o.tls);
            b.build()
        }

        ProxyOption::Http(o) => {
            let scheme = if o.tls { "https" } else { "http" };
            let mut b =
                LinkBuilder::new(scheme, &o.server, o.port).user_password(&o.username, &o.password);
            b.set("sni", &o.sni);
            for (k, v) in &o.headers {
                b.set(&format!("header-{}", k.to_ascii_lowercase()), v);
            }
            b.build()
        }

        ProxyOption::Vmess(o) => {
            let mut b = LinkBuilder::new("vmess", &o.server, o.port).user(&o.uuid);
            b.set("net", network(&o.network))
                .flag("tls", o.tls)
                .set("sni", &o.servername)
                .sorted("http-host", o.http_opts.hosts(), ",")
                .sorted("http-path", &o.http_opts.path, ",")
                .sorted("h2-host", &o.h2_opts.host, ",")
                .set("h2-path", &o.h2_opts.path)
                .set("ws-host", o.ws_opts.host())
                .set("ws-path", &o.ws_opts.path)
                .set("grpc-service-name", &o.grpc_opts.service_name);
            b.build()
        }

        ProxyOption::Vless(o) => {
            let ws_path = if o.ws_opts.path.is_empty() { &o.ws_path } else { &o.ws_opts.path };
            let ws_host = match o.ws_opts.host() {
                "" => header_value(&o.ws_headers, "host").unwrap_or_default(),
                h => h,
            };
            let mut b = LinkBuilder::new("vless", &o.server, o.port).user(&o.uuid);
            b.set("flow", &o.flow)
                .sorted("alpn", &o.alpn, ";")
                .set("packet", &o.packet_encoding)
                .set("net", network(&o.network))
                .flag("tls", o.tls)
                .set("short-id", &o.reality_opts.short_id)
                .set("public-key", &o.reality_opts.public_key)
                .set("http-method", &o.http_opts.method)
                .sorted("http-path", &o.http_opts.path, ",")
                .sorted("http-host", o.http_opts.hosts(), ",")
                .sorted("h2-host", &o.h2_opts.host, ",")
                .set("h2-path", &o.h2_opts.path)
                .set("grpc-service-name", &o.grpc_opts.service_name)
                .set("ws-path", ws_path)
                .set("ws-host", ws_host)
                .set("early-data-header-name", &o.ws_opts.early_data_header_name)
                .flag("v2ray-http-upgrade", o.ws_opts.v2ray_http_upgrade)
                .flag("v2ray-http-upgrade-fast-open", o.ws_opts.v2ray_http_upgrade_fast_open);
            b.build()
        }

        ProxyOption::Trojan(o) => {
            let mut b = LinkBuilder::new("trojan", &o.server, o.port).user(&o.password);
            b.set("net", network(&o.network))
                .set("grpc-service-name", &o.grpc_opts.service_name)
                .set("ws-host", o.ws_opts.host())
                .set("ws-path", &o.ws_opts.path)
                .set("short-id", &o.reality_opts.short_id)
                .set("public-key", &o.reality_opts.public_key);
            b.build()
        }

        ProxyOption::Hysteria(o) => {
            let mut b = LinkBuilder::new("hysteria", &o.server, o.port).user(&o.auth_str);
            b.set("protocol", &o.protocol)
                .set("obfs-protocol", &o.obfs_protocol)
                .set("obfs", &o.obfs)
                .set("sni", &o.sni)
                .sorted("alpn", &o.alpn, ",")
                .set("ca", &o.ca)
                .number("recv-window-conn", o.recv_window_conn)
                .number("recv-window", o.recv_window)
                .flag("disable-mtu-discovery", o.disable_mtu_discovery)
                .flag("fast-open", o.fast_open)
                .number("hop-interval", o.hop_interval);
            b.build()
        }

        ProxyOption::Hysteria2(o) => {
            let mut b = LinkBuilder::new("hysteria2", &o.server, o.port).user(&o.password);
            b.set("obfs", &o.obfs)
                .set("obfs-password", &o.obfs_password)
                .set("sni", &o.sni)
                .sorted("alpn", &o.alpn, ",")
                .set("ca", &o.ca)
                .number("cwnd", o.cwnd);
            b.build()
        }

        ProxyOption::WireGuard(o) => {
            let mut b = LinkBuilder::new("wireguard", &o.server, o.port).user(&o.public_key);
            b.set("private-key", &o.private_key)
                .set("pre-shared-key", &o.pre_shared_key)
                .set("ip", strip_prefix_len(&o.ip))
                .set("ipv6", strip_prefix_len(&o.ipv6));
            b.build()
        }

        ProxyOption::Tuic(o) => {
            let mut b =
                LinkBuilder::new("tuic", &o.server, o.port).user_password(&o.uuid, &o.password);
            b.set("token", &o.token)
                .sorted("alpn", &o.alpn, ",")
                .flag("reduce-rtt", o.reduce_rtt)
                .set("udp-relay-mode", &o.udp_relay_mode)
                .set("congestion-controller", &o.congestion_controller)
                .flag("disable-sni", o.disable_sni)
                .number("cwnd", o.cwnd)
                .set("ca", &o.ca)
                .set("sni", &o.sni)
                .number("recv-window", o.recv_window)
                .number("recv-window-conn", o.recv_window_conn)
                .flag("disable-mtu-discovery", o.disable_mtu_discovery)
                .flag("udp-over-stream", o.udp_over_stream)
                .number("udp-over-stream-version", o.udp_over_stream_version);
            b.build()
        }
    };
    Some(link)
}

/// 规范 URL 的 SHA-512 (小写十六进制, 128 字符)
pub fn unique_id(canonical: &str) -> String {
    hex::encode(Sha512::digest(canonical.as_bytes()))
}

/// 取 ID 的前 8 个字符
pub fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

/// tcp 是默认传输, 与未设置等价
fn network(net: &str) -> &str {
    match net {
        "tcp" => "",
        other => other,
    }
}

/// `10.0.0.2/32` -> `10.0.0.2`
fn strip_prefix_len(ip: &str) -> &str {
    ip.split('/').next().unwrap_or_default()
}
