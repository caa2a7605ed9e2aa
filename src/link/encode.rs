//! 选项 -> 分享链接
//!
//! 生成的链接都能被 [`super::decode`] 重新解析, 且身份不变。

use serde_json::json;

use super::builder::LinkBuilder;
use super::shadowsocks::format_plugin;
use crate::codec::base64::{encode_std, encode_url};
use crate::option::transport::header_value;
use crate::option::ProxyOption;

/// 生成分享链接; direct / reject 返回 `None`
pub fn to_link(opt: &ProxyOption) -> Option<String> {
    let link = match opt {
        ProxyOption::Direct(_) | ProxyOption::Reject(_) => return None,

        ProxyOption::Shadowsocks(o) => {
            let userinfo = encode_url(&format!("{}:{}", o.cipher, o.password));
            let mut b = LinkBuilder::new("ss", &o.server, o.port)
                .raw_user(userinfo)
                .fragment(&o.name);
            if !o.plugin.is_empty() {
                b = b.path("/");
                b.set("plugin", &format_plugin(&o.plugin, &o.plugin_opts));
            }
            b.build()
        }

        ProxyOption::ShadowsocksR(o) => {
            let body = format!(
                "{}:{}:{}:{}:{}:{}/?obfsparam={}&protoparam={}&remarks={}",
                o.server,
                o.port,
                o.protocol,
                o.cipher,
                o.obfs,
                encode_url(&o.password),
                encode_url(&o.obfs_param),
                encode_url(&o.protocol_param),
                encode_url(&o.name),
            );
            format!("ssr://{}", encode_url(&body))
        }

        ProxyOption::Snell(o) => {
            let mut b = LinkBuilder::new("snell", &o.server, o.port)
                .user(&o.psk)
                .fragment(&o.name);
            b.number("version", o.version);
            if let Some(mode) = o.obfs_opts.get("mode") {
                b.set("obfs", &crate::codec::value_string(mode));
            }
            if let Some(host) = o.obfs_opts.get("host") {
                b.set("obfs-host", &crate::codec::value_string(host));
            }
            b.build()
        }

        ProxyOption::Socks5(o) => {
            let mut b = LinkBuilder::new("socks5", &o.server, o.port)
                .user_password(&o.username, &o.password)
                .fragment(&o.name);
            b.flag("tls", o.tls);
            b.build()
        }

        ProxyOption::Http(o) => {
            let scheme = if o.tls { "https" } else { "http" };
            let mut b = LinkBuilder::new(scheme, &o.server, o.port)
                .user_password(&o.username, &o.password)
                .fragment(&o.name);
            b.set("sni", &o.sni);
            for (k, v) in &o.headers {
                b.set(&format!("header-{}", k), v);
            }
            b.build()
        }

        ProxyOption::Vmess(o) => {
            let (mut net, mut kind, mut host, mut path) =
                (o.network.clone(), "none".to_string(), String::new(), String::new());
            match o.network.as_str() {
                "ws" => {
                    host = o.ws_opts.host().to_string();
                    path = o.ws_opts.path.clone();
                }
                "grpc" => {
                    host = o.servername.clone();
                    path = o.grpc_opts.service_name.clone();
                }
                "h2" => {
                    host = o.h2_opts.host.join(",");
                    path = o.h2_opts.path.clone();
                }
                "http" => {
                    net = "tcp".to_string();
                    kind = "http".to_string();
                    host = o.http_opts.hosts().join(",");
                    path = o.http_opts.path.join(",");
                }
                "" => net = "tcp".to_string(),
                _ => {}
            }
            let share = json!({
                "v": "2",
                "ps": o.name,
                "add": o.server,
                "port": o.port.to_string(),
                "id": o.uuid,
                "aid": o.alter_id.to_string(),
                "scy": o.cipher,
                "net": net,
                "type": kind,
                "host": host,
                "path": path,
                "tls": if o.tls { "tls" } else { "" },
                "sni": o.servername,
                "alpn": o.alpn.join(","),
                "fp": o.client_fingerprint,
            });
            format!("vmess://{}", encode_std(&share.to_string()))
        }

        ProxyOption::Vless(o) => {
            let mut b = LinkBuilder::new("vless", &o.server, o.port)
                .user(&o.uuid)
                .fragment(&o.name);
            let security = if !o.reality_opts.is_empty() {
                "reality"
            } else if o.tls {
                "tls"
            } else {
                "none"
            };
            b.set("security", security)
                .set("sni", &o.servername)
                .set("flow", &o.flow)
                .joined("alpn", &o.alpn, ",")
                .set("fp", &o.client_fingerprint)
                .set("packetEncoding", &o.packet_encoding)
                .set("pbk", &o.reality_opts.public_key)
                .set("sid", &o.reality_opts.short_id);
            match o.network.as_str() {
                "ws" => {
                    let kind = if o.ws_opts.v2ray_http_upgrade { "httpupgrade" } else { "ws" };
                    let path = if o.ws_opts.path.is_empty() { &o.ws_path } else { &o.ws_opts.path };
                    let host = match o.ws_opts.host() {
                        "" => header_value(&o.ws_headers, "host").unwrap_or_default(),
                        h => h,
                    };
                    b.set("type", kind)
                        .set("path", path)
                        .set("host", host)
                        .set("eh", &o.ws_opts.early_data_header_name)
                        .flag("fastOpen", o.ws_opts.v2ray_http_upgrade_fast_open);
                }
                "http" => {
                    b.set("type", "http")
                        .set("method", &o.http_opts.method)
                        .joined("path", &o.http_opts.path, ",")
                        .joined("host", o.http_opts.hosts(), ",");
                }
                "grpc" => {
                    b.set("type", "grpc")
                        .set("serviceName", &o.grpc_opts.service_name);
                }
                "h2" => {
                    b.set("type", "h2")
                        .set("path", &o.h2_opts.path)
                        .joined("host", &o.h2_opts.host, ",");
                }
                "" => {
                    b.set("type", "tcp");
                }
                other => {
                    b.set("type", other);
                }
            }
            b.build()
        }

        ProxyOption::Trojan(o) => {
            let mut b = LinkBuilder::new("trojan", &o.server, o.port)
                .user(&o.password)
                .fragment(&o.name);
            b.set("sni", &o.sni)
                .set("type", &o.network)
                .joined("alpn", &o.alpn, ",")
                .set("fp", &o.client_fingerprint);
            if !o.reality_opts.is_empty() {
                b.set("security", "reality")
                    .set("pbk", &o.reality_opts.public_key)
                    .set("sid", &o.reality_opts.short_id);
            }
            match o.network.as_str() {
                "ws" => {
                    b.set("path", &o.ws_opts.path).set("host", o.ws_opts.host());
                }
                "grpc" => {
                    b.set("serviceName", &o.grpc_opts.service_name);
                }
                _ => {}
            }
            b.build()
        }

        ProxyOption::Hysteria(o) => {
            let mut b = LinkBuilder::new("hysteria", &o.server, o.port).fragment(&o.name);
            b.set("protocol", &o.protocol)
                .set("auth", &o.auth_str)
                .set("peer", &o.sni)
                .set("upmbps", &o.up)
                .set("downmbps", &o.down)
                .joined("alpn", &o.alpn, ",")
                .set("obfsParam", &o.obfs)
                .set("obfsProtocol", &o.obfs_protocol)
                .set("mport", &o.ports)
                .set("ca", &o.ca)
                .number("recv-window-conn", o.recv_window_conn)
                .number("recv-window", o.recv_window)
                .flag("disable-mtu-discovery", o.disable_mtu_discovery)
                .flag("fast-open", o.fast_open)
                .number("hop-interval", o.hop_interval)
                .flag("insecure", o.skip_cert_verify);
            b.build()
        }

        ProxyOption::Hysteria2(o) => {
            let mut b = LinkBuilder::new("hysteria2", &o.server, o.port)
                .user(&o.password)
                .path("/")
                .fragment(&o.name);
            b.set("sni", &o.sni)
                .set("obfs", &o.obfs)
                .set("obfs-password", &o.obfs_password)
                .joined("alpn", &o.alpn, ",")
                .set("mport", &o.ports)
                .set("ca", &o.ca)
                .number("cwnd", o.cwnd)
                .flag("insecure", o.skip_cert_verify);
            b.build()
        }

        ProxyOption::WireGuard(o) => {
            let mut address = Vec::new();
            if !o.ip.is_empty() {
                address.push(with_prefix_len(&o.ip, 32));
            }
            if !o.ipv6.is_empty() {
                address.push(with_prefix_len(&o.ipv6, 128));
            }
            let reserved: Vec<String> = o.reserved.iter().map(u8::to_string).collect();
            let mut b = LinkBuilder::new("wireguard", &o.server, o.port)
                .user(&o.private_key)
                .fragment(&o.name);
            b.set("publickey", &o.public_key)
                .set("presharedkey", &o.pre_shared_key)
                .joined("address", &address, ",")
                .joined("reserved", &reserved, ",")
                .number("mtu", o.mtu);
            b.build()
        }

        ProxyOption::Tuic(o) => {
            let mut b = LinkBuilder::new("tuic", &o.server, o.port)
                .user_password(&o.uuid, &o.password)
                .fragment(&o.name);
            b.set("token", &o.token)
                .set("congestion_control", &o.congestion_controller)
                .set("udp_relay_mode", &o.udp_relay_mode)
                .joined("alpn", &o.alpn, ",")
                .set("sni", &o.sni)
                .flag("disable_sni", o.disable_sni)
                .flag("reduce_rtt", o.reduce_rtt)
                .number("cwnd", o.cwnd)
                .set("ca", &o.ca)
                .number("recv_window", o.recv_window)
                .number("recv_window_conn", o.recv_window_conn)
                .flag("disable_mtu_discovery", o.disable_mtu_discovery)
                .flag("udp_over_stream", o.udp_over_stream)
                .number("udp_over_stream_version", o.udp_over_stream_version)
                .flag("allow_insecure", o.skip_cert_verify);
            b.build()
        }
    };
    Some(link)
}

fn with_prefix_len(ip: &str, len: u8) -> String {
    if ip.contains('/') {
        ip.to_string()
    } else {
        format!("{}/{}", ip, len)
    }
}
