//! vless:// 链接

use std::collections::BTreeMap;

use tracing::debug;

use super::{fragment, host_port, param, parse_url, query_map, split_list, truthy, username};
use crate::error::{Error, Result};
use crate::option::{GrpcOptions, Http2Options, HttpOptions, RealityOptions, VlessOption, WsOptions};

/// `vless://uuid@host:port?type=ws&security=tls&sni=..&host=..&path=..&flow=..#name`
pub fn parse_vless(link: &str) -> Result<VlessOption> {
    let url = parse_url(link)?;
    let (server, port) = host_port(&url, None)?;
    let q = query_map(&url);

    let uuid = username(&url);
    if uuid.is_empty() {
        return Err(Error::parse_link("vless: missing uuid"));
    }

    let network = match param(&q, "type") {
        "" => "tcp",
        t => t,
    };
    let security = param(&q, "security");
    let host = param(&q, "host");

    // host 参数优先于 sni
    let servername = if host.is_empty() { param(&q, "sni") } else { host };

    let mut opt = VlessOption {
        name: fragment(&url),
        server,
        port,
        uuid,
        flow: param(&q, "flow").to_string(),
        tls: matches!(security, "tls" | "xtls" | "reality"),
        alpn: split_list(param(&q, "alpn")),
        udp: true,
        network: network.to_string(),
        servername: servername.to_string(),
        client_fingerprint: param(&q, "fp").to_string(),
        packet_encoding: param(&q, "packetEncoding").to_string(),
        skip_cert_verify: truthy(param(&q, "allowInsecure")),
        ..Default::default()
    };

    if security == "reality" {
        opt.reality_opts = RealityOptions {
            public_key: param(&q, "pbk").to_string(),
            short_id: param(&q, "sid").to_string(),
        };
    }

    match network {
        "ws" | "httpupgrade" => {
            let mut headers = BTreeMap::new();
            if !host.is_empty() {
                headers.insert("Host".to_string(), host.to_string());
            }
            opt.network = "ws".to_string();
            opt.ws_opts = WsOptions {
                path: param(&q, "path").to_string(),
                headers,
                early_data_header_name: param(&q, "eh").to_string(),
                v2ray_http_upgrade: network == "httpupgrade",
                v2ray_http_upgrade_fast_open: truthy(param(&q, "fastOpen")),
                ..Default::default()
            };
        }
        "grpc" => {
            opt.grpc_opts = GrpcOptions {
                service_name: param(&q, "serviceName").to_string(),
            };
        }
        "http" => {
            let mut headers = BTreeMap::new();
            let hosts = split_list(host);
            if !hosts.is_empty() {
                headers.insert("Host".to_string(), hosts);
            }
            opt.http_opts = HttpOptions {
                method: param(&q, "method").to_string(),
                path: split_list(param(&q, "path")),
                headers,
            };
        }
        "h2" => {
            opt.h2_opts = Http2Options {
                host: split_list(host),
                path: param(&q, "path").to_string(),
            };
        }
        _ => {}
    }

    debug!("vless option: {}:{} network={} security={}", opt.server, opt.port, opt.network, security);
    Ok(opt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vless_ws_tls() {
        let opt = parse_vless(
            "vless://b831381d-6324-4d53-ad4f-8cda48b30811@a.com:443?type=ws&security=tls&sni=sni.com&host=cdn.com&path=%2Fray&flow=xtls-rprx-vision#vless%20node",
        )
        .unwrap();
        assert_eq!(opt.name, "vless node");
        assert_eq!(opt.uuid, "b831381d-6324-4d53-ad4f-8cda48b30811");
        assert!(opt.tls);
        assert_eq!(opt.network, "ws");
        assert_eq!(opt.servername, "cdn.com");
        assert_eq!(opt.ws_opts.path, "/ray");
        assert_eq!(opt.ws_opts.host(), "cdn.com");
        assert_eq!(opt.flow, "xtls-rprx-vision");
    }

    #[test]
    fn test_vless_defaults_to_tcp() {
        let opt = parse_vless("vless://id@a.com:443?sni=sni.com").unwrap();
        assert_eq!(opt.network, "tcp");
        assert!(!opt.tls);
        assert_eq!(opt.servername, "sni.com");
    }

    #[test]
    fn test_vless_reality() {
        let opt = parse_vless(
            "vless://id@1.2.3.4:443?security=reality&pbk=PUBKEY&sid=ab12&fp=chrome&type=grpc&serviceName=svc",
        )
        .unwrap();
        assert!(opt.tls);
        assert_eq!(opt.reality_opts.public_key, "PUBKEY");
        assert_eq!(opt.reality_opts.short_id, "ab12");
        assert_eq!(opt.client_fingerprint, "chrome");
        assert_eq!(opt.grpc_opts.service_name, "svc");
    }

    #[test]
    fn test_vless_http_obfs() {
        let opt = parse_vless("vless://id@v.com:443?type=http&method=GET&path=%2Fa,%2Fb&host=x.com").unwrap();
        assert_eq!(opt.network, "http");
        assert_eq!(opt.http_opts.method, "GET");
        assert_eq!(opt.http_opts.path, vec!["/a", "/b"]);
        assert_eq!(opt.http_opts.hosts(), ["x.com".to_string()]);
        assert!(opt.h2_opts.host.is_empty());
    }

    #[test]
    fn test_vless_missing_uuid() {
        assert!(parse_vless("vless://a.com:443").is_err());
    }
}
