//! trojan:// 链接

use std::collections::BTreeMap;

use tracing::debug;

use super::{fragment, host_port, param, parse_url, query_map, truthy, userinfo};
use crate::error::{Error, Result};
use crate::option::{GrpcOptions, RealityOptions, TrojanOption, WsOptions};

/// `trojan://password@host:port?sni=..&type=ws&path=..&host=..&alpn=h2,http/1.1#name`
pub fn parse_trojan(link: &str) -> Result<TrojanOption> {
    let url = parse_url(link)?;
    let (server, port) = host_port(&url, None)?;
    let q = query_map(&url);

    let password = userinfo(&url);
    if password.is_empty() {
        return Err(Error::parse_link("trojan: missing password"));
    }

    let sni = match (param(&q, "sni"), param(&q, "peer")) {
        ("", "") => server.clone(),
        ("", peer) => peer.to_string(),
        (sni, _) => sni.to_string(),
    };

    let mut network = param(&q, "type").to_string();
    if network.is_empty() && truthy(param(&q, "ws")) {
        network = "ws".to_string();
    }

    let mut opt = TrojanOption {
        name: fragment(&url),
        server,
        port,
        password,
        alpn: parse_alpn(&network, param(&q, "alpn")),
        sni,
        skip_cert_verify: true,
        udp: true,
        client_fingerprint: param(&q, "fp").to_string(),
        ..Default::default()
    };

    if param(&q, "security") == "reality" {
        opt.reality_opts = RealityOptions {
            public_key: param(&q, "pbk").to_string(),
            short_id: param(&q, "sid").to_string(),
        };
    }

    match network.as_str() {
        "ws" => {
            let path = match param(&q, "path") {
                "" => param(&q, "wspath"),
                p => p,
            };
            let mut headers = BTreeMap::new();
            if !param(&q, "host").is_empty() {
                headers.insert("Host".to_string(), param(&q, "host").to_string());
            }
            opt.ws_opts = WsOptions {
                path: path.to_string(),
                headers,
                ..Default::default()
            };
        }
        "grpc" => {
            opt.grpc_opts = GrpcOptions {
                service_name: param(&q, "serviceName").to_string(),
            };
        }
        _ => {}
    }
    opt.network = network;

    debug!("trojan option: {}:{} network={:?}", opt.server, opt.port, opt.network);
    Ok(opt)
}

/// `alpn` 逗号分隔, 去重且保持顺序; `type=h2` 隐含 `h2`
fn parse_alpn(network: &str, raw: &str) -> Vec<String> {
    let mut alpn: Vec<String> = Vec::new();
    let implied = if network == "h2" { Some("h2") } else { None };
    for item in implied.into_iter().chain(raw.split(',')) {
        let item = item.trim();
        if !item.is_empty() && !alpn.iter().any(|a| a == item) {
            alpn.push(item.to_string());
        }
    }
    alpn
}
