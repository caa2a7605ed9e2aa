//! hysteria:// 与 hysteria2:// 链接

use tracing::debug;

use super::{fragment, host_port, number, param, parse_url, query_map, split_list, truthy, userinfo};
use crate::error::Result;
use crate::option::{Hysteria2Option, HysteriaOption};

const DEFAULT_UP_MBPS: &str = "10";
const DEFAULT_DOWN_MBPS: &str = "50";

/// `hysteria://host:port?protocol=udp&auth=..&peer=..&upmbps=..&downmbps=..&alpn=h3&obfsParam=..#name`
///
/// 认证串缺省时取 userinfo; `recv-window-conn` 等 QUIC 参数是可选扩展。
pub fn parse_hysteria(link: &str) -> Result<HysteriaOption> {
    let url = parse_url(link)?;
    let (server, port) = host_port(&url, None)?;
    let q = query_map(&url);

    let up = match param(&q, "upmbps") {
        "" => DEFAULT_UP_MBPS,
        v => v,
    };
    let down = match param(&q, "downmbps") {
        "" => DEFAULT_DOWN_MBPS,
        v => v,
    };

    let opt = HysteriaOption {
        name: fragment(&url),
        server,
        port,
        ports: param(&q, "mport").to_string(),
        protocol: param(&q, "protocol").to_string(),
        up: up.to_string(),
        down: down.to_string(),
        auth_str: match param(&q, "auth") {
            "" => userinfo(&url),
            v => v.to_string(),
        },
        obfs: param(&q, "obfsParam").to_string(),
        obfs_protocol: param(&q, "obfsProtocol").to_string(),
        sni: param(&q, "peer").to_string(),
        skip_cert_verify: truthy(param(&q, "insecure")),
        alpn: split_list(param(&q, "alpn")),
        ca: param(&q, "ca").to_string(),
        recv_window_conn: number(&q, "recv-window-conn")?,
        recv_window: number(&q, "recv-window")?,
        disable_mtu_discovery: truthy(param(&q, "disable-mtu-discovery")),
        fast_open: truthy(param(&q, "fast-open")),
        hop_interval: number(&q, "hop-interval")?,
        ..Default::default()
    };

    debug!("hysteria option: {}:{} protocol={:?}", opt.server, opt.port, opt.protocol);
    Ok(opt)
}

/// `hysteria2://password@host:port/?sni=..&obfs=salamander&obfs-password=..&insecure=1#name`
pub fn parse_hysteria2(link: &str) -> Result<Hysteria2Option> {
    let url = parse_url(link)?;
    let (server, port) = host_port(&url, None)?;
    let q = query_map(&url);

    let sni = match param(&q, "sni") {
        "" => param(&q, "peer"),
        v => v,
    };
    let obfs = match param(&q, "obfs") {
        "none" => "",
        v => v,
    };

    let opt = Hysteria2Option {
        name: fragment(&url),
        server,
        port,
        ports: param(&q, "mport").to_string(),
        password: userinfo(&url),
        obfs: obfs.to_string(),
        obfs_password: param(&q, "obfs-password").to_string(),
        sni: sni.to_string(),
        skip_cert_verify: truthy(param(&q, "insecure")),
        alpn: split_list(param(&q, "alpn")),
        ca: param(&q, "ca").to_string(),
        cwnd: number(&q, "cwnd")?,
        ..Default::default()
    };

    debug!("hysteria2 option: {}:{} obfs={:?}", opt.server, opt.port, opt.obfs);
    Ok(opt)
}
