use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vanilla_ng::config::LogConfig;
use vanilla_ng::{dedup_by_unique_id, Config, DnsMode, Parser, ResolverRegistry};

#[tokio::main]
async fn main() -> Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());

    // 加载配置
    let config = Config::load(&path)?;

    // 初始化日志系统, guard 需存活到退出
    let _guard = init_logging(&config.log)?;

    info!("Starting vanilla-ng...");
    info!("Configuration loaded from {}", path);

    let registry = Arc::new(
        ResolverRegistry::from_config(&config.dns).context("Failed to build DNS resolvers")?,
    );
    info!("DNS: {} resolvers", registry.len());

    // 读取订阅与单独的链接
    let parser = Parser::default();
    let mut nodes = Vec::new();
    for file in &config.subscription.files {
        let data = tokio::fs::read(file)
            .await
            .with_context(|| format!("Failed to read subscription file: {}", file))?;
        let parsed = parser.parse_subscription(&data);
        info!("Subscription {}: {} nodes", file, parsed.len());
        nodes.extend(parsed);
    }
    for link in &config.subscription.links {
        match parser.parse_link(link) {
            Ok(node) => nodes.push(node),
            Err(e) => warn!("Invalid link: {}", e),
        }
    }

    let total = nodes.len();
    let nodes = dedup_by_unique_id(nodes);
    info!("{} nodes, {} after dedup", total, nodes.len());

    let dns_mode = config.subscription.dns_mode;
    for node in nodes {
        let node = match dns_mode {
            DnsMode::Disable => node,
            DnsMode::Direct => node.with_dns_direct(registry.clone()),
            DnsMode::Remote => node
                .with_dns_remote(&config.subscription.remote_nameservers)
                .context("Invalid remote nameserver")?,
        };
        info!("{} {:<9} {}", node.short_id(), node.type_string(), node.name());
        debug!("{} {}", node.short_id(), node.vanilla_link());
    }
    info!("DNS mode: {}", dns_mode);

    if let Some(host) = &config.subscription.probe_host {
        match registry.lookup_ip(host).await {
            Ok(ips) => info!("Probe {} -> {:?}", host, ips),
            Err(e) => error!("Probe {} failed: {}", host, e),
        }
        for (resolver, ips) in registry.query_a(host).await {
            info!("  {} -> {:?}", resolver, ips);
        }
    }

    Ok(())
}

/// 初始化日志系统
///
/// 返回的 guard 负责在退出时刷新日志文件
fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let json = config.format.eq_ignore_ascii_case("json");
    let json_layer = json.then(|| {
        fmt::layer()
            .json()
            .with_target(false)
            .with_thread_ids(true)
    });
    let pretty_layer = (!json).then(|| {
        fmt::layer()
            .with_target(false)
            .with_thread_ids(true)
    });

    let (file_layer, guard) = match &config.file {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "vanilla-ng.log".into());

            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}
