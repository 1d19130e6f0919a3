use anyhow::Context;
use clap::Parser;
use ember_dns_application::cache::ResolverCaches;
use ember_dns_application::ports::CacheSnapshots;
use ember_dns_application::use_cases::ResolveQueryUseCase;
use ember_dns_domain::CliOverrides;
use ember_dns_infrastructure::dns::{DnsServer, UdpForwarder};
use ember_dns_infrastructure::persistence::JsonSnapshotStore;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

mod bootstrap;

#[derive(Parser)]
#[command(name = "ember-dns")]
#[command(version)]
#[command(about = "Ember DNS - Caching DNS forwarding resolver")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// DNS server port
    #[arg(short = 'd', long)]
    dns_port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Upstream resolver address (host:port)
    #[arg(long)]
    upstream: Option<String>,

    /// Directory for cache snapshot files
    #[arg(long)]
    cache_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        dns_port: cli.dns_port,
        bind_address: cli.bind.clone(),
        upstream: cli.upstream.clone(),
        cache_dir: cli.cache_dir.clone(),
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config);

    info!("Starting Ember DNS v{}", env!("CARGO_PKG_VERSION"));

    let snapshots = Arc::new(JsonSnapshotStore::new(config.cache.directory.clone()));
    let caches = match snapshots.load() {
        Some((addresses, name_servers)) => {
            Arc::new(ResolverCaches::from_entries(addresses, name_servers))
        }
        None => {
            info!("No usable cache snapshots found, starting with empty caches");
            Arc::new(ResolverCaches::empty())
        }
    };

    let upstream: SocketAddr = config
        .upstream
        .server
        .parse()
        .with_context(|| format!("Invalid upstream address: {}", config.upstream.server))?;
    let forwarder = Arc::new(UdpForwarder::new(
        upstream,
        Duration::from_millis(config.upstream.timeout_ms),
    ));

    let engine = Arc::new(ResolveQueryUseCase::new(forwarder, snapshots, caches));

    let dns_addr: SocketAddr =
        format!("{}:{}", config.server.bind_address, config.server.dns_port)
            .parse()
            .with_context(|| {
                format!(
                    "Invalid bind address: {}:{}",
                    config.server.bind_address, config.server.dns_port
                )
            })?;

    let server = DnsServer::bind(dns_addr, engine.clone()).await.with_context(|| {
        format!(
            "Failed to bind UDP {} (port {} usually needs elevated privileges)",
            dns_addr, config.server.dns_port
        )
    })?;

    info!(upstream = %upstream, cache_dir = %config.cache.directory, "Resolver ready");

    tokio::select! {
        _ = server.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    if let Err(e) = engine.persist() {
        error!(error = %e, "Failed to persist cache snapshots at shutdown");
    } else {
        info!("Cache snapshots persisted");
    }

    Ok(())
}
