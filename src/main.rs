use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use release_updates::config::{CacheBackend, ServerConfig};
use release_updates::logging::init_logging;
use release_updates::server::run_server;

#[derive(Parser)]
#[command(name = "release-updates")]
#[command(version, about = "Update server for desktop auto-updaters")]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, env = "CONFIG")]
    config: Option<PathBuf>,

    /// Listen address (overrides the config file)
    #[arg(short, long, env = "LISTEN_ADDR")]
    listen: Option<String>,

    /// Listen port on all interfaces (ignored when --listen is set)
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Bearer token for the releases API
    #[arg(long, env = "GH_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Cache backend
    #[arg(long, env = "CACHE_BACKEND", value_enum)]
    cache_backend: Option<CacheBackend>,

    /// Cache time-to-live in milliseconds
    #[arg(long, env = "CACHE_TTL_MS")]
    cache_ttl: Option<i64>,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Enable JSON logging
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load(path)?,
            None => ServerConfig::default(),
        };

        if let Some(listen) = self.listen {
            config.listen_addr = listen;
        } else if let Some(port) = self.port {
            config.listen_addr = format!("0.0.0.0:{}", port);
        }
        if self.token.is_some() {
            config.upstream.token = self.token;
        }
        if let Some(backend) = self.cache_backend {
            config.cache.backend = backend;
        }
        if let Some(ttl) = self.cache_ttl {
            config.cache.ttl = ttl;
        }

        Ok(config)
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(&cli.log_level, cli.json_logs);
    let config = cli.into_config()?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run_server(config, shutdown_signal()))
}
