//! RFox Calendar server binary
//!
//! ```bash
//! # Defaults: 0.0.0.0:10000, any origin, any host, 4 workers
//! rfcalendar
//!
//! # Restrict cross-origin callers and trusted hosts
//! ALLOWED_ORIGINS=https://me.dev ALLOWED_HOSTS=cal.me.dev,*.onrender.com rfcalendar --port 8080
//! ```

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rfcalendar::config::{Cli, ServerConfig};
use rfcalendar::web;

fn init_logging(verbose: bool) {
    let filter = if verbose { "rfcalendar=debug,tower_http=debug,info" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = ServerConfig::from_cli(cli)?;
    log::info!(
        "upstream {}, {} workers, origins {:?}, hosts {:?}",
        config.upstream_url,
        config.workers,
        config.allowed_origins,
        config.allowed_hosts
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.workers)
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    runtime.block_on(web::run_server(config))
}
