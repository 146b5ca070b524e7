//! Serve command - start the HTTP server.

use std::path::Path;

use clap::Args;
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use klx_server::KlxServer;

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// First port to try; later ones up to the configured range end are
    /// used when it is busy
    #[arg(short, long)]
    port: Option<u16>,
}

/// Request tracing for the server, filtered by `RUST_LOG`.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "klx_server=info,klx_core=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub async fn run(args: ServeArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let mut config = super::load_config(config_path)?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
        config.server.port_range_end = config.server.port_range_end.max(port);
    }

    println!(
        "{} Starting server on {} (ports {}-{})",
        style("ℹ").blue(),
        config.server.host,
        config.server.port,
        config.server.port_range_end
    );
    println!("Press Ctrl+C to stop\n");

    KlxServer::new(config).start().await?;
    Ok(())
}
