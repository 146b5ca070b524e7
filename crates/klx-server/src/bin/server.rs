//! Statement processing server
//!
//! Run with: cargo run -p klx-server --bin klx-server [config.json]

use std::path::{Path, PathBuf};

use klx_core::KlxConfig;
use klx_server::KlxServer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "klx_server=info,klx_core=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = KlxConfig::load(config_path.as_deref(), Path::new("."))?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Upload folder: {}", config.server.upload_dir.display());
    tracing::info!("  - Text folder: {}", config.server.debug_txt_dir.display());
    tracing::info!("  - Template: {}", config.export.template_file.display());
    tracing::info!("  - Output: {}", config.export.output_file.display());

    println!(
        "\nPorts {}-{} on {}",
        config.server.port, config.server.port_range_end, config.server.host
    );
    println!("\nEndpoints:");
    println!("  POST /api/process  - Upload statements and start a batch");
    println!("  GET  /api/status   - Poll batch progress");
    println!("  GET  /api/template - Download the spreadsheet template");
    println!("  GET  /api/download - Download the latest results");
    println!("\nPress Ctrl+C to stop\n");

    KlxServer::new(config).start().await?;

    Ok(())
}
