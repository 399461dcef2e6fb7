//! X-Accel-Redirect gateway
//!
//! Serves a document root through the redirect filter. Run it behind nginx:
//!
//! ```text
//!   client ──▶ nginx ──▶ xsendfile-filter ──▶ StaticFiles
//!                ▲                               │
//!                │   X-Accel-Redirect: /files/…  │
//!                └───────────────────────────────┘
//!   nginx then serves /files/… from an `internal` location.
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};

use xsendfile_filter::apps::StaticFiles;
use xsendfile_filter::config::watcher::ConfigWatcher;
use xsendfile_filter::config::{load_with_overrides, ConfigError, ConfigOverrides, GatewayConfig};
use xsendfile_filter::observability::logging;
use xsendfile_filter::{filter_app_factory, HttpServer};

#[derive(Parser)]
#[command(name = "xsendfile-filter")]
#[command(about = "Serve files through an X-Accel-Redirect filter", long_about = None)]
struct Cli {
    /// TOML configuration file (watched for redirect map changes).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override server.bind_address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override server.document_root.
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Override redirect.map, e.g. "/var/www/=/protected/".
    #[arg(short = 'm', long)]
    redirect_map: Option<String>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            bind_address: self.bind.clone(),
            document_root: self.root.clone(),
            redirect_map: self.redirect_map.clone(),
        }
    }

    fn load(&self) -> Result<GatewayConfig, ConfigError> {
        load_with_overrides(self.config.as_deref(), &self.overrides())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.load()?;

    logging::init(&config.observability.log_level);
    tracing::info!("xsendfile-filter v{} starting", env!("CARGO_PKG_VERSION"));

    let app = StaticFiles::new(&config.server.document_root).with_block_size(config.server.block_size);
    let app = filter_app_factory(app, &config.redirect.filter_settings());

    tracing::info!(
        bind_address = %config.server.bind_address,
        document_root = %config.server.document_root.display(),
        redirect_map = ?config.redirect.map,
        "Configuration loaded"
    );

    // Keep the watcher alive for the lifetime of the server.
    let (_watcher, config_updates) = match &cli.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.with_overrides(cli.overrides()).run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(());
        }
    });

    let server = HttpServer::new(config, app);
    server.run(listener, config_updates, shutdown_rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
