//! Multi-application dispatcher (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http server ──▶ multi-app middleware ──▶ inner application
//!                     (request id,     │
//!                      trace,          ├─ script inspector  (bind / entry point)
//!                      timeout)        ├─ domain binding    (host, sub-domain, *)
//!                                      ├─ path mapper       (map, deny, *, segment)
//!                                      ├─ express fallback  (default app)
//!                                      └─ app loader        (config, events,
//!                                                            middleware, providers,
//!                                                            language pack)
//!
//!     Cross-cutting: config (+ hot reload) · observability · lifecycle
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use app_dispatcher::config::watcher::ConfigWatcher;
use app_dispatcher::dispatch::Dispatcher;
use app_dispatcher::http::HttpServer;
use app_dispatcher::lifecycle::{signals, startup, Shutdown};
use app_dispatcher::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "app-dispatcher")]
#[command(about = "Routes requests to isolated sub-applications", long_about = None)]
struct Cli {
    /// TOML configuration file; watched for changes.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Entry-point name or front-controller path; anything but
    /// index/router/think pins that app.
    #[arg(short, long)]
    entry: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let overrides = startup::Overrides { entry: cli.entry };

    let config = startup::load_startup_config(cli.config.as_deref(), &overrides)?;
    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        default_app = %config.app.default_app,
        base_path = %config.app.base_path.display(),
        express = config.app.app_express,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let dispatcher = Arc::new(Dispatcher::new(&config.app));

    // Keep the watcher alive for the lifetime of the server.
    let _watcher = match &cli.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            startup::spawn_config_reloader(dispatcher.clone(), updates, overrides.clone(), &shutdown);
            Some(watcher.run()?)
        }
        None => None,
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config, dispatcher);
    server.run(listener, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
