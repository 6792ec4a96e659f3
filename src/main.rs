//! cors-relay: CORS-friendly forwarding proxy.
//!
//! ```text
//!  browser ──▶ net::Listener ──▶ http::server ──▶ backend
//!                                   │   ▲            │
//!                      OPTIONS ◀────┘   └────────────┘
//!                      (answered         status, headers + CORS,
//!                       locally)         body streamed back
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::process::ExitCode;

use cors_relay::cli::Cli;
use cors_relay::lifecycle::{signals, Shutdown};
use cors_relay::observability::{logging, metrics};
use cors_relay::{HttpServer, Listener};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            logging::init("info");
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    logging::init(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "cors-relay starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backend = %config.backend.address,
        connect_timeout_secs = config.timeouts.connect_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validation guarantees the address parses.
        if let Ok(addr) = config.observability.metrics_address.parse::<SocketAddr>() {
            if let Err(e) = metrics::init_metrics(addr) {
                tracing::error!(error = %e, "Failed to start metrics endpoint");
            }
        }
    }

    let listener = match Listener::bind(&config.listener).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, "Cannot start proxy");
            return ExitCode::FAILURE;
        }
    };

    let server = match HttpServer::new(config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_handler(shutdown);

    if let Err(e) = server.run(listener, server_shutdown).await {
        tracing::error!(error = %e, "Server error");
        return ExitCode::FAILURE;
    }

    tracing::info!("Shutdown complete");
    ExitCode::SUCCESS
}
