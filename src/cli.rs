//! Command-line interface.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{loader, ConfigError, ProxyConfig};

/// Forward browser requests to a local API backend and answer CORS preflight.
#[derive(Debug, Parser)]
#[command(name = "cors-relay", version)]
pub struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to listen on (overrides listener.bind_address).
    #[arg(short, long, value_name = "HOST:PORT")]
    pub listen: Option<String>,

    /// Backend authority to forward to (overrides backend.address).
    #[arg(short, long, value_name = "HOST:PORT")]
    pub backend: Option<String>,

    /// Log level when RUST_LOG is unset (overrides observability.log_level).
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    /// Assemble the effective configuration: defaults, then file, then flags.
    pub fn resolve(&self) -> Result<ProxyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => loader::read_config(path)?,
            None => ProxyConfig::default(),
        };

        if let Some(listen) = &self.listen {
            config.listener.bind_address = listen.clone();
        }
        if let Some(backend) = &self.backend {
            config.backend.address = backend.clone();
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }

        loader::check(config)
    }
}
