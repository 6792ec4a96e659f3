//! TCP listener implementation.
//!
//! # Responsibilities
//! - Bind to the configured address
//! - Report bind failures as a fatal, typed error
//! - Hand the bound socket to the HTTP server, which owns the accept loop

use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::config::ListenerConfig;

/// Error type for listener operations.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// Failed to bind to address (in use, not permitted, unresolvable).
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// A bound TCP listener. Read-only after bind; accept is driven by the server.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
    local_addr: SocketAddr,
}

impl Listener {
    /// Bind to the configured address.
    pub async fn bind(config: &ListenerConfig) -> Result<Self, ListenerError> {
        let bind_err = |source| ListenerError::Bind {
            address: config.bind_address.clone(),
            source,
        };

        let inner = TcpListener::bind(config.bind_address.as_str())
            .await
            .map_err(bind_err)?;
        let local_addr = inner.local_addr().map_err(bind_err)?;

        tracing::info!(address = %local_addr, "Listener bound");

        Ok(Self { inner, local_addr })
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Release the underlying socket to the HTTP server.
    pub fn into_inner(self) -> TcpListener {
        self.inner
    }
}
