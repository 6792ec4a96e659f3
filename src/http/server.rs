//! HTTP server setup and the per-request handler.
//!
//! # Responsibilities
//! - Create the Axum router: every method on every request target reaches one handler
//! - Answer CORS preflight locally
//! - Forward everything else to the backend and relay the answer
//! - Wire up tracing spans tagged with a request ID
//! - Serve until the shutdown signal, then drain in-flight exchanges

use axum::{
    body::Body,
    extract::State,
    http::{uri::Authority, Method, Request},
    response::{IntoResponse, Response},
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::trace::{DefaultOnFailure, TraceLayer};
use tracing::Level;
use uuid::Uuid;

use crate::config::{loader, parse_backend_authority, ConfigError, ProxyConfig};
use crate::http::{cors, request, response, ProxyError};
use crate::net::Listener;
use crate::observability::metrics;

/// Application state injected into the handler. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub backend: Authority,
    pub client: Client<HttpConnector, Body>,
    pub response_timeout: Option<Duration>,
}

/// HTTP server for the forwarding proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server, validating the configuration first.
    pub fn new(config: ProxyConfig) -> Result<Self, ConfigError> {
        let config = loader::check(config)?;
        let backend = parse_backend_authority(&config.backend.address)
            .map_err(|e| ConfigError::Validation(vec![e]))?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(config.timeouts.connect()));
        connector.set_nodelay(true);

        // No idle pooling: each exchange gets its own backend connection,
        // which closes when the exchange completes or is dropped.
        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(0)
            .build(connector);

        let state = AppState {
            backend,
            client,
            response_timeout: config.timeouts.response(),
        };

        let router = Self::build_router(state);
        Ok(Self { router, config })
    }

    fn build_router(state: AppState) -> Router {
        let trace = TraceLayer::new_for_http()
            .make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    request_id = %Uuid::new_v4(),
                    method = %request.method(),
                    path = %request.uri().path()
                )
            })
            .on_failure(DefaultOnFailure::new().level(Level::WARN));

        // A fallback rather than path routes: targets like `*` must reach the
        // handler too.
        Router::new()
            .fallback(proxy_handler)
            .with_state(state)
            .layer(ServiceBuilder::new().layer(trace))
    }

    /// Run the server on a bound listener until `shutdown` fires or every
    /// `Shutdown` handle is dropped.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(
            address = %listener.local_addr(),
            backend = %self.config.backend.address,
            "Proxy server running"
        );

        axum::serve(listener.into_inner(), self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Answer preflight locally, forward everything else.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().clone();

    tracing::info!(method = %method, target = %request.uri(), "Received request");

    if method == Method::OPTIONS {
        metrics::record_request(method.as_str(), 200, start);
        return cors::preflight();
    }

    let response = match forward(&state, request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(error = %e.diagnostic(), status = %e.status(), "Proxy error");
            e.into_response()
        }
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), start);
    response
}

/// One forwarding attempt: no retries, the body is streamed both ways.
async fn forward(state: &AppState, inbound: Request<Body>) -> Result<Response, ProxyError> {
    let outbound = request::forward_request(inbound, &state.backend)?;
    tracing::debug!(target = %outbound.uri(), "Proxying request");

    let pending = state.client.request(outbound);
    let backend_response = match state.response_timeout {
        Some(limit) => tokio::time::timeout(limit, pending)
            .await
            .map_err(|_| ProxyError::UpstreamTimeout(limit))??,
        None => pending.await?,
    };

    tracing::debug!(status = %backend_response.status(), "Backend responded");
    Ok(response::relay(backend_response))
}
