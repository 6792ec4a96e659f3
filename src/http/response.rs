//! Client response construction and error mapping.
//!
//! # Design Decisions
//! - Backend bodies are streamed, never buffered
//! - Each response gets a freshly built header map: CORS headers first,
//!   then backend headers, where a backend header replaces a CORS header
//!   of the same name
//! - Failures before any response byte is sent map to an HTTP status;
//!   failures after that abort the client connection

use axum::{
    body::Body,
    http::{HeaderMap, HeaderName, Response, StatusCode},
    response::IntoResponse,
};
use hyper::body::Incoming;
use std::time::Duration;

use crate::http::cors;
use crate::http::headers::strip_hop_by_hop;

/// Per-request failures. None of these outlive the request handler.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// Backend could not be reached, or failed before producing response headers.
    #[error("backend unreachable")]
    UpstreamUnreachable(#[from] hyper_util::client::legacy::Error),

    /// Backend produced no response headers within the configured deadline.
    #[error("backend did not respond within {0:?}")]
    UpstreamTimeout(Duration),

    /// Inbound request cannot be retargeted at the backend.
    #[error("malformed request: {0}")]
    MalformedRequest(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::UpstreamUnreachable(_) => StatusCode::BAD_GATEWAY,
            ProxyError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// This error followed by every cause in its source chain.
    pub fn diagnostic(&self) -> String {
        error_chain(self)
    }
}

/// Join an error and its sources with `: `, outermost first.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> axum::response::Response {
        let mut response = (self.status(), format!("Proxy error: {}", self.diagnostic())).into_response();
        cors::apply(response.headers_mut());
        response
    }
}

/// Turn a backend response into the client response: same status, merged
/// headers, same body stream.
pub fn relay(response: Response<Incoming>) -> Response<Body> {
    let (mut parts, body) = response.into_parts();
    parts.headers = merge_headers(parts.headers);
    Response::from_parts(parts, Body::new(body))
}

/// Build the client header map from CORS headers plus backend headers.
///
/// Multi-valued backend headers (e.g. `Set-Cookie`) keep every value in order.
pub fn merge_headers(mut backend: HeaderMap) -> HeaderMap {
    strip_hop_by_hop(&mut backend);

    let mut merged = HeaderMap::with_capacity(backend.len() + 3);
    cors::apply(&mut merged);

    let mut current: Option<HeaderName> = None;
    for (name, value) in backend {
        if let Some(name) = name {
            merged.remove(&name);
            current = Some(name);
        }
        if let Some(name) = &current {
            merged.append(name.clone(), value);
        }
    }
    merged
}
