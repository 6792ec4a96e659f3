//! Forwarded request construction.
//!
//! Only the authority of the inbound target is replaced. Method, path,
//! query, end-to-end headers and the body stream pass through untouched;
//! `Host` is rewritten and hop-by-hop headers are dropped because they
//! belong to the client's connection, not the backend's.

use axum::{
    body::Body,
    http::{
        header,
        uri::{Authority, PathAndQuery, Scheme},
        HeaderValue, Request, Uri, Version,
    },
};

use crate::http::headers::strip_hop_by_hop;
use crate::http::response::ProxyError;

/// Retarget an inbound request at the backend.
///
/// The body is moved, not read: bytes reach the backend as the client sends them.
pub fn forward_request(
    request: Request<Body>,
    backend: &Authority,
) -> Result<Request<Body>, ProxyError> {
    let (mut parts, body) = request.into_parts();

    parts.uri = backend_uri(&parts.uri, backend)?;
    parts.version = Version::HTTP_11;
    parts.extensions.clear();

    strip_hop_by_hop(&mut parts.headers);
    let host = HeaderValue::from_str(backend.as_str())
        .map_err(|e| ProxyError::MalformedRequest(format!("backend host: {e}")))?;
    parts.headers.insert(header::HOST, host);

    Ok(Request::from_parts(parts, body))
}

/// Swap scheme and authority, keeping path and query verbatim.
pub fn backend_uri(target: &Uri, backend: &Authority) -> Result<Uri, ProxyError> {
    let path_and_query = target
        .path_and_query()
        .cloned()
        .unwrap_or_else(|| PathAndQuery::from_static("/"));

    Uri::builder()
        .scheme(Scheme::HTTP)
        .authority(backend.clone())
        .path_and_query(path_and_query)
        .build()
        .map_err(|e| ProxyError::MalformedRequest(format!("request target `{target}`: {e}")))
}
