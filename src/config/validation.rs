//! Configuration validation.
//!
//! Serde handles syntax; this module checks that values are usable before
//! anything is bound. Validation is a pure function over `ProxyConfig` and
//! returns all errors, not just the first.

use axum::http::uri::Authority;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` must be host:port")]
    InvalidBindAddress(String),

    #[error("backend.address `{address}` is invalid: {reason}")]
    InvalidBackend { address: String, reason: String },

    #[error("timeouts.connect_secs must be greater than zero")]
    ZeroConnectTimeout,

    #[error("observability.metrics_address `{0}` is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate the whole configuration, collecting every error.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !is_host_port(&config.listener.bind_address) {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if let Err(e) = parse_backend_authority(&config.backend.address) {
        errors.push(e);
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroConnectTimeout);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Parse the configured backend into the authority requests are retargeted at.
///
/// Accepts `host:port` or `http://host:port` (a trailing `/` is tolerated).
/// Anything carrying TLS or a path is rejected: only the authority of the
/// inbound target is ever replaced.
pub fn parse_backend_authority(address: &str) -> Result<Authority, ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidBackend {
        address: address.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = address.trim();
    let rest = match trimmed.split_once("://") {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("http") => rest,
        Some((scheme, _)) => {
            return Err(invalid(&format!("scheme `{scheme}` is not supported")));
        }
        None => trimmed,
    };
    let rest = rest.strip_suffix('/').unwrap_or(rest);

    if rest.is_empty() {
        return Err(invalid("missing host"));
    }
    if rest.contains('/') {
        return Err(invalid("must not contain a path"));
    }
    if rest.contains('@') {
        return Err(invalid("must not contain credentials"));
    }

    Authority::from_str(rest).map_err(|e| invalid(&e.to_string()))
}

fn is_host_port(value: &str) -> bool {
    match value.rsplit_once(':') {
        Some((host, port)) => !host.is_empty() && port.parse::<u16>().is_ok(),
        None => false,
    }
}
