//! Transparent HTTP forwarding proxy for browser clients.
//!
//! Every request is forwarded once, verbatim apart from its authority, to a
//! single backend; `OPTIONS` preflight is answered locally; every response
//! carries permissive CORS headers.

pub mod cli;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use net::Listener;
