//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (net::Listener)
//!     → server.rs (Axum router, one handler for every method and path)
//!         OPTIONS → cors.rs (preflight answered locally)
//!         other   → request.rs (retarget at backend, headers.rs strips hop-by-hop)
//!                 → backend (hyper client, body streamed)
//!                 → response.rs (merge headers, stream body back, map errors)
//!     → Send to client
//! ```

pub mod cors;
pub mod headers;
pub mod request;
pub mod response;
pub mod server;

pub use response::ProxyError;
pub use server::HttpServer;
