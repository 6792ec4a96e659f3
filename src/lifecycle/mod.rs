//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Parse CLI → Load config → Validate → Init logging/metrics → Bind → Serve
//!
//! Shutdown:
//!     signals.rs (SIGTERM/SIGINT) → shutdown.rs (broadcast)
//!     → server stops accepting → in-flight exchanges drain → exit
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
