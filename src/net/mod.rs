//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! listener.rs (bind, fatal BindError)
//!     → http::server (accept loop, one task per connection)
//! ```

pub mod listener;

pub use listener::{Listener, ListenerError};
