//! Stateless edge relay
//!
//! Forwards every request under a reserved path prefix to a fixed upstream
//! host, byte-transparently: same method, same body, same response status
//! and headers. The only rewrite is the host-routing header.

mod error;
mod server;

pub use error::RelayError;
pub use server::{AppState, RelayServer, create_router};
