//! Domain layer for wsrpc-client.
//!
//! Pure types with no dependencies on sockets, async runtimes, or
//! frameworks:
//!
//! - Client configuration
//! - Connection lifecycle states and the transport events that drive them
//! - The restricted arithmetic language evaluated for `eval` calls

pub mod config;
pub mod expression;
pub mod state;

pub use config::ClientConfig;
pub use expression::{evaluate, ExpressionError, Number};
pub use state::{ConnectionState, TransportEvent};
