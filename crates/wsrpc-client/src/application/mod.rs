//! Application layer for wsrpc-client.
//!
//! Knows *what* happens to each frame and event; delegates *how* bytes move
//! and *where* things are displayed to ports implemented by the
//! infrastructure layer.
//!
//! # Responsibilities
//!
//! - The connection lifecycle state machine and its control loop
//! - Keepalive scheduling
//! - Routing decoded envelopes to the call executor or notification handler
//!
//! # Ports
//!
//! | Trait            | Implemented by                                   |
//! |------------------|--------------------------------------------------|
//! | `Transport`      | `infrastructure::transport::{WsTransport, RecordingTransport}` |
//! | `Evaluator`      | `infrastructure::evaluator::ArithmeticEvaluator` |
//! | `DisplaySurface` | `infrastructure::display::{DisplayLog, LineWriterDisplay}` |

pub mod call_executor;
pub mod connection;
pub mod dispatcher;
pub mod keepalive;
pub mod notification;

pub use call_executor::{CallExecutor, EvalError, Evaluator};
pub use connection::{Connection, Transport, TransportError};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use keepalive::KeepaliveScheduler;
pub use notification::{DisplayError, DisplaySurface, NotificationHandler};
