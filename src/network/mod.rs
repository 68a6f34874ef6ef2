//! Network Module
//!
//! TCP ingestion of telemetry text.
//!
//! ## Architecture
//! - One acceptor thread owns the listening socket
//! - One client at a time; the next one waits in the backlog
//! - Each read is sanitized and handed to the dispatcher in order

mod listener;
mod session;
mod acceptor;
mod server;

pub use listener::bind_listener;
pub use session::{CloseReason, Session, SessionState, SessionSummary};
pub use acceptor::Acceptor;
pub use server::{Server, ServerHandle};
