//! Dispatch Module
//!
//! Delivers sanitized messages to the single registered consumer.
//!
//! ## Architecture
//! ```text
//!   acceptor thread                      consumer thread
//!  ┌───────────────┐   bounded channel  ┌───────────────┐
//!  │ sanitize      │ ─────────────────▶ │ MessageSink   │
//!  │ dispatch()    │   (Queued mode)    │ on_message()  │
//!  └───────────────┘                    └───────────────┘
//! ```
//! In `Inline` mode the sink runs directly inside `dispatch()`.
//! Either way messages reach the sink in receive order, exactly once each.

mod sink;
mod dispatcher;

pub use sink::MessageSink;
pub use dispatcher::{Dispatcher, DispatchStats};
