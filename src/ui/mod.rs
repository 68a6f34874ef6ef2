//! UI Module
//!
//! The text surface that received messages end up on.
//!
//! Two labels: the data line (last message received) and the status line
//! (where to connect). Surfaces synchronize internally; callers never lock.

mod surface;
mod display_sink;

pub use surface::{LogSurface, UiSurface, INITIAL_STATUS, INITIAL_TEXT};
pub use display_sink::DisplaySink;

/// Status line shown once the link is up
pub fn status_line(address: &str, port: u16) -> String {
    format!("IP: {address}  Port: {port}")
}
