//! Payload Module
//!
//! Turns raw bytes from the wire into printable text.
//!
//! ## Wire Format
//! There is none. Whatever a single read returns is one message:
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  raw bytes (1 .. rx_buffer_size - 1)          │
//! └──────────────────────────────────────────────┘
//!                      │ sanitize
//!                      ▼
//! ┌────────────────────────────────────────┬─────┐
//! │  printable ASCII 0x20..=0x7E           │ NUL │
//! └────────────────────────────────────────┴─────┘
//! ```
//!
//! A sender that splits one write over several segments produces several
//! messages; a sender that writes twice quickly may produce one.

mod sanitize;
mod message;

pub use sanitize::{is_printable, sanitize, sanitize_str};
pub use message::SanitizedMessage;
