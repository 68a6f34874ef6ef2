//! # Telly
//!
//! Receives telemetry text over TCP and puts it on a display:
//! - Static IPv4 link layer with a write-once address
//! - Single-client TCP acceptor (one session at a time, backlog 1)
//! - Sanitizer that keeps printable ASCII only
//! - Ordered delivery to one registered consumer, inline or through a
//!   bounded queue
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Link Layer (static IP)                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ up() before bind
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 Acceptor thread                              │
//! │      accept ──▶ read ──▶ sanitize ──▶ dispatch               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ in order, non-empty only
//!                       ▼
//!               ┌───────────────┐
//!               │  Dispatcher   │ inline or bounded queue
//!               └───────┬───────┘
//!                       ▼
//!               ┌───────────────┐
//!               │  UI Surface   │ set_text / set_status
//!               └───────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod payload;
pub mod dispatch;
pub mod link;
pub mod network;
pub mod ui;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, TellyError};
pub use config::{Config, DispatchMode, LinkConfig};
pub use dispatch::{Dispatcher, MessageSink};
pub use network::{Server, ServerHandle};
pub use payload::{sanitize, SanitizedMessage};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of Telly
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
