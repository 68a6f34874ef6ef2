//! Link Module
//!
//! The network interface the acceptor runs on top of.
//!
//! The link must be up before the acceptor binds. Its address is cached in
//! a write-once [`NetworkAddress`] so status reporting can read it from any
//! thread without locking.

mod address;
mod static_link;

pub use address::{LinkEvent, NetworkAddress, PLACEHOLDER_ADDRESS};
pub use static_link::StaticLink;

use crate::error::Result;

/// Link layer collaborator
pub trait LinkLayer: Send + Sync {
    /// Bring the interface up with its configured address
    fn up(&self) -> Result<()>;

    /// Current address as text, `"0.0.0.0"` until configured
    fn address(&self) -> String;
}
