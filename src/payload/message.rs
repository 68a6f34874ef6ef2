//! Sanitized message type

use std::fmt;

use bytes::Bytes;

use super::sanitize::is_printable;

/// An owned, printable message ready to hand to a consumer thread
///
/// Only built from sanitizer output, so the bytes are always printable
/// ASCII and never contain CR, LF or the terminator.
#[derive(Clone, PartialEq, Eq)]
pub struct SanitizedMessage {
    text: Bytes,
}

impl SanitizedMessage {
    /// Copy sanitized bytes into a new message
    ///
    /// Returns `None` if `bytes` contains anything outside the printable range.
    pub fn from_sanitized(bytes: &[u8]) -> Option<Self> {
        if bytes.iter().all(|&b| is_printable(b)) {
            Some(Self {
                text: Bytes::copy_from_slice(bytes),
            })
        } else {
            None
        }
    }

    /// Message text
    pub fn as_str(&self) -> &str {
        // Printable ASCII is always valid UTF-8
        std::str::from_utf8(&self.text).unwrap_or_default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Debug for SanitizedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SanitizedMessage").field(&self.as_str()).finish()
    }
}

impl fmt::Display for SanitizedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
