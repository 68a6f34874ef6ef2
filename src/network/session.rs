//! Client Session
//!
//! One connected peer, from accept to close.

use std::io::{ErrorKind, Read};
use std::net::{SocketAddr, TcpStream};

use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::payload::sanitize_str;

/// Where the acceptor is in its accept/receive cycle
///
/// ```text
///   Listening ──accept──▶ Connected ──read > 0──┐
///       ▲                     │  ▲──────────────┘
///       │               read == 0 / error
///       │                     ▼
///       └──────close──── Closing
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Listening,
    Connected,
    Closing,
}

impl SessionState {
    /// A client was accepted
    pub fn accepted(self) -> Self {
        match self {
            SessionState::Listening => SessionState::Connected,
            other => other,
        }
    }

    /// A read returned `len` bytes (0 means the peer closed)
    pub fn received(self, len: usize) -> Self {
        match self {
            SessionState::Connected if len > 0 => SessionState::Connected,
            SessionState::Connected => SessionState::Closing,
            other => other,
        }
    }

    /// A read failed
    pub fn failed(self) -> Self {
        match self {
            SessionState::Connected => SessionState::Closing,
            other => other,
        }
    }

    /// The client socket was closed
    pub fn closed(self) -> Self {
        match self {
            SessionState::Closing => SessionState::Listening,
            other => other,
        }
    }
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Read returned 0
    PeerClosed,

    /// Read failed with this error kind
    Error(ErrorKind),
}

/// What happened during one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub peer: SocketAddr,
    /// Reads that returned data
    pub chunks: u64,
    /// Messages handed to the dispatcher (non-empty after sanitizing)
    pub messages: u64,
    pub bytes_received: u64,
    pub closed_by: CloseReason,
}

/// A connected client
pub struct Session {
    stream: TcpStream,
    peer: SocketAddr,
    state: SessionState,
}

impl Session {
    pub fn new(stream: TcpStream, peer: SocketAddr) -> Self {
        Self {
            stream,
            peer,
            state: SessionState::Listening.accepted(),
        }
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Receive until the peer closes or a read fails
    ///
    /// Each read of up to `rx.len()` bytes is one message. It is sanitized
    /// into `clean` (whose length is the output capacity) and dispatched if
    /// anything printable is left. Read errors end the session normally;
    /// only a dispatch failure is returned as `Err`.
    pub fn serve(&mut self, rx: &mut [u8], clean: &mut [u8], dispatcher: &Dispatcher) -> Result<SessionSummary> {
        let mut chunks = 0u64;
        let mut messages = 0u64;
        let mut bytes_received = 0u64;

        let closed_by = loop {
            match self.stream.read(rx) {
                Ok(0) => {
                    self.state = self.state.received(0);
                    tracing::info!(peer = %self.peer, "Client disconnected");
                    break CloseReason::PeerClosed;
                }
                Ok(len) => {
                    self.state = self.state.received(len);
                    chunks += 1;
                    bytes_received += len as u64;

                    let text = sanitize_str(&rx[..len], clean);
                    tracing::debug!(peer = %self.peer, raw_len = len, text, "Received (sanitized)");

                    if !text.is_empty() {
                        dispatcher.dispatch(text)?;
                        messages += 1;
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.state = self.state.failed();
                    tracing::warn!(peer = %self.peer, error = %e, "Receive error");
                    break CloseReason::Error(e.kind());
                }
            }
        };

        Ok(SessionSummary {
            peer: self.peer,
            chunks,
            messages,
            bytes_received,
            closed_by,
        })
    }

    /// Close the client socket
    pub fn close(mut self) -> SessionState {
        self.state = self.state.closed();
        // Dropping the stream closes the socket
        self.state
    }
}
