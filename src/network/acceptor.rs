//! Connection Acceptor
//!
//! Serially accepts one client at a time and runs its session to the end.

use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::Result;
use super::session::{Session, SessionState};

/// State visible to the server handle while the acceptor thread runs
#[derive(Debug)]
pub(crate) struct AcceptorShared {
    shutdown: AtomicBool,
    state: Mutex<SessionState>,
    /// Second handle to the live client socket, used to unblock its read
    client: Mutex<Option<TcpStream>>,
    sessions: AtomicU64,
}

impl AcceptorShared {
    pub(crate) fn new() -> Self {
        Self {
            shutdown: AtomicBool::new(false),
            state: Mutex::new(SessionState::Listening),
            client: Mutex::new(None),
            sessions: AtomicU64::new(0),
        }
    }

    pub(crate) fn state(&self) -> SessionState {
        *self.state.lock()
    }

    pub(crate) fn sessions(&self) -> u64 {
        self.sessions.load(Ordering::Relaxed)
    }

    pub(crate) fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Flag the acceptor to stop and end the live session, if any
    pub(crate) fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);

        if let Some(client) = self.client.lock().take() {
            if let Err(e) = client.shutdown(std::net::Shutdown::Both) {
                tracing::debug!(error = %e, "Client socket already closed");
            }
        }
    }

    /// Publish the live client so shutdown can unblock its read
    ///
    /// A client that cannot be published is not served: nothing could end
    /// its session from outside.
    fn register_client(&self, stream: &TcpStream) -> Registration {
        let mut slot = self.client.lock();
        if self.is_shutdown() {
            return Registration::ShuttingDown;
        }
        match stream.try_clone() {
            Ok(clone) => {
                *slot = Some(clone);
                Registration::Registered
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cannot clone client socket, dropping client");
                Registration::Unavailable
            }
        }
    }

    fn clear_client(&self) {
        self.client.lock().take();
    }

    fn set_state(&self, state: SessionState) {
        *self.state.lock() = state;
    }
}

/// Outcome of publishing an accepted client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Registration {
    Registered,
    ShuttingDown,
    Unavailable,
}

/// Owns the listening socket and the accept/receive loop
pub struct Acceptor {
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    shared: Arc<AcceptorShared>,
    /// Receive buffer, one slot short of the sanitizer capacity
    rx_buf: Vec<u8>,
    /// Sanitizer output, including the terminator slot
    clean_buf: Vec<u8>,
}

impl Acceptor {
    pub(crate) fn new(
        listener: TcpListener,
        dispatcher: Arc<Dispatcher>,
        shared: Arc<AcceptorShared>,
        config: &Config,
    ) -> Self {
        Self {
            listener,
            dispatcher,
            shared,
            rx_buf: vec![0; config.max_read_len().max(1)],
            clean_buf: vec![0; config.rx_buffer_size],
        }
    }

    /// Run until shutdown is requested
    ///
    /// Accept, receive and dispatch failures end at most the current
    /// session; the loop carries on with the next client.
    pub fn run(&mut self) -> Result<()> {
        loop {
            if self.shared.is_shutdown() {
                break;
            }

            self.shared.set_state(SessionState::Listening);
            tracing::info!("Waiting for client connection...");

            let (stream, peer) = match self.listener.accept() {
                Ok(accepted) => accepted,
                Err(e) => {
                    if self.shared.is_shutdown() {
                        break;
                    }
                    tracing::error!(error = %e, "Failed to accept connection");
                    continue;
                }
            };

            match self.shared.register_client(&stream) {
                Registration::Registered => {}
                // Woken up for shutdown
                Registration::ShuttingDown => break,
                Registration::Unavailable => continue,
            }

            let mut session = Session::new(stream, peer);
            let number = self.shared.sessions.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::info!(peer = %session.peer(), session = number, "Client connected");
            self.shared.set_state(session.state());

            let result = session.serve(&mut self.rx_buf, &mut self.clean_buf, &self.dispatcher);
            self.shared.set_state(SessionState::Closing);

            self.shared.clear_client();
            let state = session.close();
            self.shared.set_state(state);

            match result {
                Ok(summary) => tracing::info!(
                    peer = %summary.peer,
                    chunks = summary.chunks,
                    messages = summary.messages,
                    bytes = summary.bytes_received,
                    closed_by = ?summary.closed_by,
                    "Session ended"
                ),
                Err(e) => tracing::error!(
                    peer = %peer,
                    error = %e,
                    "Dispatch failed, session dropped"
                ),
            }
        }

        self.shared.set_state(SessionState::Listening);
        tracing::info!("Acceptor stopped");
        Ok(())
    }
}
