//! TCP Server
//!
//! Ties the link layer, listener, acceptor thread and dispatcher together.

use std::net::{Ipv4Addr, SocketAddr, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::Config;
use crate::dispatch::{DispatchStats, Dispatcher, MessageSink};
use crate::error::{Result, TellyError};
use crate::link::{LinkLayer, StaticLink};
use crate::ui::status_line;
use super::acceptor::{Acceptor, AcceptorShared};
use super::listener::bind_listener;
use super::session::SessionState;

/// How long shutdown waits for the loopback wake-up connect
const WAKE_TIMEOUT: Duration = Duration::from_secs(1);

/// Telly receiver
///
/// Holds everything the receiver needs: the config, the link layer and the
/// dispatcher with its registered sink. Nothing is global, so several
/// servers can run in one process on different ports.
pub struct Server {
    config: Config,
    link: Arc<dyn LinkLayer>,
    dispatcher: Dispatcher,
}

impl Server {
    /// Create a server on a [`StaticLink`] built from `config.link`
    pub fn new(config: Config, sink: Arc<dyn MessageSink>) -> Result<Self> {
        let link: Arc<dyn LinkLayer> = Arc::new(StaticLink::new(config.link));
        Self::with_link(config, link, sink)
    }

    /// Create a server on a caller-provided link layer
    pub fn with_link(config: Config, link: Arc<dyn LinkLayer>, sink: Arc<dyn MessageSink>) -> Result<Self> {
        config.validate()?;
        let dispatcher = Dispatcher::new(config.dispatch, config.queue_capacity, sink)?;

        Ok(Self {
            config,
            link,
            dispatcher,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Address reported by the link layer
    pub fn address(&self) -> String {
        self.link.address()
    }

    /// Bring the link up, bind, and start the acceptor thread
    ///
    /// Link or bind failures are returned here and nothing is spawned.
    pub fn start(self) -> Result<ServerHandle> {
        let Server {
            config,
            link,
            dispatcher,
        } = self;

        tracing::info!(port = config.port, "Starting TCP server");

        if let Err(e) = link.up() {
            tracing::error!(error = %e, "Link layer failed to come up");
            return Err(e);
        }

        let listener = match bind_listener(config.bind_ip, config.port, config.backlog) {
            Ok(listener) => listener,
            Err(e) => {
                tracing::error!(error = %e, "Failed to start listener");
                return Err(e);
            }
        };
        let local_addr = listener.local_addr()?;

        let dispatcher = Arc::new(dispatcher);
        let shared = Arc::new(AcceptorShared::new());
        let mut acceptor = Acceptor::new(
            listener,
            Arc::clone(&dispatcher),
            Arc::clone(&shared),
            &config,
        );

        let thread = thread::Builder::new()
            .name("telly-acceptor".to_string())
            .spawn(move || acceptor.run())?;

        tracing::info!(
            address = %link.address(),
            local = %local_addr,
            dispatch = ?config.dispatch,
            "TCP server listening"
        );

        Ok(ServerHandle {
            local_addr,
            link,
            shared,
            stats: dispatcher.stats(),
            dispatcher: Some(dispatcher),
            thread: Some(thread),
        })
    }

    /// Start and block until the acceptor stops
    pub fn run(self) -> Result<()> {
        self.start()?.wait()
    }
}

/// A running server
///
/// Dropping the handle shuts the server down.
pub struct ServerHandle {
    local_addr: SocketAddr,
    link: Arc<dyn LinkLayer>,
    shared: Arc<AcceptorShared>,
    stats: Arc<DispatchStats>,
    dispatcher: Option<Arc<Dispatcher>>,
    thread: Option<JoinHandle<Result<()>>>,
}

impl ServerHandle {
    /// Socket address the listener is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Link layer address as text
    pub fn address(&self) -> String {
        self.link.address()
    }

    /// `IP: <address>  Port: <port>` for the status label
    pub fn status_line(&self) -> String {
        status_line(&self.address(), self.local_addr.port())
    }

    /// Current accept/receive state
    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    /// Number of clients accepted so far
    pub fn sessions(&self) -> u64 {
        self.shared.sessions()
    }

    pub fn stats(&self) -> Arc<DispatchStats> {
        Arc::clone(&self.stats)
    }

    /// Block until the acceptor thread exits
    pub fn wait(mut self) -> Result<()> {
        let result = self.join_acceptor();
        self.finish_dispatch();
        result
    }

    /// Stop accepting, end the live session and drain the dispatcher
    pub fn shutdown(mut self) -> Result<()> {
        self.stop()
    }

    fn stop(&mut self) -> Result<()> {
        if self.thread.is_none() {
            return Ok(());
        }

        tracing::info!("Shutting down TCP server");
        self.shared.request_shutdown();
        self.wake_acceptor();

        let result = self.join_acceptor();
        self.finish_dispatch();
        result
    }

    /// Unblock a pending `accept` with a throwaway loopback connection
    fn wake_acceptor(&self) {
        let mut target = self.local_addr;
        if target.ip().is_unspecified() {
            target.set_ip(Ipv4Addr::LOCALHOST.into());
        }
        if let Err(e) = TcpStream::connect_timeout(&target, WAKE_TIMEOUT) {
            tracing::debug!(error = %e, "Wake-up connect failed");
        }
    }

    fn join_acceptor(&mut self) -> Result<()> {
        match self.thread.take() {
            Some(thread) => thread
                .join()
                .map_err(|_| TellyError::Server("acceptor thread panicked".to_string()))?,
            None => Ok(()),
        }
    }

    fn finish_dispatch(&mut self) {
        if let Some(dispatcher) = self.dispatcher.take() {
            match Arc::try_unwrap(dispatcher) {
                Ok(dispatcher) => dispatcher.shutdown(),
                Err(_) => tracing::warn!("Dispatcher still shared, leaving it to drain on drop"),
            }
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tracing::warn!(error = %e, "Server stopped with error");
        }
    }
}
