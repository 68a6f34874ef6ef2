//! Dispatcher
//!
//! Inline or queued delivery of sanitized messages to the consumer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender};

use crate::config::DispatchMode;
use crate::error::{Result, TellyError};
use crate::payload::SanitizedMessage;
use super::MessageSink;

/// Message counters shared between the acceptor and consumer side
#[derive(Debug, Default)]
pub struct DispatchStats {
    /// Messages accepted by `dispatch()`
    dispatched: AtomicU64,

    /// Messages the sink has returned from
    delivered: AtomicU64,
}

impl DispatchStats {
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }
}

/// Routes sanitized messages to the registered sink
///
/// The sink is fixed at construction. Dropping the dispatcher (or calling
/// [`Dispatcher::shutdown`]) closes the queue and waits for the consumer
/// thread to deliver everything already queued.
pub struct Dispatcher {
    /// Sink for inline delivery (None in queued mode)
    inline: Option<Arc<dyn MessageSink>>,

    /// Producer side of the queue (None in inline mode or after close)
    tx: Option<Sender<SanitizedMessage>>,

    /// Consumer thread (queued mode only)
    worker: Option<JoinHandle<()>>,

    stats: Arc<DispatchStats>,
}

impl Dispatcher {
    /// Build a dispatcher for `mode`. `capacity` is ignored in inline mode.
    pub fn new(mode: DispatchMode, capacity: usize, sink: Arc<dyn MessageSink>) -> Result<Self> {
        match mode {
            DispatchMode::Inline => Ok(Self::inline(sink)),
            DispatchMode::Queued => Self::queued(capacity, sink),
        }
    }

    /// Deliver on the caller's thread
    pub fn inline(sink: Arc<dyn MessageSink>) -> Self {
        Self {
            inline: Some(sink),
            tx: None,
            worker: None,
            stats: Arc::new(DispatchStats::default()),
        }
    }

    /// Deliver on a dedicated consumer thread fed by a bounded channel
    pub fn queued(capacity: usize, sink: Arc<dyn MessageSink>) -> Result<Self> {
        if capacity == 0 {
            return Err(TellyError::Config(
                "dispatch queue capacity must be non-zero".to_string(),
            ));
        }

        let (tx, rx) = channel::bounded(capacity);
        let stats = Arc::new(DispatchStats::default());
        let worker_stats = Arc::clone(&stats);

        let worker = thread::Builder::new()
            .name("telly-dispatch".to_string())
            .spawn(move || consume(rx, sink, worker_stats))?;

        tracing::debug!(capacity, "Dispatch queue started");

        Ok(Self {
            inline: None,
            tx: Some(tx),
            worker: Some(worker),
            stats,
        })
    }

    /// Hand one sanitized message to the sink
    ///
    /// Empty messages are ignored. In queued mode this blocks while the queue
    /// is full, so nothing is dropped and order is kept.
    pub fn dispatch(&self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }

        if let Some(sink) = &self.inline {
            self.stats.dispatched.fetch_add(1, Ordering::Relaxed);
            sink.on_message(text);
            self.stats.delivered.fetch_add(1, Ordering::Relaxed);
            return Ok(());
        }

        let tx = self.tx.as_ref().ok_or(TellyError::DispatchClosed)?;
        let message = SanitizedMessage::from_sanitized(text.as_bytes()).ok_or_else(|| {
            TellyError::Server("dispatch called with unsanitized text".to_string())
        })?;

        tx.send(message).map_err(|_| TellyError::DispatchClosed)?;
        self.stats.dispatched.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Counters for this dispatcher
    pub fn stats(&self) -> Arc<DispatchStats> {
        Arc::clone(&self.stats)
    }

    /// Messages waiting in the queue (always 0 inline)
    pub fn pending(&self) -> usize {
        self.tx.as_ref().map_or(0, |tx| tx.len())
    }

    /// Close the queue and wait for the consumer to drain it
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        // Dropping the sender ends the consumer loop once the queue is empty
        self.tx.take();

        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("Dispatch consumer thread panicked");
            }
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.close();
    }
}

fn consume(rx: Receiver<SanitizedMessage>, sink: Arc<dyn MessageSink>, stats: Arc<DispatchStats>) {
    for message in rx.iter() {
        sink.on_message(message.as_str());
        stats.delivered.fetch_add(1, Ordering::Relaxed);
    }
    tracing::debug!(
        delivered = stats.delivered(),
        "Dispatch queue closed"
    );
}
