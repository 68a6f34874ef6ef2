//! Message consumer trait

/// Receives each non-empty sanitized message
///
/// Must return promptly: in inline mode it holds up the network reads, in
/// queued mode it holds up the queue. The `&str` is only valid for the call.
pub trait MessageSink: Send + Sync {
    fn on_message(&self, message: &str);
}

impl<F> MessageSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn on_message(&self, message: &str) {
        self(message)
    }
}
