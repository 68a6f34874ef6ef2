//! Consumer that shows each message on a surface

use std::sync::Arc;

use crate::dispatch::MessageSink;
use super::UiSurface;

/// Puts every dispatched message on the surface's data label
pub struct DisplaySink<S: UiSurface> {
    surface: Arc<S>,
}

impl<S: UiSurface> DisplaySink<S> {
    pub fn new(surface: Arc<S>) -> Self {
        Self { surface }
    }

    pub fn surface(&self) -> &Arc<S> {
        &self.surface
    }
}

impl<S: UiSurface> MessageSink for DisplaySink<S> {
    fn on_message(&self, message: &str) {
        tracing::debug!(message, "Updating display");
        self.surface.set_text(message);
    }
}
