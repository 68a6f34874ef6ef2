//! UI surfaces

use parking_lot::Mutex;

/// Data label text before the first message
pub const INITIAL_TEXT: &str = "Waiting...";

/// Status label text before the link is up
pub const INITIAL_STATUS: &str = "Initializing network...";

/// A display with a data label and a status label
pub trait UiSurface: Send + Sync {
    fn set_text(&self, text: &str);
    fn set_status(&self, status: &str);
}

#[derive(Debug, Clone)]
struct Labels {
    text: String,
    status: String,
    updates: u64,
}

/// Headless surface that writes label changes to the log
///
/// Keeps the current label values so they can be queried.
#[derive(Debug)]
pub struct LogSurface {
    labels: Mutex<Labels>,
}

impl LogSurface {
    pub fn new() -> Self {
        Self {
            labels: Mutex::new(Labels {
                text: INITIAL_TEXT.to_string(),
                status: INITIAL_STATUS.to_string(),
                updates: 0,
            }),
        }
    }

    /// Current data label
    pub fn text(&self) -> String {
        self.labels.lock().text.clone()
    }

    /// Current status label
    pub fn status(&self) -> String {
        self.labels.lock().status.clone()
    }

    /// Number of `set_text` calls so far
    pub fn updates(&self) -> u64 {
        self.labels.lock().updates
    }
}

impl Default for LogSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl UiSurface for LogSurface {
    fn set_text(&self, text: &str) {
        let mut labels = self.labels.lock();
        labels.text.clear();
        labels.text.push_str(text);
        labels.updates += 1;
        tracing::info!(target: "telly::display", text, "Display updated");
    }

    fn set_status(&self, status: &str) {
        self.labels.lock().status = status.to_string();
        tracing::info!(target: "telly::display", status, "Status updated");
    }
}
