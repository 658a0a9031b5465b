use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use analysis_controller::errors::StatusError;
use analysis_controller::progress::StatusSink;

/// A status sink that records every message it is shown.
///
/// Clones share the same record, so keep one clone for assertions and hand
/// another to the code under test.
#[derive(Debug, Default, Clone)]
pub struct RecordingStatus {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shareable trait object backed by the same record.
    pub fn sink(&self) -> Arc<dyn StatusSink> {
        Arc::new(self.clone())
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.messages.lock().unwrap().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many recorded messages start with `prefix`.
    pub fn count_prefixed(&self, prefix: &str) -> usize {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.starts_with(prefix))
            .count()
    }
}

impl StatusSink for RecordingStatus {
    fn show(&self, message: &str) -> Result<(), StatusError> {
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

/// A status sink whose host is gone: every update fails.
#[derive(Debug, Default)]
pub struct FailingStatus {
    attempts: AtomicUsize,
}

impl FailingStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl StatusSink for FailingStatus {
    fn show(&self, _message: &str) -> Result<(), StatusError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StatusError::Unavailable)
    }
}
