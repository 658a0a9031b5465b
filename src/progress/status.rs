// src/progress/status.rs

//! Status display collaborator and the messages shown through it.

use tracing::{debug, info};

use crate::errors::StatusError;

/// Log target used by [`LogStatus`].
pub const STATUS_LOG_TARGET: &str = "analysis_controller::status";

/// A single-line status indicator owned by the host.
///
/// Each message replaces the previous one. There is no acknowledgement.
pub trait StatusSink: Send + Sync {
    fn show(&self, message: &str) -> Result<(), StatusError>;
}

/// Push `message` to `sink`, dropping any failure.
///
/// Display updates are cosmetic; the core never fails because of them.
pub fn show_status(sink: &dyn StatusSink, message: &str) {
    if let Err(err) = sink.show(message) {
        debug!(error = %err, message, "status update dropped");
    }
}

/// Status sink that writes every message to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogStatus;

impl StatusSink for LogStatus {
    fn show(&self, message: &str) -> Result<(), StatusError> {
        info!(target: STATUS_LOG_TARGET, "{}", message);
        Ok(())
    }
}

/// Builds the user-facing status texts for one controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusText {
    label: String,
}

impl StatusText {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn starting(&self) -> String {
        format!("{}: starting up", self.label)
    }

    pub fn working(&self) -> String {
        format!("{}: working", self.label)
    }

    pub fn working_with(&self, glyph: &str) -> String {
        format!("{}: working {glyph}", self.label)
    }

    pub fn done(&self) -> String {
        format!("{}: done", self.label)
    }

    pub fn could_not_start(&self) -> String {
        format!("{}: could not start", self.label)
    }
}
