// src/progress/mod.rs

//! Progress tracking for worker notifications.
//!
//! The worker announces work with two notification kinds, which may overlap
//! and arrive in bursts. This module folds them into a single busy/idle
//! signal:
//! - [`counter`] keeps the clamped in-flight count.
//! - [`core`] is the pure state machine deciding spinner and status changes.
//! - [`spinner`] owns the periodic tick while busy.
//! - [`status`] is the status display collaborator.
//! - [`tracker`] is the IO shell tying the above together.

pub mod core;
pub mod counter;
pub mod spinner;
pub mod status;
pub mod tracker;

pub use self::core::{ProgressCommand, ProgressCore, ProgressEvent, ProgressStep, StatusUpdate};
pub use counter::{Decrement, ProgressCounter};
pub use spinner::{GlyphCycle, SpinnerSession};
pub use status::{show_status, LogStatus, StatusSink, StatusText};
pub use tracker::{lock_tracker, ProgressSettings, ProgressTracker, SharedTracker};
