// src/progress/tracker.rs

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::{debug, info};

use crate::progress::core::{ProgressCommand, ProgressCore, ProgressEvent, StatusUpdate};
use crate::progress::spinner::{GlyphCycle, SpinnerSession, DEFAULT_GLYPHS, DEFAULT_TICK};
use crate::progress::status::{show_status, StatusSink, StatusText};
use crate::types::DisplayState;

/// Tracker handle shared between notification handlers and the disposer.
pub type SharedTracker = Arc<Mutex<ProgressTracker>>;

/// How the busy indicator looks and ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSettings {
    /// Prefix of every status message (e.g. `analysis`).
    pub label: String,
    pub tick: Duration,
    pub glyphs: Vec<String>,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            label: "analysis".to_string(),
            tick: DEFAULT_TICK,
            glyphs: DEFAULT_GLYPHS.iter().map(|g| g.to_string()).collect(),
        }
    }
}

/// Folds begin/end notifications into a busy/idle status.
///
/// This is the IO shell around [`ProgressCore`]: the core decides, the
/// tracker owns the one `SpinnerSession` and talks to the status display.
/// Nothing here returns an error.
pub struct ProgressTracker {
    core: ProgressCore,
    spinner: Option<SpinnerSession>,
    status: Arc<dyn StatusSink>,
    settings: ProgressSettings,
    text: StatusText,
    shut_down: bool,
}

impl fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("core", &self.core)
            .field("spinner", &self.spinner)
            .field("shut_down", &self.shut_down)
            .finish_non_exhaustive()
    }
}

impl ProgressTracker {
    pub fn new(settings: ProgressSettings, status: Arc<dyn StatusSink>) -> Self {
        let text = StatusText::new(settings.label.clone());
        Self {
            core: ProgressCore::new(),
            spinner: None,
            status,
            settings,
            text,
            shut_down: false,
        }
    }

    pub fn shared(settings: ProgressSettings, status: Arc<dyn StatusSink>) -> SharedTracker {
        Arc::new(Mutex::new(Self::new(settings, status)))
    }

    pub fn count(&self) -> usize {
        self.core.count()
    }

    pub fn display_state(&self) -> DisplayState {
        self.core.display_state()
    }

    /// Whether a spinner session is currently held.
    pub fn spinner_active(&self) -> bool {
        self.spinner.as_ref().is_some_and(SpinnerSession::is_active)
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    pub fn on_work_started(&mut self) {
        self.handle(ProgressEvent::WorkStarted);
    }

    pub fn on_work_finished(&mut self) {
        self.handle(ProgressEvent::WorkFinished);
    }

    /// Feed one event through the core and execute the resulting commands.
    pub fn handle(&mut self, event: ProgressEvent) {
        if self.shut_down {
            debug!(?event, "tracker shut down; ignoring event");
            return;
        }

        let step = self.core.step(event);
        for command in step.commands {
            self.execute(command);
        }
    }

    /// Cancel any active spinner and stop reacting to events.
    ///
    /// Leaves the status display untouched. Idempotent.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.stop_spinner();
        info!(in_flight = self.core.count(), "progress tracker shut down");
    }

    fn execute(&mut self, command: ProgressCommand) {
        match command {
            ProgressCommand::StartSpinner => self.start_spinner(),
            ProgressCommand::StopSpinner => self.stop_spinner(),
            ProgressCommand::ShowStatus(update) => {
                let message = match update {
                    StatusUpdate::Working => self.text.working(),
                    StatusUpdate::Done => self.text.done(),
                };
                show_status(self.status.as_ref(), &message);
            }
        }
    }

    fn start_spinner(&mut self) {
        if self.spinner.is_some() {
            debug!("spinner already running; not starting another");
            return;
        }
        self.spinner = Some(SpinnerSession::start(
            self.settings.tick,
            GlyphCycle::new(self.settings.glyphs.clone()),
            self.text.clone(),
            Arc::clone(&self.status),
        ));
    }

    fn stop_spinner(&mut self) {
        if let Some(mut spinner) = self.spinner.take() {
            spinner.cancel();
        }
    }
}

/// Lock a shared tracker, recovering from poisoning.
///
/// The tracker holds no invariants a panicking handler could break halfway,
/// so a poisoned lock is still safe to use.
pub fn lock_tracker(tracker: &SharedTracker) -> MutexGuard<'_, ProgressTracker> {
    tracker.lock().unwrap_or_else(|poison| poison.into_inner())
}
