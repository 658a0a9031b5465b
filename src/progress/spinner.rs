// src/progress/spinner.rs

//! Periodic status pulse shown while work is in flight.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::progress::status::{show_status, StatusSink, StatusText};

/// Glyphs cycled through by default.
pub const DEFAULT_GLYPHS: [&str; 4] = ["|", "/", "-", "\\"];

/// Default spacing between spinner ticks.
pub const DEFAULT_TICK: Duration = Duration::from_millis(100);

/// A fixed cycle of glyphs that wraps after the last one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphCycle {
    glyphs: Vec<String>,
    next: usize,
}

impl GlyphCycle {
    pub fn new(glyphs: Vec<String>) -> Self {
        Self { glyphs, next: 0 }
    }

    /// Return the current glyph and move to the next, wrapping around.
    ///
    /// `None` only for an empty cycle.
    pub fn advance(&mut self) -> Option<&str> {
        if self.glyphs.is_empty() {
            return None;
        }
        let index = self.next;
        self.next = (self.next + 1) % self.glyphs.len();
        self.glyphs.get(index).map(String::as_str)
    }
}

impl Default for GlyphCycle {
    fn default() -> Self {
        Self::new(DEFAULT_GLYPHS.iter().map(|g| g.to_string()).collect())
    }
}

/// One active spinner: a Tokio task ticking at a fixed interval.
///
/// Ticks and [`cancel`](Self::cancel) synchronise on a shared gate, so once
/// `cancel` returns no further tick can reach the status display.
pub struct SpinnerSession {
    task: Option<JoinHandle<()>>,
    gate: Arc<Mutex<bool>>,
}

impl std::fmt::Debug for SpinnerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpinnerSession")
            .field("active", &self.is_active())
            .finish()
    }
}

impl SpinnerSession {
    /// Start ticking. The first tick fires one `tick` after start.
    ///
    /// Outside a Tokio runtime the session is created inert: it reports
    /// active until cancelled but never ticks.
    pub fn start(
        tick: Duration,
        glyphs: GlyphCycle,
        text: StatusText,
        sink: Arc<dyn StatusSink>,
    ) -> Self {
        let gate = Arc::new(Mutex::new(true));

        let task = match Handle::try_current() {
            Ok(runtime) => {
                let gate = Arc::clone(&gate);
                Some(runtime.spawn(run_ticks(tick, glyphs, text, sink, gate)))
            }
            Err(e) => {
                warn!(error = %e, "no async runtime; spinner will not tick");
                None
            }
        };

        debug!(tick_ms = tick.as_millis(), "spinner session started");
        Self { task, gate }
    }

    pub fn is_active(&self) -> bool {
        *lock_gate(&self.gate)
    }

    /// Stop ticking. Idempotent: returns `true` only for the call that
    /// actually stopped the session.
    pub fn cancel(&mut self) -> bool {
        {
            let mut open = lock_gate(&self.gate);
            if !*open {
                return false;
            }
            *open = false;
        }

        if let Some(task) = self.task.take() {
            task.abort();
        }
        debug!("spinner session cancelled");
        true
    }
}

impl Drop for SpinnerSession {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn lock_gate(gate: &Mutex<bool>) -> std::sync::MutexGuard<'_, bool> {
    gate.lock().unwrap_or_else(|poison| poison.into_inner())
}

async fn run_ticks(
    tick: Duration,
    mut glyphs: GlyphCycle,
    text: StatusText,
    sink: Arc<dyn StatusSink>,
    gate: Arc<Mutex<bool>>,
) {
    let mut interval = interval_at(Instant::now() + tick, tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;

        let open = lock_gate(&gate);
        if !*open {
            break;
        }
        if let Some(glyph) = glyphs.advance() {
            show_status(sink.as_ref(), &text.working_with(glyph));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_wraps_after_last_glyph() {
        let mut cycle = GlyphCycle::default();
        let seen: Vec<String> = (0..6)
            .filter_map(|_| cycle.advance().map(str::to_string))
            .collect();

        assert_eq!(seen, vec!["|", "/", "-", "\\", "|", "/"]);
    }

    #[test]
    fn empty_cycle_yields_nothing() {
        let mut cycle = GlyphCycle::new(Vec::new());
        assert_eq!(cycle.advance(), None);
    }

    struct Silent;

    impl StatusSink for Silent {
        fn show(&self, _message: &str) -> Result<(), crate::errors::StatusError> {
            Ok(())
        }
    }

    #[test]
    fn cancel_is_idempotent_without_runtime() {
        let mut session = SpinnerSession::start(
            DEFAULT_TICK,
            GlyphCycle::default(),
            StatusText::new("analysis"),
            Arc::new(Silent),
        );

        assert!(session.is_active());
        assert!(session.cancel());
        assert!(!session.cancel());
        assert!(!session.is_active());
    }
}
