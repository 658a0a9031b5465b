// src/progress/core.rs

//! Pure progress state machine.
//!
//! This module contains a synchronous, deterministic "core" that consumes
//! [`ProgressEvent`]s and produces:
//! - an updated in-flight count
//! - a list of commands describing what the IO shell should do next
//!
//! The shell (`progress::tracker::ProgressTracker`) is responsible for the
//! spinner timer and for talking to the status display. The core is intended
//! to be unit and property tested without any Tokio, timers, or hosts.

use tracing::debug;

use crate::progress::counter::{Decrement, ProgressCounter};
use crate::types::DisplayState;

/// The two notification kinds the worker sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    WorkStarted,
    WorkFinished,
}

/// Which status message the shell should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusUpdate {
    Working,
    Done,
}

/// Command produced by the core, to be executed by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressCommand {
    StartSpinner,
    StopSpinner,
    ShowStatus(StatusUpdate),
}

/// Decision returned by the core after handling a single event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressStep {
    pub commands: Vec<ProgressCommand>,
    pub state: DisplayState,
}

/// Pure progress state: the counter and whether a spinner is running.
///
/// `spinner_active` is true exactly while `count > 0`.
#[derive(Debug, Default, Clone)]
pub struct ProgressCore {
    counter: ProgressCounter,
    spinner_active: bool,
}

impl ProgressCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.counter.count()
    }

    pub fn display_state(&self) -> DisplayState {
        DisplayState::from_count(self.counter.count())
    }

    pub fn spinner_active(&self) -> bool {
        self.spinner_active
    }

    /// Handle a single event, returning the commands for the shell.
    pub fn step(&mut self, event: ProgressEvent) -> ProgressStep {
        let commands = match event {
            ProgressEvent::WorkStarted => self.handle_work_started(),
            ProgressEvent::WorkFinished => self.handle_work_finished(),
        };

        ProgressStep {
            commands,
            state: self.display_state(),
        }
    }

    fn handle_work_started(&mut self) -> Vec<ProgressCommand> {
        let count = self.counter.increment();
        debug!(count, "work started");

        if self.spinner_active {
            return Vec::new();
        }

        self.spinner_active = true;
        vec![
            ProgressCommand::StartSpinner,
            ProgressCommand::ShowStatus(StatusUpdate::Working),
        ]
    }

    fn handle_work_finished(&mut self) -> Vec<ProgressCommand> {
        match self.counter.decrement() {
            Decrement::Remaining(count) => {
                debug!(count, "work finished; still busy");
                Vec::new()
            }
            Decrement::Idle => {
                debug!("work finished; now idle");
                let mut commands = Vec::with_capacity(2);
                if self.spinner_active {
                    self.spinner_active = false;
                    commands.push(ProgressCommand::StopSpinner);
                }
                commands.push(ProgressCommand::ShowStatus(StatusUpdate::Done));
                commands
            }
            Decrement::Unmatched => {
                // Possible protocol desync; clamped, not an error.
                debug!("work finished without matching start; ignoring");
                Vec::new()
            }
        }
    }
}
