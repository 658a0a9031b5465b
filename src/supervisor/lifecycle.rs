// src/supervisor/lifecycle.rs

//! The supervisor state machine.

use std::fmt;
use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::errors::SpawnError;
use crate::progress::status::{show_status, StatusSink, StatusText};

use super::command::{CommandSpec, SpawnConfig};
use super::handle::WorkerHandle;
use super::spawner::Spawner;
use super::stderr::forward_stderr;

/// Lifecycle of a single start attempt.
///
/// `Unstarted -> Starting -> { Running | Failed }`. `Failed` is terminal: a
/// retry needs a new `Supervisor`. Channel-level disconnects after `Running`
/// are the message client's concern and never move the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Unstarted,
    Starting,
    Running,
    Failed,
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SupervisorState::Unstarted => "unstarted",
            SupervisorState::Starting => "starting",
            SupervisorState::Running => "running",
            SupervisorState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Produces the worker channel, or fails in a way the host can observe.
pub struct Supervisor {
    config: SpawnConfig,
    spawner: Arc<dyn Spawner>,
    status: Arc<dyn StatusSink>,
    text: StatusText,
    state: SupervisorState,
}

impl fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Supervisor {
    pub fn new(
        config: SpawnConfig,
        spawner: Arc<dyn Spawner>,
        status: Arc<dyn StatusSink>,
        text: StatusText,
    ) -> Self {
        Self {
            config,
            spawner,
            status,
            text,
            state: SupervisorState::Unstarted,
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    pub fn config(&self) -> &SpawnConfig {
        &self.config
    }

    /// The command line this supervisor spawns.
    pub fn command_spec(&self) -> CommandSpec {
        self.config.command_spec()
    }

    /// Start the worker and hand back its handle.
    ///
    /// On failure the status display shows a terse "could not start"
    /// message, the error is logged, and the supervisor moves to `Failed`.
    /// Nothing is retried.
    pub async fn obtain_channel(&mut self) -> Result<WorkerHandle, SpawnError> {
        if self.state != SupervisorState::Unstarted {
            return Err(SpawnError::AlreadyStarted { state: self.state });
        }
        self.state = SupervisorState::Starting;

        let spec = self.config.command_spec();
        info!(
            mode = %self.config.mode,
            command = %spec,
            cwd = %spec.cwd.display(),
            "starting worker"
        );

        match self.start(&spec).await {
            Ok(handle) => {
                info!(pid = ?handle.pid(), "worker started; waiting for channel handshake");
                Ok(handle)
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    async fn start(&self, spec: &CommandSpec) -> Result<WorkerHandle, SpawnError> {
        let mut handle = self.spawner.spawn(spec).await?;
        if !handle.has_channel() {
            return Err(SpawnError::MissingPipe { stream: "channel" });
        }

        if let Some(stderr) = handle.take_stderr() {
            forward_stderr(stderr, handle.pid());
        }

        if !self.config.startup_grace.is_zero() {
            sleep(self.config.startup_grace).await;
        }

        if let Some(status) = handle.exit_status_now() {
            // `handle` is dropped here, so no live handle escapes.
            return Err(SpawnError::ExitedImmediately {
                command: spec.program.clone(),
                code: status.code(),
            });
        }

        Ok(handle)
    }

    fn fail(&mut self, err: &SpawnError) {
        self.state = SupervisorState::Failed;
        error!(
            command = %self.config.command,
            root = %self.config.root,
            error = %err,
            "could not start worker"
        );
        show_status(self.status.as_ref(), &self.text.could_not_start());
    }

    /// Record the first successful handshake over the channel.
    ///
    /// Returns `false` (and changes nothing) unless the supervisor is
    /// `Starting`.
    pub fn mark_running(&mut self) -> bool {
        if self.state != SupervisorState::Starting {
            debug!(state = %self.state, "ignoring handshake outside Starting");
            return false;
        }
        self.state = SupervisorState::Running;
        info!("worker channel established");
        true
    }
}
