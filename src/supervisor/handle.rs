// src/supervisor/handle.rs

//! Exclusive handle to a running worker.

use std::fmt;
use std::process::ExitStatus;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::Child;
use tracing::{debug, info, warn};

use crate::errors::SpawnError;

/// Write half of the worker channel (the worker's stdin).
pub type WorkerInput = Box<dyn AsyncWrite + Send + Unpin>;

/// Read half of a worker stream (stdout or stderr).
pub type WorkerOutput = Box<dyn AsyncRead + Send + Unpin>;

/// The byte-stream pair handed to the message client.
pub struct Channel {
    pub input: WorkerInput,
    pub output: WorkerOutput,
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel").finish_non_exhaustive()
    }
}

/// Owns the worker process (if any) and its three streams.
///
/// The channel and the stderr stream can each be taken out exactly once.
/// Releasing the handle kills the process; dropping it releases too.
pub struct WorkerHandle {
    pid: Option<u32>,
    channel: Option<Channel>,
    stderr: Option<WorkerOutput>,
    child: Option<Child>,
    released: bool,
}

impl fmt::Debug for WorkerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerHandle")
            .field("pid", &self.pid)
            .field("has_channel", &self.channel.is_some())
            .field("has_stderr", &self.stderr.is_some())
            .field("released", &self.released)
            .finish()
    }
}

impl WorkerHandle {
    /// Wrap a freshly spawned child, taking its piped streams.
    pub fn from_child(mut child: Child) -> Result<Self, SpawnError> {
        let input = child
            .stdin
            .take()
            .ok_or(SpawnError::MissingPipe { stream: "stdin" })?;
        let output = child
            .stdout
            .take()
            .ok_or(SpawnError::MissingPipe { stream: "stdout" })?;
        let stderr = child.stderr.take();

        Ok(Self {
            pid: child.id(),
            channel: Some(Channel {
                input: Box::new(input),
                output: Box::new(output),
            }),
            stderr: stderr.map(|s| Box::new(s) as WorkerOutput),
            child: Some(child),
            released: false,
        })
    }

    /// Wrap streams of a worker this controller did not spawn (an already
    /// running process, or an in-memory pipe).
    pub fn from_streams(
        input: WorkerInput,
        output: WorkerOutput,
        stderr: Option<WorkerOutput>,
    ) -> Self {
        Self {
            pid: None,
            channel: Some(Channel { input, output }),
            stderr,
            child: None,
            released: false,
        }
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn has_channel(&self) -> bool {
        self.channel.is_some()
    }

    /// Take the message channel. Returns `None` once taken or released.
    pub fn take_channel(&mut self) -> Option<Channel> {
        self.channel.take()
    }

    /// Take the diagnostic stream. Returns `None` once taken.
    pub fn take_stderr(&mut self) -> Option<WorkerOutput> {
        self.stderr.take()
    }

    /// Non-blocking check for an already exited process.
    ///
    /// Always `None` for workers without an owned process.
    pub fn exit_status_now(&mut self) -> Option<ExitStatus> {
        let child = self.child.as_mut()?;
        match child.try_wait() {
            Ok(status) => status,
            Err(e) => {
                debug!(pid = ?self.pid, error = %e, "could not poll worker exit status");
                None
            }
        }
    }

    /// Wait for the owned process to exit.
    ///
    /// Returns `Ok(None)` for workers without an owned process.
    pub async fn wait(&mut self) -> std::io::Result<Option<ExitStatus>> {
        match self.child.as_mut() {
            Some(child) => child.wait().await.map(Some),
            None => Ok(None),
        }
    }

    /// Close the channel and kill the process. Idempotent.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.channel = None;
        self.stderr = None;

        if let Some(mut child) = self.child.take() {
            // Dropping the child afterwards lets Tokio reap it in the background.
            match child.start_kill() {
                Ok(()) => info!(pid = ?self.pid, "worker process released"),
                Err(e) => warn!(
                    pid = ?self.pid,
                    error = %e,
                    "failed to kill worker process on release"
                ),
            }
        } else {
            debug!("worker streams released");
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.release();
    }
}
