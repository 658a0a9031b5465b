// src/supervisor/spawner.rs

//! Pluggable spawn abstraction.
//!
//! The supervisor talks to a `Spawner` instead of calling
//! `tokio::process::Command` directly. This keeps the async boundary
//! explicit and makes it easy to swap in a fake spawner in tests.
//!
//! - `ProcessSpawner` is the default implementation: it spawns a real OS
//!   process with piped stdio.
//! - Tests can provide their own `Spawner` that, for example, records the
//!   resolved command lines and hands back in-memory streams.

use std::future::Future;
use std::pin::Pin;

use tracing::debug;

use crate::errors::SpawnError;

use super::command::CommandSpec;
use super::handle::WorkerHandle;

/// Future returned by [`Spawner::spawn`].
pub type SpawnFuture<'a> =
    Pin<Box<dyn Future<Output = Result<WorkerHandle, SpawnError>> + Send + 'a>>;

/// Trait abstracting how the worker is brought up.
pub trait Spawner: Send + Sync {
    /// Start (or connect to) the worker described by `spec`.
    fn spawn<'a>(&'a self, spec: &'a CommandSpec) -> SpawnFuture<'a>;
}

/// Spawns the worker as a child process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessSpawner;

impl Spawner for ProcessSpawner {
    fn spawn<'a>(&'a self, spec: &'a CommandSpec) -> SpawnFuture<'a> {
        Box::pin(async move {
            debug!(
                command = %spec,
                cwd = %spec.cwd.display(),
                env = ?spec.env,
                "spawning worker process"
            );

            let child = spec
                .to_command()
                .spawn()
                .map_err(|e| SpawnError::from_io(&spec.program, e))?;

            WorkerHandle::from_child(child)
        })
    }
}
