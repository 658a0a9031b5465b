// src/supervisor/mod.rs

//! Worker process supervision.
//!
//! This module is responsible for obtaining a communication channel to the
//! worker process, using `tokio::process::Command`, and for reporting spawn
//! failures to the user-visible status and the log.
//!
//! - [`command`] composes the worker command line from a [`SpawnConfig`].
//! - [`spawner`] provides the `Spawner` trait and the concrete
//!   `ProcessSpawner` used in production, which tests can replace with a
//!   fake implementation.
//! - [`handle`] owns the spawned worker's streams and process.
//! - [`stderr`] forwards worker diagnostics to the log.
//! - [`lifecycle`] holds the `Supervisor` state machine itself.

pub mod command;
pub mod handle;
pub mod lifecycle;
pub mod spawner;
pub mod stderr;

pub use command::{CommandSpec, SpawnConfig};
pub use handle::{Channel, WorkerHandle, WorkerInput, WorkerOutput};
pub use lifecycle::{Supervisor, SupervisorState};
pub use spawner::{ProcessSpawner, SpawnFuture, Spawner};
pub use stderr::{drain_stderr, WORKER_LOG_TARGET};
