// src/errors.rs

//! Crate-wide error types.

use std::io;

use thiserror::Error;

use crate::supervisor::SupervisorState;

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Worker could not start: {0}")]
    Spawn(#[from] SpawnError),

    #[error("Message client error: {0}")]
    Client(#[from] ClientError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Why the worker process could not be started.
///
/// Every variant is terminal for the [`Supervisor`](crate::supervisor::Supervisor)
/// that produced it; retrying means building a new supervisor.
#[derive(Error, Debug)]
pub enum SpawnError {
    #[error("worker command not found: {command} ({source})")]
    NotFound {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to spawn worker '{command}': {source}")]
    Os {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("worker '{command}' exited immediately (exit code {code:?})")]
    ExitedImmediately { command: String, code: Option<i32> },

    #[error("worker {stream} was not captured")]
    MissingPipe { stream: &'static str },

    #[error("supervisor cannot start a worker from state {state}")]
    AlreadyStarted { state: SupervisorState },
}

impl SpawnError {
    /// Classify an OS-level spawn error for `command`.
    pub fn from_io(command: &str, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            SpawnError::NotFound {
                command: command.to_string(),
                source,
            }
        } else {
            SpawnError::Os {
                command: command.to_string(),
                source,
            }
        }
    }
}

/// Failures reported by the status display collaborator.
///
/// These are never propagated out of the core; callers drop them.
#[derive(Error, Debug)]
pub enum StatusError {
    #[error("status display unavailable")]
    Unavailable,

    #[error("status display rejected message: {0}")]
    Rejected(String),
}

/// Failures reported by the message client collaborator.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("message client failed to start: {0}")]
    Start(String),

    #[error("message client already started")]
    AlreadyStarted,
}

pub type Result<T> = std::result::Result<T, ControllerError>;
