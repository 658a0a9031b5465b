use std::io::{self, Cursor};
use std::sync::{Arc, Mutex};

use tokio::io::DuplexStream;

use analysis_controller::errors::SpawnError;
use analysis_controller::supervisor::{CommandSpec, SpawnFuture, Spawner, WorkerHandle, WorkerOutput};

#[derive(Debug, Clone)]
enum Outcome {
    Succeed { stderr: Vec<u8> },
    /// Streams without a message channel.
    NoChannel,
    Fail(io::ErrorKind),
}

/// A fake spawner that:
/// - records every resolved command line it is asked to spawn
/// - hands back in-memory streams instead of a process, or fails.
#[derive(Debug, Clone)]
pub struct FakeSpawner {
    outcome: Outcome,
    specs: Arc<Mutex<Vec<CommandSpec>>>,
    worker_sides: Arc<Mutex<Vec<DuplexStream>>>,
}

impl FakeSpawner {
    pub fn succeeding() -> Self {
        Self::with_outcome(Outcome::Succeed { stderr: Vec::new() })
    }

    /// Succeeds, but the handle it returns has no message channel.
    pub fn without_channel() -> Self {
        Self::with_outcome(Outcome::NoChannel)
    }

    /// Succeeds, and the worker writes exactly `bytes` to stderr.
    pub fn with_stderr_bytes(bytes: &[u8]) -> Self {
        Self::with_outcome(Outcome::Succeed {
            stderr: bytes.to_vec(),
        })
    }

    /// Succeeds, and the worker "writes" these lines to stderr.
    pub fn with_stderr(lines: &[&str]) -> Self {
        Self::with_stderr_bytes(lines.join("\n").as_bytes())
    }

    /// Fails every spawn with an OS error of `kind`.
    pub fn failing(kind: io::ErrorKind) -> Self {
        Self::with_outcome(Outcome::Fail(kind))
    }

    fn with_outcome(outcome: Outcome) -> Self {
        Self {
            outcome,
            specs: Arc::new(Mutex::new(Vec::new())),
            worker_sides: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn specs(&self) -> Vec<CommandSpec> {
        self.specs.lock().unwrap().clone()
    }

    pub fn spawn_count(&self) -> usize {
        self.specs.lock().unwrap().len()
    }

    /// The worker end of the most recent in-memory channel.
    pub fn take_worker_side(&self) -> Option<DuplexStream> {
        self.worker_sides.lock().unwrap().pop()
    }
}

impl Spawner for FakeSpawner {
    fn spawn<'a>(&'a self, spec: &'a CommandSpec) -> SpawnFuture<'a> {
        Box::pin(async move {
            self.specs.lock().unwrap().push(spec.clone());

            match &self.outcome {
                Outcome::Succeed { stderr } => {
                    let (controller_side, worker_side) = tokio::io::duplex(4096);
                    let (read, write) = tokio::io::split(controller_side);
                    self.worker_sides.lock().unwrap().push(worker_side);

                    Ok(WorkerHandle::from_streams(
                        Box::new(write),
                        Box::new(read),
                        Some(Box::new(Cursor::new(stderr.clone())) as WorkerOutput),
                    ))
                }
                Outcome::NoChannel => {
                    let (controller_side, _worker_side) = tokio::io::duplex(64);
                    let (read, write) = tokio::io::split(controller_side);
                    let mut handle =
                        WorkerHandle::from_streams(Box::new(write), Box::new(read), None);
                    handle.take_channel();
                    Ok(handle)
                }
                Outcome::Fail(kind) => Err(SpawnError::from_io(
                    &spec.program,
                    io::Error::new(*kind, "fake spawn failure"),
                )),
            }
        })
    }
}
