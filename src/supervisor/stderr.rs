// src/supervisor/stderr.rs

//! Worker stderr forwarding.

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use super::handle::WorkerOutput;

/// Log target used for lines the worker writes to stderr.
pub const WORKER_LOG_TARGET: &str = "analysis_controller::worker";

/// Forward worker stderr to the log, one line per event.
///
/// Fire-and-forget: the forwarder ends when the pipe closes. Always consume
/// stderr so the worker's pipe never fills up or breaks under it.
pub fn forward_stderr(stderr: WorkerOutput, pid: Option<u32>) {
    tokio::spawn(drain_stderr(stderr, pid));
}

/// Read `stderr` to the end, logging every non-blank line.
///
/// Lines are decoded lossily, so bytes that are not UTF-8 never stop the
/// drain. Only end-of-stream or a read error does.
pub async fn drain_stderr(stderr: WorkerOutput, pid: Option<u32>) {
    let mut reader = BufReader::new(stderr);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim();
                if !line.is_empty() {
                    info!(target: WORKER_LOG_TARGET, pid = ?pid, "{}", line);
                }
            }
            Err(e) => {
                debug!(pid = ?pid, error = %e, "worker stderr read failed");
                break;
            }
        }
    }

    debug!(pid = ?pid, "worker stderr closed");
}
