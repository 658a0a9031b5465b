use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

/// Formatted log output captured for one test.
///
/// Installed as the thread-local default, so it sees events from the test
/// itself and from tasks polled on the same current-thread runtime.
#[derive(Debug, Default, Clone)]
pub struct CapturedLogs {
    buf: Arc<Mutex<Vec<u8>>>,
}

/// Writer handed out by [`CapturedLogs`] for each event.
pub struct CapturedWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl io::Write for CapturedWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CapturedWriter {
            buf: Arc::clone(&self.buf),
        }
    }
}

impl CapturedLogs {
    /// Start capturing every level on the current thread until the guard is
    /// dropped.
    pub fn install() -> (Self, DefaultGuard) {
        let logs = Self::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_max_level(tracing::Level::TRACE)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (logs, guard)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock().unwrap()).into_owned()
    }

    /// Captured lines emitted under `target`.
    pub fn lines_for(&self, target: &str) -> Vec<String> {
        let prefix = format!("{target}:");
        self.contents()
            .lines()
            .filter(|line| line.split_whitespace().nth(1) == Some(prefix.as_str()))
            .map(str::to_string)
            .collect()
    }

    /// Poll until a captured line contains `needle`, giving background
    /// tasks a chance to run. Returns `false` after `within`.
    pub async fn wait_for(&self, needle: &str, within: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + within;
        loop {
            if self.contents().contains(needle) {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}
