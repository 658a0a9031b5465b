use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// How the worker process is obtained.
///
/// - `Direct`: run a fixed, already-resolved command line from the worker
///   root (used for a long-lived development build).
/// - `Launch`: compose a run command against the worker's manifest, which is
///   located by concatenating the manifest name onto the root (default).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerMode {
    Direct,
    Launch,
}

impl Default for WorkerMode {
    fn default() -> Self {
        WorkerMode::Launch
    }
}

impl FromStr for WorkerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "direct" => Ok(WorkerMode::Direct),
            "launch" => Ok(WorkerMode::Launch),
            other => Err(format!(
                "invalid worker mode: {other} (expected \"direct\" or \"launch\")"
            )),
        }
    }
}

impl fmt::Display for WorkerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerMode::Direct => f.write_str("direct"),
            WorkerMode::Launch => f.write_str("launch"),
        }
    }
}

/// What the status indicator currently conveys.
///
/// Never stored on its own: always derived from the in-flight work count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    Idle,
    Busy,
}

impl DisplayState {
    pub fn from_count(count: usize) -> Self {
        if count > 0 {
            DisplayState::Busy
        } else {
            DisplayState::Idle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_mode_parses_case_insensitively() {
        assert_eq!(" Direct ".parse::<WorkerMode>(), Ok(WorkerMode::Direct));
        assert_eq!("LAUNCH".parse::<WorkerMode>(), Ok(WorkerMode::Launch));
        assert!("spawn".parse::<WorkerMode>().is_err());
    }

    #[test]
    fn display_state_follows_count() {
        assert_eq!(DisplayState::from_count(0), DisplayState::Idle);
        assert_eq!(DisplayState::from_count(1), DisplayState::Busy);
        assert_eq!(DisplayState::from_count(42), DisplayState::Busy);
    }
}
