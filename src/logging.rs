// src/logging.rs

//! Logging setup using `tracing` + `tracing-subscriber`.
//!
//! Filter directives come from, in order:
//! 1. `--log-level` (a single global level)
//! 2. `ANALYSIS_CONTROLLER_LOG`, in `EnvFilter` syntax, so worker output can
//!    be tuned separately, e.g. `info,analysis_controller::worker=warn`
//! 3. `info`
//!
//! Everything is written to stderr; a host relaying the worker channel may
//! own stdout.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

/// Environment variable holding filter directives.
pub const LOG_ENV_VAR: &str = "ANALYSIS_CONTROLLER_LOG";

const DEFAULT_DIRECTIVES: &str = "info";

/// Install the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV_VAR).ok();
    let directives = filter_directives(cli_level, env.as_deref());
    let filter = EnvFilter::try_new(&directives)
        .with_context(|| format!("invalid log filter '{directives}' (from {LOG_ENV_VAR})"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))?;

    Ok(())
}

/// Pick the directive string for the given CLI flag and environment value.
fn filter_directives(cli_level: Option<LogLevel>, env: Option<&str>) -> String {
    if let Some(level) = cli_level {
        return level_directive(level).to_string();
    }
    match env.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => DEFAULT_DIRECTIVES.to_string(),
    }
}

fn level_directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
