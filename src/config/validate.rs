// src/config/validate.rs

use std::time::Duration;

use crate::config::duration::parse_duration;
use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{ControllerError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = ControllerError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_worker(&raw)?;
        validate_progress(&raw)?;
        let tick = parse_tick(&raw)?;
        let startup_grace = parse_named_duration("worker.startup_grace", &raw.worker.startup_grace)?;
        Ok(ConfigFile::new_unchecked(raw, tick, startup_grace))
    }
}

fn validate_worker(cfg: &RawConfigFile) -> Result<()> {
    if cfg.worker.root.trim().is_empty() {
        return Err(ControllerError::ConfigError(
            "[worker].root must be set to the worker source directory".to_string(),
        ));
    }

    if cfg.worker.command.trim().is_empty() {
        return Err(ControllerError::ConfigError(
            "[worker].command must not be empty".to_string(),
        ));
    }

    for key in cfg.worker.env.keys() {
        if key.is_empty() || key.contains('=') {
            return Err(ControllerError::ConfigError(format!(
                "[worker.env] has invalid variable name '{key}'"
            )));
        }
    }

    Ok(())
}

fn validate_progress(cfg: &RawConfigFile) -> Result<()> {
    if cfg.progress.namespace.trim().is_empty() {
        return Err(ControllerError::ConfigError(
            "[progress].namespace must not be empty".to_string(),
        ));
    }

    if cfg.progress.glyphs.is_empty() {
        return Err(ControllerError::ConfigError(
            "[progress].glyphs must contain at least one glyph".to_string(),
        ));
    }

    Ok(())
}

fn parse_tick(cfg: &RawConfigFile) -> Result<Duration> {
    let tick = parse_named_duration("progress.tick", &cfg.progress.tick)?;
    if tick.is_zero() {
        return Err(ControllerError::ConfigError(
            "[progress].tick must be greater than zero".to_string(),
        ));
    }
    Ok(tick)
}

fn parse_named_duration(field: &str, value: &str) -> Result<Duration> {
    parse_duration(value)
        .map_err(|e| ControllerError::ConfigError(format!("invalid {field}: {e}")))
}
