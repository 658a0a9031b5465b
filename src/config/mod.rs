// src/config/mod.rs

//! Configuration loading and validation for the controller.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants and parse durations (`validate.rs`,
//!   `duration.rs`).

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::parse_duration;
pub use loader::{load_and_validate, load_from_path, DEFAULT_CONFIG_FILE};
pub use model::{ClientSection, ConfigFile, ProgressSection, RawConfigFile, WorkerSection};
