// src/supervisor/command.rs

//! Deterministic composition of the worker command line.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::types::WorkerMode;

/// Flag prefix used to point the launcher at the worker's manifest.
pub const MANIFEST_FLAG: &str = "--manifest-path=";

/// Wait before checking for an early exit. Long enough for a launcher that
/// rejects its manifest to have died.
pub const DEFAULT_STARTUP_GRACE: Duration = Duration::from_millis(200);

/// Everything the supervisor needs to start the worker.
///
/// The root path is taken as given: it is neither canonicalised nor checked
/// for existence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnConfig {
    /// Worker source root. Used verbatim as the manifest prefix.
    pub root: String,
    pub mode: WorkerMode,
    /// Program to execute (e.g. `cargo`).
    pub command: String,
    /// First argument (e.g. `run`). Skipped when empty.
    pub subcommand: String,
    /// Manifest file name appended to `root` in launch mode.
    pub manifest: String,
    /// Trailing arguments, passed in order after everything else.
    pub args: Vec<String>,
    /// Environment overrides layered on top of the inherited environment.
    pub env: BTreeMap<String, String>,
    /// Working directory; defaults to `root`.
    pub cwd: Option<PathBuf>,
    /// How long to wait before checking whether the worker already exited.
    /// Zero checks once without waiting.
    pub startup_grace: Duration,
}

impl SpawnConfig {
    /// Launch-mode config for `root` with the stock `cargo run` command and
    /// backtraces enabled in the worker.
    pub fn new(root: impl Into<String>) -> Self {
        let mut env = BTreeMap::new();
        env.insert("RUST_BACKTRACE".to_string(), "1".to_string());

        Self {
            root: root.into(),
            mode: WorkerMode::Launch,
            command: "cargo".to_string(),
            subcommand: "run".to_string(),
            manifest: "Cargo.toml".to_string(),
            args: Vec::new(),
            env,
            cwd: None,
            startup_grace: DEFAULT_STARTUP_GRACE,
        }
    }

    pub fn with_mode(mut self, mode: WorkerMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_command(mut self, command: &str, subcommand: &str) -> Self {
        self.command = command.to_string();
        self.subcommand = subcommand.to_string();
        self
    }

    pub fn with_arg(mut self, arg: &str) -> Self {
        self.args.push(arg.to_string());
        self
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_startup_grace(mut self, grace: Duration) -> Self {
        self.startup_grace = grace;
        self
    }

    /// Path of the manifest as handed to the launcher: `root` + `manifest`,
    /// concatenated as strings.
    pub fn manifest_path(&self) -> String {
        format!("{}{}", self.root, self.manifest)
    }

    /// Resolve the full command line. Pure: equal configs always yield equal
    /// specs.
    pub fn command_spec(&self) -> CommandSpec {
        let mut args = Vec::with_capacity(self.args.len() + 2);
        if !self.subcommand.is_empty() {
            args.push(self.subcommand.clone());
        }
        if self.mode == WorkerMode::Launch {
            args.push(format!("{MANIFEST_FLAG}{}", self.manifest_path()));
        }
        args.extend(self.args.iter().cloned());

        CommandSpec {
            program: self.command.clone(),
            args,
            env: self.env.clone(),
            cwd: self
                .cwd
                .clone()
                .unwrap_or_else(|| PathBuf::from(&self.root)),
        }
    }
}

/// A fully resolved worker invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub cwd: PathBuf,
}

impl CommandSpec {
    /// Build the Tokio command with all three standard streams piped.
    ///
    /// stdout is reserved for the message channel; stderr is diagnostics.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .envs(&self.env)
            .current_dir(&self.cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_mode_concatenates_manifest_onto_root() {
        let spec = SpawnConfig::new("/home/me/worker/").command_spec();

        assert_eq!(spec.program, "cargo");
        assert_eq!(
            spec.args,
            vec![
                "run".to_string(),
                "--manifest-path=/home/me/worker/Cargo.toml".to_string()
            ]
        );
        assert_eq!(spec.cwd, PathBuf::from("/home/me/worker/"));
        assert_eq!(spec.env.get("RUST_BACKTRACE").map(String::as_str), Some("1"));
    }

    #[test]
    fn new_config_waits_before_exit_check() {
        let cfg = SpawnConfig::new("/srv/worker/");
        assert_eq!(cfg.startup_grace, DEFAULT_STARTUP_GRACE);
        assert_eq!(
            cfg.with_startup_grace(Duration::ZERO).startup_grace,
            Duration::ZERO
        );
    }

    #[test]
    fn root_without_trailing_separator_is_not_fixed_up() {
        let cfg = SpawnConfig::new("/srv/worker");
        assert_eq!(cfg.manifest_path(), "/srv/workerCargo.toml");
    }

    #[test]
    fn direct_mode_skips_manifest() {
        let spec = SpawnConfig::new("/srv/worker/")
            .with_mode(WorkerMode::Direct)
            .with_arg("--stdio")
            .command_spec();

        assert_eq!(spec.to_string(), "cargo run --stdio");
    }

    #[test]
    fn empty_subcommand_is_omitted() {
        let spec = SpawnConfig::new("/srv/worker/")
            .with_mode(WorkerMode::Direct)
            .with_command("worker-bin", "")
            .command_spec();

        assert!(spec.args.is_empty());
        assert_eq!(spec.to_string(), "worker-bin");
    }

    #[test]
    fn explicit_cwd_overrides_root() {
        let mut cfg = SpawnConfig::new("/srv/worker/");
        cfg.cwd = Some(PathBuf::from("/tmp"));
        assert_eq!(cfg.command_spec().cwd, PathBuf::from("/tmp"));
    }
}
