// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::controller::ControllerSettings;
use crate::messaging::{ClientOptions, DEFAULT_NAMESPACE};
use crate::progress::spinner::DEFAULT_GLYPHS;
use crate::progress::tracker::ProgressSettings;
use crate::supervisor::SpawnConfig;
use crate::types::WorkerMode;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [worker]
/// root = "/home/me/texls/"
/// mode = "launch"
///
/// [worker.env]
/// RUST_BACKTRACE = "1"
///
/// [progress]
/// label = "analysis"
/// tick = "100ms"
///
/// [client]
/// documents = ["tex", "latex"]
/// ```
///
/// Every section is optional, but `worker.root` must be set for the file to
/// validate.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub worker: WorkerSection,

    #[serde(default)]
    pub progress: ProgressSection,

    #[serde(default)]
    pub client: ClientSection,
}

/// A validated configuration.
///
/// Only constructed through `ConfigFile::try_from(RawConfigFile)`, so the
/// duration strings are known to parse.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub worker: WorkerSection,
    pub progress: ProgressSection,
    pub client: ClientSection,
    tick: Duration,
    startup_grace: Duration,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        raw: RawConfigFile,
        tick: Duration,
        startup_grace: Duration,
    ) -> Self {
        Self {
            worker: raw.worker,
            progress: raw.progress,
            client: raw.client,
            tick,
            startup_grace,
        }
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    pub fn startup_grace(&self) -> Duration {
        self.startup_grace
    }

    /// Runtime settings for one controller instance.
    pub fn settings(&self) -> ControllerSettings {
        let worker = &self.worker;
        let spawn = SpawnConfig {
            root: worker.root.clone(),
            mode: worker.mode,
            command: worker.command.clone(),
            subcommand: worker.subcommand.clone(),
            manifest: worker.manifest.clone(),
            args: worker.args.clone(),
            env: worker.env.clone(),
            cwd: worker.cwd.as_ref().map(PathBuf::from),
            startup_grace: self.startup_grace,
        };

        ControllerSettings {
            spawn,
            progress: ProgressSettings {
                label: self.progress.label.clone(),
                tick: self.tick,
                glyphs: self.progress.glyphs.clone(),
            },
            namespace: self.progress.namespace.clone(),
            client: ClientOptions {
                name: self.client.name.clone(),
                document_selector: self.client.documents.clone(),
                configuration_section: self.client.configuration_section.clone(),
            },
        }
    }
}

/// `[worker]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerSection {
    /// Worker source root. The manifest name is appended to it verbatim, so
    /// it usually ends with a path separator.
    #[serde(default)]
    pub root: String,

    /// `"launch"` (default) or `"direct"`.
    #[serde(default)]
    pub mode: WorkerMode,

    #[serde(default = "default_command")]
    pub command: String,

    #[serde(default = "default_subcommand")]
    pub subcommand: String,

    /// Only used in launch mode.
    #[serde(default = "default_manifest")]
    pub manifest: String,

    #[serde(default)]
    pub args: Vec<String>,

    /// Environment overrides for the worker process.
    #[serde(default = "default_env")]
    pub env: BTreeMap<String, String>,

    /// Working directory; defaults to `root`.
    #[serde(default)]
    pub cwd: Option<String>,

    /// Duration string to wait before checking whether the worker exited
    /// right away. Defaults to `"200ms"`; `"0ms"` checks without waiting.
    #[serde(default = "default_startup_grace")]
    pub startup_grace: String,
}

fn default_command() -> String {
    "cargo".to_string()
}

fn default_subcommand() -> String {
    "run".to_string()
}

fn default_manifest() -> String {
    "Cargo.toml".to_string()
}

fn default_env() -> BTreeMap<String, String> {
    BTreeMap::from([("RUST_BACKTRACE".to_string(), "1".to_string())])
}

fn default_startup_grace() -> String {
    "200ms".to_string()
}

impl Default for WorkerSection {
    fn default() -> Self {
        Self {
            root: String::new(),
            mode: WorkerMode::default(),
            command: default_command(),
            subcommand: default_subcommand(),
            manifest: default_manifest(),
            args: Vec::new(),
            env: default_env(),
            cwd: None,
            startup_grace: default_startup_grace(),
        }
    }
}

/// `[progress]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressSection {
    /// Prefix of every status message.
    #[serde(default = "default_label")]
    pub label: String,

    /// Notification namespace; methods are `<namespace>/diagnosticsBegin`
    /// and `<namespace>/diagnosticsEnd`.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Spinner tick as a duration string.
    #[serde(default = "default_tick")]
    pub tick: String,

    #[serde(default = "default_glyphs")]
    pub glyphs: Vec<String>,
}

fn default_label() -> String {
    "analysis".to_string()
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_tick() -> String {
    "100ms".to_string()
}

fn default_glyphs() -> Vec<String> {
    DEFAULT_GLYPHS.iter().map(|g| g.to_string()).collect()
}

impl Default for ProgressSection {
    fn default() -> Self {
        Self {
            label: default_label(),
            namespace: default_namespace(),
            tick: default_tick(),
            glyphs: default_glyphs(),
        }
    }
}

/// `[client]` section, passed through to the message client.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSection {
    #[serde(default = "default_client_name")]
    pub name: String,

    /// Document kinds the host routes to the worker.
    #[serde(default = "default_documents")]
    pub documents: Vec<String>,

    #[serde(default = "default_configuration_section")]
    pub configuration_section: String,
}

fn default_client_name() -> String {
    ClientOptions::default().name
}

fn default_documents() -> Vec<String> {
    ClientOptions::default().document_selector
}

fn default_configuration_section() -> String {
    ClientOptions::default().configuration_section
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            name: default_client_name(),
            documents: default_documents(),
            configuration_section: default_configuration_section(),
        }
    }
}
