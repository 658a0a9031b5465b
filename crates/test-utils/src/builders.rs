#![allow(dead_code)]

use analysis_controller::config::{ConfigFile, RawConfigFile};
use analysis_controller::types::WorkerMode;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new(root: &str) -> Self {
        let mut config = RawConfigFile {
            worker: Default::default(),
            progress: Default::default(),
            client: Default::default(),
        };
        config.worker.root = root.to_string();
        Self { config }
    }

    pub fn with_mode(mut self, mode: WorkerMode) -> Self {
        self.config.worker.mode = mode;
        self
    }

    pub fn with_command(mut self, command: &str, subcommand: &str) -> Self {
        self.config.worker.command = command.to_string();
        self.config.worker.subcommand = subcommand.to_string();
        self
    }

    pub fn with_arg(mut self, arg: &str) -> Self {
        self.config.worker.args.push(arg.to_string());
        self
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.config
            .worker
            .env
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_startup_grace(mut self, grace: &str) -> Self {
        self.config.worker.startup_grace = grace.to_string();
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.config.progress.label = label.to_string();
        self
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.config.progress.namespace = namespace.to_string();
        self
    }

    pub fn with_tick(mut self, tick: &str) -> Self {
        self.config.progress.tick = tick.to_string();
        self
    }

    pub fn with_glyphs(mut self, glyphs: &[&str]) -> Self {
        self.config.progress.glyphs = glyphs.iter().map(|g| g.to_string()).collect();
        self
    }

    pub fn with_documents(mut self, documents: &[&str]) -> Self {
        self.config.client.documents = documents.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}
