// src/controller.rs

//! Activation entry point and disposal.
//!
//! The host calls [`Controller::activate`] once per activation. On success a
//! disposer is registered on the host's [`DisposalSink`]; disposing it stops
//! the message client, cancels any running spinner and releases the worker.

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::{ControllerError, Result, SpawnError};
use crate::messaging::{register_progress_handlers, ClientOptions, MessageClient, NotificationMethods};
use crate::progress::status::{show_status, LogStatus, StatusSink, StatusText};
use crate::progress::tracker::{lock_tracker, ProgressSettings, ProgressTracker, SharedTracker};
use crate::supervisor::{ProcessSpawner, SpawnConfig, Spawner, Supervisor, WorkerHandle};

/// Something the host tears down on deactivation.
pub trait Disposable: Send {
    /// Release resources. Must tolerate being called more than once.
    fn dispose(&mut self);
}

/// The host's registry of things to dispose.
pub trait DisposalSink: Send {
    fn register(&mut self, disposable: Box<dyn Disposable>);
}

/// A simple `DisposalSink` that disposes in reverse registration order.
///
/// Disposes whatever is left when dropped.
#[derive(Default)]
pub struct Subscriptions {
    items: Vec<Box<dyn Disposable>>,
}

impl fmt::Debug for Subscriptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriptions")
            .field("len", &self.items.len())
            .finish()
    }
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Dispose and forget everything registered so far.
    pub fn dispose_all(&mut self) {
        while let Some(mut item) = self.items.pop() {
            item.dispose();
        }
    }
}

impl DisposalSink for Subscriptions {
    fn register(&mut self, disposable: Box<dyn Disposable>) {
        self.items.push(disposable);
    }
}

impl Drop for Subscriptions {
    fn drop(&mut self) {
        self.dispose_all();
    }
}

/// Everything one controller instance needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    pub spawn: SpawnConfig,
    pub progress: ProgressSettings,
    /// Notification namespace (e.g. `texDocument`).
    pub namespace: String,
    pub client: ClientOptions,
}

impl ControllerSettings {
    pub fn new(spawn: SpawnConfig) -> Self {
        Self {
            spawn,
            progress: ProgressSettings::default(),
            namespace: crate::messaging::DEFAULT_NAMESPACE.to_string(),
            client: ClientOptions::default(),
        }
    }

    pub fn methods(&self) -> NotificationMethods {
        NotificationMethods::for_namespace(&self.namespace)
    }
}

/// Wires supervisor, tracker and message client together.
pub struct Controller {
    settings: ControllerSettings,
    spawner: Arc<dyn Spawner>,
    status: Arc<dyn StatusSink>,
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Controller {
    /// Controller spawning real processes and reporting status to the log.
    pub fn new(settings: ControllerSettings) -> Self {
        Self {
            settings,
            spawner: Arc::new(ProcessSpawner),
            status: Arc::new(LogStatus),
        }
    }

    pub fn with_spawner(mut self, spawner: Arc<dyn Spawner>) -> Self {
        self.spawner = spawner;
        self
    }

    pub fn with_status(mut self, status: Arc<dyn StatusSink>) -> Self {
        self.status = status;
        self
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    /// Start the worker, connect `client` to it and register the disposer.
    ///
    /// A spawn failure has already been shown on the status display and
    /// logged when this returns `Err`; nothing is registered in that case.
    pub async fn activate<C>(self, mut client: C, sink: &mut dyn DisposalSink) -> Result<()>
    where
        C: MessageClient + 'static,
    {
        let Controller {
            settings,
            spawner,
            status,
        } = self;

        let text = StatusText::new(settings.progress.label.clone());
        show_status(status.as_ref(), &text.starting());

        let mut supervisor = Supervisor::new(
            settings.spawn.clone(),
            spawner,
            Arc::clone(&status),
            text,
        );
        let mut worker = supervisor.obtain_channel().await?;
        // Present: the supervisor rejects handles without a channel.
        let channel = worker
            .take_channel()
            .ok_or(SpawnError::MissingPipe { stream: "channel" })?;

        let tracker = ProgressTracker::shared(settings.progress.clone(), Arc::clone(&status));
        register_progress_handlers(&mut client, &settings.methods(), &tracker);

        if let Err(err) = client.start(channel, settings.client.clone()).await {
            warn!(error = %err, "message client failed to start; releasing worker");
            worker.release();
            return Err(ControllerError::Client(err));
        }
        supervisor.mark_running();

        info!(
            pid = ?worker.pid(),
            documents = ?settings.client.document_selector,
            "controller active"
        );

        sink.register(Box::new(ActiveController {
            client: Box::new(client),
            tracker,
            worker: Some(worker),
            supervisor,
            disposed: false,
        }));
        Ok(())
    }
}

/// The disposer registered for one successful activation.
struct ActiveController {
    client: Box<dyn MessageClient>,
    tracker: SharedTracker,
    worker: Option<WorkerHandle>,
    supervisor: Supervisor,
    disposed: bool,
}

impl Disposable for ActiveController {
    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        info!(worker_state = %self.supervisor.state(), "disposing controller");
        self.client.stop();
        lock_tracker(&self.tracker).shutdown();
        if let Some(mut worker) = self.worker.take() {
            worker.release();
        }
    }
}
