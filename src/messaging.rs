// src/messaging.rs

//! Seam to the generic message client.
//!
//! The client owns the wire protocol; this crate only registers two
//! notification handlers on it and hands it the worker channel. Payloads
//! are opaque: only the notification method matters.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use tracing::debug;

use crate::errors::ClientError;
use crate::progress::core::ProgressEvent;
use crate::progress::tracker::{lock_tracker, SharedTracker};
use crate::supervisor::Channel;

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "texDocument";

/// Method suffix for "work started".
pub const BEGIN_METHOD: &str = "diagnosticsBegin";

/// Method suffix for "work finished".
pub const END_METHOD: &str = "diagnosticsEnd";

/// Callback invoked by the client for each notification of one method.
pub type NotificationHandler = Box<dyn Fn(Value) + Send + Sync>;

/// Future returned by [`MessageClient::start`].
pub type StartFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ClientError>> + Send + 'a>>;

/// Host-side settings passed through to the client untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Human-readable client name.
    pub name: String,
    /// Document kinds the host routes to this worker.
    pub document_selector: Vec<String>,
    /// Settings section the host keeps in sync with the worker.
    pub configuration_section: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            name: "TeX Language Server".to_string(),
            document_selector: vec!["tex".to_string(), "latex".to_string()],
            configuration_section: "languageServerExample".to_string(),
        }
    }
}

/// A bidirectional message client (external collaborator).
///
/// Implementations deliver notifications strictly in arrival order, one at
/// a time.
pub trait MessageClient: Send {
    /// Register `handler` for notifications named `method`.
    fn on_notification(&mut self, method: &str, handler: NotificationHandler);

    /// Take ownership of the channel and perform the initial handshake.
    fn start(&mut self, channel: Channel, options: ClientOptions) -> StartFuture<'_>;

    /// Tear down the connection. Must be idempotent.
    fn stop(&mut self);
}

/// The two fully qualified notification methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMethods {
    pub begin: String,
    pub end: String,
}

impl NotificationMethods {
    pub fn for_namespace(namespace: &str) -> Self {
        Self {
            begin: format!("{namespace}/{BEGIN_METHOD}"),
            end: format!("{namespace}/{END_METHOD}"),
        }
    }

    /// Map a method name to its progress event.
    pub fn classify(&self, method: &str) -> Option<ProgressEvent> {
        if method == self.begin {
            Some(ProgressEvent::WorkStarted)
        } else if method == self.end {
            Some(ProgressEvent::WorkFinished)
        } else {
            None
        }
    }
}

impl Default for NotificationMethods {
    fn default() -> Self {
        Self::for_namespace(DEFAULT_NAMESPACE)
    }
}

/// Register the begin/end handlers on `client`, both feeding `tracker`.
pub fn register_progress_handlers(
    client: &mut dyn MessageClient,
    methods: &NotificationMethods,
    tracker: &SharedTracker,
) {
    for (method, event) in [
        (methods.begin.as_str(), ProgressEvent::WorkStarted),
        (methods.end.as_str(), ProgressEvent::WorkFinished),
    ] {
        let tracker = SharedTracker::clone(tracker);
        debug!(method, "registering progress handler");
        client.on_notification(
            method,
            Box::new(move |_payload: Value| {
                lock_tracker(&tracker).handle(event);
            }),
        );
    }
}

/// Route an arbitrary notification to `tracker`.
///
/// For clients that deliver every notification to a single callback.
/// Unknown methods are ignored; returns whether the method was recognised.
pub fn route_notification(
    methods: &NotificationMethods,
    tracker: &SharedTracker,
    method: &str,
    _payload: Value,
) -> bool {
    match methods.classify(method) {
        Some(event) => {
            lock_tracker(tracker).handle(event);
            true
        }
        None => {
            debug!(method, "ignoring unrecognised notification");
            false
        }
    }
}
