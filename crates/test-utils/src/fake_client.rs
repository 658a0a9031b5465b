use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use analysis_controller::errors::ClientError;
use analysis_controller::messaging::{ClientOptions, MessageClient, NotificationHandler, StartFuture};
use analysis_controller::supervisor::Channel;

#[derive(Default)]
struct FakeClientState {
    handlers: HashMap<String, NotificationHandler>,
    started: bool,
    stop_calls: usize,
    options: Option<ClientOptions>,
    channel: Option<Channel>,
}

/// A fake message client that:
/// - stores registered notification handlers
/// - accepts (or refuses) the channel on `start`
/// - lets tests deliver notifications through a [`FakeClientProbe`].
pub struct FakeClient {
    state: Arc<Mutex<FakeClientState>>,
    refuse_start: bool,
}

/// Test-side view of a [`FakeClient`] that has been moved into the
/// controller.
#[derive(Clone)]
pub struct FakeClientProbe {
    state: Arc<Mutex<FakeClientState>>,
}

impl FakeClient {
    pub fn new() -> (Self, FakeClientProbe) {
        Self::build(false)
    }

    /// A client whose handshake always fails.
    pub fn refusing() -> (Self, FakeClientProbe) {
        Self::build(true)
    }

    fn build(refuse_start: bool) -> (Self, FakeClientProbe) {
        let state = Arc::new(Mutex::new(FakeClientState::default()));
        let probe = FakeClientProbe {
            state: Arc::clone(&state),
        };
        (
            Self {
                state,
                refuse_start,
            },
            probe,
        )
    }
}

impl MessageClient for FakeClient {
    fn on_notification(&mut self, method: &str, handler: NotificationHandler) {
        self.state
            .lock()
            .unwrap()
            .handlers
            .insert(method.to_string(), handler);
    }

    fn start(&mut self, channel: Channel, options: ClientOptions) -> StartFuture<'_> {
        let state = Arc::clone(&self.state);
        let refuse = self.refuse_start;

        Box::pin(async move {
            if refuse {
                return Err(ClientError::Start("fake handshake refused".to_string()));
            }
            let mut guard = state.lock().unwrap();
            if guard.started {
                return Err(ClientError::AlreadyStarted);
            }
            guard.started = true;
            guard.options = Some(options);
            guard.channel = Some(channel);
            Ok(())
        })
    }

    fn stop(&mut self) {
        let mut guard = self.state.lock().unwrap();
        guard.stop_calls += 1;
        guard.channel = None;
    }
}

impl FakeClientProbe {
    /// Deliver a notification; returns `false` if no handler is registered
    /// for `method`.
    pub fn notify(&self, method: &str) -> bool {
        self.notify_with(method, Value::Null)
    }

    pub fn notify_with(&self, method: &str, payload: Value) -> bool {
        let guard = self.state.lock().unwrap();
        match guard.handlers.get(method) {
            Some(handler) => {
                handler(payload);
                true
            }
            None => false,
        }
    }

    /// Registered methods, sorted.
    pub fn methods(&self) -> Vec<String> {
        let mut methods: Vec<String> = self.state.lock().unwrap().handlers.keys().cloned().collect();
        methods.sort();
        methods
    }

    pub fn is_started(&self) -> bool {
        self.state.lock().unwrap().started
    }

    pub fn stop_calls(&self) -> usize {
        self.state.lock().unwrap().stop_calls
    }

    pub fn options(&self) -> Option<ClientOptions> {
        self.state.lock().unwrap().options.clone()
    }

    pub fn has_channel(&self) -> bool {
        self.state.lock().unwrap().channel.is_some()
    }

    /// Take the channel the controller handed over.
    pub fn take_channel(&self) -> Option<Channel> {
        self.state.lock().unwrap().channel.take()
    }
}
