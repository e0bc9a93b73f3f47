//! RemoteSession: the one object a front end talks to.
//!
//! Owns every component of the session core, wires them together, and
//! exposes user actions plus subscriptions.  Construction does no I/O;
//! [`RemoteSession::start`] launches the background loops and
//! [`RemoteSession::shutdown`] stops them.
//!
//! Every user action follows the same pattern: run it, and on failure both
//! publish a [`Notice`] and return the error, so a console front end can
//! print it while a richer UI shows a toast.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tracing::{info, info_span, Span};
use uuid::Uuid;

use tvremote_core::{KeyCode, SessionState};

use crate::application::config::SessionConfig;
use crate::application::event_stream::{DeviceEventHandler, EventStream};
use crate::application::gateway::{Gateway, RemoteError};
use crate::application::key_dispatch::{InputFeedback, KeyDispatcher};
use crate::application::notice::{Notice, NoticeBoard};
use crate::application::pairing::{PairingCoordinator, PairingPhase, PairingState};
use crate::application::session::SessionStore;
use crate::application::status_poller::{CadenceControl, StatusPoller};
use crate::application::text_input::TextInput;

pub struct RemoteSession {
    id: Uuid,
    span: Span,
    gateway: Arc<dyn Gateway>,
    session: Arc<SessionStore>,
    cadence: CadenceControl,
    poller: Arc<StatusPoller>,
    pairing: Arc<PairingCoordinator>,
    events: Arc<EventStream>,
    keys: KeyDispatcher,
    text: Arc<TextInput>,
    notices: NoticeBoard,
}

impl RemoteSession {
    /// Builds a session around `gateway`.  Nothing runs until [`start`](Self::start).
    pub fn new(gateway: Arc<dyn Gateway>, config: SessionConfig, feedback: Arc<dyn InputFeedback>) -> Self {
        let id = Uuid::new_v4();
        let span = info_span!("session", id = %id);
        let session = Arc::new(SessionStore::new());
        let cadence = CadenceControl::new();

        let pairing = Arc::new(PairingCoordinator::new(
            Arc::clone(&gateway),
            Arc::clone(&session),
            cadence.clone(),
            config.min_pairing_code_len,
        ));
        let poller = Arc::new(StatusPoller::new(
            Arc::clone(&gateway),
            Arc::clone(&session),
            Arc::clone(&pairing),
            cadence.clone(),
            config.clone(),
        ));
        let events = Arc::new(EventStream::new(
            Arc::clone(&gateway),
            Arc::clone(&session),
            config.clone(),
        ));
        let text = Arc::new(TextInput::new(Arc::clone(&gateway), Arc::clone(&session)));
        events.register(Arc::clone(&text) as Arc<dyn DeviceEventHandler>);
        let keys = KeyDispatcher::new(
            Arc::clone(&gateway),
            Arc::clone(&session),
            feedback,
            config.mute_compensation_delay,
        );
        let notices = NoticeBoard::new(config.notice_lifetime);

        Self {
            id,
            span,
            gateway,
            session,
            cadence,
            poller,
            pairing,
            events,
            keys,
            text,
            notices,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Starts status polling and the event long-poll loop.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) {
        let _entered = self.span.enter();
        info!("session started");
        self.poller.start();
        self.events.start();
    }

    /// Stops every background loop.  The session can be started again.
    pub fn shutdown(&self) {
        let _entered = self.span.enter();
        self.poller.stop();
        self.events.stop();
        info!("session stopped");
    }

    // ── State ─────────────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> SessionState {
        self.session.snapshot()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.session.subscribe()
    }

    pub fn pairing_phase(&self) -> PairingPhase {
        self.pairing.phase()
    }

    pub fn subscribe_pairing(&self) -> watch::Receiver<PairingState> {
        self.pairing.subscribe()
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    /// Adds a device event handler next to the built-in text input handler.
    pub fn register_event_handler(&self, handler: Arc<dyn DeviceEventHandler>) {
        self.events.register(handler);
    }

    /// Foreground/background signal from the hosting UI.
    pub fn set_foreground(&self, foreground: bool) {
        self.events.set_foreground(foreground);
    }

    pub fn is_muted(&self) -> bool {
        self.keys.is_muted()
    }

    // ── User actions ──────────────────────────────────────────────────────────

    /// Asks the gateway to connect and polls fast until it does.
    pub async fn connect(&self) -> Result<(), RemoteError> {
        let result = self.gateway.connect().await;
        if result.is_ok() {
            info!(parent: &self.span, "connect requested");
            self.cadence.request_fast();
        }
        self.report(result)
    }

    pub async fn send_key(&self, key: &KeyCode) -> Result<(), RemoteError> {
        let result = self.keys.send(key).await;
        self.report(result)
    }

    pub async fn launch_app(&self, app_id: &str) -> Result<(), RemoteError> {
        let result = self.keys.launch_app(app_id).await;
        self.report(result)
    }

    /// Mirrors the full local buffer `current` onto the TV's text field.
    pub async fn edit_text(&self, current: &str) -> Result<(), RemoteError> {
        let result = self.text.on_edit(current).await;
        self.report(result)
    }

    /// Sends `text` in one request, pressing enter afterwards if `commit`.
    pub async fn submit_text(&self, text: &str, commit: bool) -> Result<(), RemoteError> {
        let result = self.text.submit_all(text, commit).await;
        self.report(result)
    }

    pub fn set_pairing_code(&self, code: &str) -> Result<(), RemoteError> {
        let result = self.pairing.set_code(code);
        self.report(result)
    }

    pub async fn submit_pairing_code(&self, code: &str) -> Result<(), RemoteError> {
        let result = self.pairing.submit(code).await;
        if result.is_ok() {
            self.notices.info("pairing code accepted");
        }
        self.report(result)
    }

    pub fn cancel_pairing(&self) {
        self.pairing.cancel();
    }

    fn report(&self, result: Result<(), RemoteError>) -> Result<(), RemoteError> {
        if let Err(err) = &result {
            let _entered = self.span.enter();
            self.notices.error(err);
        }
        result
    }
}

impl Drop for RemoteSession {
    fn drop(&mut self) {
        self.poller.stop();
        self.events.stop();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
