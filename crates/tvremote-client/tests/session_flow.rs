//! End-to-end session behaviour against an in-memory gateway.
//!
//! The fake gateway holds a mutable status the test edits to play the part
//! of the TV, records every call, and answers with a little latency so that
//! overlapping requests would be visible.  All tests run on tokio's paused
//! clock, so the 2 s / 500 ms cadences are exact and the suite stays fast.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::sleep;

use tvremote_client::application::config::SessionConfig;
use tvremote_client::application::key_dispatch::InputFeedback;
use tvremote_client::application::pairing::PairingPhase;
use tvremote_client::{Gateway, RemoteError, RemoteSession};
use tvremote_core::{AppEntry, DeviceEvent, DeviceEventKind, KeyCode, StatusResponse};

const LATENCY: Duration = Duration::from_millis(20);

type EventResult = Result<Option<DeviceEvent>, RemoteError>;

struct FakeGateway {
    status: Mutex<StatusResponse>,
    status_calls: AtomicUsize,
    status_in_flight: AtomicBool,
    overlapping_polls: AtomicBool,
    calls: Mutex<Vec<String>>,
    events: tokio::sync::Mutex<mpsc::UnboundedReceiver<EventResult>>,
}

impl FakeGateway {
    fn new() -> (Arc<Self>, mpsc::UnboundedSender<EventResult>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let gateway = Arc::new(Self {
            status: Mutex::new(StatusResponse::default()),
            status_calls: AtomicUsize::new(0),
            status_in_flight: AtomicBool::new(false),
            overlapping_polls: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
            events: tokio::sync::Mutex::new(rx),
        });
        (gateway, tx)
    }

    fn set_status(&self, update: impl FnOnce(&mut StatusResponse)) {
        update(&mut self.status.lock().unwrap());
    }

    fn polls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn status(&self) -> Result<StatusResponse, RemoteError> {
        if self.status_in_flight.swap(true, Ordering::SeqCst) {
            self.overlapping_polls.store(true, Ordering::SeqCst);
        }
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        sleep(LATENCY).await;
        let status = self.status.lock().unwrap().clone();
        self.status_in_flight.store(false, Ordering::SeqCst);
        Ok(status)
    }

    async fn connect(&self) -> Result<(), RemoteError> {
        self.record("connect".into());
        self.set_status(|s| s.connecting = true);
        Ok(())
    }

    async fn send_key(&self, key: &KeyCode) -> Result<(), RemoteError> {
        sleep(LATENCY).await;
        self.record(format!("key:{key}"));
        Ok(())
    }

    async fn launch_app(&self, app_id: &str) -> Result<(), RemoteError> {
        self.record(format!("app:{app_id}"));
        Ok(())
    }

    async fn submit_pairing_code(&self, code: &str) -> Result<(), RemoteError> {
        sleep(LATENCY).await;
        self.record(format!("pair:{code}"));
        if code == "0000" {
            return Err(RemoteError::GatewayRejected {
                status: 400,
                message: "Pairing failed".into(),
            });
        }
        Ok(())
    }

    async fn send_text(&self, text: &str, enter: bool) -> Result<(), RemoteError> {
        sleep(LATENCY).await;
        self.record(format!("text:{text}:{enter}"));
        Ok(())
    }

    async fn next_event(&self) -> EventResult {
        match self.events.lock().await.recv().await {
            Some(result) => result,
            None => std::future::pending().await,
        }
    }
}

struct Silent;

impl InputFeedback for Silent {
    fn key_sent(&self, _key: &KeyCode) {}
}

fn start_session() -> (RemoteSession, Arc<FakeGateway>, mpsc::UnboundedSender<EventResult>) {
    let (gateway, events) = FakeGateway::new();
    let session = RemoteSession::new(
        Arc::clone(&gateway) as Arc<dyn Gateway>,
        SessionConfig::default(),
        Arc::new(Silent),
    );
    session.start();
    (session, gateway, events)
}

async fn connected_session() -> (RemoteSession, Arc<FakeGateway>, mpsc::UnboundedSender<EventResult>) {
    let (session, gateway, events) = start_session();
    gateway.set_status(|s| {
        s.connected = true;
        s.tv_name = "Living Room".into();
    });
    sleep(Duration::from_millis(2100)).await;
    assert!(session.snapshot().connected);
    (session, gateway, events)
}

#[tokio::test(start_paused = true)]
async fn test_connect_pair_and_settle() {
    // Arrange – idle, disconnected gateway
    let (session, gateway, _events) = start_session();
    sleep(Duration::from_millis(100)).await;
    assert_eq!(gateway.polls(), 1);

    // Act 1 – connect: polling speeds up immediately
    session.connect().await.unwrap();
    sleep(Duration::from_millis(1100)).await;
    assert!(gateway.polls() >= 3, "fast polling after connect, got {}", gateway.polls());

    // Act 2 – the TV asks for a pairing code
    gateway.set_status(|s| {
        s.connecting = false;
        s.pairing_in_progress = true;
    });
    sleep(Duration::from_millis(600)).await;
    assert_eq!(session.pairing_phase(), PairingPhase::CodeEntry { code: String::new() });

    // Act 3 – a too-short code never reaches the gateway
    let short = session.submit_pairing_code("12").await;
    assert!(matches!(short, Err(RemoteError::Validation(_))));
    assert!(!gateway.calls().iter().any(|c| c.starts_with("pair:")));

    // Act 4 – the right code is accepted; the prompt closes and stays closed
    session.submit_pairing_code("4821").await.unwrap();
    assert_eq!(session.pairing_phase(), PairingPhase::Idle);
    sleep(Duration::from_millis(1000)).await;
    assert_eq!(session.pairing_phase(), PairingPhase::Idle, "no reopen while handshake finishes");

    // Act 5 – the gateway finishes and reports the connection
    gateway.set_status(|s| {
        s.pairing_in_progress = false;
        s.connected = true;
        s.tv_name = "Living Room".into();
        s.apps = vec![AppEntry {
            name: "YouTube".into(),
            id: "https://www.youtube.com".into(),
            icon: None,
        }];
    });
    sleep(Duration::from_millis(600)).await;

    // Assert – connected, and back on the 2 s cadence
    let state = session.snapshot();
    assert!(state.connected);
    assert_eq!(state.device_name, "Living Room");
    assert_eq!(state.apps.len(), 1);

    let before = gateway.polls();
    sleep(Duration::from_millis(4000)).await;
    assert_eq!(gateway.polls() - before, 2);
    assert!(!gateway.overlapping_polls.load(Ordering::SeqCst));

    session.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_rejected_pairing_code_is_kept() {
    // Arrange
    let (session, gateway, _events) = start_session();
    gateway.set_status(|s| s.pairing_in_progress = true);
    sleep(Duration::from_millis(2100)).await;
    assert!(matches!(session.pairing_phase(), PairingPhase::CodeEntry { .. }));
    let mut notices = session.subscribe_notices();

    // Act
    let result = session.submit_pairing_code("0000").await;

    // Assert
    assert!(matches!(result, Err(RemoteError::GatewayRejected { status: 400, .. })));
    assert_eq!(session.pairing_phase(), PairingPhase::CodeEntry { code: "0000".into() });
    assert_eq!(notices.recv().await.unwrap().message, "Pairing failed");

    session.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_keyboard_event_seeds_text_sync() {
    // Arrange
    let (session, gateway, events) = connected_session().await;

    // Act – the TV focuses a search field that already holds "bre"
    events
        .send(Ok(Some(DeviceEvent {
            kind: DeviceEventKind::ImeShow,
            data: json!({ "text": "bre" }),
        })))
        .unwrap();
    sleep(Duration::from_millis(10)).await;
    session.edit_text("brea").await.unwrap();
    session.edit_text("break").await.unwrap();
    session.edit_text("brew").await.unwrap();

    // Assert – only the differences went over the wire
    assert_eq!(
        gateway.calls(),
        vec!["text:a:false", "text:k:false", "key:KEYCODE_DEL", "key:KEYCODE_DEL", "text:w:false"]
    );

    session.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_home_while_muted_remutes() {
    // Arrange
    let (session, gateway, _events) = connected_session().await;
    session.send_key(&KeyCode::from_alias("mute")).await.unwrap();

    // Act
    session.send_key(&KeyCode::from_alias("home")).await.unwrap();

    // Assert
    assert_eq!(
        gateway.calls(),
        vec!["key:KEYCODE_VOLUME_MUTE", "key:KEYCODE_HOME", "key:KEYCODE_VOLUME_MUTE"]
    );
    assert!(session.is_muted());

    session.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_gates_user_actions() {
    // Arrange
    let (session, gateway, _events) = connected_session().await;
    gateway.set_status(|s| s.connected = false);
    sleep(Duration::from_millis(2100)).await;

    // Act
    let result = session.launch_app("com.netflix.ninja").await;

    // Assert
    assert_eq!(result, Err(RemoteError::NotConnected));
    assert!(gateway.calls().is_empty());

    session.shutdown();
}
