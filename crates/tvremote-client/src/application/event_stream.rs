//! EventStream: long-polls the gateway for device-initiated events.
//!
//! While the TV is connected the loop keeps exactly one `GET api/events`
//! request outstanding.  The gateway holds each request until it has an
//! event or its own timeout fires; either way the loop immediately issues
//! the next one.  Events are handed to the registered
//! [`DeviceEventHandler`]s synchronously and in arrival order.
//!
//! Back-off rules:
//!
//! | Situation                    | Wait before the next request |
//! |------------------------------|------------------------------|
//! | event or empty response      | none (foreground)            |
//! | request failed, foreground   | `event_error_backoff`        |
//! | client in background         | `event_background_backoff`   |
//! | TV not connected             | no request; re-check every `event_park_interval` |
//!
//! Returning to the foreground cuts a background wait short.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;
use tracing::{debug, trace, Instrument, Span};

use tvremote_core::DeviceEvent;

use crate::application::config::SessionConfig;
use crate::application::gateway::Gateway;
use crate::application::session::SessionStore;
use crate::application::timer::CancellableTimer;

/// Receives device events from the [`EventStream`].
///
/// Called on the event loop task; implementations must not block.
pub trait DeviceEventHandler: Send + Sync {
    fn handle(&self, event: &DeviceEvent);
}

/// Long-poll loop for device events.
pub struct EventStream {
    gateway: Arc<dyn Gateway>,
    session: Arc<SessionStore>,
    config: SessionConfig,
    foreground: watch::Sender<bool>,
    handlers: RwLock<Vec<Arc<dyn DeviceEventHandler>>>,
    timer: CancellableTimer,
}

impl EventStream {
    pub fn new(gateway: Arc<dyn Gateway>, session: Arc<SessionStore>, config: SessionConfig) -> Self {
        let (foreground, _rx) = watch::channel(true);
        Self {
            gateway,
            session,
            config,
            foreground,
            handlers: RwLock::new(Vec::new()),
            timer: CancellableTimer::new("event-stream"),
        }
    }

    /// Adds a handler.  Handlers are called in registration order.
    pub fn register(&self, handler: Arc<dyn DeviceEventHandler>) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handler);
    }

    /// Tells the loop whether the client UI is visible.
    pub fn set_foreground(&self, foreground: bool) {
        self.foreground.send_if_modified(|current| {
            let changed = *current != foreground;
            *current = foreground;
            changed
        });
    }

    pub fn is_foreground(&self) -> bool {
        *self.foreground.borrow()
    }

    /// Starts (or restarts) the long-poll loop.
    pub fn start(self: &Arc<Self>) {
        let this = Arc::clone(self);
        let rx = self.foreground.subscribe();
        self.timer.arm(this.run(rx).instrument(Span::current()));
    }

    pub fn stop(&self) {
        self.timer.cancel();
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_armed()
    }

    fn dispatch(&self, event: &DeviceEvent) {
        trace!(kind = event.kind.as_wire(), "device event");
        let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
        for handler in handlers.iter() {
            handler.handle(event);
        }
    }

    async fn run(self: Arc<Self>, mut foreground_rx: watch::Receiver<bool>) {
        loop {
            if !self.session.is_connected() {
                time::sleep(self.config.event_park_interval).await;
                continue;
            }

            let foreground = *foreground_rx.borrow_and_update();
            let delay = match self.gateway.next_event().await {
                Ok(Some(event)) => {
                    self.dispatch(&event);
                    None
                }
                Ok(None) => None,
                Err(err) => {
                    debug!(error = %err, "event long-poll failed");
                    Some(self.config.event_error_backoff)
                }
            };
            let delay = self.next_delay(foreground, delay);

            if let Some(delay) = delay {
                tokio::select! {
                    _ = time::sleep(delay) => {}
                    changed = foreground_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
        }
    }

    /// A background client always waits the long back-off.
    fn next_delay(&self, foreground: bool, delay: Option<Duration>) -> Option<Duration> {
        if foreground {
            delay
        } else {
            Some(self.config.event_background_backoff)
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::gateway::RemoteError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::mpsc;
    use tvremote_core::{DeviceEventKind, KeyCode, StatusResponse};

    type EventResult = Result<Option<DeviceEvent>, RemoteError>;

    /// Gateway whose long-poll blocks until the test pushes a response, or
    /// fails every request after a short delay when `unreachable` is set.
    struct ScriptedEvents {
        rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<EventResult>>,
        calls: AtomicUsize,
        unreachable: bool,
        in_flight: AtomicBool,
        overlapped: AtomicBool,
    }

    #[async_trait]
    impl Gateway for ScriptedEvents {
        async fn status(&self) -> Result<StatusResponse, RemoteError> {
            Ok(StatusResponse::default())
        }
        async fn connect(&self) -> Result<(), RemoteError> {
            Ok(())
        }
        async fn send_key(&self, _key: &KeyCode) -> Result<(), RemoteError> {
            Ok(())
        }
        async fn launch_app(&self, _app_id: &str) -> Result<(), RemoteError> {
            Ok(())
        }
        async fn submit_pairing_code(&self, _code: &str) -> Result<(), RemoteError> {
            Ok(())
        }
        async fn send_text(&self, _text: &str, _enter: bool) -> Result<(), RemoteError> {
            Ok(())
        }
        async fn next_event(&self) -> EventResult {
            if self.in_flight.swap(true, Ordering::SeqCst) {
                self.overlapped.store(true, Ordering::SeqCst);
            }
            self.calls.fetch_add(1, Ordering::SeqCst);
            let result = if self.unreachable {
                time::sleep(Duration::from_millis(20)).await;
                Err(RemoteError::Transport("connection refused".into()))
            } else {
                match self.rx.lock().await.recv().await {
                    Some(result) => result,
                    None => std::future::pending().await,
                }
            };
            self.in_flight.store(false, Ordering::SeqCst);
            result
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<DeviceEventKind>>);

    impl DeviceEventHandler for Recorder {
        fn handle(&self, event: &DeviceEvent) {
            self.0.lock().unwrap().push(event.kind.clone());
        }
    }

    struct Harness {
        stream: Arc<EventStream>,
        session: Arc<SessionStore>,
        gateway: Arc<ScriptedEvents>,
        push: mpsc::UnboundedSender<EventResult>,
        recorder: Arc<Recorder>,
    }

    fn harness(connected: bool) -> Harness {
        scripted_harness(connected, false)
    }

    fn scripted_harness(connected: bool, unreachable: bool) -> Harness {
        let (push, rx) = mpsc::unbounded_channel();
        let gateway = Arc::new(ScriptedEvents {
            rx: tokio::sync::Mutex::new(rx),
            calls: AtomicUsize::new(0),
            unreachable,
            in_flight: AtomicBool::new(false),
            overlapped: AtomicBool::new(false),
        });
        let session = Arc::new(SessionStore::new());
        session.apply_status(&StatusResponse {
            connected,
            ..Default::default()
        });
        let stream = Arc::new(EventStream::new(
            Arc::clone(&gateway) as Arc<dyn Gateway>,
            Arc::clone(&session),
            SessionConfig::default(),
        ));
        let recorder = Arc::new(Recorder::default());
        stream.register(Arc::clone(&recorder) as Arc<dyn DeviceEventHandler>);
        Harness {
            stream,
            session,
            gateway,
            push,
            recorder,
        }
    }

    fn event(kind: &str) -> DeviceEvent {
        DeviceEvent {
            kind: DeviceEventKind::from_wire(kind),
            data: json!({}),
        }
    }

    fn calls(h: &Harness) -> usize {
        h.gateway.calls.load(Ordering::SeqCst)
    }

    fn overlapped(h: &Harness) -> bool {
        h.gateway.overlapped.load(Ordering::SeqCst)
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_dispatched_in_arrival_order() {
        // Arrange
        let h = harness(true);
        h.stream.start();

        // Act
        h.push.send(Ok(Some(event("IME_SHOW")))).unwrap();
        h.push.send(Ok(None)).unwrap();
        h.push.send(Ok(Some(event("IME_HIDE")))).unwrap();
        time::sleep(Duration::from_millis(10)).await;

        // Assert
        assert_eq!(
            *h.recorder.0.lock().unwrap(),
            vec![DeviceEventKind::ImeShow, DeviceEventKind::ImeHide]
        );
        // Three answered requests plus the one now outstanding.
        assert_eq!(calls(&h), 4);
        assert!(!overlapped(&h));
        h.stream.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_requests_while_disconnected() {
        // Arrange
        let h = harness(false);

        // Act
        h.stream.start();
        time::sleep(Duration::from_secs(5)).await;

        // Assert
        assert_eq!(calls(&h), 0);

        // Once connected, the loop picks up within one park interval.
        h.session.apply_status(&StatusResponse {
            connected: true,
            ..Default::default()
        });
        time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(calls(&h), 1);
        h.stream.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_backs_off_before_retrying() {
        // Arrange
        let h = harness(true);
        h.stream.start();

        // Act
        h.push
            .send(Err(RemoteError::Transport("connection reset".into())))
            .unwrap();
        time::sleep(Duration::from_millis(1000)).await;

        // Assert – still inside the 2 s back-off
        assert_eq!(calls(&h), 1);
        time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(calls(&h), 2);
        assert!(h.recorder.0.lock().unwrap().is_empty());
        h.stream.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_survives_unreachable_gateway() {
        // Arrange – every long-poll fails after 20 ms
        let h = scripted_harness(true, true);
        let backoff = SessionConfig::default().event_error_backoff;

        // Act
        h.stream.start();
        time::sleep(Duration::from_secs(60)).await;

        // Assert – one request per back-off period, never two at once
        assert!(h.stream.is_running());
        let expected = (Duration::from_secs(60).as_millis() / backoff.as_millis()) as usize;
        let made = calls(&h);
        assert!(
            (expected - 1..=expected + 1).contains(&made),
            "expected about {expected} requests, got {made}"
        );
        assert!(!overlapped(&h));
        assert!(h.recorder.0.lock().unwrap().is_empty());
        h.stream.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_slows_polling_and_foreground_resumes() {
        // Arrange
        let h = harness(true);
        h.stream.set_foreground(false);
        h.stream.start();

        // Act – one event, then the loop must wait the background back-off
        h.push.send(Ok(Some(event("IME_SHOW")))).unwrap();
        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(calls(&h), 1);

        h.stream.set_foreground(true);
        time::sleep(Duration::from_millis(10)).await;

        // Assert
        assert_eq!(calls(&h), 2);
        assert!(!overlapped(&h));
        h.stream.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_ends_loop() {
        let h = harness(true);
        h.stream.start();
        time::sleep(Duration::from_millis(10)).await;
        assert!(h.stream.is_running());

        h.stream.stop();
        time::sleep(Duration::from_millis(10)).await;

        assert!(!h.stream.is_running());
    }
}
