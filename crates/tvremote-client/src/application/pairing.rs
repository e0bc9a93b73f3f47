//! PairingCoordinator: the code-entry sub-flow of connecting to a new TV.
//!
//! # Pairing lifecycle (for beginners)
//!
//! The first time the gateway connects to a TV, the TV shows a short code on
//! screen and the gateway waits for the user to type it into the client:
//!
//! ```text
//!            poller sees                user submits         gateway accepts
//!         pairing_in_progress          (code len >= 4)
//!   Idle ───────────────────► CodeEntry ──────────────► Submitting ───────────► Idle
//!    ▲                            │  ▲                       │
//!    │        cancel              │  └───────────────────────┘
//!    └────────────────────────────┘       gateway rejects
//!                                      (code kept for editing)
//! ```
//!
//! The coordinator never polls on its own; the status poller tells it when
//! the gateway opened or closed its pairing window, and when the TV finally
//! connected.  The only thing it changes on the poller is the cadence:
//! fast while a submission is outstanding and afterwards until the
//! connection lands, base again after a rejection.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::application::gateway::{Gateway, RemoteError};
use crate::application::session::SessionStore;
use crate::application::status_poller::CadenceControl;

/// The code being entered, and whether it is currently being submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairingAttempt {
    pub code: String,
    pub submitting: bool,
}

/// Flow position as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingPhase {
    Idle,
    CodeEntry { code: String },
    Submitting { code: String },
}

/// Everything the coordinator tracks; published to subscribers on change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairingState {
    /// `Some` while the code-entry flow is open.
    pub attempt: Option<PairingAttempt>,
    /// Set once the gateway accepted a code and is finishing the handshake.
    /// While set, the gateway still reports `pairing_in_progress` and the
    /// flow must not reopen.
    pub awaiting_connection: bool,
}

impl PairingState {
    pub fn phase(&self) -> PairingPhase {
        match &self.attempt {
            None => PairingPhase::Idle,
            Some(a) if a.submitting => PairingPhase::Submitting { code: a.code.clone() },
            Some(a) => PairingPhase::CodeEntry { code: a.code.clone() },
        }
    }
}

/// Drives the pairing flow on top of the session state.
pub struct PairingCoordinator {
    gateway: Arc<dyn Gateway>,
    session: Arc<SessionStore>,
    cadence: CadenceControl,
    min_code_len: usize,
    state: watch::Sender<PairingState>,
}

impl PairingCoordinator {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        session: Arc<SessionStore>,
        cadence: CadenceControl,
        min_code_len: usize,
    ) -> Self {
        let (state, _rx) = watch::channel(PairingState::default());
        Self {
            gateway,
            session,
            cadence,
            min_code_len,
            state,
        }
    }

    pub fn phase(&self) -> PairingPhase {
        self.state.borrow().phase()
    }

    /// `true` while the code-entry flow is shown (entering or submitting).
    pub fn is_open(&self) -> bool {
        self.state.borrow().attempt.is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<PairingState> {
        self.state.subscribe()
    }

    // ── Poller-driven transitions ─────────────────────────────────────────────

    /// The gateway reports it is waiting for a code.
    ///
    /// Opens a fresh flow unless one is already open or an accepted code is
    /// still being completed by the gateway.
    pub fn on_pairing_requested(&self) {
        let opened = self.state.send_if_modified(|s| {
            if s.attempt.is_some() || s.awaiting_connection {
                return false;
            }
            s.attempt = Some(PairingAttempt::default());
            true
        });
        if opened {
            info!("TV is waiting for a pairing code");
        }
    }

    /// The gateway reports the TV is connected: close whatever is open.
    pub fn on_connected(&self) {
        let closed = self.state.send_if_modified(|s| {
            let changed = s.attempt.is_some() || s.awaiting_connection;
            s.attempt = None;
            s.awaiting_connection = false;
            changed
        });
        if closed {
            info!("pairing complete");
        }
    }

    /// The gateway is neither pairing nor connected: its pairing window closed.
    ///
    /// An open code-entry flow is closed.  A submission in flight is left to
    /// its own response.
    pub fn on_pairing_window_closed(&self) {
        let closed = self.state.send_if_modified(|s| {
            let mut changed = std::mem::take(&mut s.awaiting_connection);
            if s.attempt.as_ref().is_some_and(|a| !a.submitting) {
                s.attempt = None;
                changed = true;
            }
            changed
        });
        if closed {
            debug!("gateway pairing window closed");
        }
    }

    // ── User-driven transitions ───────────────────────────────────────────────

    /// Updates the code being typed.
    ///
    /// # Errors
    ///
    /// [`RemoteError::Validation`] when no code entry is open or a submission
    /// is in flight.
    pub fn set_code(&self, code: &str) -> Result<(), RemoteError> {
        let mut result = Ok(());
        self.state.send_if_modified(|s| match &mut s.attempt {
            Some(a) if !a.submitting => {
                a.code = code.to_string();
                true
            }
            Some(_) => {
                result = Err(RemoteError::validation("a pairing code is already being submitted"));
                false
            }
            None => {
                result = Err(RemoteError::validation("the TV is not waiting for a pairing code"));
                false
            }
        });
        result
    }

    /// Submits `code` to the gateway.
    ///
    /// # Errors
    ///
    /// - [`RemoteError::Validation`] if the code is shorter than the minimum,
    ///   no flow is open, or a submission is already in flight.  No request
    ///   is made.
    /// - The gateway's error if it rejects the code; the flow returns to code
    ///   entry with the code kept for correction.
    pub async fn submit(&self, code: &str) -> Result<(), RemoteError> {
        let code = code.trim().to_string();
        if code.chars().count() < self.min_code_len {
            return Err(RemoteError::validation(format!(
                "pairing code must be at least {} characters",
                self.min_code_len
            )));
        }

        let mut entered = Err(RemoteError::validation("the TV is not waiting for a pairing code"));
        self.state.send_if_modified(|s| match &mut s.attempt {
            Some(a) if !a.submitting => {
                a.code = code.clone();
                a.submitting = true;
                entered = Ok(());
                true
            }
            Some(_) => {
                entered = Err(RemoteError::validation("a pairing code is already being submitted"));
                false
            }
            None => false,
        });
        entered?;

        self.cadence.request_fast();
        info!("submitting pairing code");

        match self.gateway.submit_pairing_code(&code).await {
            Ok(()) => {
                self.state.send_modify(|s| {
                    if s.attempt.as_ref().is_some_and(|a| a.submitting) {
                        s.attempt = None;
                    }
                    s.awaiting_connection = true;
                });
                self.session.set_pairing_in_progress(false);
                info!("pairing code accepted; waiting for connection");
                Ok(())
            }
            Err(err) => {
                self.state.send_if_modified(|s| match &mut s.attempt {
                    Some(a) if a.submitting => {
                        a.submitting = false;
                        true
                    }
                    _ => false,
                });
                self.cadence.settle();
                Err(err)
            }
        }
    }

    /// Closes the flow and clears the code.
    ///
    /// Allowed from any phase.  If a submission is in flight its response
    /// no longer reopens the flow.
    pub fn cancel(&self) {
        self.state.send_if_modified(|s| s.attempt.take().is_some());
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::gateway::MockGateway;
    use crate::application::status_poller::PollCadence;
    use tokio_test::{assert_err, assert_ok};

    fn make(gateway: MockGateway) -> (PairingCoordinator, CadenceControl) {
        let cadence = CadenceControl::new();
        let coordinator = PairingCoordinator::new(
            Arc::new(gateway),
            Arc::new(SessionStore::new()),
            cadence.clone(),
            4,
        );
        (coordinator, cadence)
    }

    #[test]
    fn test_pairing_request_opens_code_entry() {
        // Arrange
        let (pairing, _) = make(MockGateway::new());

        // Act
        pairing.on_pairing_requested();

        // Assert
        assert_eq!(pairing.phase(), PairingPhase::CodeEntry { code: String::new() });
    }

    #[test]
    fn test_repeated_pairing_request_keeps_typed_code() {
        let (pairing, _) = make(MockGateway::new());
        pairing.on_pairing_requested();
        assert_ok!(pairing.set_code("12"));

        pairing.on_pairing_requested();

        assert_eq!(pairing.phase(), PairingPhase::CodeEntry { code: "12".into() });
    }

    #[tokio::test]
    async fn test_short_code_is_rejected_without_network_call() {
        // Arrange – the mock has no expectations, so any call would panic
        let mut gateway = MockGateway::new();
        gateway.expect_submit_pairing_code().times(0);
        let (pairing, cadence) = make(gateway);
        pairing.on_pairing_requested();

        // Act
        let result = pairing.submit("12a").await;

        // Assert
        assert!(matches!(result, Err(RemoteError::Validation(_))));
        assert_eq!(pairing.phase(), PairingPhase::CodeEntry { code: String::new() });
        assert_eq!(cadence.current(), PollCadence::Base);
    }

    #[tokio::test]
    async fn test_submit_without_open_flow_is_validation_error() {
        let mut gateway = MockGateway::new();
        gateway.expect_submit_pairing_code().times(0);
        let (pairing, _) = make(gateway);

        let err = assert_err!(pairing.submit("1234").await);

        assert!(matches!(err, RemoteError::Validation(_)));
    }

    #[tokio::test]
    async fn test_accepted_code_returns_to_idle_and_polls_fast() {
        // Arrange
        let mut gateway = MockGateway::new();
        gateway
            .expect_submit_pairing_code()
            .withf(|code: &str| code == "A1B2")
            .times(1)
            .returning(|_| Ok(()));
        let (pairing, cadence) = make(gateway);
        pairing.on_pairing_requested();

        // Act
        assert_ok!(pairing.submit(" A1B2 ").await);

        // Assert
        assert_eq!(pairing.phase(), PairingPhase::Idle);
        assert!(matches!(cadence.current(), PollCadence::Fast { .. }));
    }

    #[tokio::test]
    async fn test_rejected_code_is_kept_for_correction() {
        // Arrange
        let mut gateway = MockGateway::new();
        gateway.expect_submit_pairing_code().times(1).returning(|_| {
            Err(RemoteError::GatewayRejected {
                status: 400,
                message: "Not waiting for pairing code".into(),
            })
        });
        let (pairing, cadence) = make(gateway);
        pairing.on_pairing_requested();

        // Act
        let err = assert_err!(pairing.submit("9999").await);

        // Assert
        assert_eq!(err.to_string(), "Not waiting for pairing code");
        assert_eq!(pairing.phase(), PairingPhase::CodeEntry { code: "9999".into() });
        assert_eq!(cadence.current(), PollCadence::Base);
    }

    #[tokio::test]
    async fn test_accepted_code_suppresses_reopen_until_connected() {
        // Arrange
        let mut gateway = MockGateway::new();
        gateway.expect_submit_pairing_code().returning(|_| Ok(()));
        let (pairing, _) = make(gateway);
        pairing.on_pairing_requested();
        assert_ok!(pairing.submit("4821").await);

        // Act – gateway still finishing the handshake
        pairing.on_pairing_requested();

        // Assert
        assert_eq!(pairing.phase(), PairingPhase::Idle);

        // Once connected, a later pairing request opens a new flow again.
        pairing.on_connected();
        pairing.on_pairing_requested();
        assert!(pairing.is_open());
    }

    #[test]
    fn test_connected_closes_open_flow() {
        let (pairing, _) = make(MockGateway::new());
        pairing.on_pairing_requested();

        pairing.on_connected();

        assert_eq!(pairing.phase(), PairingPhase::Idle);
    }

    #[test]
    fn test_window_closed_closes_code_entry() {
        let (pairing, _) = make(MockGateway::new());
        pairing.on_pairing_requested();

        pairing.on_pairing_window_closed();

        assert!(!pairing.is_open());
    }

    #[test]
    fn test_cancel_clears_code() {
        // Arrange
        let (pairing, _) = make(MockGateway::new());
        pairing.on_pairing_requested();
        assert_ok!(pairing.set_code("55"));

        // Act
        pairing.cancel();
        pairing.on_pairing_requested();

        // Assert – reopened flow starts empty
        assert_eq!(pairing.phase(), PairingPhase::CodeEntry { code: String::new() });
    }

    #[test]
    fn test_set_code_requires_open_flow() {
        let (pairing, _) = make(MockGateway::new());
        assert!(matches!(pairing.set_code("1"), Err(RemoteError::Validation(_))));
    }

    #[tokio::test]
    async fn test_subscribers_observe_phase_changes() {
        let (pairing, _) = make(MockGateway::new());
        let mut rx = pairing.subscribe();

        pairing.on_pairing_requested();

        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().attempt.is_some());
    }
}
