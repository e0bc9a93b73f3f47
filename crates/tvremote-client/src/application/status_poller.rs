//! StatusPoller: keeps the session state in step with the gateway.
//!
//! The gateway offers no push channel for connection status, so the client
//! asks `GET api/status` on a timer.  Two cadences exist:
//!
//! - **Base** (2 s) while nothing is happening.
//! - **Fast** (500 ms) while a connect or pairing submission is outstanding,
//!   so the UI flips to "connected" promptly.
//!
//! # Cadence switching
//!
//! [`CadenceControl`] is a `watch` channel shared with whoever starts an
//! action (the session facade for connect, the pairing coordinator for code
//! submission).  The poll loop sleeps on *either* its interval *or* a cadence
//! change; a change drops the pending sleep and polls immediately.  There is
//! therefore exactly one pending poll timer at any time, and one poll in
//! flight at most, because polls run inline in the single loop task.
//!
//! A fast phase ends (back to base) when the gateway reports `connected`,
//! when the attempt was visibly aborted (the gateway reported `connecting`
//! or `pairing_in_progress` during the phase and now reports neither), or
//! after [`SessionConfig::fast_phase_limit`].
//!
//! Poll failures leave the session state untouched and are logged at debug
//! level only: an absent status is not a fault.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, Instant};
use tracing::{debug, info, Instrument, Span};

use tvremote_core::StatusResponse;

use crate::application::config::SessionConfig;
use crate::application::gateway::Gateway;
use crate::application::pairing::PairingCoordinator;
use crate::application::session::SessionStore;
use crate::application::timer::CancellableTimer;

/// Poll cadence requested of the poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollCadence {
    Base,
    /// `since` identifies the phase; re-requesting fast starts a new phase.
    Fast { since: Instant },
}

/// Shared handle for switching the poller's cadence.
#[derive(Clone)]
pub struct CadenceControl {
    tx: Arc<watch::Sender<PollCadence>>,
}

impl CadenceControl {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(PollCadence::Base);
        Self { tx: Arc::new(tx) }
    }

    /// Starts a new fast phase.  Always wakes the poller.
    pub fn request_fast(&self) {
        self.tx.send_replace(PollCadence::Fast { since: Instant::now() });
    }

    /// Returns to the base cadence if a fast phase is running.
    pub fn settle(&self) {
        self.tx.send_if_modified(|cadence| {
            if matches!(cadence, PollCadence::Fast { .. }) {
                *cadence = PollCadence::Base;
                true
            } else {
                false
            }
        });
    }

    pub fn current(&self) -> PollCadence {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<PollCadence> {
        self.tx.subscribe()
    }
}

impl Default for CadenceControl {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks one fast phase to decide when it is over.
#[derive(Debug, Default)]
struct FastPhase {
    since: Option<Instant>,
    progress_seen: bool,
}

impl FastPhase {
    /// Feeds one poll outcome observed during the phase started at `since`.
    /// A failed poll (`None`) only counts toward the time limit.
    /// Returns `true` once the phase has reached a terminal state.
    fn observe(&mut self, since: Instant, status: Option<&StatusResponse>, limit: Duration) -> bool {
        if self.since != Some(since) {
            self.since = Some(since);
            self.progress_seen = false;
        }
        let finished = status.is_some_and(|status| {
            let in_progress = status.connecting || status.pairing_in_progress;
            let aborted = self.progress_seen && !in_progress && !status.connected;
            self.progress_seen |= in_progress;
            status.connected || aborted
        });
        finished || since.elapsed() >= limit
    }
}

/// Periodically refreshes [`SessionStore`] from the gateway.
pub struct StatusPoller {
    gateway: Arc<dyn Gateway>,
    session: Arc<SessionStore>,
    pairing: Arc<PairingCoordinator>,
    cadence: CadenceControl,
    config: SessionConfig,
    timer: CancellableTimer,
}

impl StatusPoller {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        session: Arc<SessionStore>,
        pairing: Arc<PairingCoordinator>,
        cadence: CadenceControl,
        config: SessionConfig,
    ) -> Self {
        Self {
            gateway,
            session,
            pairing,
            cadence,
            config,
            timer: CancellableTimer::new("status-poll"),
        }
    }

    /// Starts (or restarts) the poll loop.  The first poll happens immediately.
    pub fn start(self: &Arc<Self>) {
        let this = Arc::clone(self);
        let rx = self.cadence.subscribe();
        self.timer.arm(this.run(rx).instrument(Span::current()));
    }

    /// Stops the poll loop.
    pub fn stop(&self) {
        self.timer.cancel();
    }

    /// `true` while the poll loop is running.
    pub fn is_running(&self) -> bool {
        self.timer.is_armed()
    }

    /// Polls once and applies the result.  Returns the status on success.
    ///
    /// Only the loop task calls this, which keeps one poll in flight.
    pub(crate) async fn poll(&self) -> Option<StatusResponse> {
        let status = match self.gateway.status().await {
            Ok(status) => status,
            Err(err) => {
                debug!(error = %err, "status poll failed");
                return None;
            }
        };

        let was_connected = self.session.is_connected();
        if self.session.apply_status(&status) && status.connected != was_connected {
            info!(connected = status.connected, tv = %status.tv_name, "connection status changed");
        }

        if status.connected {
            self.pairing.on_connected();
        } else if status.pairing_in_progress {
            self.pairing.on_pairing_requested();
        } else if !status.connecting {
            self.pairing.on_pairing_window_closed();
        }

        Some(status)
    }

    fn period(&self, cadence: PollCadence) -> Duration {
        match cadence {
            PollCadence::Base => self.config.base_poll_interval,
            PollCadence::Fast { .. } => self.config.fast_poll_interval,
        }
    }

    async fn run(self: Arc<Self>, mut cadence_rx: watch::Receiver<PollCadence>) {
        let mut phase = FastPhase::default();
        loop {
            let cadence = *cadence_rx.borrow_and_update();
            let status = self.poll().await;
            if let PollCadence::Fast { since } = cadence {
                if phase.observe(since, status.as_ref(), self.config.fast_phase_limit)
                    && *cadence_rx.borrow() == cadence
                {
                    debug!("fast polling phase over");
                    self.cadence.settle();
                    cadence_rx.borrow_and_update();
                }
            }

            let period = self.period(*cadence_rx.borrow());
            tokio::select! {
                _ = time::sleep(period) => {}
                changed = cadence_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
