//! Process-wide session state with publish/subscribe.
//!
//! [`SessionStore`] wraps a `tokio::sync::watch` channel holding the current
//! [`SessionState`].  Writers replace the whole snapshot in one step; readers
//! either take a cheap clone ([`SessionStore::snapshot`]) or subscribe and get
//! woken on every change.
//!
//! Only two components write: the status poller (from gateway responses) and
//! the pairing coordinator (optimistic `pairing_in_progress` updates).

use tokio::sync::watch;

use tvremote_core::{SessionState, StatusResponse};

/// Shared owner of the current [`SessionState`].
pub struct SessionStore {
    tx: watch::Sender<SessionState>,
}

impl SessionStore {
    /// Creates a store holding the initial, disconnected state.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionState::default());
        Self { tx }
    }

    /// Returns a clone of the current snapshot.
    pub fn snapshot(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    /// `true` if the TV is currently connected.  Gate for every user action.
    pub fn is_connected(&self) -> bool {
        self.tx.borrow().connected
    }

    /// Subscribes to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    /// Replaces the snapshot with the one described by `status`.
    ///
    /// Subscribers are only notified if something actually changed.  Returns
    /// `true` in that case.
    pub fn apply_status(&self, status: &StatusResponse) -> bool {
        let next = SessionState::from_status(status);
        self.tx.send_if_modified(|state| {
            if *state == next {
                false
            } else {
                *state = next;
                true
            }
        })
    }

    /// Optimistically overrides the pairing flag until the next status poll.
    pub fn set_pairing_in_progress(&self, in_progress: bool) {
        self.tx.send_if_modified(|state| {
            let changed = state.pairing_in_progress != in_progress;
            state.pairing_in_progress = in_progress;
            changed
        });
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
