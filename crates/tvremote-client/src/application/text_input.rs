//! TextInput: mirrors a local text field onto the TV's focused text field.
//!
//! Each local snapshot is diffed against the last transmitted one (see
//! [`tvremote_core::domain::text_diff`]) and the resulting operations are
//! sent as remote key presses (`KEYCODE_DEL`) and text insertions.
//!
//! # Ordering
//!
//! Every edit first takes its turn on a FIFO send lock, then records the
//! snapshot and advances the baseline before any network call.  Diffing and
//! transmission therefore happen in the same order: the operations of edit
//! *n* all reach the gateway before those of edit *n + 1*, and edit *n + 1*
//! is diffed against edit *n*, even when callers on different worker threads
//! fire edits without awaiting each one.
//!
//! A failed operation aborts the rest of that edit's sequence.  The baseline
//! is not rolled back: the next edit is diffed against what the user sees
//! locally, which is the best available guess at the TV's field.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use tvremote_core::{DeviceEvent, DeviceEventKind, KeyCode, TextEditState, TextOp};

use crate::application::event_stream::DeviceEventHandler;
use crate::application::gateway::{Gateway, RemoteError};
use crate::application::session::SessionStore;

/// Text-field mirror: turns local snapshots into remote delete/type calls.
///
/// Also a [`DeviceEventHandler`], so that the TV's keyboard events re-seed
/// the baseline.
pub struct TextInput {
    gateway: Arc<dyn Gateway>,
    session: Arc<SessionStore>,
    state: Mutex<TextEditState>,
    send_lock: tokio::sync::Mutex<()>,
}

impl TextInput {
    pub fn new(gateway: Arc<dyn Gateway>, session: Arc<SessionStore>) -> Self {
        Self {
            gateway,
            session,
            state: Mutex::new(TextEditState::new()),
            send_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// The local buffer as last recorded.
    pub fn current_text(&self) -> String {
        self.lock_state().current.clone()
    }

    /// Transmits the difference between the last sent text and `current`.
    ///
    /// # Errors
    ///
    /// [`RemoteError::NotConnected`] without recording anything, or the first
    /// gateway failure, which aborts the remaining operations of this edit.
    pub async fn on_edit(&self, current: &str) -> Result<(), RemoteError> {
        if !self.session.is_connected() {
            return Err(RemoteError::NotConnected);
        }

        let _turn = self.send_lock.lock().await;
        let ops = self.lock_state().record(current);
        for op in &ops {
            let sent = match op {
                TextOp::DeleteChar => self.gateway.send_key(&KeyCode::del()).await,
                TextOp::InsertText(text) => self.gateway.send_text(text, false).await,
            };
            if let Err(err) = sent {
                debug!(error = %err, "text edit aborted");
                return Err(err);
            }
        }
        Ok(())
    }

    /// Sends `text` in one request, optionally committing it with enter.
    ///
    /// On success the edit buffer is cleared; the remote field has been
    /// submitted and is no longer a diff baseline.
    pub async fn submit_all(&self, text: &str, commit: bool) -> Result<(), RemoteError> {
        if text.is_empty() {
            return Err(RemoteError::validation("nothing to send"));
        }
        if !self.session.is_connected() {
            return Err(RemoteError::NotConnected);
        }

        let _turn = self.send_lock.lock().await;
        self.gateway.send_text(text, commit).await?;
        self.lock_state().reset("");
        Ok(())
    }

    /// Re-seeds the baseline, e.g. when the TV focuses a pre-filled field.
    pub fn reset(&self, text: &str) {
        self.lock_state().reset(text);
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, TextEditState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DeviceEventHandler for TextInput {
    fn handle(&self, event: &DeviceEvent) {
        match event.kind {
            DeviceEventKind::ImeShow => {
                let text = event.data_str("text").unwrap_or_default();
                debug!(len = text.chars().count(), "TV text field focused");
                self.reset(text);
            }
            DeviceEventKind::ImeHide => self.reset(""),
            DeviceEventKind::Other(_) => {}
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
