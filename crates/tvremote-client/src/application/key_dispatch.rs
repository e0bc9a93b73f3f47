//! KeyDispatcher: sends key and app-launch commands to the TV.
//!
//! Most keys are passed through unmodified.  The one exception is a quirk of
//! the TV firmware: the home command also unmutes the TV.  The dispatcher
//! remembers whether it last toggled mute *on*, and after a home command
//! issued while muted it waits a short delay and toggles mute again so the
//! TV ends up muted as the user expects.
//!
//! The muted flag is the dispatcher's own belief.  It starts `false` and only
//! flips on mute toggles sent through this dispatcher; the gateway never
//! reports the TV's volume state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use tvremote_core::KeyCode;

use crate::application::gateway::{Gateway, RemoteError};
use crate::application::session::SessionStore;

/// Local acknowledgement of a key press (a bell, a haptic tick, ...).
pub trait InputFeedback: Send + Sync {
    fn key_sent(&self, key: &KeyCode);
}

/// Sends keys and app launches, gated on the session being connected.
pub struct KeyDispatcher {
    gateway: Arc<dyn Gateway>,
    session: Arc<SessionStore>,
    feedback: Arc<dyn InputFeedback>,
    compensation_delay: Duration,
    muted: AtomicBool,
}

impl KeyDispatcher {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        session: Arc<SessionStore>,
        feedback: Arc<dyn InputFeedback>,
        compensation_delay: Duration,
    ) -> Self {
        Self {
            gateway,
            session,
            feedback,
            compensation_delay,
            muted: AtomicBool::new(false),
        }
    }

    /// Current belief about the TV's mute state.
    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }

    /// Sends `key`, compensating the home-unmutes quirk.
    ///
    /// # Errors
    ///
    /// [`RemoteError::NotConnected`] without a request, or the gateway's error.
    /// A failed mute toggle does not flip the muted flag.
    pub async fn send(&self, key: &KeyCode) -> Result<(), RemoteError> {
        if !self.session.is_connected() {
            return Err(RemoteError::NotConnected);
        }

        self.gateway.send_key(key).await?;
        self.feedback.key_sent(key);

        if key.is_mute_toggle() {
            let now_muted = !self.muted.fetch_xor(true, Ordering::SeqCst);
            debug!(muted = now_muted, "mute toggled");
        } else if key.is_home() && self.is_muted() {
            tokio::time::sleep(self.compensation_delay).await;
            debug!("re-muting after home");
            self.gateway.send_key(&KeyCode::volume_mute()).await?;
        }
        Ok(())
    }

    /// Asks the gateway to launch `app_id` on the TV.
    pub async fn launch_app(&self, app_id: &str) -> Result<(), RemoteError> {
        if !self.session.is_connected() {
            return Err(RemoteError::NotConnected);
        }
        self.gateway.launch_app(app_id).await?;
        info!(app_id, "app launched");
        Ok(())
    }
}
