//! Session snapshot: what the client currently believes about the TV.
//!
//! A [`SessionState`] is an immutable value.  Components never edit a shared
//! instance field by field; the status poller builds a new snapshot from each
//! gateway response and publishes it in one assignment, so readers can never
//! observe a half-updated state (e.g. `connected = true` with the previous
//! device's app list).

use serde::{Deserialize, Serialize};

use crate::protocol::messages::StatusResponse;

/// A launchable application advertised by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppEntry {
    /// Display name, e.g. `"YouTube"`.
    pub name: String,
    /// Launch identifier passed back in `launch_app` (an app link or package name).
    pub id: String,
    /// Icon path relative to the gateway, if the gateway serves one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Connection, pairing, and app-list status of the remote session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// `true` once the gateway holds a live remote-protocol connection to the TV.
    pub connected: bool,
    /// Human-readable TV name reported by the gateway.
    pub device_name: String,
    /// Launchable apps in gateway order.
    pub apps: Vec<AppEntry>,
    /// `true` while the gateway is waiting for a pairing code.
    pub pairing_in_progress: bool,
}

impl SessionState {
    /// Builds the snapshot that corresponds to a gateway status response.
    pub fn from_status(status: &StatusResponse) -> Self {
        Self {
            connected: status.connected,
            device_name: status.tv_name.clone(),
            apps: status.apps.clone(),
            pairing_in_progress: status.pairing_in_progress,
        }
    }

    /// Looks up an advertised app by its launch identifier.
    pub fn app(&self, id: &str) -> Option<&AppEntry> {
        self.apps.iter().find(|app| app.id == id)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
