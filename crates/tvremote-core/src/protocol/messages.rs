//! Request and response bodies of the gateway HTTP API.
//!
//! | Call           | Method | Path              | Body                   |
//! |----------------|--------|-------------------|------------------------|
//! | status         | GET    | `api/status`      | –                      |
//! | connect        | POST   | `api/connect`     | –                      |
//! | send_key       | POST   | `api/send_key`    | [`SendKeyRequest`]     |
//! | launch_app     | POST   | `api/launch_app`  | [`LaunchAppRequest`]   |
//! | pairing_code   | POST   | `api/pairing_code`| [`PairingCodeRequest`] |
//! | send_text      | POST   | `api/send_text`   | [`SendTextRequest`]    |
//! | events         | GET    | `api/events`      | – (long-poll)          |
//!
//! Every non-2xx response carries an [`ErrorResponse`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::session::AppEntry;
use crate::keymap::KeyCode;

/// Route paths, relative to the gateway base URL.
pub mod routes {
    pub const STATUS: &str = "api/status";
    pub const CONNECT: &str = "api/connect";
    pub const SEND_KEY: &str = "api/send_key";
    pub const LAUNCH_APP: &str = "api/launch_app";
    pub const PAIRING_CODE: &str = "api/pairing_code";
    pub const SEND_TEXT: &str = "api/send_text";
    pub const EVENTS: &str = "api/events";
}

/// `GET api/status` response.
///
/// Every field has a default so an older or partial gateway response still
/// parses; a missing `connected` reads as disconnected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub connected: bool,
    #[serde(default = "default_tv_name")]
    pub tv_name: String,
    #[serde(default)]
    pub apps: Vec<AppEntry>,
    #[serde(default)]
    pub pairing_in_progress: bool,
    /// `true` while the gateway is opening its device connection.
    #[serde(default)]
    pub connecting: bool,
}

fn default_tv_name() -> String {
    "Android TV".to_string()
}

/// `POST api/send_key` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendKeyRequest {
    pub key: KeyCode,
}

/// `POST api/launch_app` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchAppRequest {
    pub app_id: String,
}

/// `POST api/pairing_code` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingCodeRequest {
    pub code: String,
}

/// `POST api/send_text` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendTextRequest {
    pub text: String,
    /// Ask the gateway to press enter after the text has been typed.
    #[serde(default, skip_serializing_if = "is_false")]
    pub enter: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Body of any non-2xx gateway response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// One event from `GET api/events`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceEventMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
