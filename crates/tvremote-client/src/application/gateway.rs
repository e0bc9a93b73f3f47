//! The gateway port: everything the session core needs from the outside world.
//!
//! The application layer talks to the TV only through the [`Gateway`] trait.
//! The infrastructure layer provides the HTTP implementation; tests provide
//! in-memory fakes and `mockall` mocks.

use async_trait::async_trait;
use thiserror::Error;

use tvremote_core::{DeviceEvent, KeyCode, StatusResponse};

/// Every failure the session core can report.
///
/// | Variant           | Origin                                  | Surfaced?        |
/// |-------------------|-----------------------------------------|------------------|
/// | `Validation`      | local precondition, no network call     | yes, immediately |
/// | `NotConnected`    | user action while disconnected          | yes, immediately |
/// | `GatewayRejected` | non-2xx response                        | user actions only|
/// | `Transport`       | no response obtained                    | user actions only|
///
/// Background loops (status poll, event long-poll) swallow the last two and
/// retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// A local precondition failed (e.g. a pairing code that is too short).
    #[error("{0}")]
    Validation(String),

    /// A user action was attempted while the TV is not connected.
    #[error("not connected to the TV")]
    NotConnected,

    /// The gateway answered with a non-2xx status.
    #[error("{message}")]
    GatewayRejected { status: u16, message: String },

    /// The request failed before a response was obtained.
    #[error("gateway unreachable: {0}")]
    Transport(String),
}

impl RemoteError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Client side of the gateway HTTP contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Gateway: Send + Sync {
    /// `GET api/status`.
    async fn status(&self) -> Result<StatusResponse, RemoteError>;

    /// `POST api/connect`: asks the gateway to (re)connect to the TV.
    async fn connect(&self) -> Result<(), RemoteError>;

    /// `POST api/send_key`.
    async fn send_key(&self, key: &KeyCode) -> Result<(), RemoteError>;

    /// `POST api/launch_app`.
    async fn launch_app(&self, app_id: &str) -> Result<(), RemoteError>;

    /// `POST api/pairing_code`.
    async fn submit_pairing_code(&self, code: &str) -> Result<(), RemoteError>;

    /// `POST api/send_text`, optionally followed by enter on the gateway side.
    async fn send_text(&self, text: &str, enter: bool) -> Result<(), RemoteError>;

    /// `GET api/events` long-poll.
    ///
    /// Returns `Ok(None)` when the gateway held the request until its timeout
    /// without an event to deliver.
    async fn next_event(&self) -> Result<Option<DeviceEvent>, RemoteError>;
}
