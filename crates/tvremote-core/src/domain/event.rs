//! Device-initiated UI events.
//!
//! The TV occasionally tells the client something the client did not ask
//! for, most importantly "a text field has focus, show the keyboard"
//! (`IME_SHOW`).  The gateway queues these and hands them out one per
//! long-poll response.

use serde_json::Value;

use crate::protocol::messages::DeviceEventMessage;

/// Kind of a [`DeviceEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeviceEventKind {
    /// The TV focused a text field; the client should show its text entry surface.
    ImeShow,
    /// The TV dismissed its on-screen keyboard.
    ImeHide,
    /// Any event type this client does not interpret.  Handlers may still inspect it.
    Other(String),
}

impl DeviceEventKind {
    /// Maps the gateway's `type` string to a kind.
    pub fn from_wire(kind: &str) -> Self {
        match kind {
            "IME_SHOW" => Self::ImeShow,
            "IME_HIDE" => Self::ImeHide,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the gateway's `type` string for this kind.
    pub fn as_wire(&self) -> &str {
        match self {
            Self::ImeShow => "IME_SHOW",
            Self::ImeHide => "IME_HIDE",
            Self::Other(kind) => kind,
        }
    }
}

/// One event pushed by the TV.  Consumed once; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceEvent {
    pub kind: DeviceEventKind,
    /// Opaque payload; its shape depends on `kind`.
    pub data: Value,
}

impl DeviceEvent {
    /// Convenience accessor for a string field of the payload.
    pub fn data_str(&self, field: &str) -> Option<&str> {
        self.data.get(field).and_then(Value::as_str)
    }
}

impl From<DeviceEventMessage> for DeviceEvent {
    fn from(msg: DeviceEventMessage) -> Self {
        Self {
            kind: DeviceEventKind::from_wire(&msg.kind),
            data: msg.data,
        }
    }
}
