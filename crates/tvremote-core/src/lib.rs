//! # tvremote-core
//!
//! Shared library for tvremote containing the gateway HTTP contract, the
//! session domain model, and the text synchronisation algorithm.
//!
//! This crate has zero dependencies on async runtimes, sockets, or UI
//! frameworks.  Everything here can be exercised synchronously in tests.
//!
//! # Architecture overview (for beginners)
//!
//! tvremote drives a television (navigation, media keys, volume, app launch,
//! text entry) through a *gateway*: a small HTTP service that owns the actual
//! device pairing and wire protocol.  The client never talks to the TV
//! directly.  This crate defines the pieces both sides of that boundary agree
//! on:
//!
//! - **`protocol`** – The JSON request and response bodies of the gateway's
//!   HTTP API (`/api/status`, `/api/send_key`, `/api/events`, ...).
//!
//! - **`domain`** – Pure client-side state: the [`SessionState`] snapshot,
//!   device-initiated [`DeviceEvent`]s, and the [`text_diff`](domain::text_diff)
//!   algorithm that turns local buffer edits into remote key presses.
//!
//! - **`keymap`** – The opaque [`KeyCode`] identifier plus the handful of codes
//!   the client attaches meaning to (home, mute, delete) and friendly aliases.

pub mod domain;
pub mod keymap;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `tvremote_core::SessionState` instead of the full module path.
pub use domain::event::{DeviceEvent, DeviceEventKind};
pub use domain::session::{AppEntry, SessionState};
pub use domain::text_diff::{apply, diff, TextEditState, TextOp};
pub use keymap::KeyCode;
pub use protocol::messages::StatusResponse;
