//! Application layer: the session core.
//!
//! # What lives here? (for beginners)
//!
//! Everything that decides *what* the client does, with no knowledge of
//! *how* requests reach the gateway.  All I/O goes through the
//! [`gateway::Gateway`] trait, which the infrastructure layer implements
//! over HTTP and tests replace with mocks.
//!
//! - **`session`** – `SessionStore`, the shared, subscribable snapshot of
//!   connection status, device name, and installed apps.
//! - **`status_poller`** – Refreshes the snapshot on a 2 s / 500 ms cadence.
//! - **`pairing`** – The code-entry flow shown while the TV waits for a
//!   pairing code.
//! - **`event_stream`** – Long-polls device-initiated events such as
//!   "keyboard shown".
//! - **`text_input`** – Mirrors a local text field onto the TV using the
//!   prefix diff from `tvremote-core`.
//! - **`key_dispatch`** – Key presses and app launches, including the
//!   home-unmutes compensation.
//! - **`remote_session`** – Owns and wires all of the above; the front end's
//!   single entry point.
//! - **`notice`**, **`timer`**, **`config`** – Small shared building blocks.

pub mod config;
pub mod event_stream;
pub mod gateway;
pub mod key_dispatch;
pub mod notice;
pub mod pairing;
pub mod remote_session;
pub mod session;
pub mod status_poller;
pub mod text_input;
pub mod timer;
