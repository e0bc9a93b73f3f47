//! tvremote-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does tvremote-client do? (for beginners)
//!
//! The *client* is whatever the user holds: here, a terminal.  It never
//! speaks the TV's own remote protocol.  Instead it talks plain HTTP/JSON to
//! a *gateway* that is already paired with the TV, and keeps a consistent
//! picture of "am I connected, to which TV, with which apps" on top of that
//! stateless channel.
//!
//! The client:
//!
//! 1. Polls `api/status` every 2 s (every 500 ms while a connect or pairing
//!    is in flight) and publishes the result as a `SessionState`.
//! 2. Opens a pairing-code prompt when the gateway says the TV is showing a
//!    code, and submits what the user types.
//! 3. Long-polls `api/events` for things the TV initiates, such as "a text
//!    field has focus".
//! 4. Turns local text edits into remote delete/type operations.
//! 5. Sends keys and app launches, compensating for the TV unmuting itself
//!    when the home key is pressed.

/// Application layer: the session core.
pub mod application;

/// Infrastructure layer: HTTP gateway, config file, console.
pub mod infrastructure;

pub use application::gateway::{Gateway, RemoteError};
pub use application::remote_session::RemoteSession;
