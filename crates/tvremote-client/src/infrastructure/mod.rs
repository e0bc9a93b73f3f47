//! Infrastructure layer for the client application.
//!
//! Contains the adapters between the session core and the outside world:
//! HTTP, the config file, the console, and the terminal bell.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `tvremote_core`, but MUST NOT be imported by the `application` or domain
//! layers.
//!
//! # Sub-modules
//!
//! - **`gateway`** – `HttpGateway`, the `reqwest` implementation of the
//!   application's `Gateway` trait.
//!
//! - **`storage`** – Loads and saves the TOML config file in the platform
//!   config directory.
//!
//! - **`console`** – Parses the line commands typed into the `tvremote`
//!   binary.
//!
//! - **`feedback`** – `InputFeedback` implementations (terminal bell, none).

pub mod console;
pub mod feedback;
pub mod gateway;
pub mod storage;
