//! Storage infrastructure: the client's TOML configuration file.
//!
//! The session core never reads files.  This module loads `ClientConfig`
//! from the platform config directory, falls back to defaults on first run,
//! and converts it into the plain `SessionConfig` the application layer
//! consumes.

pub mod config;
