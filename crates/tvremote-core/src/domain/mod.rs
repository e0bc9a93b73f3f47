//! Domain entities for tvremote.
//!
//! This module contains pure client-side logic with no infrastructure
//! dependencies.
//!
//! # What is "domain" in Clean Architecture? (for beginners)
//!
//! Domain code holds the rules that make the system what it is, here: what
//! "connected to the TV" means, which events the TV can push, and how a local
//! text buffer is mirrored remotely.  It never performs I/O, so it compiles
//! and tests on any platform without a gateway running.

/// Device-initiated UI events delivered by the gateway's long-poll feed.
pub mod event;

/// Connection, pairing, and app-list snapshot shared by every component.
pub mod session;

/// Prefix-based text buffer differ.
///
/// See [`text_diff::diff`] for the algorithm.
pub mod text_diff;
