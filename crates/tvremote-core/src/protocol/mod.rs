//! Protocol module containing the gateway's JSON request and response types.

pub mod messages;

pub use messages::*;
