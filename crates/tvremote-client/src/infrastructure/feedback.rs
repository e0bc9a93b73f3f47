//! Local key-press feedback for the console front end.

use std::io::Write;

use tvremote_core::KeyCode;

use crate::application::key_dispatch::InputFeedback;

/// Rings the terminal bell once per key sent.
pub struct BellFeedback;

impl InputFeedback for BellFeedback {
    fn key_sent(&self, _key: &KeyCode) {
        let mut out = std::io::stderr();
        // A bell that fails to ring is not worth reporting.
        let _ = out.write_all(b"\x07").and_then(|()| out.flush());
    }
}

/// No feedback at all.
pub struct NoFeedback;

impl InputFeedback for NoFeedback {
    fn key_sent(&self, _key: &KeyCode) {}
}
