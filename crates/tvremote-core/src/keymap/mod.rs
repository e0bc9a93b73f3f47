//! Key codes understood by the gateway.
//!
//! Key codes are opaque device-protocol identifiers (Android `KEYCODE_*`
//! names) that the client passes through to the gateway unmodified.  The
//! client only attaches meaning to three of them:
//!
//! - [`KeyCode::HOME`] – has the side effect of unmuting the TV.
//! - [`KeyCode::VOLUME_MUTE`] – toggles mute; tracked so the side effect above
//!   can be compensated.
//! - [`KeyCode::DEL`] – the remote backspace used by text synchronisation.
//!
//! The alias table lets a console front end accept `up` instead of
//! `KEYCODE_DPAD_UP`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque device key identifier, e.g. `"KEYCODE_DPAD_UP"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCode(String);

impl KeyCode {
    pub const HOME: &'static str = "KEYCODE_HOME";
    pub const VOLUME_MUTE: &'static str = "KEYCODE_VOLUME_MUTE";
    pub const DEL: &'static str = "KEYCODE_DEL";
    pub const ENTER: &'static str = "KEYCODE_ENTER";

    /// Wraps a raw key code string.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn home() -> Self {
        Self::new(Self::HOME)
    }

    pub fn volume_mute() -> Self {
        Self::new(Self::VOLUME_MUTE)
    }

    pub fn del() -> Self {
        Self::new(Self::DEL)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` for the home navigation command.
    pub fn is_home(&self) -> bool {
        self.0 == Self::HOME
    }

    /// `true` for the mute toggle.
    pub fn is_mute_toggle(&self) -> bool {
        self.0 == Self::VOLUME_MUTE
    }

    /// Resolves a friendly alias (case-insensitive) or passes a raw code through.
    ///
    /// Anything that is not a known alias is treated as a raw key code and
    /// upper-cased, so `keycode_menu` and `KEYCODE_MENU` are equivalent.
    pub fn from_alias(input: &str) -> Self {
        let lowered = input.trim().to_ascii_lowercase();
        ALIASES
            .iter()
            .find(|(alias, _)| *alias == lowered)
            .map(|(_, code)| Self::new(*code))
            .unwrap_or_else(|| Self::new(input.trim().to_ascii_uppercase()))
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for KeyCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// Friendly names for the remote's buttons.
pub const ALIASES: &[(&str, &str)] = &[
    ("up", "KEYCODE_DPAD_UP"),
    ("down", "KEYCODE_DPAD_DOWN"),
    ("left", "KEYCODE_DPAD_LEFT"),
    ("right", "KEYCODE_DPAD_RIGHT"),
    ("ok", "KEYCODE_DPAD_CENTER"),
    ("back", "KEYCODE_BACK"),
    ("home", KeyCode::HOME),
    ("menu", "KEYCODE_MENU"),
    ("mute", KeyCode::VOLUME_MUTE),
    ("vol+", "KEYCODE_VOLUME_UP"),
    ("vol-", "KEYCODE_VOLUME_DOWN"),
    ("power", "KEYCODE_POWER"),
    ("play", "KEYCODE_MEDIA_PLAY_PAUSE"),
    ("stop", "KEYCODE_MEDIA_STOP"),
    ("next", "KEYCODE_MEDIA_NEXT"),
    ("prev", "KEYCODE_MEDIA_PREVIOUS"),
    ("rewind", "KEYCODE_MEDIA_REWIND"),
    ("ffwd", "KEYCODE_MEDIA_FAST_FORWARD"),
    ("ch+", "KEYCODE_CHANNEL_UP"),
    ("ch-", "KEYCODE_CHANNEL_DOWN"),
    ("input", "KEYCODE_TV_INPUT"),
    ("red", "KEYCODE_PROG_RED"),
    ("green", "KEYCODE_PROG_GREEN"),
    ("yellow", "KEYCODE_PROG_YELLOW"),
    ("blue", "KEYCODE_PROG_BLUE"),
    ("del", KeyCode::DEL),
    ("enter", KeyCode::ENTER),
];
