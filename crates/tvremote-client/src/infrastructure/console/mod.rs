//! Line-oriented console commands for the `tvremote` binary.
//!
//! One command per line; the first word selects the command and the rest of
//! the line is its argument, taken verbatim (so `type hello world` types
//! `hello world`, spaces included).

use thiserror::Error;

use tvremote_core::KeyCode;

/// One parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Connect,
    /// Send a key by alias (`up`, `mute`) or raw code (`KEYCODE_MENU`).
    Key(KeyCode),
    App(String),
    /// The full new contents of the local text field.  Sent as a diff.
    Type(String),
    /// Bulk-send without enter.
    Send(String),
    /// Bulk-send followed by enter.
    Enter(String),
    /// Edit the pairing code without submitting it.
    Code(String),
    /// Submit a pairing code.
    Pair(String),
    Cancel,
    Status,
    Apps,
    Foreground,
    Background,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    #[error("empty command")]
    Empty,

    #[error("unknown command {0:?}; type `help` for a list")]
    Unknown(String),

    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
}

pub const HELP: &str = "\
commands:
  connect            ask the gateway to connect to the TV
  key <alias|code>   send a key (up, down, left, right, ok, back, home, mute, vol+, ...)
  app <id>           launch an app by id
  type <text>        set the text field to <text> (sent as a diff; empty clears)
  send <text>        type <text> in one go
  enter <text>       type <text> in one go and press enter
  code <code>        edit the pairing code
  pair <code>        submit the pairing code shown on the TV
  cancel             close the pairing prompt
  status             show the connection state
  apps               list installed apps
  fg | bg            foreground / background the client
  help               this text
  quit               exit";

impl ConsoleCommand {
    /// Parses one input line.
    pub fn parse(line: &str) -> Result<Self, CommandParseError> {
        let line = line.trim_start().trim_end_matches(['\r', '\n']);
        let (word, rest) = match line.split_once(' ') {
            Some((word, rest)) => (word, rest),
            None => (line.trim_end(), ""),
        };

        let required = |name: &'static str| -> Result<String, CommandParseError> {
            let arg = rest.trim();
            if arg.is_empty() {
                Err(CommandParseError::MissingArgument(name))
            } else {
                Ok(arg.to_string())
            }
        };

        match word.to_ascii_lowercase().as_str() {
            "" => Err(CommandParseError::Empty),
            "connect" => Ok(Self::Connect),
            "key" | "k" => Ok(Self::Key(KeyCode::from_alias(&required("key")?))),
            "app" => Ok(Self::App(required("app")?)),
            "type" | "t" => Ok(Self::Type(rest.to_string())),
            "send" => Ok(Self::Send(required_verbatim(rest, "send")?)),
            "enter" => Ok(Self::Enter(required_verbatim(rest, "enter")?)),
            "code" => Ok(Self::Code(rest.trim().to_string())),
            "pair" => Ok(Self::Pair(required("pair")?)),
            "cancel" => Ok(Self::Cancel),
            "status" | "s" => Ok(Self::Status),
            "apps" => Ok(Self::Apps),
            "fg" => Ok(Self::Foreground),
            "bg" => Ok(Self::Background),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(CommandParseError::Unknown(other.to_string())),
        }
    }
}

/// Like a required argument, but keeps inner and trailing spaces.
fn required_verbatim(rest: &str, name: &'static str) -> Result<String, CommandParseError> {
    if rest.trim().is_empty() {
        Err(CommandParseError::MissingArgument(name))
    } else {
        Ok(rest.to_string())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
