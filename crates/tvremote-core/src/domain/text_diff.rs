//! Text buffer synchronisation between the local input field and the TV.
//!
//! The TV's text field can only be edited the way a keyboard edits it: type
//! characters at the cursor, or press delete to remove the character before
//! the cursor.  The cursor always sits at the end.  Every local edit (typing,
//! backspace, paste, autocorrect replacing a word) therefore has to be
//! expressed as "delete N characters from the tail, then type a string".
//!
//! # Algorithm
//!
//! Given the text the TV already shows (`previous`) and the new local text
//! (`current`), [`diff`] evaluates three cases in order:
//!
//! 1. `current` starts with `previous` → type the appended suffix.
//! 2. `previous` starts with `current` → delete the truncated characters.
//! 3. Otherwise → find the longest common prefix, delete everything in
//!    `previous` after it, then type everything in `current` after it.
//!
//! Case 3 subsumes the other two; they are spelled out because they are the
//! overwhelmingly common keystroke cases.  No suffix matching or general
//! edit-distance search is done: every operation is a network round trip to
//! the TV, and one delete-run plus one insert keeps the sequence short and
//! predictable.
//!
//! Lengths are counted in Unicode scalar values (`char`s), matching one press
//! of the TV's delete key.

use tracing::trace;

/// One remote edit operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextOp {
    /// Delete the character before the remote cursor.
    DeleteChar,
    /// Type a contiguous run of text at the remote cursor.
    InsertText(String),
}

/// Computes the operations that turn `previous` into `current` on the remote side.
///
/// # Example
///
/// ```rust
/// use tvremote_core::{diff, TextOp};
///
/// assert_eq!(diff("cat", "cats"), vec![TextOp::InsertText("s".into())]);
/// assert_eq!(diff("cats", "cat"), vec![TextOp::DeleteChar]);
/// ```
pub fn diff(previous: &str, current: &str) -> Vec<TextOp> {
    if previous == current {
        return Vec::new();
    }

    // Case 1: pure append.
    if let Some(suffix) = current.strip_prefix(previous) {
        return vec![TextOp::InsertText(suffix.to_string())];
    }

    // Case 2: pure truncation.
    if previous.starts_with(current) {
        let removed = previous[current.len()..].chars().count();
        return vec![TextOp::DeleteChar; removed];
    }

    // Case 3: delete the diverging tail, then type the replacement.
    let prefix_bytes = common_prefix_len(previous, current);
    let deletes = previous[prefix_bytes..].chars().count();
    let mut ops = vec![TextOp::DeleteChar; deletes];
    let inserted = &current[prefix_bytes..];
    if !inserted.is_empty() {
        ops.push(TextOp::InsertText(inserted.to_string()));
    }
    ops
}

/// Applies `ops` to `buffer` the way the remote text field would.
///
/// Deleting from an empty buffer is a no-op, as it is on the TV.
pub fn apply(buffer: &str, ops: &[TextOp]) -> String {
    let mut out = buffer.to_string();
    for op in ops {
        match op {
            TextOp::DeleteChar => {
                out.pop();
            }
            TextOp::InsertText(text) => out.push_str(text),
        }
    }
    out
}

/// Byte length of the longest common prefix, always on a `char` boundary.
fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, ca), cb)| ca != cb)
        .map(|((idx, _), _)| idx)
        .unwrap_or_else(|| a.len().min(b.len()))
}

/// Local buffer plus the baseline already reflected on the TV.
///
/// [`record`](Self::record) advances the baseline *before* returning the
/// operations, so the caller can start the (slow) remote calls knowing that
/// the next edit will be diffed against the right text even if those calls
/// have not completed yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextEditState {
    /// Latest local buffer.
    pub current: String,
    /// Buffer state the TV already shows (or will, once queued operations land).
    pub last_sent: String,
}

impl TextEditState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new local snapshot and returns the operations to transmit.
    pub fn record(&mut self, current: &str) -> Vec<TextOp> {
        let ops = diff(&self.last_sent, current);
        trace!(ops = ops.len(), "text edit recorded");
        self.current = current.to_string();
        self.last_sent = current.to_string();
        ops
    }

    /// Re-seeds both buffers, e.g. when the TV reports the field's contents.
    pub fn reset(&mut self, text: &str) {
        self.current = text.to_string();
        self.last_sent = text.to_string();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
