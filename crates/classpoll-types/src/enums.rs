//! Enumeration types shared by the engine and both client surfaces.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Option selection
// ---------------------------------------------------------------------------

/// How a vote names the option it is cast for.
///
/// The index is the canonical form. The text form is accepted for older
/// clients and resolves to the first option whose text matches exactly
/// (case-sensitive).
///
/// On the wire this is untagged: a JSON number selects by index, a JSON
/// string selects by text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(untagged)]
pub enum OptionSelector {
    /// Zero-based position in the poll's option list.
    Index(usize),
    /// Exact display text of the option.
    Text(String),
}

impl core::fmt::Display for OptionSelector {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Index(i) => write!(f, "#{i}"),
            Self::Text(t) => write!(f, "{t:?}"),
        }
    }
}

impl From<usize> for OptionSelector {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for OptionSelector {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Vote rejection
// ---------------------------------------------------------------------------

/// Stable machine-readable code for a rejected vote.
///
/// Clients switch on this to decide between "you already voted" and
/// "this poll has ended" style messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// No poll has been created yet.
    NoActivePoll,
    /// The current poll's window has closed.
    PollExpired,
    /// This student name already has a response on the current poll.
    AlreadyVoted,
    /// The selector does not match any option.
    InvalidOption,
    /// The student name was blank.
    InvalidStudentName,
}

impl RejectionReason {
    /// The `snake_case` code used on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoActivePoll => "no_active_poll",
            Self::PollExpired => "poll_expired",
            Self::AlreadyVoted => "already_voted",
            Self::InvalidOption => "invalid_option",
            Self::InvalidStudentName => "invalid_student_name",
        }
    }
}
