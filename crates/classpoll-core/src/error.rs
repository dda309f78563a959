//! Error types for the poll engine.
//!
//! [`ValidationError`] covers malformed create requests. [`VoteRejected`]
//! covers every way a vote can be refused; each variant is a distinct,
//! expected outcome rather than a failure of the engine. Neither leaves
//! the store in a partially-modified state.

use classpoll_types::{OptionSelector, PollId, RejectionReason};

/// A create-poll request that cannot be accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The question was empty or whitespace.
    #[error("question must not be empty")]
    EmptyQuestion,

    /// Fewer than two options were supplied.
    #[error("a poll needs at least 2 options, got {count}")]
    TooFewOptions {
        /// Number of options supplied.
        count: usize,
    },

    /// More options than the configured limit.
    #[error("a poll may have at most {max} options, got {count}")]
    TooManyOptions {
        /// Number of options supplied.
        count: usize,
        /// Configured maximum.
        max: usize,
    },

    /// An option had empty or whitespace text.
    #[error("option {index} has empty text")]
    EmptyOptionText {
        /// Zero-based position of the offending option.
        index: usize,
    },

    /// Duration was zero or negative.
    #[error("duration must be positive, got {seconds}s")]
    NonPositiveDuration {
        /// The supplied duration.
        seconds: i64,
    },

    /// Duration exceeds the configured limit.
    #[error("duration may be at most {max}s, got {seconds}s")]
    DurationTooLong {
        /// The supplied duration.
        seconds: i64,
        /// Configured maximum.
        max: i64,
    },

    /// The window end would not fit in an `i64` millisecond timestamp.
    #[error("duration of {seconds}s overflows the poll end time")]
    DurationOverflow {
        /// The supplied duration.
        seconds: i64,
    },
}

/// Why a vote was not recorded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VoteRejected {
    /// No poll has been created.
    #[error("there is no active poll")]
    NoActivePoll,

    /// The current poll's window has closed.
    #[error("poll {poll_id} has ended")]
    PollExpired {
        /// The poll that was current when the vote arrived.
        poll_id: PollId,
    },

    /// This student already answered the current poll.
    #[error("{student} has already voted")]
    AlreadyVoted {
        /// The student name.
        student: String,
    },

    /// The selector matched none of the poll's options.
    #[error("no option matches {selector}")]
    InvalidOption {
        /// The selector as received.
        selector: OptionSelector,
    },
}

impl VoteRejected {
    /// The wire-level rejection code for this outcome.
    pub const fn reason(&self) -> RejectionReason {
        match self {
            Self::NoActivePoll => RejectionReason::NoActivePoll,
            Self::PollExpired { .. } => RejectionReason::PollExpired,
            Self::AlreadyVoted { .. } => RejectionReason::AlreadyVoted,
            Self::InvalidOption { .. } => RejectionReason::InvalidOption,
        }
    }
}
