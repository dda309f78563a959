//! Read-only poll view models.
//!
//! These are projections computed from a stored poll on every read. They
//! are what the HTTP surface returns and what the realtime channel pushes;
//! the stored poll itself never leaves the engine.
//!
//! Field names are `camelCase` on the wire to match the browser client.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::PollId;

/// One option of a poll with its derived tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "camelCase")]
pub struct OptionTally {
    /// The option's index rendered as a string.
    pub id: String,
    /// Display text.
    pub text: String,
    /// Number of responses that chose this option.
    pub count: usize,
    /// `count / totalResponses` as a whole percentage, rounded half-up.
    pub percentage: u8,
    /// Whether the teacher marked this option as the correct answer.
    pub is_correct: bool,
}

/// A poll plus its live tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "camelCase")]
pub struct PollView {
    /// Poll identifier.
    pub id: PollId,
    /// The question text.
    pub question: String,
    /// Options in creation order.
    pub options: Vec<OptionTally>,
    /// Student name to chosen option index.
    pub responses: BTreeMap<String, usize>,
    /// Number of students who have voted.
    pub total_responses: usize,
    /// Start of the voting window, milliseconds since the Unix epoch.
    #[ts(type = "number")]
    pub start_time: i64,
    /// End of the voting window (exclusive), milliseconds since the Unix epoch.
    #[ts(type = "number")]
    pub end_time: i64,
}

impl PollView {
    /// Look up an option's tally by its display text.
    pub fn option(&self, text: &str) -> Option<&OptionTally> {
        self.options.iter().find(|o| o.text == text)
    }
}
