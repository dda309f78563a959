//! The stored poll record.
//!
//! A [`Poll`] is built once by the engine and afterwards only two things
//! about it can change: `responses` grows, and `end_time` may be pulled
//! back to "now" when a newer poll supersedes it. Everything else is
//! fixed. Mutation is crate-private so only the engine can do either.
//!
//! Per-option counts are never stored. They are derived from `responses`
//! whenever asked for, so `sum(counts) == responses.len()` cannot drift.

use std::collections::BTreeMap;

use classpoll_types::{OptionSelector, PollId};
use serde::Deserialize;

/// An option as supplied by the teacher at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOption {
    /// Display text.
    pub text: String,
    /// Whether this option is the correct answer.
    #[serde(default)]
    pub is_correct: bool,
}

impl NewOption {
    /// An option not marked correct.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_correct: false,
        }
    }

    /// An option marked correct.
    pub fn correct(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_correct: true,
        }
    }
}

/// One selectable answer within a stored poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOption {
    /// Display text.
    pub text: String,
    /// Whether the teacher marked this option correct.
    pub is_correct: bool,
}

/// One round of voting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poll {
    id: PollId,
    question: String,
    options: Vec<PollOption>,
    start_time: i64,
    end_time: i64,
    responses: BTreeMap<String, usize>,
}

impl Poll {
    /// Build a fresh poll. Input is assumed validated.
    pub(crate) fn new(question: &str, options: &[NewOption], start_time: i64, end_time: i64) -> Self {
        Self {
            id: PollId::new(),
            question: question.to_owned(),
            options: options
                .iter()
                .map(|o| PollOption {
                    text: o.text.clone(),
                    is_correct: o.is_correct,
                })
                .collect(),
            start_time,
            end_time,
            responses: BTreeMap::new(),
        }
    }

    /// Poll identifier.
    pub const fn id(&self) -> PollId {
        self.id
    }

    /// The question text.
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Options in creation order.
    pub fn options(&self) -> &[PollOption] {
        &self.options
    }

    /// Window start, inclusive.
    pub const fn start_time(&self) -> i64 {
        self.start_time
    }

    /// Window end, exclusive.
    pub const fn end_time(&self) -> i64 {
        self.end_time
    }

    /// Student name to chosen option index.
    pub const fn responses(&self) -> &BTreeMap<String, usize> {
        &self.responses
    }

    /// Whether `now` falls inside `[start_time, end_time)`.
    pub const fn is_active_at(&self, now: i64) -> bool {
        self.start_time <= now && now < self.end_time
    }

    /// Whether the window closed at or before `now`.
    pub const fn has_ended_at(&self, now: i64) -> bool {
        self.end_time <= now
    }

    /// Whether `student` already has a response.
    pub fn has_voted(&self, student: &str) -> bool {
        self.responses.contains_key(student)
    }

    /// Resolve a selector to an option index.
    ///
    /// Text matches are exact and case-sensitive; the first matching
    /// option wins when texts repeat.
    pub fn resolve(&self, selector: &OptionSelector) -> Option<usize> {
        match selector {
            OptionSelector::Index(i) => (*i < self.options.len()).then_some(*i),
            OptionSelector::Text(text) => self.options.iter().position(|o| &o.text == text),
        }
    }

    /// Number of responses per option, in option order.
    pub fn option_counts(&self) -> Vec<usize> {
        let mut counts = vec![0_usize; self.options.len()];
        for &chosen in self.responses.values() {
            if let Some(c) = counts.get_mut(chosen) {
                *c = c.saturating_add(1);
            }
        }
        counts
    }

    /// Pull the end of the window back to `now` if it lies later.
    pub(crate) fn close_at(&mut self, now: i64) {
        if now < self.end_time {
            self.end_time = now.max(self.start_time);
        }
    }

    /// Record a response. The caller has already checked the student is
    /// new and the index is in range.
    pub(crate) fn record(&mut self, student: &str, option: usize) {
        self.responses.insert(student.to_owned(), option);
    }
}
