//! Append-only poll log.
//!
//! [`PollStore`] keeps every poll ever created in creation order. It does
//! no validation; the engine owns it and enforces all the rules. Nothing
//! is ever removed.

use crate::poll::Poll;

/// Ordered, append-only collection of polls.
#[derive(Debug, Default)]
pub struct PollStore {
    polls: Vec<Poll>,
}

impl PollStore {
    /// An empty store.
    pub const fn new() -> Self {
        Self { polls: Vec::new() }
    }

    /// Add a poll at the end of the log and return its position.
    pub(crate) fn append(&mut self, poll: Poll) -> usize {
        self.polls.push(poll);
        self.polls.len().saturating_sub(1)
    }

    /// Every poll, oldest first.
    pub fn all(&self) -> &[Poll] {
        &self.polls
    }

    /// Number of polls stored.
    pub fn len(&self) -> usize {
        self.polls.len()
    }

    /// Whether no poll has been created yet.
    pub fn is_empty(&self) -> bool {
        self.polls.is_empty()
    }

    pub(crate) fn get(&self, position: usize) -> Option<&Poll> {
        self.polls.get(position)
    }

    pub(crate) fn get_mut(&mut self, position: usize) -> Option<&mut Poll> {
        self.polls.get_mut(position)
    }
}
