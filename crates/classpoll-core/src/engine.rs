//! Poll lifecycle engine.
//!
//! [`PollEngine`] wraps the [`PollStore`] with the rules of the game:
//!
//! - Creating a poll ends whichever poll is still running (its window is
//!   clamped to the creation instant) and makes the new poll the only
//!   active one. Creation is the only way a poll becomes active.
//! - A vote is checked against, in order: a current poll exists, its
//!   window is still open, the student has not answered yet, and the
//!   selected option exists. The first failing check is the rejection.
//! - Expiry is lazy. No timer fires when a window closes; the next read
//!   or vote simply sees that `now` is past `end_time`.
//!
//! The engine is synchronous and does no I/O. Callers sharing it across
//! tasks put the whole engine behind one lock, which makes each
//! check-then-write in [`PollEngine::vote`] a single critical section.

use std::sync::Arc;

use classpoll_types::OptionSelector;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::config::PollsConfig;
use crate::error::{ValidationError, VoteRejected};
use crate::poll::{NewOption, Poll};
use crate::store::PollStore;

/// Milliseconds per second.
const MILLIS_PER_SECOND: i64 = 1000;

/// Minimum number of options per poll.
const MIN_OPTIONS: usize = 2;

/// The poll lifecycle state machine.
#[derive(Debug)]
pub struct PollEngine {
    /// Every poll ever created.
    store: PollStore,
    /// Position in `store` of the most recently created poll.
    current: Option<usize>,
    /// Source of "now".
    clock: Arc<dyn Clock>,
    /// Creation limits.
    limits: PollsConfig,
}

impl PollEngine {
    /// Build an engine over an existing store.
    ///
    /// When the store already holds polls, the last one is treated as
    /// current; whether it is still active is decided by its window.
    pub fn new(store: PollStore, clock: Arc<dyn Clock>, limits: PollsConfig) -> Self {
        let current = store.len().checked_sub(1);
        Self {
            store,
            current,
            clock,
            limits,
        }
    }

    /// Current instant according to the engine's clock.
    pub fn now(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Create a poll and make it the sole active poll. Returns a copy of
    /// the stored poll as created.
    ///
    /// Any poll still inside its window is ended at this instant and
    /// stays in history with the votes it collected.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the question is blank, there are
    /// fewer than two options, any option text is blank, the duration is
    /// not positive, or the window end overflows. Configured
    /// `max_options` / `max_duration_seconds` limits apply only when set.
    /// Nothing is stored on error.
    pub fn create_poll(
        &mut self,
        question: &str,
        options: &[NewOption],
        duration_seconds: i64,
    ) -> Result<Poll, ValidationError> {
        self.validate(question, options, duration_seconds)?;

        let now = self.now();
        let end_time = duration_seconds
            .checked_mul(MILLIS_PER_SECOND)
            .and_then(|ms| now.checked_add(ms))
            .ok_or(ValidationError::DurationOverflow {
                seconds: duration_seconds,
            })?;

        if let Some(previous) = self.current.and_then(|pos| self.store.get_mut(pos)) {
            if previous.is_active_at(now) {
                previous.close_at(now);
                info!(
                    poll_id = %previous.id(),
                    responses = previous.responses().len(),
                    "Active poll superseded"
                );
            }
        }

        let poll = Poll::new(question, options, now, end_time);
        info!(
            poll_id = %poll.id(),
            options = poll.options().len(),
            duration_seconds,
            "Poll created"
        );
        self.current = Some(self.store.append(poll.clone()));
        Ok(poll)
    }

    /// Record `student`'s vote on the current poll.
    ///
    /// # Errors
    ///
    /// Returns the first failing check as a [`VoteRejected`]:
    /// [`NoActivePoll`](VoteRejected::NoActivePoll),
    /// [`PollExpired`](VoteRejected::PollExpired),
    /// [`AlreadyVoted`](VoteRejected::AlreadyVoted), then
    /// [`InvalidOption`](VoteRejected::InvalidOption). The poll is
    /// untouched on rejection.
    pub fn vote(
        &mut self,
        student: &str,
        selector: &OptionSelector,
    ) -> Result<&Poll, VoteRejected> {
        let now = self.now();
        let poll = self
            .current
            .and_then(|pos| self.store.get_mut(pos))
            .ok_or(VoteRejected::NoActivePoll)?;

        if !poll.is_active_at(now) {
            return Err(VoteRejected::PollExpired { poll_id: poll.id() });
        }
        if poll.has_voted(student) {
            return Err(VoteRejected::AlreadyVoted {
                student: student.to_owned(),
            });
        }
        let option = poll
            .resolve(selector)
            .ok_or_else(|| VoteRejected::InvalidOption {
                selector: selector.clone(),
            })?;

        poll.record(student, option);
        debug!(poll_id = %poll.id(), student, option, "Vote recorded");
        Ok(poll)
    }

    /// The poll whose window contains now, if any.
    pub fn active_poll(&self) -> Option<&Poll> {
        let now = self.now();
        self.current_poll().filter(|p| p.is_active_at(now))
    }

    /// Every poll whose window has closed, oldest first.
    pub fn history(&self) -> Vec<&Poll> {
        let now = self.now();
        self.store
            .all()
            .iter()
            .filter(|p| p.has_ended_at(now))
            .collect()
    }

    /// Read access to the full poll log.
    pub const fn store(&self) -> &PollStore {
        &self.store
    }

    fn current_poll(&self) -> Option<&Poll> {
        self.current.and_then(|pos| self.store.get(pos))
    }

    fn validate(
        &self,
        question: &str,
        options: &[NewOption],
        duration_seconds: i64,
    ) -> Result<(), ValidationError> {
        if question.trim().is_empty() {
            return Err(ValidationError::EmptyQuestion);
        }
        if options.len() < MIN_OPTIONS {
            return Err(ValidationError::TooFewOptions {
                count: options.len(),
            });
        }
        if let Some(max) = self.limits.max_options.filter(|max| options.len() > *max) {
            return Err(ValidationError::TooManyOptions {
                count: options.len(),
                max,
            });
        }
        if let Some(index) = options.iter().position(|o| o.text.trim().is_empty()) {
            return Err(ValidationError::EmptyOptionText { index });
        }
        if duration_seconds <= 0 {
            return Err(ValidationError::NonPositiveDuration {
                seconds: duration_seconds,
            });
        }
        if let Some(max) = self
            .limits
            .max_duration_seconds
            .filter(|max| duration_seconds > *max)
        {
            return Err(ValidationError::DurationTooLong {
                seconds: duration_seconds,
                max,
            });
        }
        Ok(())
    }
}
