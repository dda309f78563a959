//! Shared application state.
//!
//! [`AppState`] holds the poll engine behind a single lock, the participant
//! roster, and the broadcast channel that fans events out to every
//! `WebSocket` connection. The poll operations here are shared by the HTTP
//! handlers and the realtime dispatcher so both surfaces behave the same.
//!
//! Every state-changing operation publishes its event while still holding
//! the lock it changed state under (the engine lock for polls, the roster
//! lock for participant lists). That keeps broadcast order identical to
//! the order in which the changes were applied.

use std::sync::atomic::{AtomicU64, Ordering};

use classpoll_core::tally::project;
use classpoll_core::{NewOption, PollEngine};
use classpoll_types::{ConnectionId, OptionSelector, Participant, PollView, ServerEvent};
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::info;

use crate::error::ApiError;
use crate::roster::Roster;

/// Default capacity of the broadcast channel.
///
/// A subscriber that falls further behind than this receives
/// [`broadcast::error::RecvError::Lagged`] and skips ahead.
pub const DEFAULT_BROADCAST_CAPACITY: usize = 256;

/// A server event plus who should receive it.
#[derive(Debug, Clone)]
pub struct Outbound {
    /// `None` for everyone, otherwise a single connection.
    pub target: Option<ConnectionId>,
    /// The event to send.
    pub event: ServerEvent,
}

impl Outbound {
    /// Whether `connection` should forward this event.
    pub fn is_for(&self, connection: ConnectionId) -> bool {
        self.target.is_none_or(|t| t == connection)
    }
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`](std::sync::Arc) and injected via Axum's `State`
/// extractor.
#[derive(Debug)]
pub struct AppState {
    /// The poll engine. One lock covers every create and vote.
    pub engine: RwLock<PollEngine>,
    /// Connected students.
    pub roster: Mutex<Roster>,
    /// Broadcast sender for realtime events.
    pub tx: broadcast::Sender<Outbound>,
    /// Source of connection identifiers.
    next_connection: AtomicU64,
}

impl AppState {
    /// Create state around an engine with the default channel capacity.
    pub fn new(engine: PollEngine) -> Self {
        Self::with_capacity(engine, DEFAULT_BROADCAST_CAPACITY)
    }

    /// Create state around an engine with a given channel capacity
    /// (minimum 1).
    pub fn with_capacity(engine: PollEngine, capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            engine: RwLock::new(engine),
            roster: Mutex::new(Roster::new()),
            tx,
            next_connection: AtomicU64::new(1),
        }
    }

    /// Subscribe to the realtime channel.
    pub fn subscribe(&self) -> broadcast::Receiver<Outbound> {
        self.tx.subscribe()
    }

    /// Publish an event to every connection.
    ///
    /// Returns the number of subscribers that received it; 0 when nobody
    /// is connected, which is not an error.
    pub fn broadcast(&self, event: ServerEvent) -> usize {
        self.tx
            .send(Outbound {
                target: None,
                event,
            })
            .unwrap_or(0)
    }

    /// Publish an event to a single connection.
    pub fn send_to(&self, connection: ConnectionId, event: ServerEvent) -> usize {
        self.tx
            .send(Outbound {
                target: Some(connection),
                event,
            })
            .unwrap_or(0)
    }

    /// Allocate a fresh connection identifier.
    pub fn next_connection_id(&self) -> ConnectionId {
        ConnectionId(self.next_connection.fetch_add(1, Ordering::Relaxed))
    }

    // -----------------------------------------------------------------------
    // Poll operations
    // -----------------------------------------------------------------------

    /// Create a poll, broadcast `poll-started`, and return its view.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for a malformed request.
    pub async fn create_poll(
        &self,
        question: &str,
        options: &[NewOption],
        duration_seconds: i64,
    ) -> Result<PollView, ApiError> {
        let mut engine = self.engine.write().await;
        let poll = engine.create_poll(question, options, duration_seconds)?;
        let view = project(&poll);
        let receivers = self.broadcast(ServerEvent::PollStarted(view.clone()));
        drop(engine);

        info!(poll_id = %view.id, receivers, "Broadcast poll-started");
        self.broadcast_participants().await;
        Ok(view)
    }

    /// Record a vote, broadcast `poll-updated`, and return the new tally.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidStudentName`] for a blank name, or
    /// [`ApiError::Rejected`] with the engine's reason.
    pub async fn vote(
        &self,
        student: &str,
        selector: &OptionSelector,
    ) -> Result<PollView, ApiError> {
        if student.trim().is_empty() {
            return Err(ApiError::InvalidStudentName);
        }
        let mut engine = self.engine.write().await;
        let view = project(engine.vote(student, selector)?);
        self.broadcast(ServerEvent::PollUpdated(view.clone()));
        Ok(view)
    }

    /// The active poll's view, if a poll is active.
    pub async fn active_poll(&self) -> Option<PollView> {
        self.engine.read().await.active_poll().map(project)
    }

    /// Views of every finished poll, oldest first.
    pub async fn history(&self) -> Vec<PollView> {
        self.engine
            .read()
            .await
            .history()
            .into_iter()
            .map(project)
            .collect()
    }

    /// Current participant list.
    pub async fn participants(&self) -> Vec<Participant> {
        self.roster.lock().await.participants()
    }

    /// Broadcast `student-list` with the roster lock held.
    pub async fn broadcast_participants(&self) -> usize {
        let roster = self.roster.lock().await;
        self.broadcast(ServerEvent::StudentList(roster.participants()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use classpoll_core::config::PollsConfig;
    use classpoll_core::{ManualClock, PollStore};

    use super::*;

    fn state() -> AppState {
        let clock = Arc::new(ManualClock::new(0));
        AppState::new(PollEngine::new(
            PollStore::new(),
            clock,
            PollsConfig::default(),
        ))
    }

    #[test]
    fn outbound_targeting() {
        let all = Outbound {
            target: None,
            event: ServerEvent::StudentList(Vec::new()),
        };
        let one = Outbound {
            target: Some(ConnectionId(2)),
            event: ServerEvent::StudentList(Vec::new()),
        };
        assert!(all.is_for(ConnectionId(1)));
        assert!(one.is_for(ConnectionId(2)));
        assert!(!one.is_for(ConnectionId(1)));
    }

    #[test]
    fn connection_ids_are_unique() {
        let state = state();
        let a = state.next_connection_id();
        let b = state.next_connection_id();
        assert_ne!(a, b);
    }

    #[test]
    fn broadcast_without_subscribers_is_not_an_error() {
        let state = state();
        assert_eq!(state.broadcast(ServerEvent::StudentList(Vec::new())), 0);
    }

    #[tokio::test]
    async fn blank_student_name_is_rejected_before_engine() {
        let state = state();
        let result = state.vote("   ", &OptionSelector::Index(0)).await;
        assert!(matches!(result, Err(ApiError::InvalidStudentName)));
    }
}
