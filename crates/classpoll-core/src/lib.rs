//! Poll lifecycle engine, poll store, and tally projection for Classpoll.
//!
//! This crate owns the only stateful logic in the system: how a poll is
//! created, how votes are accepted or refused, when a poll stops being
//! active, and how live percentages are derived. It is synchronous and
//! in-memory; the server crate puts it behind a lock and exposes it over
//! HTTP and `WebSocket`.
//!
//! # Modules
//!
//! - [`clock`] -- [`Clock`](clock::Clock) trait with system and manual
//!   implementations.
//! - [`config`] -- `classpoll.yaml` loading into typed structs.
//! - [`engine`] -- [`PollEngine`](engine::PollEngine), the lifecycle state
//!   machine.
//! - [`error`] -- Validation errors and vote rejections.
//! - [`poll`] -- The stored poll record.
//! - [`store`] -- Append-only poll log.
//! - [`tally`] -- Pure projection of a poll into its live tally.

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod poll;
pub mod store;
pub mod tally;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ClasspollConfig;
pub use engine::PollEngine;
pub use error::{ValidationError, VoteRejected};
pub use poll::{NewOption, Poll, PollOption};
pub use store::PollStore;
