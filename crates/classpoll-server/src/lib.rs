//! HTTP + `WebSocket` server for the Classpoll live-polling engine.
//!
//! This crate exposes the poll engine from `classpoll-core` to browsers:
//!
//! - **REST endpoints** under `/api/polls` to create a poll, vote, and read
//!   the active poll and history
//! - **`WebSocket` endpoint** (`/ws`) carrying live tallies, the
//!   participant list, chat, and teacher moderation
//!
//! # Architecture
//!
//! [`AppState`] owns the engine behind one `RwLock`. Creates and votes take
//! the write half for their whole check-then-write sequence; reads take
//! the read half. Every accepted change is pushed through a
//! [`tokio::sync::broadcast`] channel to all connected sockets.

pub mod error;
pub mod handlers;
pub mod roster;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

pub use router::build_router;
pub use server::{start_server, ServerError};
pub use state::{AppState, Outbound};
