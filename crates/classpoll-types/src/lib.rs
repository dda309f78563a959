//! Shared wire types for the Classpoll live-polling server.
//!
//! Everything in this crate crosses a process boundary: HTTP response
//! bodies, realtime frames, and the `TypeScript` bindings generated for the
//! browser client via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Poll and connection identifiers
//! - [`enums`] -- Option selectors and vote rejection codes
//! - [`view`] -- Projected poll views with live tallies
//! - [`realtime`] -- Client and server `WebSocket` messages

pub mod enums;
pub mod ids;
pub mod realtime;
pub mod view;

pub use enums::{OptionSelector, RejectionReason};
pub use ids::{ConnectionId, PollId};
pub use realtime::{ChatMessage, ClientEvent, Participant, ServerEvent, VoteRejectedNotice};
pub use view::{OptionTally, PollView};
