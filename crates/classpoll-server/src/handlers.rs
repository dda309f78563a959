//! REST API endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `POST` | `/api/polls/create` | Create a poll (ends any running poll) |
//! | `POST` | `/api/polls/vote` | Vote on the active poll |
//! | `GET` | `/api/polls/active` | The active poll, or `null` |
//! | `GET` | `/api/polls/history` | Every finished poll |

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::Json;
use classpoll_core::NewOption;
use classpoll_types::OptionSelector;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/polls/create`.
#[derive(Debug, Deserialize)]
pub struct CreatePollRequest {
    /// The question text.
    pub question: String,
    /// At least two options.
    pub options: Vec<NewOption>,
    /// Voting window length in seconds.
    pub duration: i64,
}

/// Request body for `POST /api/polls/vote`.
///
/// `option` may be an index or the option's text.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    /// The voting student's name.
    pub student_name: String,
    /// The chosen option.
    #[serde(alias = "optionIndex", alias = "selectedOption")]
    pub option: OptionSelector,
}

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Always `true`.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    /// The payload.
    pub data: T,
}

impl<T> ApiResponse<T> {
    fn ok(message: &str, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.to_owned(),
            data,
        })
    }
}

// ---------------------------------------------------------------------------
// GET /
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing the current poll state.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let active = state.active_poll().await;
    let history = state.history().await.len();
    let participants = state.participants().await.len();

    let current = active.map_or_else(
        || String::from("none"),
        |p| format!("{} ({} responses)", html_escape(&p.question), p.total_responses),
    );

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Classpoll</title></head>
<body>
    <h1>Classpoll</h1>
    <p>Active poll: {current}</p>
    <p>Finished polls: {history}</p>
    <p>Participants: {participants}</p>
    <ul>
        <li><a href="/api/polls/active">/api/polls/active</a></li>
        <li><a href="/api/polls/history">/api/polls/history</a></li>
        <li><code>ws://host:port/ws</code></li>
    </ul>
</body>
</html>"#
    ))
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

// ---------------------------------------------------------------------------
// POST /api/polls/create
// ---------------------------------------------------------------------------

/// Create a poll and broadcast `poll-started`.
pub async fn create_poll(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreatePollRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let view = state
        .create_poll(&req.question, &req.options, req.duration)
        .await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Poll created successfully", view),
    ))
}

// ---------------------------------------------------------------------------
// POST /api/polls/vote
// ---------------------------------------------------------------------------

/// Vote on the active poll and broadcast `poll-updated`.
pub async fn vote(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let view = state.vote(&req.student_name, &req.option).await?;
    Ok(ApiResponse::ok("Vote submitted", view))
}

// ---------------------------------------------------------------------------
// GET /api/polls/active
// ---------------------------------------------------------------------------

/// Return the active poll with its live tally, or `null`.
pub async fn active_poll(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.active_poll().await)
}

// ---------------------------------------------------------------------------
// GET /api/polls/history
// ---------------------------------------------------------------------------

/// Return every finished poll, oldest first.
pub async fn history(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ApiResponse::ok("Poll history fetched successfully", state.history().await)
}
