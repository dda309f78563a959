//! Error types for the HTTP surface.
//!
//! [`ApiError`] unifies every failure a request can hit into one enum that
//! converts into an Axum response. The JSON body always carries a stable
//! `reason` code next to the human-readable message:
//!
//! ```json
//! { "success": false, "message": "ana has already voted", "reason": "already_voted", "status": 409 }
//! ```

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use classpoll_core::{ValidationError, VoteRejected};
use classpoll_types::RejectionReason;

/// Errors that can occur while serving a request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A create-poll request failed validation.
    #[error("invalid poll: {0}")]
    Validation(#[from] ValidationError),

    /// A vote was refused by the engine.
    #[error("{0}")]
    Rejected(#[from] VoteRejected),

    /// The voting student's name was blank.
    #[error("student name must not be empty")]
    InvalidStudentName,

    /// The request body could not be parsed.
    #[error("invalid request body: {0}")]
    BadRequest(String),
}

impl ApiError {
    /// The vote rejection code, for errors that are vote rejections.
    pub const fn rejection_reason(&self) -> Option<RejectionReason> {
        match self {
            Self::Rejected(r) => Some(r.reason()),
            Self::InvalidStudentName => Some(RejectionReason::InvalidStudentName),
            Self::Validation(_) | Self::BadRequest(_) => None,
        }
    }

    /// HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Rejected(VoteRejected::NoActivePoll) => StatusCode::NOT_FOUND,
            Self::Rejected(VoteRejected::PollExpired { .. }) => StatusCode::GONE,
            Self::Rejected(VoteRejected::AlreadyVoted { .. }) => StatusCode::CONFLICT,
            Self::Rejected(VoteRejected::InvalidOption { .. })
            | Self::Validation(_)
            | Self::InvalidStudentName
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn reason_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::BadRequest(_) => "bad_request",
            Self::Rejected(r) => r.reason().as_str(),
            Self::InvalidStudentName => RejectionReason::InvalidStudentName.as_str(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({
            "success": false,
            "message": self.to_string(),
            "reason": self.reason_code(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
