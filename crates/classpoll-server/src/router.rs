//! Axum router construction.
//!
//! Assembles the poll REST endpoints and the realtime `WebSocket` route
//! into a single [`Router`] with CORS and request tracing.

use std::sync::Arc;

use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /ws` -- realtime `WebSocket` channel
/// - `POST /api/polls/create` -- create a poll
/// - `POST /api/polls/vote` -- vote on the active poll
/// - `GET /api/polls/active` -- active poll or `null`
/// - `GET /api/polls/history` -- finished polls
///
/// CORS allows any origin for `GET` and `POST`; browsers load the client
/// from a different origin than the API.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/ws", get(ws::ws_connect))
        .route("/api/polls/create", post(handlers::create_poll))
        .route("/api/polls/vote", post(handlers::vote))
        .route("/api/polls/active", get(handlers::active_poll))
        .route("/api/polls/history", get(handlers::history))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
