//! `WebSocket` handler for the realtime channel.
//!
//! Clients connect to `GET /ws`. Each connection subscribes to the shared
//! broadcast channel and forwards every event addressed to everyone or to
//! itself. Incoming text frames are parsed as [`ClientEvent`]s and handled
//! by [`dispatch`]; replies meant only for the sender are written straight
//! back to the socket.
//!
//! If a client falls behind, lagged events are skipped and the client
//! resumes from the most recent one.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use chrono::Utc;
use classpoll_types::{ChatMessage, ClientEvent, ConnectionId, ServerEvent, VoteRejectedNotice};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_connect(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Run one connection, then drop it from the roster.
async fn handle_ws(socket: WebSocket, state: Arc<AppState>) {
    let connection = state.next_connection_id();
    debug!(%connection, "WebSocket client connected");

    run_connection(socket, &state, connection).await;

    let mut roster = state.roster.lock().await;
    if let Some(name) = roster.unregister(connection) {
        debug!(%connection, name = %name, "Student left");
        state.broadcast(ServerEvent::StudentList(roster.participants()));
    }
}

async fn run_connection(mut socket: WebSocket, state: &AppState, connection: ConnectionId) {
    let mut rx = state.subscribe();

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(outbound) if outbound.is_for(connection) => {
                        let kicked = matches!(outbound.event, ServerEvent::Kicked { .. });
                        if !send_event(&mut socket, &outbound.event).await {
                            debug!(%connection, "WebSocket client disconnected (send failed)");
                            return;
                        }
                        if kicked {
                            let _ = socket.send(Message::Close(None)).await;
                            return;
                        }
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(n)) => {
                        debug!(%connection, skipped = n, "WebSocket client lagged, skipping ahead");
                    }
                    Err(RecvError::Closed) => {
                        debug!("Broadcast channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientEvent>(text.as_str()) {
                            Ok(event) => {
                                if let Some(reply) = dispatch(state, connection, event).await {
                                    if !send_event(&mut socket, &reply).await {
                                        return;
                                    }
                                }
                            }
                            Err(e) => warn!(%connection, "Ignoring malformed client frame: {e}"),
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(%connection, "WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!(%connection, "WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(%connection, "WebSocket error: {e}");
                        return;
                    }
                    _ => {}
                }
            }
        }
    }
}

/// Serialize and send one event. Returns `false` once the socket is gone.
async fn send_event(socket: &mut WebSocket, event: &ServerEvent) -> bool {
    let json = match serde_json::to_string(event) {
        Ok(j) => j,
        Err(e) => {
            warn!("Failed to serialize server event: {e}");
            return true;
        }
    };
    socket.send(Message::Text(json.into())).await.is_ok()
}

/// Apply one client event.
///
/// Effects meant for everyone go out over the broadcast channel. The
/// return value, if any, is a reply for the sending connection only.
pub async fn dispatch(
    state: &AppState,
    connection: ConnectionId,
    event: ClientEvent,
) -> Option<ServerEvent> {
    match event {
        ClientEvent::RegisterStudent { name } => {
            let name = name.trim();
            if name.is_empty() {
                warn!(%connection, "Ignoring registration with blank name");
                return None;
            }
            info!(%connection, name, "Student registered");
            let mut roster = state.roster.lock().await;
            roster.register(connection, name);
            state.broadcast(ServerEvent::StudentList(roster.participants()));
            None
        }

        ClientEvent::Vote {
            student_name,
            option,
        } => match state.vote(&student_name, &option).await {
            Ok(_) => None,
            Err(e) => {
                debug!(%connection, student = %student_name, "Vote rejected: {e}");
                e.rejection_reason().map(|reason| {
                    ServerEvent::VoteRejected(VoteRejectedNotice {
                        reason,
                        message: e.to_string(),
                    })
                })
            }
        },

        ClientEvent::ChatMessage { name, message } => {
            if name.trim().is_empty() || message.trim().is_empty() {
                return None;
            }
            state.broadcast(ServerEvent::ChatBroadcast(ChatMessage {
                name,
                message,
                timestamp: Utc::now(),
            }));
            None
        }

        ClientEvent::GetStudentList => Some(ServerEvent::StudentList(state.participants().await)),

        ClientEvent::KickStudent { name } => {
            let mut roster = state.roster.lock().await;
            match roster.remove_by_name(&name) {
                Some(target) => {
                    info!(%target, name = %name, "Kicking student");
                    state.send_to(target, ServerEvent::Kicked { name });
                    state.broadcast(ServerEvent::StudentList(roster.participants()));
                }
                None => warn!(name = %name, "Student not found for kick"),
            }
            None
        }
    }
}
