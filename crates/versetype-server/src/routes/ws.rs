//! WebSocket route handler.

use crate::state::AppState;
use crate::websocket::handle_websocket;
use axum::{
    extract::{
        ws::{WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// Longest user identifier accepted from the client.
const MAX_USER_ID_LEN: usize = 128;

#[derive(Debug, Deserialize)]
pub struct ConnectParams {
    /// Opaque user identifier; a fresh one is issued when absent.
    pub uid: Option<String>,
}

pub async fn upgrade(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ConnectParams>,
    ws: WebSocketUpgrade,
) -> Response {
    let user_id = resolve_user_id(params.uid.as_deref());
    ws.on_upgrade(move |socket| handle_connection(socket, state, user_id))
}

async fn handle_connection(socket: WebSocket, state: Arc<AppState>, user_id: String) {
    if let Err(e) = handle_websocket(socket, state, user_id.clone()).await {
        tracing::error!(target: "versetype::ws", "WebSocket error for user {}: {}", user_id, e);
    }
}

fn resolve_user_id(uid: Option<&str>) -> String {
    match uid.map(str::trim) {
        Some(uid) if !uid.is_empty() && uid.len() <= MAX_USER_ID_LEN => uid.to_string(),
        _ => Uuid::new_v4().to_string(),
    }
}
