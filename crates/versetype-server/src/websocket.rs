//! WebSocket connection handling.
//!
//! Each connection owns one [`SessionEngine`]. Inbound frames are handled one
//! at a time, in arrival order; the engine runs on the blocking pool because
//! progress store calls may block on I/O.

use crate::state::AppState;
use anyhow::Result;
use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use versetype_core::SessionEngine;
use versetype_types::{WsClientMessage, WsServerMessage};

/// Frames queued for the send task.
#[derive(Debug)]
enum Outgoing {
    Message(WsServerMessage),
    /// Send a close frame and stop.
    Close,
}

pub async fn handle_websocket(socket: WebSocket, state: Arc<AppState>, user_id: String) -> Result<()> {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (outgoing_tx, mut outgoing_rx) = mpsc::channel::<Outgoing>(32);

    info!(target: "versetype::ws", "Client connected: user {}", user_id);

    let engine = SessionEngine::new(
        user_id.clone(),
        state.index.clone(),
        state.store.clone(),
        state.clock.clone(),
    );

    // Forward queued messages to the socket
    let send_user = user_id.clone();
    let mut send_task = tokio::spawn(async move {
        while let Some(outgoing) = outgoing_rx.recv().await {
            let msg = match outgoing {
                Outgoing::Message(msg) => msg,
                Outgoing::Close => {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
            };
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    debug!(target: "versetype::ws", "Failed to serialize message for user {}: {}", send_user, e);
                    continue;
                }
            };
            if let Err(e) = ws_tx.send(Message::Text(json.into())).await {
                debug!(target: "versetype::ws", "WebSocket send failed for user {}: {}", send_user, e);
                break;
            }
        }
    });

    // Handle incoming messages
    let recv_user = user_id.clone();
    let mut recv_task = tokio::spawn(async move {
        let (mut engine, books) = run_engine(engine, |engine| engine.books()).await?;
        let greeting = [
            WsServerMessage::Welcome {
                user_id: recv_user.clone(),
            },
            books,
        ];
        for msg in greeting {
            if outgoing_tx.send(Outgoing::Message(msg)).await.is_err() {
                return Ok(());
            }
        }

        while let Some(frame) = ws_rx.next().await {
            let text = match frame {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(_)) => break,
                Ok(_) => continue,
                Err(e) => {
                    debug!(target: "versetype::ws", "WebSocket read failed for user {}: {}", recv_user, e);
                    break;
                }
            };

            let client_msg = match serde_json::from_str::<WsClientMessage>(text.as_str()) {
                Ok(msg) => msg,
                Err(e) => {
                    debug!(target: "versetype::ws", "Ignoring unrecognized message from user {}: {}", recv_user, e);
                    continue;
                }
            };

            let (returned, output) = run_engine(engine, move |engine| engine.handle(client_msg)).await?;
            engine = returned;

            for msg in output.messages {
                if outgoing_tx.send(Outgoing::Message(msg)).await.is_err() {
                    return Ok(());
                }
            }
            if output.close {
                let _ = outgoing_tx.send(Outgoing::Close).await;
                break;
            }
        }
        Ok::<(), anyhow::Error>(())
    });

    // A closed socket stops both sides; a finished reader lets the writer
    // drain what is queued (such as the farewell) first.
    let result = tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
            Ok(())
        }
        joined = &mut recv_task => {
            let _ = (&mut send_task).await;
            joined.map_err(anyhow::Error::from).and_then(|r| r)
        }
    };

    info!(target: "versetype::ws", "Client disconnected: user {}", user_id);
    result
}

/// Run `f` against the engine on the blocking pool and hand the engine back.
///
/// If the connection goes away meanwhile, the blocking call still runs to
/// completion on its own.
async fn run_engine<T, F>(mut engine: SessionEngine, f: F) -> Result<(SessionEngine, T)>
where
    T: Send + 'static,
    F: FnOnce(&mut SessionEngine) -> T + Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || {
        let out = f(&mut engine);
        (engine, out)
    })
    .await?;
    Ok(result)
}
