//! WebSocket message protocol between client and server.

use serde::{Deserialize, Serialize};

use crate::{BookProgress, PassageMeta, StatsSnapshot};

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsClientMessage {
    /// Choose a collection to practice. `content` is the collection name.
    SelectCollection { content: String },
    /// Typed attempt at the passage on screen.
    Submit { content: String },
    /// Revisit a passage. `content` is a 1-based decimal passage number.
    Jump { content: String },
    /// Request the collection picker again.
    GetBooks,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsServerMessage {
    /// Identity the client should reconnect with.
    Welcome { user_id: String },
    /// Collection picker.
    Books { books: Vec<BookProgress> },
    /// Passage presentation.
    Verse {
        content: String,
        passage: PassageMeta,
        /// 1-based position within the collection.
        number: u32,
        total: u32,
        stats: StatsSnapshot,
    },
    Correct,
    Wrong,
    Stats { stats: StatsSnapshot },
    /// The selected collection has no passages left.
    Complete { content: String, stats: StatsSnapshot },
    Error { content: String },
    /// Informational message, e.g. progress could not be saved.
    Notice { content: String },
    /// Plain response, used for the quit acknowledgment.
    Response { content: String },
}
