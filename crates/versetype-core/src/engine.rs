//! Session engine: turns client messages into session mutations and replies.
//!
//! One engine exists per connection and handles messages strictly in order,
//! so it needs no locking of its own. Durable progress goes through the
//! [`ProgressStore`]; storage failures are reported to the client as a
//! notice and the session carries on with its in-memory state.

use crate::{normalize, Clock, PassageIndex, ProgressStore, Selection, Session, SessionState, VersetypeError};
use std::sync::Arc;
use tracing::{debug, info, warn};
use versetype_types::{ProgressRecord, RuntimeMetrics, WsClientMessage, WsServerMessage};

/// Submission that ends the connection, compared case-insensitively.
pub const QUIT_TOKEN: &str = "quit";

/// Reply to the quit token.
const FAREWELL: &str = "goodbye";

/// Maximum size for a single submission (10KB)
const MAX_SUBMISSION_SIZE: usize = 10 * 1024;

/// Characters per word for words-per-minute.
const CHARS_PER_WORD: f64 = 5.0;

/// Replies produced by one inbound message.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EngineOutput {
    pub messages: Vec<WsServerMessage>,
    /// The connection should be closed once `messages` are sent.
    pub close: bool,
}

impl EngineOutput {
    fn push(&mut self, msg: WsServerMessage) {
        self.messages.push(msg);
    }
}

pub struct SessionEngine {
    index: Arc<PassageIndex>,
    store: Arc<dyn ProgressStore>,
    clock: Arc<dyn Clock>,
    session: Session,
}

impl SessionEngine {
    pub fn new(
        user_id: impl Into<String>,
        index: Arc<PassageIndex>,
        store: Arc<dyn ProgressStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let session = Session::new(user_id, clock.now());
        Self {
            index,
            store,
            clock,
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state
    }

    /// Process one client message.
    pub fn handle(&mut self, msg: WsClientMessage) -> EngineOutput {
        let mut out = EngineOutput::default();
        match msg {
            WsClientMessage::SelectCollection { content } => self.select_collection(content.trim(), &mut out),
            WsClientMessage::Submit { content } => self.submit(&content, &mut out),
            WsClientMessage::Jump { content } => self.jump(&content, &mut out),
            WsClientMessage::GetBooks => out.push(self.books()),
        }
        out
    }

    /// Collection picker with the user's completion percentages.
    pub fn books(&self) -> WsServerMessage {
        let percents = match self.store.list_all(&self.session.user_id) {
            Ok(percents) => percents,
            Err(e) => {
                warn!(target: "versetype::store", "Failed to list progress for {}: {}", self.session.user_id, e);
                Default::default()
            }
        };
        WsServerMessage::Books {
            books: self.index.book_progress(&percents),
        }
    }

    fn select_collection(&mut self, name: &str, out: &mut EngineOutput) {
        let Some(passages) = self.index.get(name) else {
            debug!(target: "versetype::session", "User {} selected unknown collection '{}'", self.session.user_id, name);
            out.push(input_error(VersetypeError::UnknownCollection(name.to_string())));
            return;
        };
        let total = passages.len() as u32;
        let user_id = self.session.user_id.clone();

        let mut record = match self.store.get_or_create(&user_id, name, total) {
            Ok(record) => record,
            Err(e) => {
                warn!(target: "versetype::store", "Failed to load progress for {}/{}: {}", user_id, name, e);
                out.push(storage_notice("Progress could not be loaded", &e));
                ProgressRecord::new(total)
            }
        };

        let reconcile = record.total_count != total || record.current_index > total;
        if reconcile {
            warn!(
                target: "versetype::session",
                "Stored progress for {}/{} expects {} passages at index {}, collection has {}",
                user_id, name, record.total_count, record.current_index, total
            );
            record.total_count = total;
            record.current_index = record.current_index.min(total);
        }

        self.session.metrics = RuntimeMetrics::reset_at(self.clock.now());
        self.session.selection = Some(Selection {
            collection: name.to_string(),
            passages,
            record,
            cursor: record.current_index,
        });
        info!(
            target: "versetype::session",
            "User {} selected '{}' at passage {}/{}",
            user_id, name, record.current_index, total
        );

        if reconcile {
            if let Some(notice) = self.persist() {
                out.push(notice);
            }
        }
        self.present(out);
    }

    fn submit(&mut self, text: &str, out: &mut EngineOutput) {
        if self.session.state != SessionState::AwaitingInput {
            debug!(target: "versetype::session", "Ignoring submission in state {:?}", self.session.state);
            return;
        }
        if text.len() > MAX_SUBMISSION_SIZE {
            warn!(
                target: "versetype::session",
                "Submission too large ({} bytes) from {}, max {} bytes",
                text.len(),
                self.session.user_id,
                MAX_SUBMISSION_SIZE
            );
            out.push(WsServerMessage::Error {
                content: format!("Submission too large (max {} bytes)", MAX_SUBMISSION_SIZE),
            });
            return;
        }
        let Some(selection) = self.session.selection.as_mut() else {
            return;
        };
        let Some(passage) = selection.current_passage() else {
            return;
        };

        let input = normalize(text);
        let input = input.trim();
        let target = normalize(&passage.text);
        let target = target.trim();

        if input.to_lowercase() == QUIT_TOKEN {
            info!(target: "versetype::session", "User {} quit", self.session.user_id);
            out.push(WsServerMessage::Response {
                content: FAREWELL.to_string(),
            });
            out.close = true;
            return;
        }

        let now = self.clock.now();
        let metrics = &mut self.session.metrics;
        if !metrics.started && !input.is_empty() {
            metrics.started = true;
            metrics.start_time = now;
        }
        metrics.chars_typed += input.chars().count() as u64;

        let replaying = selection.is_replaying();
        let matched = input == target;

        if matched {
            metrics.correct_chars += target.chars().count() as u64;
            let elapsed_ms = (now - metrics.start_time).num_milliseconds();
            if elapsed_ms > 0 {
                let minutes = elapsed_ms as f64 / 60_000.0;
                metrics.wpm = (metrics.correct_chars as f64 / CHARS_PER_WORD / minutes) as u32;
            }

            if replaying {
                selection.cursor += 1;
                if selection.cursor >= selection.total() {
                    selection.cursor = selection.record.current_index;
                }
            } else {
                selection.record.correct += 1;
                selection.record.current_index += 1;
                selection.cursor = selection.record.current_index;
            }
        } else if !replaying {
            selection.record.mistakes += 1;
        }

        debug!(
            target: "versetype::session",
            "User {} submission {} (replay: {})",
            self.session.user_id,
            if matched { "correct" } else { "wrong" },
            replaying
        );

        let notice = if replaying { None } else { self.persist() };

        out.push(if matched { WsServerMessage::Correct } else { WsServerMessage::Wrong });
        if let Some(stats) = self.session.stats() {
            out.push(WsServerMessage::Stats { stats });
        }
        if matched {
            self.present(out);
        }
        if let Some(notice) = notice {
            out.push(notice);
        }
    }

    fn jump(&mut self, content: &str, out: &mut EngineOutput) {
        let Some(selection) = self.session.selection.as_mut() else {
            out.push(WsServerMessage::Error {
                content: "Select a collection first".to_string(),
            });
            return;
        };
        let total = selection.total();
        let position = match content.trim().parse::<u32>() {
            Ok(position) if (1..=total).contains(&position) => position,
            _ => {
                out.push(input_error(VersetypeError::PassageOutOfRange {
                    position: content.trim().to_string(),
                    total,
                }));
                return;
            }
        };

        selection.cursor = position - 1;
        debug!(
            target: "versetype::session",
            "User {} jumped to passage {} of '{}'",
            self.session.user_id, position, selection.collection
        );
        self.present(out);
    }

    /// Show the passage under the cursor, or completion once past the end.
    fn present(&mut self, out: &mut EngineOutput) {
        let Some(stats) = self.session.stats() else {
            return;
        };
        let Some(selection) = self.session.selection.as_ref() else {
            return;
        };

        match selection.current_passage() {
            Some(passage) => {
                self.session.state = SessionState::AwaitingInput;
                out.push(WsServerMessage::Verse {
                    content: passage.text.clone(),
                    passage: passage.meta(),
                    number: selection.cursor + 1,
                    total: selection.total(),
                    stats,
                });
            }
            None => {
                info!(
                    target: "versetype::session",
                    "User {} completed '{}'",
                    self.session.user_id, selection.collection
                );
                self.session.state = SessionState::Completed;
                out.push(WsServerMessage::Complete {
                    content: "complete".to_string(),
                    stats,
                });
            }
        }
    }

    /// Write the working record through to the store.
    ///
    /// On success the merged record becomes the working copy. On failure the
    /// in-memory record is kept and a notice for the client is returned.
    fn persist(&mut self) -> Option<WsServerMessage> {
        let user_id = &self.session.user_id;
        let selection = self.session.selection.as_mut()?;

        match self.store.update(user_id, &selection.collection, &selection.record) {
            Ok(merged) => {
                let at_frontier = !selection.is_replaying();
                selection.record = merged;
                if at_frontier {
                    selection.cursor = merged.current_index;
                }
                None
            }
            Err(e) => {
                warn!(
                    target: "versetype::store",
                    "Failed to save progress for {}/{}: {}",
                    user_id, selection.collection, e
                );
                Some(storage_notice("Progress could not be saved", &e))
            }
        }
    }
}

fn input_error(err: VersetypeError) -> WsServerMessage {
    WsServerMessage::Error {
        content: err.to_string(),
    }
}

fn storage_notice(what: &str, err: &VersetypeError) -> WsServerMessage {
    WsServerMessage::Notice {
        content: format!("{}: {}", what, err),
    }
}
