//! Core typing-session engine and progress persistence for Versetype.

mod clock;
mod corpus;
mod db;
mod engine;
mod error;
mod file_store;
mod normalize;
mod session;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use corpus::{PassageIndex, load_corpus, parse_corpus};
pub use db::SqliteProgressStore;
pub use engine::{EngineOutput, SessionEngine, QUIT_TOKEN};
pub use error::VersetypeError;
pub use file_store::FileProgressStore;
pub use normalize::normalize;
pub use session::{Selection, Session, SessionState};
pub use store::{MemoryProgressStore, ProgressStore};

/// Result type for Versetype operations.
pub type Result<T> = std::result::Result<T, VersetypeError>;
