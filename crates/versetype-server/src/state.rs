//! Shared application state.

use crate::config::{Config, StorageBackend};
use std::sync::Arc;
use tracing::info;
use versetype_core::{
    Clock, FileProgressStore, MemoryProgressStore, PassageIndex, ProgressStore,
    SqliteProgressStore, SystemClock,
};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub index: Arc<PassageIndex>,
    pub store: Arc<dyn ProgressStore>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Load the corpus and open the configured progress store.
    ///
    /// Fails when the corpus is missing or empty; nothing can run without it.
    pub fn new(config: Config) -> versetype_core::Result<Self> {
        let index = Arc::new(versetype_core::load_corpus(&config.corpus_path)?);
        let store = open_store(&config)?;
        Ok(Self::from_parts(config, index, store, Arc::new(SystemClock)))
    }

    pub fn from_parts(
        config: Config,
        index: Arc<PassageIndex>,
        store: Arc<dyn ProgressStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            index,
            store,
            clock,
        }
    }
}

fn open_store(config: &Config) -> versetype_core::Result<Arc<dyn ProgressStore>> {
    let store: Arc<dyn ProgressStore> = match config.storage {
        StorageBackend::Sqlite => {
            info!(target: "versetype::startup", "Using SQLite progress store at {}", config.db_path.display());
            Arc::new(SqliteProgressStore::open(&config.db_path)?)
        }
        StorageBackend::File => {
            info!(target: "versetype::startup", "Using file progress store at {}", config.progress_file.display());
            Arc::new(FileProgressStore::open(&config.progress_file)?)
        }
        StorageBackend::Memory => {
            info!(target: "versetype::startup", "Using in-memory progress store; progress is lost on restart");
            Arc::new(MemoryProgressStore::new())
        }
    };
    Ok(store)
}
