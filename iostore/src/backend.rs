//! Store selection and construction.

use std::path::PathBuf;
use std::sync::Arc;

use iochat::{ChatStore, InMemoryChatStore};

use crate::error::StoreError;
use crate::sqlite::default_sqlite_path;

pub use crate::sqlite::SqliteChatStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Sqlite { path: PathBuf },
    InMemory,
}

impl StoreConfig {
    /// `:memory:` selects the process-local store; anything else is a SQLite file.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.as_os_str() == ":memory:" {
            Self::InMemory
        } else {
            Self::Sqlite { path }
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: default_sqlite_path(),
        }
    }
}

pub fn create_chat_store(config: StoreConfig) -> Result<Arc<dyn ChatStore>, StoreError> {
    match config {
        StoreConfig::Sqlite { path } => Ok(Arc::new(SqliteChatStore::new(path)?)),
        StoreConfig::InMemory => Ok(Arc::new(InMemoryChatStore::new())),
    }
}

pub fn create_default_chat_store() -> Result<Arc<dyn ChatStore>, StoreError> {
    create_chat_store(StoreConfig::default())
}
