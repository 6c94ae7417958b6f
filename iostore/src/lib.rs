//! Durable chat persistence for the io backend.
//!
//! ```rust
//! use iostore::StoreConfig;
//!
//! assert_eq!(StoreConfig::from_path(":memory:"), StoreConfig::InMemory);
//! ```

mod backend;
mod error;
mod sqlite;

pub mod prelude {
    pub use crate::{
        SqliteChatStore, StoreConfig, StoreError, StoreErrorKind, create_chat_store,
        create_default_chat_store,
    };
}

pub use backend::{SqliteChatStore, StoreConfig, create_chat_store, create_default_chat_store};
pub use error::{StoreError, StoreErrorKind};
