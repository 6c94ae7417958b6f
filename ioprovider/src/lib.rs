//! Domain model, catalog and provider adapters for the io chat backend.
//!
//! Every LLM backend implements [`ModelProvider`]; a [`ProviderRegistry`] maps
//! catalog provider names to implementations at startup.
//!
//! ```rust
//! use ioprovider::{ProviderRegistry, catalog};
//!
//! let registry = ProviderRegistry::new();
//! assert!(!registry.contains(catalog::DEFAULT_PROVIDER));
//! ```

pub mod adapters;
pub mod catalog;
pub mod credentials;
pub mod error;
pub mod model;
pub mod prelude;
pub mod provider;
pub mod registry;

pub use catalog::{CatalogEntry, CatalogError, CatalogErrorKind};
pub use credentials::{SecretString, SecureCredentialManager};
pub use error::{ProviderError, ProviderErrorKind};
pub use model::{
    AiConfig, MediaItem, MediaKind, Message, MessageContent, Model, Provider, Role, User,
};
pub use provider::{ModelProvider, ProviderFuture};
pub use registry::ProviderRegistry;
