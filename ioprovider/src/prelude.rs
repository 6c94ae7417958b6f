//! Common `ioprovider` imports for downstream crates.

pub use crate::{
    AiConfig, MediaItem, MediaKind, Message, MessageContent, Model, ModelProvider, Provider,
    ProviderError, ProviderErrorKind, ProviderFuture, ProviderRegistry, Role, User, catalog,
};
pub use iocommon::BoxFuture;
