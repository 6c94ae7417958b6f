//! Common imports for applications embedding the io backend.

pub use crate::io_content;
pub use crate::{
    Backend, BackendConfig, BackendError, BackendErrorKind, build_backend, build_backend_with,
    build_provider_from_api_key, build_provider_registry, in_memory_backend, parse_provider_name,
};
pub use crate::{
    AiConfig, ChatError, ChatErrorKind, ChatService, ChatStore, Conversation, ErrorCategory,
    InMemoryChatStore, MediaItem, Message, MessageContent, ModelProvider, ProviderError,
    ProviderRegistry, Role, StoreConfig, User,
};
