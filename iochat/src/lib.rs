//! Session and conversation orchestration over model providers.
//!
//! The [`ChatService`] turns one inbound chat message into a persisted exchange:
//! it resolves the author, continues or starts the active conversation, stores
//! the message, asks the active configuration's provider for a reply and stores
//! that too. Shared session state lives in a [`SessionCache`].

mod bootstrap;
pub mod codec;
mod config;
mod conversation;
mod error;
mod hooks;
mod service;
mod session;
mod store;
mod types;
mod users;

pub mod prelude {
    pub use crate::{
        ChatError, ChatErrorKind, ChatOperation, ChatPhase, ChatService, ChatServiceBuilder,
        ChatStore, Conversation, ConversationParticipant, ErrorCategory, InMemoryChatStore,
        NoopPipelineHooks, PipelineHooks, SessionSnapshot,
    };
    pub use ioprovider::{AiConfig, MediaItem, Message, MessageContent, Role, User};
}

pub use bootstrap::{create_default_config, sync_catalog};
pub use config::ConfigResolver;
pub use conversation::{
    ConversationManager, DEFAULT_SESSION_TTL_MINUTES, conversation_name, default_session_ttl,
};
pub use error::{ChatError, ChatErrorKind, ErrorCategory};
pub use hooks::{ChatOperation, ChatPhase, NoopPipelineHooks, PipelineHooks};
pub use service::{ChatService, ChatServiceBuilder};
pub use session::{SessionCache, SessionSnapshot, SharedConversation};
pub use store::{ChatFuture, ChatStore, InMemoryChatStore};
pub use types::{Conversation, ConversationParticipant, NewAiConfig, NewMessage, StoredMessage};
pub use users::{UserRegistry, normalize_username};
