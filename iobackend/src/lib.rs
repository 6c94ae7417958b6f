//! Single-dependency facade over the io workspace crates.
//!
//! Re-exports the chat core, providers, storage and observability crates and
//! wires them into a ready [`Backend`] from environment configuration.
//!
//! ```rust,no_run
//! use iobackend::{BackendConfig, build_backend, io_content};
//!
//! # async fn run() -> Result<(), iobackend::BackendError> {
//! let backend = build_backend(BackendConfig::from_env()?).await?;
//! let reply = backend.chat.send_message(io_content!("hello"), "erin").await?;
//! println!("{}", reply.content.text);
//! # Ok(())
//! # }
//! ```

mod macros;

pub mod config;
pub mod prelude;
pub mod providers;
pub mod runtime;
pub mod util;

pub use iochat;
pub use iocommon;
pub use ioobserve;
pub use ioprovider;
pub use iostore;

pub use iochat::{
    ChatError, ChatErrorKind, ChatOperation, ChatPhase, ChatService, ChatServiceBuilder,
    ChatStore, Conversation, ConversationParticipant, ErrorCategory, InMemoryChatStore,
    NoopPipelineHooks, PipelineHooks, SessionSnapshot,
};
pub use iocommon::{BoxFuture, Clock, SystemClock};
pub use ioobserve::{
    FanoutPipelineHooks, MetricsPipelineHooks, SafePipelineHooks, TracingPipelineHooks,
};
pub use ioprovider::{
    AiConfig, MediaItem, MediaKind, Message, MessageContent, ModelProvider, ProviderError,
    ProviderErrorKind, ProviderFuture, ProviderRegistry, Role, SecureCredentialManager, User,
};
pub use iostore::{SqliteChatStore, StoreConfig, StoreError, StoreErrorKind};

pub use config::{BackendConfig, BackendError, BackendErrorKind};
pub use providers::{build_provider_from_api_key, build_provider_registry};
pub use runtime::{Backend, build_backend, build_backend_with, default_hooks, in_memory_backend};
pub use util::{file, image, parse_provider_name, text};
