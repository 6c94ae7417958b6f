//! The capability every LLM backend implements.

use crate::{AiConfig, Message, MessageContent, ProviderError};

pub type ProviderFuture<'a, T> = iocommon::BoxFuture<'a, T>;

/// Produces a reply for an ordered conversation history under one AI config.
///
/// `history` is ascending by creation time and already contains the newest
/// user turn. Adapters must not download or transcode media; attachments are
/// forwarded by URL or dropped.
pub trait ModelProvider: Send + Sync {
    /// Registry key, matching the catalog provider name (for example `"openai"`).
    fn name(&self) -> &str;

    fn send_message<'a>(
        &'a self,
        history: &'a [Message],
        config: &'a AiConfig,
    ) -> ProviderFuture<'a, Result<MessageContent, ProviderError>>;
}
