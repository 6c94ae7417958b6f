//! Runtime wiring: store, providers, observability and bootstrap.

use std::sync::Arc;

use chrono::TimeDelta;
use iochat::{ChatService, ChatStore, InMemoryChatStore, default_session_ttl};
use ioobserve::{
    FanoutPipelineHooks, MetricsPipelineHooks, SafePipelineHooks, TracingPipelineHooks,
};
use ioprovider::ProviderRegistry;
use iostore::create_chat_store;

use crate::config::{BackendConfig, BackendError};
use crate::providers::build_provider_registry;

#[derive(Clone)]
pub struct Backend {
    pub store: Arc<dyn ChatStore>,
    pub chat: ChatService,
}

/// Opens the configured store, builds the providers and bootstraps the database.
pub async fn build_backend(config: BackendConfig) -> Result<Backend, BackendError> {
    let store = create_chat_store(config.store.clone())?;
    let providers = build_provider_registry(&config)?;
    build_backend_with(store, providers, config.session_ttl).await
}

pub async fn build_backend_with(
    store: Arc<dyn ChatStore>,
    providers: ProviderRegistry,
    session_ttl: TimeDelta,
) -> Result<Backend, BackendError> {
    let chat = ChatService::builder(Arc::clone(&store))
        .providers(providers)
        .hooks(Arc::new(default_hooks()))
        .session_ttl(session_ttl)
        .build();
    chat.initialize_database().await?;

    tracing::info!(
        providers = ?chat.providers().names(),
        session_ttl_minutes = session_ttl.num_minutes(),
        "io backend ready"
    );
    Ok(Backend { store, chat })
}

/// A bootstrapped backend over the process-local store.
pub async fn in_memory_backend(providers: ProviderRegistry) -> Result<Backend, BackendError> {
    build_backend_with(
        Arc::new(InMemoryChatStore::new()),
        providers,
        default_session_ttl(),
    )
    .await
}

pub fn default_hooks() -> FanoutPipelineHooks {
    FanoutPipelineHooks::new()
        .with(SafePipelineHooks::new(TracingPipelineHooks))
        .with(SafePipelineHooks::new(MetricsPipelineHooks))
}

#[cfg(test)]
mod tests {
    use iochat::ErrorCategory;
    use ioprovider::{AiConfig, Message, MessageContent, ModelProvider, ProviderError, ProviderFuture};

    use super::*;

    struct ShoutingProvider;

    impl ModelProvider for ShoutingProvider {
        fn name(&self) -> &str {
            "openai"
        }

        fn send_message<'a>(
            &'a self,
            history: &'a [Message],
            _config: &'a AiConfig,
        ) -> ProviderFuture<'a, Result<MessageContent, ProviderError>> {
            Box::pin(async move {
                let last = history
                    .last()
                    .map(|message| message.content.text.to_uppercase())
                    .unwrap_or_default();
                Ok(MessageContent::text(last))
            })
        }
    }

    #[tokio::test]
    async fn in_memory_backend_is_bootstrapped_and_answers() {
        let providers = ProviderRegistry::new().with_provider(ShoutingProvider);
        let backend = in_memory_backend(providers).await.expect("backend should build");

        let configs = backend.store.list_ai_configs().await.expect("configs");
        assert_eq!(configs.len(), 1);

        let reply = backend
            .chat
            .send_message(MessageContent::text("hello io"), "Erin")
            .await
            .expect("reply");
        assert_eq!(reply.content.text, "HELLO IO");
    }

    #[tokio::test]
    async fn missing_provider_surfaces_as_not_found() {
        let backend = in_memory_backend(ProviderRegistry::new())
            .await
            .expect("backend should build");

        let err = backend
            .chat
            .send_message(MessageContent::text("hello"), "erin")
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn default_hooks_fan_out_to_tracing_and_metrics() {
        assert_eq!(default_hooks().len(), 2);
    }
}
