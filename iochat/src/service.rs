//! The message orchestrator: one pipeline per inbound chat message.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use chrono::TimeDelta;
use iocommon::{Clock, SystemClock};
use ioprovider::{AiConfig, Message, MessageContent, ModelProvider, ProviderRegistry, Role, User};
use uuid::Uuid;

use crate::bootstrap::{create_default_config, sync_catalog};
use crate::codec::encode_content;
use crate::conversation::default_session_ttl;
use crate::{
    ChatError, ChatOperation, ChatPhase, ChatStore, ConfigResolver, Conversation,
    ConversationManager, ConversationParticipant, NewMessage, NoopPipelineHooks, PipelineHooks,
    SessionCache, SessionSnapshot, SharedConversation, UserRegistry,
};

#[derive(Clone)]
pub struct ChatService {
    store: Arc<dyn ChatStore>,
    providers: Arc<ProviderRegistry>,
    session: Arc<SessionCache>,
    clock: Arc<dyn Clock>,
    hooks: Arc<dyn PipelineHooks>,
    users: UserRegistry,
    conversations: ConversationManager,
    configs: ConfigResolver,
}

impl ChatService {
    pub fn new(store: Arc<dyn ChatStore>, providers: ProviderRegistry) -> Self {
        Self::builder(store).providers(providers).build()
    }

    pub fn builder(store: Arc<dyn ChatStore>) -> ChatServiceBuilder {
        ChatServiceBuilder::new(store)
    }

    /// Persists the user's message, asks the active provider for a reply and
    /// persists the reply. Returns the assistant message.
    ///
    /// Steps already completed are not undone when a later one fails: a stored
    /// user message stays stored even if the provider call errors.
    pub async fn send_message(
        &self,
        content: MessageContent,
        username: &str,
    ) -> Result<Message, ChatError> {
        let started = Instant::now();
        let result = self.run_send_message(content, username).await;
        self.hooks.on_request_complete(
            ChatOperation::SendMessage,
            result.as_ref().err(),
            started.elapsed(),
        );
        result
    }

    /// Persists the user's message without generating a reply.
    pub async fn store_message(
        &self,
        content: MessageContent,
        username: &str,
    ) -> Result<(), ChatError> {
        let started = Instant::now();
        let result = self.run_store_message(content, username).await;
        self.hooks.on_request_complete(
            ChatOperation::StoreMessage,
            result.as_ref().err(),
            started.elapsed(),
        );
        result
    }

    /// Syncs the catalog into the store and creates the default config when none exists.
    pub async fn initialize_database(&self) -> Result<(), ChatError> {
        sync_catalog(self.store.as_ref())
            .await
            .map_err(|error| error.context("sync catalog"))?;
        create_default_config(self.store.as_ref(), &self.configs).await
    }

    pub async fn list_ai_configs(&self) -> Result<Vec<AiConfig>, ChatError> {
        self.configs.list_ai_configs().await
    }

    pub async fn create_ai_config(
        &self,
        provider: &str,
        model: &str,
        name: &str,
        system_prompt: &str,
    ) -> Result<AiConfig, ChatError> {
        self.configs
            .create_ai_config(provider, model, name, system_prompt)
            .await
    }

    pub async fn set_active_config(&self, id: Uuid) -> Result<AiConfig, ChatError> {
        self.configs.set_active_config(id).await
    }

    pub async fn active_config(&self) -> Result<AiConfig, ChatError> {
        self.configs.active_config().await
    }

    pub async fn conversation_history(
        &self,
        conversation_id: Uuid,
    ) -> Result<Vec<Message>, ChatError> {
        self.conversations.conversation_history(conversation_id).await
    }

    /// The cached conversation, whether or not its continuity window has lapsed.
    pub async fn active_conversation(&self) -> Option<Conversation> {
        match self.session.active_conversation() {
            Some(conversation) => Some(conversation.snapshot().await),
            None => None,
        }
    }

    pub async fn list_participants(
        &self,
        conversation_id: Uuid,
    ) -> Result<Vec<ConversationParticipant>, ChatError> {
        self.store
            .list_participants(conversation_id)
            .await
            .map_err(|error| error.context("list participants"))
    }

    pub fn session(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    async fn run_send_message(
        &self,
        content: MessageContent,
        username: &str,
    ) -> Result<Message, ChatError> {
        let conversation = self.store_user_message(content, username).await?;

        let history = self
            .step(
                ChatPhase::LoadHistory,
                self.conversations.conversation_history(conversation.id()),
            )
            .await?;
        let config = self
            .step(ChatPhase::ResolveConfig, self.configs.active_config())
            .await?;
        let provider = self
            .step(ChatPhase::ResolveProvider, self.resolve_provider(&config))
            .await?;
        let reply = self
            .step(ChatPhase::CallProvider, async {
                provider
                    .send_message(&history, &config)
                    .await
                    .map_err(ChatError::provider_unavailable)
            })
            .await?;
        let message = self
            .step(
                ChatPhase::StoreAssistantMessage,
                self.persist_message(conversation.id(), None, Role::Assistant, reply),
            )
            .await?;

        self.step(ChatPhase::RecordActivity, async {
            self.record_activity(&conversation).await;
            Ok::<(), ChatError>(())
        })
        .await?;
        Ok(message)
    }

    async fn run_store_message(
        &self,
        content: MessageContent,
        username: &str,
    ) -> Result<(), ChatError> {
        let conversation = self.store_user_message(content, username).await?;
        self.step(ChatPhase::RecordActivity, async {
            self.record_activity(&conversation).await;
            Ok::<(), ChatError>(())
        })
        .await
    }

    /// The preparation shared by both entry points.
    async fn store_user_message(
        &self,
        content: MessageContent,
        username: &str,
    ) -> Result<SharedConversation, ChatError> {
        let user = self
            .step(ChatPhase::ResolveUser, self.users.get_or_create_user(username))
            .await?;
        let conversation = self
            .step(
                ChatPhase::ResolveConversation,
                self.conversations.get_or_create_active_conversation(),
            )
            .await?;
        self.step(
            ChatPhase::AddParticipant,
            self.conversations
                .add_participant_if_needed(&conversation, &user),
        )
        .await?;
        self.step(
            ChatPhase::StoreUserMessage,
            self.persist_message(conversation.id(), Some(&user), Role::User, content),
        )
        .await?;

        Ok(conversation)
    }

    async fn resolve_provider(
        &self,
        config: &AiConfig,
    ) -> Result<Arc<dyn ModelProvider>, ChatError> {
        self.providers
            .get(config.provider_name())
            .ok_or_else(|| ChatError::provider_not_found(config.provider_name()))
    }

    async fn persist_message(
        &self,
        conversation_id: Uuid,
        user: Option<&User>,
        role: Role,
        content: MessageContent,
    ) -> Result<Message, ChatError> {
        let encoded = encode_content(&content)?;
        let stored = self
            .store
            .create_message(NewMessage {
                conversation_id,
                user_id: user.map(|user| user.id),
                role,
                content: encoded,
            })
            .await
            .map_err(|error| error.context("create message"))?;

        Ok(Message {
            id: stored.id,
            conversation_id,
            user: user.cloned(),
            role,
            content,
            created_at: stored.created_at,
        })
    }

    /// In-memory only. The store marker was bumped when the conversation was resolved.
    async fn record_activity(&self, conversation: &SharedConversation) {
        let now = self.clock.now();
        conversation.lock().await.last_used_at = Some(now);
        self.session.record_activity(now);
    }

    async fn step<T, F>(&self, phase: ChatPhase, future: F) -> Result<T, ChatError>
    where
        F: Future<Output = Result<T, ChatError>>,
    {
        self.hooks.on_step_start(phase);
        let started = Instant::now();

        match future.await {
            Ok(value) => {
                self.hooks.on_step_success(phase, started.elapsed());
                Ok(value)
            }
            Err(error) => {
                let error = error.context(phase.description()).with_phase(phase);
                self.hooks.on_step_failure(phase, &error, started.elapsed());
                Err(error)
            }
        }
    }
}

pub struct ChatServiceBuilder {
    store: Arc<dyn ChatStore>,
    providers: ProviderRegistry,
    clock: Arc<dyn Clock>,
    hooks: Arc<dyn PipelineHooks>,
    session_ttl: TimeDelta,
}

impl ChatServiceBuilder {
    pub fn new(store: Arc<dyn ChatStore>) -> Self {
        Self {
            store,
            providers: ProviderRegistry::new(),
            clock: Arc::new(SystemClock),
            hooks: Arc::new(NoopPipelineHooks),
            session_ttl: default_session_ttl(),
        }
    }

    pub fn providers(mut self, providers: ProviderRegistry) -> Self {
        self.providers = providers;
        self
    }

    pub fn provider<P>(mut self, provider: P) -> Self
    where
        P: ModelProvider + 'static,
    {
        self.providers.register(provider);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn PipelineHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Inactivity window after which the next message starts a new conversation.
    pub fn session_ttl(mut self, ttl: TimeDelta) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn build(self) -> ChatService {
        let session = Arc::new(SessionCache::new());
        let users = UserRegistry::new(self.store.clone());
        let conversations = ConversationManager::new(
            self.store.clone(),
            session.clone(),
            self.clock.clone(),
            self.session_ttl,
        );
        let configs = ConfigResolver::new(self.store.clone(), session.clone());

        ChatService {
            store: self.store,
            providers: Arc::new(self.providers),
            session,
            clock: self.clock,
            hooks: self.hooks,
            users,
            conversations,
            configs,
        }
    }
}
