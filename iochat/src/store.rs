//! Persistence contract required by the orchestrator and an in-memory implementation.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use ioprovider::{AiConfig, Model, Provider, User};
use uuid::Uuid;

use crate::{
    ChatError, Conversation, ConversationParticipant, NewAiConfig, NewMessage, StoredMessage,
};

pub type ChatFuture<'a, T> = iocommon::BoxFuture<'a, T>;

/// Store operations the core needs. Lookups return `Ok(None)` on a miss.
///
/// `create_user` and `add_participant` must be idempotent: creating an existing
/// user name returns the stored row, re-adding a member is a no-op.
pub trait ChatStore: Send + Sync {
    /// All configs with model and provider joined, in the store's listing order.
    fn list_ai_configs<'a>(&'a self) -> ChatFuture<'a, Result<Vec<AiConfig>, ChatError>>;

    fn get_ai_config<'a>(&'a self, id: Uuid)
    -> ChatFuture<'a, Result<Option<AiConfig>, ChatError>>;

    fn create_ai_config<'a>(
        &'a self,
        config: NewAiConfig,
    ) -> ChatFuture<'a, Result<AiConfig, ChatError>>;

    fn get_provider<'a>(
        &'a self,
        name: &'a str,
    ) -> ChatFuture<'a, Result<Option<Provider>, ChatError>>;

    fn create_provider<'a>(&'a self, name: &'a str)
    -> ChatFuture<'a, Result<Provider, ChatError>>;

    fn get_model<'a>(
        &'a self,
        provider_id: Uuid,
        name: &'a str,
    ) -> ChatFuture<'a, Result<Option<Model>, ChatError>>;

    fn create_model<'a>(
        &'a self,
        provider: &'a Provider,
        name: &'a str,
    ) -> ChatFuture<'a, Result<Model, ChatError>>;

    fn get_user<'a>(&'a self, name: &'a str) -> ChatFuture<'a, Result<Option<User>, ChatError>>;

    fn create_user<'a>(&'a self, name: &'a str) -> ChatFuture<'a, Result<User, ChatError>>;

    fn create_conversation<'a>(
        &'a self,
        name: &'a str,
    ) -> ChatFuture<'a, Result<Conversation, ChatError>>;

    fn touch_conversation<'a>(
        &'a self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> ChatFuture<'a, Result<(), ChatError>>;

    fn add_participant<'a>(
        &'a self,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> ChatFuture<'a, Result<ConversationParticipant, ChatError>>;

    fn list_participants<'a>(
        &'a self,
        conversation_id: Uuid,
    ) -> ChatFuture<'a, Result<Vec<ConversationParticipant>, ChatError>>;

    /// Messages of one conversation, ascending by creation time.
    fn list_messages<'a>(
        &'a self,
        conversation_id: Uuid,
    ) -> ChatFuture<'a, Result<Vec<StoredMessage>, ChatError>>;

    fn create_message<'a>(
        &'a self,
        message: NewMessage,
    ) -> ChatFuture<'a, Result<StoredMessage, ChatError>>;
}

#[derive(Debug, Default)]
struct InMemoryState {
    providers: Vec<Provider>,
    models: Vec<Model>,
    configs: Vec<StoredConfig>,
    users: Vec<User>,
    conversations: Vec<Conversation>,
    participants: Vec<ConversationParticipant>,
    messages: Vec<StoredMessage>,
}

#[derive(Debug, Clone)]
struct StoredConfig {
    id: Uuid,
    name: String,
    model_id: Uuid,
    system_prompt: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    last_used_at: Option<DateTime<Utc>>,
}

impl InMemoryState {
    fn join_config(&self, row: &StoredConfig) -> Result<AiConfig, ChatError> {
        let model = self
            .models
            .iter()
            .find(|model| model.id == row.model_id)
            .cloned()
            .ok_or_else(|| ChatError::store(format!("config {} references a missing model", row.id)))?;

        Ok(AiConfig {
            id: row.id,
            name: row.name.clone(),
            model,
            system_prompt: row.system_prompt.clone().unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
            last_used_at: row.last_used_at,
        })
    }
}

/// Process-local store; listing order is insertion order.
#[derive(Debug, Default)]
pub struct InMemoryChatStore {
    state: Mutex<InMemoryState>,
}

impl InMemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, InMemoryState>, ChatError> {
        self.state
            .lock()
            .map_err(|_| ChatError::store("chat store lock poisoned"))
    }

    /// Stores a message row verbatim, bypassing content encoding and role checks.
    ///
    /// Exists so tests can seed rows a real store may hold after corruption or
    /// an older schema; the pipeline never calls it.
    pub fn insert_raw_message(&self, message: StoredMessage) -> Result<(), ChatError> {
        self.state()?.messages.push(message);
        Ok(())
    }
}

impl ChatStore for InMemoryChatStore {
    fn list_ai_configs<'a>(&'a self) -> ChatFuture<'a, Result<Vec<AiConfig>, ChatError>> {
        Box::pin(async move {
            let state = self.state()?;
            state
                .configs
                .iter()
                .map(|row| state.join_config(row))
                .collect()
        })
    }

    fn get_ai_config<'a>(
        &'a self,
        id: Uuid,
    ) -> ChatFuture<'a, Result<Option<AiConfig>, ChatError>> {
        Box::pin(async move {
            let state = self.state()?;
            state
                .configs
                .iter()
                .find(|row| row.id == id)
                .map(|row| state.join_config(row))
                .transpose()
        })
    }

    fn create_ai_config<'a>(
        &'a self,
        config: NewAiConfig,
    ) -> ChatFuture<'a, Result<AiConfig, ChatError>> {
        Box::pin(async move {
            let mut state = self.state()?;
            let now = Utc::now();
            let row = StoredConfig {
                id: Uuid::new_v4(),
                name: config.name,
                model_id: config.model_id,
                system_prompt: config.system_prompt,
                created_at: now,
                updated_at: now,
                last_used_at: None,
            };
            let joined = state.join_config(&row)?;
            state.configs.push(row);
            Ok(joined)
        })
    }

    fn get_provider<'a>(
        &'a self,
        name: &'a str,
    ) -> ChatFuture<'a, Result<Option<Provider>, ChatError>> {
        Box::pin(async move {
            Ok(self
                .state()?
                .providers
                .iter()
                .find(|provider| provider.name == name)
                .cloned())
        })
    }

    fn create_provider<'a>(
        &'a self,
        name: &'a str,
    ) -> ChatFuture<'a, Result<Provider, ChatError>> {
        Box::pin(async move {
            let mut state = self.state()?;
            if state.providers.iter().any(|provider| provider.name == name) {
                return Err(ChatError::store(format!("provider {name} already exists")));
            }

            let now = Utc::now();
            let provider = Provider {
                id: Uuid::new_v4(),
                name: name.to_string(),
                created_at: now,
                updated_at: now,
            };
            state.providers.push(provider.clone());
            Ok(provider)
        })
    }

    fn get_model<'a>(
        &'a self,
        provider_id: Uuid,
        name: &'a str,
    ) -> ChatFuture<'a, Result<Option<Model>, ChatError>> {
        Box::pin(async move {
            Ok(self
                .state()?
                .models
                .iter()
                .find(|model| model.provider.id == provider_id && model.name == name)
                .cloned())
        })
    }

    fn create_model<'a>(
        &'a self,
        provider: &'a Provider,
        name: &'a str,
    ) -> ChatFuture<'a, Result<Model, ChatError>> {
        Box::pin(async move {
            let mut state = self.state()?;
            if state
                .models
                .iter()
                .any(|model| model.provider.id == provider.id && model.name == name)
            {
                return Err(ChatError::store(format!(
                    "model {name} already exists for provider {}",
                    provider.name
                )));
            }

            let model = Model {
                id: Uuid::new_v4(),
                provider: provider.clone(),
                name: name.to_string(),
                description: None,
                created_at: Utc::now(),
            };
            state.models.push(model.clone());
            Ok(model)
        })
    }

    fn get_user<'a>(&'a self, name: &'a str) -> ChatFuture<'a, Result<Option<User>, ChatError>> {
        Box::pin(async move {
            Ok(self
                .state()?
                .users
                .iter()
                .find(|user| user.name == name)
                .cloned())
        })
    }

    fn create_user<'a>(&'a self, name: &'a str) -> ChatFuture<'a, Result<User, ChatError>> {
        Box::pin(async move {
            let mut state = self.state()?;
            if let Some(existing) = state.users.iter().find(|user| user.name == name) {
                return Ok(existing.clone());
            }

            let now = Utc::now();
            let user = User {
                id: Uuid::new_v4(),
                name: name.to_string(),
                created_at: now,
                updated_at: now,
            };
            state.users.push(user.clone());
            Ok(user)
        })
    }

    fn create_conversation<'a>(
        &'a self,
        name: &'a str,
    ) -> ChatFuture<'a, Result<Conversation, ChatError>> {
        Box::pin(async move {
            let now = Utc::now();
            let conversation = Conversation {
                id: Uuid::new_v4(),
                name: name.to_string(),
                created_at: now,
                updated_at: now,
                last_used_at: None,
                participants: Vec::new(),
            };
            self.state()?.conversations.push(conversation.clone());
            Ok(conversation)
        })
    }

    fn touch_conversation<'a>(
        &'a self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> ChatFuture<'a, Result<(), ChatError>> {
        Box::pin(async move {
            let mut state = self.state()?;
            let conversation = state
                .conversations
                .iter_mut()
                .find(|conversation| conversation.id == id)
                .ok_or_else(|| ChatError::store(format!("conversation {id} not found")))?;
            conversation.last_used_at = Some(at);
            conversation.updated_at = at;
            Ok(())
        })
    }

    fn add_participant<'a>(
        &'a self,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> ChatFuture<'a, Result<ConversationParticipant, ChatError>> {
        Box::pin(async move {
            let mut state = self.state()?;
            if let Some(existing) = state.participants.iter().find(|participant| {
                participant.conversation_id == conversation_id && participant.user_id == user_id
            }) {
                return Ok(existing.clone());
            }

            let participant = ConversationParticipant {
                conversation_id,
                user_id,
                joined_at: Utc::now(),
            };
            state.participants.push(participant.clone());
            Ok(participant)
        })
    }

    fn list_participants<'a>(
        &'a self,
        conversation_id: Uuid,
    ) -> ChatFuture<'a, Result<Vec<ConversationParticipant>, ChatError>> {
        Box::pin(async move {
            Ok(self
                .state()?
                .participants
                .iter()
                .filter(|participant| participant.conversation_id == conversation_id)
                .cloned()
                .collect())
        })
    }

    fn list_messages<'a>(
        &'a self,
        conversation_id: Uuid,
    ) -> ChatFuture<'a, Result<Vec<StoredMessage>, ChatError>> {
        Box::pin(async move {
            let mut messages = self
                .state()?
                .messages
                .iter()
                .filter(|message| message.conversation_id == conversation_id)
                .cloned()
                .collect::<Vec<_>>();
            messages.sort_by_key(|message| message.created_at);
            Ok(messages)
        })
    }

    fn create_message<'a>(
        &'a self,
        message: NewMessage,
    ) -> ChatFuture<'a, Result<StoredMessage, ChatError>> {
        Box::pin(async move {
            let mut state = self.state()?;
            let user = match message.user_id {
                Some(user_id) => Some(
                    state
                        .users
                        .iter()
                        .find(|user| user.id == user_id)
                        .cloned()
                        .ok_or_else(|| ChatError::store(format!("user {user_id} not found")))?,
                ),
                None => None,
            };

            let stored = StoredMessage {
                id: Uuid::new_v4(),
                conversation_id: message.conversation_id,
                user,
                role: message.role.as_str().to_string(),
                content: message.content,
                created_at: Utc::now(),
            };
            state.messages.push(stored.clone());
            Ok(stored)
        })
    }
}
