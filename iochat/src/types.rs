//! Conversation and store row types.

use chrono::{DateTime, Utc};
use ioprovider::{Role, User};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationParticipant {
    pub conversation_id: Uuid,
    pub user_id: Uuid,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    /// Members known to this process; filled as users speak.
    pub participants: Vec<ConversationParticipant>,
}

impl Conversation {
    pub fn has_participant(&self, user_id: Uuid) -> bool {
        self.participants
            .iter()
            .any(|participant| participant.user_id == user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAiConfig {
    pub name: String,
    pub model_id: Uuid,
    /// `None` when the prompt is empty.
    pub system_prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub conversation_id: Uuid,
    pub user_id: Option<Uuid>,
    pub role: Role,
    /// JSON-encoded `MessageContent`.
    pub content: String,
}

/// A message row as the store returns it, author joined, content still encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub user: Option<User>,
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
