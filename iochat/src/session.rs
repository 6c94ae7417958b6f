//! Process-wide session state: active config, active conversation, last activity.
//!
//! Fields live behind one `RwLock` that is never held across an await. Cache-miss
//! resolution is serialized separately through per-resource async locks so that
//! concurrent cold starts share one created resource.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use ioprovider::AiConfig;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::Conversation;

/// The active conversation, shared between every request that continues it.
///
/// Participant additions go through the inner lock, so all holders observe them.
#[derive(Debug, Clone)]
pub struct SharedConversation {
    id: Uuid,
    inner: Arc<Mutex<Conversation>>,
}

impl SharedConversation {
    pub fn new(conversation: Conversation) -> Self {
        Self {
            id: conversation.id,
            inner: Arc::new(Mutex::new(conversation)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub async fn lock(&self) -> MutexGuard<'_, Conversation> {
        self.inner.lock().await
    }

    pub async fn snapshot(&self) -> Conversation {
        self.inner.lock().await.clone()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub active_config: Option<AiConfig>,
    pub active_conversation: Option<SharedConversation>,
    /// `None` until the first successful request.
    pub last_activity: Option<DateTime<Utc>>,
    /// When the active conversation was started by this process.
    pub conversation_started_at: Option<DateTime<Utc>>,
}

impl SessionSnapshot {
    /// The most recent of the last activity and the active conversation's start.
    pub fn activity_anchor(&self) -> Option<DateTime<Utc>> {
        match (self.last_activity, self.conversation_started_at) {
            (Some(activity), Some(started)) => Some(activity.max(started)),
            (activity, started) => activity.or(started),
        }
    }
}

#[derive(Debug, Default)]
pub struct SessionCache {
    state: RwLock<SessionSnapshot>,
    config_resolution: Mutex<()>,
    conversation_resolution: Mutex<()>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.read().clone()
    }

    pub fn active_config(&self) -> Option<AiConfig> {
        self.read().active_config.clone()
    }

    pub fn set_active_config(&self, config: AiConfig) {
        self.write().active_config = Some(config);
    }

    pub fn active_conversation(&self) -> Option<SharedConversation> {
        self.read().active_conversation.clone()
    }

    pub fn set_active_conversation(&self, conversation: SharedConversation) {
        self.write().active_conversation = Some(conversation);
    }

    /// Makes a freshly created conversation active and stamps its start.
    pub fn start_conversation(&self, conversation: SharedConversation, at: DateTime<Utc>) {
        let mut state = self.write();
        state.active_conversation = Some(conversation);
        state.conversation_started_at = Some(at);
    }

    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.read().last_activity
    }

    pub fn record_activity(&self, at: DateTime<Utc>) {
        self.write().last_activity = Some(at);
    }

    pub(crate) async fn lock_config_resolution(&self) -> MutexGuard<'_, ()> {
        self.config_resolution.lock().await
    }

    pub(crate) async fn lock_conversation_resolution(&self) -> MutexGuard<'_, ()> {
        self.conversation_resolution.lock().await
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionSnapshot> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionSnapshot> {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation() -> Conversation {
        let now = Utc::now();
        Conversation {
            id: Uuid::new_v4(),
            name: "test".to_string(),
            created_at: now,
            updated_at: now,
            last_used_at: None,
            participants: Vec::new(),
        }
    }

    #[test]
    fn starts_empty() {
        let cache = SessionCache::new();
        let snapshot = cache.snapshot();
        assert!(snapshot.active_config.is_none());
        assert!(snapshot.active_conversation.is_none());
        assert!(snapshot.last_activity.is_none());
    }

    #[tokio::test]
    async fn shared_conversation_aliases_mutations() {
        let cache = SessionCache::new();
        let shared = SharedConversation::new(conversation());
        cache.set_active_conversation(shared.clone());

        let from_cache = cache.active_conversation().expect("conversation cached");
        assert!(from_cache.ptr_eq(&shared));

        from_cache.lock().await.name = "renamed".to_string();
        assert_eq!(shared.snapshot().await.name, "renamed");
    }

    #[test]
    fn record_activity_overwrites() {
        let cache = SessionCache::new();
        let first = Utc::now();
        cache.record_activity(first);
        let second = first + chrono::TimeDelta::minutes(5);
        cache.record_activity(second);
        assert_eq!(cache.last_activity(), Some(second));
    }

    #[test]
    fn anchor_prefers_latest_timestamp() {
        let cache = SessionCache::new();
        assert!(cache.snapshot().activity_anchor().is_none());

        let activity = Utc::now();
        cache.record_activity(activity);
        assert_eq!(cache.snapshot().activity_anchor(), Some(activity));

        let started = activity + chrono::TimeDelta::minutes(40);
        cache.start_conversation(SharedConversation::new(conversation()), started);
        assert_eq!(cache.snapshot().activity_anchor(), Some(started));
    }
}
