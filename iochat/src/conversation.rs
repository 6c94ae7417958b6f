//! Active conversation continuity, history loading and participant membership.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use iocommon::Clock;
use ioprovider::{Message, User};
use uuid::Uuid;

use crate::codec::message_from_stored;
use crate::{ChatError, ChatStore, SessionCache, SessionSnapshot, SharedConversation};

pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 30;

pub fn default_session_ttl() -> TimeDelta {
    TimeDelta::minutes(DEFAULT_SESSION_TTL_MINUTES)
}

/// Human-readable label for a conversation started at `at`, e.g. `Jan 2, 2006 15:04`.
pub fn conversation_name(at: DateTime<Utc>) -> String {
    at.format("%b %-d, %Y %H:%M").to_string()
}

#[derive(Clone)]
pub struct ConversationManager {
    store: Arc<dyn ChatStore>,
    session: Arc<SessionCache>,
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
}

impl ConversationManager {
    pub fn new(
        store: Arc<dyn ChatStore>,
        session: Arc<SessionCache>,
        clock: Arc<dyn Clock>,
        ttl: TimeDelta,
    ) -> Self {
        Self {
            store,
            session,
            clock,
            ttl,
        }
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Returns the cached conversation while the previous activity is younger
    /// than the TTL, otherwise starts a new one and makes it active.
    ///
    /// A conversation that has not finished a request yet is measured from its
    /// start, so concurrent first messages land in the same conversation.
    /// Either way the store's last-used marker is bumped here, so nothing after
    /// the assistant reply needs to write.
    pub async fn get_or_create_active_conversation(
        &self,
    ) -> Result<SharedConversation, ChatError> {
        let now = self.clock.now();
        let before = self.session.snapshot();
        if let Some(conversation) = self.live_conversation(&before, now) {
            return self.reuse(conversation, now).await;
        }

        let observed = before.active_conversation.as_ref().map(SharedConversation::id);
        let _resolution = self.session.lock_conversation_resolution().await;

        // Another request may have replaced the conversation while we waited.
        if let Some(current) = self.session.active_conversation()
            && Some(current.id()) != observed
        {
            return self.reuse(current, now).await;
        }

        let name = conversation_name(now);
        let mut conversation = self
            .store
            .create_conversation(&name)
            .await
            .map_err(|error| error.context("create conversation"))?;
        conversation.last_used_at = Some(now);

        let shared = SharedConversation::new(conversation);
        self.session.start_conversation(shared.clone(), now);
        tracing::info!(conversation_id = %shared.id(), name = %name, "started new conversation");

        self.store
            .touch_conversation(shared.id(), now)
            .await
            .map_err(|error| error.context("update conversation last used"))?;

        Ok(shared)
    }

    /// Every readable message of the conversation, oldest first.
    pub async fn conversation_history(
        &self,
        conversation_id: Uuid,
    ) -> Result<Vec<Message>, ChatError> {
        let history = self
            .store
            .list_messages(conversation_id)
            .await
            .map_err(|error| error.context("list messages"))?
            .into_iter()
            .filter_map(message_from_stored)
            .collect::<Vec<_>>();
        Ok(history)
    }

    /// Adds `user` to the conversation unless already a member.
    ///
    /// The conversation lock is held across the store insert so concurrent
    /// first messages from one user write a single membership row.
    pub async fn add_participant_if_needed(
        &self,
        conversation: &SharedConversation,
        user: &User,
    ) -> Result<(), ChatError> {
        let mut guard = conversation.lock().await;
        if guard.has_participant(user.id) {
            return Ok(());
        }

        let participant = self
            .store
            .add_participant(guard.id, user.id)
            .await
            .map_err(|error| error.context("add participant"))?;
        guard.participants.push(participant);
        Ok(())
    }

    async fn reuse(
        &self,
        conversation: SharedConversation,
        now: DateTime<Utc>,
    ) -> Result<SharedConversation, ChatError> {
        self.store
            .touch_conversation(conversation.id(), now)
            .await
            .map_err(|error| error.context("update conversation last used"))?;
        Ok(conversation)
    }

    fn live_conversation(
        &self,
        snapshot: &SessionSnapshot,
        now: DateTime<Utc>,
    ) -> Option<SharedConversation> {
        let conversation = snapshot.active_conversation.as_ref()?;
        let anchor = snapshot.activity_anchor()?;
        (now - anchor < self.ttl).then(|| conversation.clone())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use iocommon::ManualClock;

    use super::*;
    use crate::InMemoryChatStore;

    fn manager(clock: Arc<ManualClock>) -> (ConversationManager, Arc<SessionCache>, Arc<InMemoryChatStore>) {
        let store = Arc::new(InMemoryChatStore::new());
        let session = Arc::new(SessionCache::new());
        let manager =
            ConversationManager::new(store.clone(), session.clone(), clock, default_session_ttl());
        (manager, session, store)
    }

    #[test]
    fn names_use_short_month_and_minutes() {
        let at = Utc.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap();
        assert_eq!(conversation_name(at), "Jan 2, 2006 15:04");
    }

    #[tokio::test]
    async fn reuses_conversation_inside_window_only() {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()));
        let (manager, session, _) = manager(clock.clone());

        let first = manager.get_or_create_active_conversation().await.unwrap();
        session.record_activity(clock.now());

        clock.advance(std::time::Duration::from_secs(29 * 60));
        let second = manager.get_or_create_active_conversation().await.unwrap();
        assert_eq!(first.id(), second.id());

        clock.advance(std::time::Duration::from_secs(60));
        let third = manager.get_or_create_active_conversation().await.unwrap();
        assert_ne!(first.id(), third.id());
    }

    #[tokio::test]
    async fn unfinished_conversation_expires_from_its_start() {
        let clock = Arc::new(ManualClock::starting_now());
        let (manager, _, _) = manager(clock.clone());

        let first = manager.get_or_create_active_conversation().await.unwrap();
        clock.advance(std::time::Duration::from_secs(10 * 60));
        let second = manager.get_or_create_active_conversation().await.unwrap();
        assert_eq!(first.id(), second.id());

        clock.advance(std::time::Duration::from_secs(20 * 60));
        let third = manager.get_or_create_active_conversation().await.unwrap();
        assert_ne!(first.id(), third.id());
    }

    #[tokio::test]
    async fn new_conversation_is_marked_used() {
        let clock = Arc::new(ManualClock::starting_now());
        let (manager, _, _) = manager(clock.clone());

        let conversation = manager.get_or_create_active_conversation().await.unwrap();
        assert_eq!(conversation.snapshot().await.last_used_at, Some(clock.now()));
    }

    #[tokio::test]
    async fn participant_is_added_once() {
        let clock = Arc::new(ManualClock::starting_now());
        let (manager, _, store) = manager(clock);
        let user = store.create_user("alice").await.unwrap();
        let conversation = manager.get_or_create_active_conversation().await.unwrap();

        manager.add_participant_if_needed(&conversation, &user).await.unwrap();
        manager.add_participant_if_needed(&conversation, &user).await.unwrap();

        assert_eq!(conversation.snapshot().await.participants.len(), 1);
        assert_eq!(store.list_participants(conversation.id()).await.unwrap().len(), 1);
    }
}
