//! Pipeline step instrumentation contract.
//!
//! ```rust
//! use iochat::{ChatPhase, NoopPipelineHooks, PipelineHooks};
//!
//! let hooks = NoopPipelineHooks;
//! hooks.on_step_start(ChatPhase::ResolveUser);
//! assert_eq!(ChatPhase::CallProvider.as_str(), "call_provider");
//! ```

use std::time::Duration;

use crate::ChatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatPhase {
    ResolveUser,
    ResolveConversation,
    AddParticipant,
    StoreUserMessage,
    LoadHistory,
    ResolveConfig,
    ResolveProvider,
    CallProvider,
    StoreAssistantMessage,
    RecordActivity,
}

impl ChatPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ResolveUser => "resolve_user",
            Self::ResolveConversation => "resolve_conversation",
            Self::AddParticipant => "add_participant",
            Self::StoreUserMessage => "store_user_message",
            Self::LoadHistory => "load_history",
            Self::ResolveConfig => "resolve_config",
            Self::ResolveProvider => "resolve_provider",
            Self::CallProvider => "call_provider",
            Self::StoreAssistantMessage => "store_assistant_message",
            Self::RecordActivity => "record_activity",
        }
    }

    /// Context prefix used when a step's error is propagated.
    pub fn description(self) -> &'static str {
        match self {
            Self::ResolveUser => "get or create user",
            Self::ResolveConversation => "get or create active conversation",
            Self::AddParticipant => "add participant",
            Self::StoreUserMessage => "store user message",
            Self::LoadHistory => "get conversation history",
            Self::ResolveConfig => "get active config",
            Self::ResolveProvider => "get llm provider",
            Self::CallProvider => "call llm provider",
            Self::StoreAssistantMessage => "store assistant message",
            Self::RecordActivity => "record session activity",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatOperation {
    SendMessage,
    StoreMessage,
}

impl ChatOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SendMessage => "send_message",
            Self::StoreMessage => "store_message",
        }
    }
}

/// Observes each orchestrator step. Implementations must be cheap and must not block.
pub trait PipelineHooks: Send + Sync {
    fn on_step_start(&self, _phase: ChatPhase) {}

    fn on_step_success(&self, _phase: ChatPhase, _elapsed: Duration) {}

    fn on_step_failure(&self, _phase: ChatPhase, _error: &ChatError, _elapsed: Duration) {}

    /// Called once per request with its outcome.
    fn on_request_complete(
        &self,
        _operation: ChatOperation,
        _error: Option<&ChatError>,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPipelineHooks;

impl PipelineHooks for NoopPipelineHooks {}
