//! Chat-layer errors and boundary classification.
//!
//! ```rust
//! use iochat::{ChatError, ErrorCategory};
//!
//! let err = ChatError::no_configs_found().context("get active config");
//! assert_eq!(err.category(), ErrorCategory::NotConfigured);
//! assert_eq!(err.message, "get active config: no ai configs found");
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

use ioprovider::{CatalogError, ProviderError, ProviderErrorKind};

use crate::ChatPhase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    /// The store holds no AI configs yet.
    NoConfigsFound,
    /// The active config names a provider with no registered adapter.
    ProviderNotFound,
    /// The adapter was reached but the vendor call failed.
    ProviderUnavailable,
    /// A (provider, model) pair is absent from the catalog or the store.
    ValidationFailed,
    Store,
    Internal,
}

/// Coarse failure classes a transport boundary maps onto status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotConfigured,
    NotFound,
    BackendUnavailable,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
    pub phase: Option<ChatPhase>,
    pub provider_error: Option<ProviderErrorKind>,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            phase: None,
            provider_error: None,
        }
    }

    pub fn no_configs_found() -> Self {
        Self::new(ChatErrorKind::NoConfigsFound, "no ai configs found")
    }

    pub fn provider_not_found(provider: &str) -> Self {
        Self::new(
            ChatErrorKind::ProviderNotFound,
            format!("llm provider not found: {provider}"),
        )
    }

    pub fn provider_unavailable(error: ProviderError) -> Self {
        let mut value = Self::new(
            ChatErrorKind::ProviderUnavailable,
            format!("llm service unavailable: {error}"),
        );
        value.provider_error = Some(error.kind);
        value
    }

    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::ValidationFailed, message)
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Store, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Internal, message)
    }

    /// Prefixes the message with the failing operation, keeping the kind.
    pub fn context(mut self, operation: &str) -> Self {
        self.message = format!("{operation}: {}", self.message);
        self
    }

    /// Records the first pipeline step that failed; later calls keep it.
    pub fn with_phase(mut self, phase: ChatPhase) -> Self {
        self.phase.get_or_insert(phase);
        self
    }

    pub fn category(&self) -> ErrorCategory {
        match self.kind {
            ChatErrorKind::NoConfigsFound => ErrorCategory::NotConfigured,
            ChatErrorKind::ProviderNotFound | ChatErrorKind::ValidationFailed => {
                ErrorCategory::NotFound
            }
            ChatErrorKind::ProviderUnavailable => ErrorCategory::BackendUnavailable,
            ChatErrorKind::Store | ChatErrorKind::Internal => ErrorCategory::Internal,
        }
    }

    /// Whether the same request may succeed later without operator action.
    pub fn is_retryable(&self) -> bool {
        match self.kind {
            ChatErrorKind::ProviderUnavailable => !matches!(
                self.provider_error,
                Some(
                    ProviderErrorKind::Authentication
                        | ProviderErrorKind::InvalidRequest
                        | ProviderErrorKind::UnsupportedModel
                )
            ),
            ChatErrorKind::Store => true,
            _ => false,
        }
    }
}

impl Display for ChatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ChatError {}

impl From<CatalogError> for ChatError {
    fn from(value: CatalogError) -> Self {
        ChatError::validation_failed(value.message)
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(value: serde_json::Error) -> Self {
        ChatError::internal(format!("failed to encode message content: {value}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_mapping_covers_every_kind() {
        let cases = [
            (ChatError::no_configs_found(), ErrorCategory::NotConfigured),
            (ChatError::provider_not_found("x"), ErrorCategory::NotFound),
            (ChatError::validation_failed("x"), ErrorCategory::NotFound),
            (
                ChatError::provider_unavailable(ProviderError::timeout("slow")),
                ErrorCategory::BackendUnavailable,
            ),
            (ChatError::store("x"), ErrorCategory::Internal),
            (ChatError::internal("x"), ErrorCategory::Internal),
        ];

        for (error, category) in cases {
            assert_eq!(error.category(), category, "{error}");
        }
    }

    #[test]
    fn provider_unavailable_keeps_vendor_classification() {
        let transient = ChatError::provider_unavailable(ProviderError::rate_limited("busy"));
        assert_eq!(transient.provider_error, Some(ProviderErrorKind::RateLimited));
        assert!(transient.is_retryable());

        let misconfigured =
            ChatError::provider_unavailable(ProviderError::unsupported_model("gpt-2"));
        assert!(!misconfigured.is_retryable());
        assert!(misconfigured.message.starts_with("llm service unavailable"));
    }

    #[test]
    fn phase_records_first_failing_step() {
        let err = ChatError::store("disk full")
            .with_phase(ChatPhase::StoreUserMessage)
            .with_phase(ChatPhase::LoadHistory);
        assert_eq!(err.phase, Some(ChatPhase::StoreUserMessage));
    }

    #[test]
    fn context_nests_operation_names() {
        let err = ChatError::store("locked")
            .context("create message")
            .context("store user message");
        assert_eq!(err.message, "store user message: create message: locked");
        assert_eq!(err.to_string(), "Store: store user message: create message: locked");
    }
}
