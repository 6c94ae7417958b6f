//! Environment-driven backend configuration.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

use chrono::TimeDelta;
use iochat::{ChatError, DEFAULT_SESSION_TTL_MINUTES};
use ioprovider::ProviderError;
use iostore::{StoreConfig, StoreError};

pub const ENV_SQLITE_PATH: &str = "IO_SQLITE_PATH";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const ENV_PROVIDER_TIMEOUT_SECS: &str = "IO_PROVIDER_TIMEOUT_SECS";
pub const ENV_SESSION_TTL_MINUTES: &str = "IO_SESSION_TTL_MINUTES";

pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    Config,
    Provider,
    Store,
    Chat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub message: String,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Config, message)
    }
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for BackendError {}

impl From<ProviderError> for BackendError {
    fn from(error: ProviderError) -> Self {
        Self::new(BackendErrorKind::Provider, error.to_string())
    }
}

impl From<StoreError> for BackendError {
    fn from(error: StoreError) -> Self {
        Self::new(BackendErrorKind::Store, error.to_string())
    }
}

impl From<ChatError> for BackendError {
    fn from(error: ChatError) -> Self {
        Self::new(BackendErrorKind::Chat, error.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub store: StoreConfig,
    pub openai_api_key: String,
    /// Registers the Anthropic adapter when present.
    pub anthropic_api_key: Option<String>,
    pub provider_timeout: Duration,
    pub session_ttl: TimeDelta,
}

impl BackendConfig {
    pub fn new(openai_api_key: impl Into<String>) -> Self {
        Self {
            store: StoreConfig::default(),
            openai_api_key: openai_api_key.into(),
            anthropic_api_key: None,
            provider_timeout: Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS),
            session_ttl: TimeDelta::minutes(DEFAULT_SESSION_TTL_MINUTES),
        }
    }

    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }

    pub fn with_anthropic_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.anthropic_api_key = Some(api_key.into());
        self
    }

    pub fn from_env() -> Result<Self, BackendError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BackendError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let openai_api_key = value(ENV_OPENAI_API_KEY)
            .ok_or_else(|| BackendError::config(format!("{ENV_OPENAI_API_KEY} is required")))?;
        let mut config = Self::new(openai_api_key);

        if let Some(path) = value(ENV_SQLITE_PATH) {
            config.store = StoreConfig::from_path(path);
        }
        config.anthropic_api_key = value(ENV_ANTHROPIC_API_KEY);

        if let Some(raw) = value(ENV_PROVIDER_TIMEOUT_SECS) {
            let secs = parse_positive(ENV_PROVIDER_TIMEOUT_SECS, &raw)?;
            config.provider_timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = value(ENV_SESSION_TTL_MINUTES) {
            let minutes = parse_positive(ENV_SESSION_TTL_MINUTES, &raw)?;
            config.session_ttl = i64::try_from(minutes)
                .ok()
                .and_then(TimeDelta::try_minutes)
                .ok_or_else(|| {
                    BackendError::config(format!("{ENV_SESSION_TTL_MINUTES} is out of range"))
                })?;
        }

        Ok(config)
    }
}

fn parse_positive(key: &str, raw: &str) -> Result<u64, BackendError> {
    match raw.parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(BackendError::config(format!(
            "{key} must be a positive integer, got '{raw}'"
        ))),
    }
}
