//! Code-defined catalog of known providers and models.
//!
//! The catalog is authoritative for configuration: an AI config may only bind a
//! (provider, model) pair listed here. Adapters keep their own supported sets,
//! which are allowed to drift from this list.
//!
//! ```rust
//! use ioprovider::catalog::{self, CatalogErrorKind};
//!
//! assert!(catalog::validate_model("openai", "gpt-5-nano").is_ok());
//!
//! let err = catalog::validate_model("openai", "davinci").unwrap_err();
//! assert_eq!(err.kind, CatalogErrorKind::UnsupportedModel);
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

pub const PROVIDER_OPENAI: &str = "openai";
pub const PROVIDER_ANTHROPIC: &str = "anthropic";

pub const DEFAULT_PROVIDER: &str = PROVIDER_OPENAI;
pub const DEFAULT_MODEL: &str = "gpt-5-nano";
pub const DEFAULT_CONFIG_NAME: &str = "Io";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Io, a helpful AI assistant.

Context: You're in a Discord group chat. Messages are formatted as \"username: message content\" - the username is part of the format, not part of what the user is saying. Multiple people may be talking.

Guidelines:
- Match the tone of the conversation - casual when users are casual, professional when they need help.
- Keep responses concise and Discord-friendly.
- For technical questions: be precise, show examples, explain clearly.
- Use natural language - don't force slang or emojis unless it fits the context.
- IMPORTANT: Do NOT prefix your responses with \"io:\" or \"Io:\" - just respond directly.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub provider: &'static str,
    pub models: &'static [&'static str],
}

pub const ENTRIES: &[CatalogEntry] = &[
    CatalogEntry {
        provider: PROVIDER_OPENAI,
        models: &["gpt-5-nano", "gpt-4.1-nano"],
    },
    CatalogEntry {
        provider: PROVIDER_ANTHROPIC,
        models: &["claude-3-5-sonnet-20241022", "claude-3-5-haiku-20241022"],
    },
];

pub fn entries() -> &'static [CatalogEntry] {
    ENTRIES
}

pub fn providers() -> impl Iterator<Item = &'static str> {
    ENTRIES.iter().map(|entry| entry.provider)
}

pub fn models_for(provider: &str) -> Option<&'static [&'static str]> {
    ENTRIES
        .iter()
        .find(|entry| entry.provider == provider)
        .map(|entry| entry.models)
}

pub fn validate_model(provider: &str, model: &str) -> Result<(), CatalogError> {
    let Some(models) = models_for(provider) else {
        return Err(CatalogError::unsupported_provider(format!(
            "unsupported provider: {provider}"
        )));
    };

    if !models.contains(&model) {
        return Err(CatalogError::unsupported_model(format!(
            "unsupported model {model} for provider {provider}"
        )));
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogErrorKind {
    UnsupportedProvider,
    UnsupportedModel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogError {
    pub kind: CatalogErrorKind,
    pub message: String,
}

impl CatalogError {
    pub fn new(kind: CatalogErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unsupported_provider(message: impl Into<String>) -> Self {
        Self::new(CatalogErrorKind::UnsupportedProvider, message)
    }

    pub fn unsupported_model(message: impl Into<String>) -> Self {
        Self::new(CatalogErrorKind::UnsupportedModel, message)
    }
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for CatalogError {}
