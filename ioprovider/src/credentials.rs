//! In-memory API key storage keyed by provider name.
//!
//! ```rust
//! use ioprovider::SecureCredentialManager;
//!
//! let credentials = SecureCredentialManager::new();
//! credentials.set_openai_api_key("sk-test").unwrap();
//! assert!(credentials.has_api_key("openai").unwrap());
//! assert!(credentials.set_anthropic_api_key("sk-test").is_err());
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::ProviderError;
use crate::catalog::{PROVIDER_ANTHROPIC, PROVIDER_OPENAI};

#[derive(Clone, PartialEq, Eq)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn expose(&self) -> &str {
        self.value.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        // SAFETY: zero bytes are valid UTF-8 and the string is never read again.
        unsafe {
            self.value.as_mut_vec().fill(0);
        }
    }
}

#[derive(Default)]
pub struct SecureCredentialManager {
    api_keys: Mutex<HashMap<String, SecretString>>,
}

impl SecureCredentialManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_api_key(
        &self,
        provider: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<(), ProviderError> {
        let api_key = SecretString::new(api_key);
        if api_key.is_empty() {
            return Err(ProviderError::authentication("api key must not be empty"));
        }

        self.keys()?.insert(provider.into(), api_key);
        Ok(())
    }

    /// OpenAI keys are expected to start with `sk-`.
    pub fn set_openai_api_key(&self, api_key: impl Into<String>) -> Result<(), ProviderError> {
        let api_key = api_key.into();
        if !api_key.starts_with("sk-") {
            return Err(ProviderError::authentication(
                "OpenAI API key must start with 'sk-'",
            ));
        }

        self.set_api_key(PROVIDER_OPENAI, api_key)
    }

    /// Anthropic keys are expected to start with `sk-ant-`.
    pub fn set_anthropic_api_key(&self, api_key: impl Into<String>) -> Result<(), ProviderError> {
        let api_key = api_key.into();
        if !api_key.starts_with("sk-ant-") {
            return Err(ProviderError::authentication(
                "Anthropic API key must start with 'sk-ant-'",
            ));
        }

        self.set_api_key(PROVIDER_ANTHROPIC, api_key)
    }

    pub fn has_api_key(&self, provider: &str) -> Result<bool, ProviderError> {
        Ok(self.keys()?.contains_key(provider))
    }

    pub fn api_key(&self, provider: &str) -> Result<Option<SecretString>, ProviderError> {
        Ok(self.keys()?.get(provider).cloned())
    }

    /// Looks up a key or fails with an authentication error naming the provider.
    pub fn require_api_key(&self, provider: &str) -> Result<SecretString, ProviderError> {
        self.api_key(provider)?.ok_or_else(|| {
            ProviderError::authentication(format!("no {provider} API key configured"))
        })
    }

    pub fn clear(&self, provider: &str) -> Result<bool, ProviderError> {
        Ok(self.keys()?.remove(provider).is_some())
    }

    fn keys(&self) -> Result<MutexGuard<'_, HashMap<String, SecretString>>, ProviderError> {
        self.api_keys
            .lock()
            .map_err(|_| ProviderError::other("credential manager lock poisoned"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderErrorKind;

    #[test]
    fn secret_debug_is_redacted() {
        let secret = SecretString::new("sk-very-secret");
        assert_eq!(format!("{secret:?}"), "[REDACTED]");
        assert_eq!(secret.expose(), "sk-very-secret");
    }

    #[test]
    fn rejects_empty_and_misprefixed_keys() {
        let credentials = SecureCredentialManager::new();

        let err = credentials.set_api_key("openai", "  ").unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::Authentication);

        assert!(credentials.set_openai_api_key("pk-123").is_err());
        assert!(credentials.set_anthropic_api_key("sk-123").is_err());
        assert!(credentials.set_anthropic_api_key("sk-ant-123").is_ok());
    }

    #[test]
    fn require_api_key_names_missing_provider() {
        let credentials = SecureCredentialManager::new();
        let err = credentials.require_api_key("anthropic").unwrap_err();
        assert_eq!(err.message, "no anthropic API key configured");

        credentials.set_openai_api_key("sk-abc").unwrap();
        assert_eq!(credentials.require_api_key("openai").unwrap().expose(), "sk-abc");
        assert!(credentials.clear("openai").unwrap());
        assert!(!credentials.has_api_key("openai").unwrap());
    }
}
