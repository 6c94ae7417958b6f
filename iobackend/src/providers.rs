//! Provider construction from configured API keys.

use std::sync::Arc;
use std::time::Duration;

use ioprovider::catalog::{PROVIDER_ANTHROPIC, PROVIDER_OPENAI};
use ioprovider::{ModelProvider, ProviderError, ProviderRegistry, SecureCredentialManager};
use reqwest::Client;

use crate::config::BackendConfig;

/// Registers OpenAI, plus Anthropic when a key for it is configured.
pub fn build_provider_registry(config: &BackendConfig) -> Result<ProviderRegistry, ProviderError> {
    let credentials = Arc::new(SecureCredentialManager::new());
    let http = http_client(config.provider_timeout)?;

    let mut registry = ProviderRegistry::new();
    registry.register_shared(build_openai_provider(
        Arc::clone(&credentials),
        config.openai_api_key.trim(),
        http.clone(),
    )?);

    if let Some(api_key) = config.anthropic_api_key.as_deref() {
        registry.register_shared(build_anthropic_provider(
            credentials,
            api_key.trim(),
            http,
        )?);
    }

    Ok(registry)
}

/// Builds a single adapter by catalog provider name.
pub fn build_provider_from_api_key(
    provider: &str,
    api_key: &str,
    timeout: Duration,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    let credentials = Arc::new(SecureCredentialManager::new());
    let http = http_client(timeout)?;

    match provider {
        PROVIDER_OPENAI => build_openai_provider(credentials, api_key.trim(), http),
        PROVIDER_ANTHROPIC => build_anthropic_provider(credentials, api_key.trim(), http),
        other => Err(ProviderError::invalid_request(format!(
            "no adapter available for provider {other}"
        ))),
    }
}

fn http_client(timeout: Duration) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| ProviderError::transport(err.to_string()))
}

#[cfg(feature = "provider-openai")]
fn build_openai_provider(
    credentials: Arc<SecureCredentialManager>,
    api_key: &str,
    http: Client,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    use ioprovider::adapters::openai::{OpenAiHttpTransport, OpenAiProvider};

    credentials.set_openai_api_key(api_key)?;
    let transport = Arc::new(OpenAiHttpTransport::new(http));
    Ok(Arc::new(OpenAiProvider::new(credentials, transport)))
}

#[cfg(not(feature = "provider-openai"))]
fn build_openai_provider(
    _credentials: Arc<SecureCredentialManager>,
    _api_key: &str,
    _http: Client,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    Err(ProviderError::invalid_request(
        "provider-openai feature is not enabled on iobackend",
    ))
}

#[cfg(feature = "provider-anthropic")]
fn build_anthropic_provider(
    credentials: Arc<SecureCredentialManager>,
    api_key: &str,
    http: Client,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    use ioprovider::adapters::anthropic::{AnthropicHttpTransport, AnthropicProvider};

    credentials.set_anthropic_api_key(api_key)?;
    let transport = Arc::new(AnthropicHttpTransport::new(http));
    Ok(Arc::new(AnthropicProvider::new(credentials, transport)))
}

#[cfg(not(feature = "provider-anthropic"))]
fn build_anthropic_provider(
    _credentials: Arc<SecureCredentialManager>,
    _api_key: &str,
    _http: Client,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    Err(ProviderError::invalid_request(
        "provider-anthropic feature is not enabled on iobackend",
    ))
}

#[cfg(all(test, feature = "provider-openai", feature = "provider-anthropic"))]
mod tests {
    use ioprovider::ProviderErrorKind;

    use super::*;

    #[test]
    fn registers_anthropic_only_when_keyed() {
        let config = BackendConfig::new("sk-openai");
        let registry = build_provider_registry(&config).unwrap();
        assert_eq!(registry.names(), vec![PROVIDER_OPENAI.to_string()]);

        let config = config.with_anthropic_api_key("sk-ant-key");
        let registry = build_provider_registry(&config).unwrap();
        assert_eq!(
            registry.names(),
            vec![PROVIDER_ANTHROPIC.to_string(), PROVIDER_OPENAI.to_string()]
        );
    }

    #[test]
    fn malformed_keys_are_rejected() {
        let err = build_provider_registry(&BackendConfig::new("not-a-key"))
            .err()
            .expect("malformed openai key should fail");
        assert_eq!(err.kind, ProviderErrorKind::Authentication);

        let err = build_provider_from_api_key(PROVIDER_ANTHROPIC, "sk-openai", Duration::from_secs(5))
            .err()
            .expect("openai key should not pass as anthropic");
        assert_eq!(err.kind, ProviderErrorKind::Authentication);
    }

    #[test]
    fn unknown_provider_has_no_adapter() {
        let err = build_provider_from_api_key("mistral", "key", Duration::from_secs(5))
            .err()
            .expect("unknown provider should fail");
        assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);
    }
}
