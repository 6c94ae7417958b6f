//! OpenAI auth resolution policy.

use crate::catalog::PROVIDER_OPENAI;
use crate::{ProviderError, SecureCredentialManager};

use super::types::OpenAiAuth;

/// Resolves OpenAI authentication from API key credentials only.
pub(crate) fn resolve_openai_auth(
    credentials: &SecureCredentialManager,
) -> Result<OpenAiAuth, ProviderError> {
    credentials
        .require_api_key(PROVIDER_OPENAI)
        .map(OpenAiAuth::ApiKey)
}
