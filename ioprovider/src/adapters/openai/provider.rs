//! OpenAI provider implementation over transport and shared models.

use std::sync::Arc;

use crate::catalog::PROVIDER_OPENAI;
use crate::{
    AiConfig, Message, MessageContent, ModelProvider, ProviderError, ProviderFuture,
    SecureCredentialManager,
};

use super::auth::resolve_openai_auth;
use super::transport::OpenAiTransport;
use super::types::{OpenAiInputItem, OpenAiReasoningEffort, OpenAiRequest};

/// A model this adapter can call, independent of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenAiSupportedModel {
    pub name: &'static str,
    pub wire_name: &'static str,
    pub reasoning: bool,
}

pub const OPENAI_SUPPORTED_MODELS: &[OpenAiSupportedModel] = &[
    OpenAiSupportedModel {
        name: "gpt-5.1",
        wire_name: "gpt-5-chat-latest",
        reasoning: false,
    },
    OpenAiSupportedModel {
        name: "gpt-5-nano",
        wire_name: "gpt-5-nano",
        reasoning: true,
    },
    OpenAiSupportedModel {
        name: "gpt-5-mini",
        wire_name: "gpt-5-mini",
        reasoning: true,
    },
];

pub fn supported_model(name: &str) -> Option<&'static OpenAiSupportedModel> {
    OPENAI_SUPPORTED_MODELS
        .iter()
        .find(|model| model.name == name)
}

#[derive(Clone)]
pub struct OpenAiProvider {
    credentials: Arc<SecureCredentialManager>,
    transport: Arc<dyn OpenAiTransport>,
    reasoning_effort: OpenAiReasoningEffort,
}

impl OpenAiProvider {
    pub fn new(
        credentials: Arc<SecureCredentialManager>,
        transport: Arc<dyn OpenAiTransport>,
    ) -> Self {
        Self {
            credentials,
            transport,
            reasoning_effort: OpenAiReasoningEffort::Low,
        }
    }

    pub fn with_reasoning_effort(mut self, effort: OpenAiReasoningEffort) -> Self {
        self.reasoning_effort = effort;
        self
    }

    pub(crate) fn build_openai_request(
        &self,
        history: &[Message],
        config: &AiConfig,
    ) -> Result<OpenAiRequest, ProviderError> {
        let model = supported_model(config.model_name()).ok_or_else(|| {
            ProviderError::unsupported_model(format!(
                "unknown or unsupported model: {}",
                config.model_name()
            ))
        })?;

        Ok(OpenAiRequest {
            model: model.wire_name.to_string(),
            instructions: Some(config.system_prompt.clone()),
            input: history.iter().map(OpenAiInputItem::from_message).collect(),
            reasoning_effort: model.reasoning.then_some(self.reasoning_effort),
        })
    }
}

impl ModelProvider for OpenAiProvider {
    fn name(&self) -> &str {
        PROVIDER_OPENAI
    }

    fn send_message<'a>(
        &'a self,
        history: &'a [Message],
        config: &'a AiConfig,
    ) -> ProviderFuture<'a, Result<MessageContent, ProviderError>> {
        Box::pin(async move {
            let request = self.build_openai_request(history, config)?;
            let auth = resolve_openai_auth(&self.credentials)?;
            let response = self.transport.create_response(request, auth).await?;
            Ok(MessageContent::text(response.output_text))
        })
    }
}
