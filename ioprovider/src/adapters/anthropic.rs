//! Anthropic provider over the Messages API.
//!
//! Flattening follows the same rules as the OpenAI adapter: authored text is
//! prefixed with the speaker name, images and documents are forwarded by URL,
//! and attachment kinds the API cannot reference by URL are dropped.

use std::sync::Arc;

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use crate::catalog::PROVIDER_ANTHROPIC;
use crate::{
    AiConfig, MediaKind, Message, MessageContent, ModelProvider, ProviderError, ProviderFuture,
    Role, SecretString, SecureCredentialManager,
};

pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const ANTHROPIC_DEFAULT_MAX_TOKENS: u32 = 1024;

pub const ANTHROPIC_SUPPORTED_MODELS: &[&str] =
    &["claude-3-5-sonnet-20241022", "claude-3-5-haiku-20241022"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnthropicRequest {
    pub model: String,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub messages: Vec<AnthropicMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnthropicMessage {
    pub role: &'static str,
    pub content: Vec<AnthropicContentBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicContentBlock {
    Text { text: String },
    Image { source: AnthropicUrlSource },
    Document { source: AnthropicUrlSource },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnthropicUrlSource {
    pub r#type: &'static str,
    pub url: String,
}

impl AnthropicUrlSource {
    fn url(url: &str) -> Self {
        Self {
            r#type: "url",
            url: url.to_string(),
        }
    }
}

impl AnthropicMessage {
    /// Returns `None` for turns that would carry no content blocks; the API
    /// rejects empty messages.
    pub fn from_message(message: &Message) -> Option<Self> {
        let text = &message.content.text;

        if message.role == Role::Assistant {
            if text.is_empty() {
                return None;
            }
            return Some(Self {
                role: "assistant",
                content: vec![AnthropicContentBlock::Text { text: text.clone() }],
            });
        }

        let mut content = Vec::with_capacity(message.content.media.len() + 1);
        if !text.is_empty() {
            let text = match message.author_name() {
                Some(author) => format!("{author}: {text}"),
                None => text.clone(),
            };
            content.push(AnthropicContentBlock::Text { text });
        }

        for item in &message.content.media {
            match item.kind() {
                Some(MediaKind::Image) => content.push(AnthropicContentBlock::Image {
                    source: AnthropicUrlSource::url(&item.url),
                }),
                Some(MediaKind::File) => content.push(AnthropicContentBlock::Document {
                    source: AnthropicUrlSource::url(&item.url),
                }),
                Some(MediaKind::Video | MediaKind::Audio) | None => {}
            }
        }

        (!content.is_empty()).then_some(Self {
            role: "user",
            content,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnthropicResponse {
    pub id: String,
    pub model: String,
    #[serde(default)]
    pub content: Vec<AnthropicResponseBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

impl AnthropicResponse {
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                AnthropicResponseBlock::Text { text } => Some(text.as_str()),
                AnthropicResponseBlock::Other => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicResponseBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorEnvelope {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

pub trait AnthropicTransport: Send + Sync + std::fmt::Debug {
    fn create_message<'a>(
        &'a self,
        request: AnthropicRequest,
        api_key: SecretString,
    ) -> ProviderFuture<'a, Result<AnthropicResponse, ProviderError>>;
}

#[derive(Debug, Clone)]
pub struct AnthropicHttpTransport {
    client: Client,
    base_url: String,
}

impl AnthropicHttpTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: ANTHROPIC_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn parse_error(response: Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<AnthropicErrorEnvelope>(&body)
            .map(|envelope| envelope.error.message)
            .unwrap_or_else(|_| format!("Anthropic request failed with status {status}"));

        ProviderError::from_http_status(status.as_u16(), message)
    }
}

impl AnthropicTransport for AnthropicHttpTransport {
    fn create_message<'a>(
        &'a self,
        request: AnthropicRequest,
        api_key: SecretString,
    ) -> ProviderFuture<'a, Result<AnthropicResponse, ProviderError>> {
        Box::pin(async move {
            let url = format!("{}/messages", self.base_url.trim_end_matches('/'));
            let response = self
                .client
                .post(url)
                .header("x-api-key", api_key.expose())
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&request)
                .send()
                .await
                .map_err(|err| {
                    if err.is_timeout() {
                        ProviderError::timeout(err.to_string())
                    } else {
                        ProviderError::transport(err.to_string())
                    }
                })?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            response
                .json::<AnthropicResponse>()
                .await
                .map_err(|err| ProviderError::transport(err.to_string()))
        })
    }
}

#[derive(Clone)]
pub struct AnthropicProvider {
    credentials: Arc<SecureCredentialManager>,
    transport: Arc<dyn AnthropicTransport>,
    max_tokens: u32,
}

impl AnthropicProvider {
    pub fn new(
        credentials: Arc<SecureCredentialManager>,
        transport: Arc<dyn AnthropicTransport>,
    ) -> Self {
        Self {
            credentials,
            transport,
            max_tokens: ANTHROPIC_DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn build_request(
        &self,
        history: &[Message],
        config: &AiConfig,
    ) -> Result<AnthropicRequest, ProviderError> {
        if !ANTHROPIC_SUPPORTED_MODELS.contains(&config.model_name()) {
            return Err(ProviderError::unsupported_model(format!(
                "unknown or unsupported model: {}",
                config.model_name()
            )));
        }

        let messages = history
            .iter()
            .filter_map(AnthropicMessage::from_message)
            .collect::<Vec<_>>();
        if messages.is_empty() {
            return Err(ProviderError::invalid_request(
                "Anthropic request requires at least one non-empty message",
            ));
        }

        Ok(AnthropicRequest {
            model: config.model_name().to_string(),
            max_tokens: self.max_tokens,
            system: (!config.system_prompt.is_empty()).then(|| config.system_prompt.clone()),
            messages,
        })
    }
}

impl ModelProvider for AnthropicProvider {
    fn name(&self) -> &str {
        PROVIDER_ANTHROPIC
    }

    fn send_message<'a>(
        &'a self,
        history: &'a [Message],
        config: &'a AiConfig,
    ) -> ProviderFuture<'a, Result<MessageContent, ProviderError>> {
        Box::pin(async move {
            let request = self.build_request(history, config)?;
            let api_key = self.credentials.require_api_key(PROVIDER_ANTHROPIC)?;
            let response = self.transport.create_message(request, api_key).await?;
            Ok(MessageContent::text(response.text()))
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::{MediaItem, Model, Provider, ProviderErrorKind, User};

    #[derive(Debug)]
    struct NoopTransport;

    impl AnthropicTransport for NoopTransport {
        fn create_message<'a>(
            &'a self,
            _request: AnthropicRequest,
            _api_key: SecretString,
        ) -> ProviderFuture<'a, Result<AnthropicResponse, ProviderError>> {
            Box::pin(async { Err(ProviderError::other("not used")) })
        }
    }

    fn config(model: &str) -> AiConfig {
        let now = Utc::now();
        AiConfig {
            id: Uuid::new_v4(),
            name: "claude".to_string(),
            model: Model {
                id: Uuid::new_v4(),
                provider: Provider {
                    id: Uuid::new_v4(),
                    name: "anthropic".to_string(),
                    created_at: now,
                    updated_at: now,
                },
                name: model.to_string(),
                description: None,
                created_at: now,
            },
            system_prompt: String::new(),
            created_at: now,
            updated_at: now,
            last_used_at: None,
        }
    }

    fn message(role: Role, author: Option<&str>, content: MessageContent) -> Message {
        let now = Utc::now();
        Message {
            id: Uuid::new_v4(),
            conversation_id: Uuid::nil(),
            user: author.map(|name| User {
                id: Uuid::new_v4(),
                name: name.to_string(),
                created_at: now,
                updated_at: now,
            }),
            role,
            content,
            created_at: now,
        }
    }

    #[test]
    fn builds_messages_request_with_url_sources() {
        let provider = AnthropicProvider::new(
            Arc::new(SecureCredentialManager::new()),
            Arc::new(NoopTransport),
        );
        let history = vec![
            message(
                Role::User,
                Some("carol"),
                MessageContent::text("see attached")
                    .with_media(MediaItem::new("image", "https://x/p.png"))
                    .with_media(MediaItem::new("file", "https://x/r.pdf"))
                    .with_media(MediaItem::new("video", "https://x/v.mp4")),
            ),
            message(Role::Assistant, None, MessageContent::default()),
            message(Role::Assistant, None, MessageContent::text("got it")),
        ];

        let request = provider
            .build_request(&history, &config("claude-3-5-haiku-20241022"))
            .unwrap();
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["max_tokens"], 1024);
        assert!(json.get("system").is_none());
        assert_eq!(json["messages"].as_array().map(Vec::len), Some(2));
        assert_eq!(
            json["messages"][0]["content"],
            json!([
                { "type": "text", "text": "carol: see attached" },
                { "type": "image", "source": { "type": "url", "url": "https://x/p.png" } },
                { "type": "document", "source": { "type": "url", "url": "https://x/r.pdf" } }
            ])
        );
        assert_eq!(json["messages"][1]["role"], "assistant");
    }

    #[test]
    fn rejects_models_outside_supported_set() {
        let provider = AnthropicProvider::new(
            Arc::new(SecureCredentialManager::new()),
            Arc::new(NoopTransport),
        );
        let history = vec![message(Role::User, None, MessageContent::text("hi"))];

        let err = provider
            .build_request(&history, &config("claude-2"))
            .unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::UnsupportedModel);
    }

    #[test]
    fn response_text_skips_non_text_blocks() {
        let response: AnthropicResponse = serde_json::from_value(json!({
            "id": "msg_1",
            "model": "claude-3-5-haiku-20241022",
            "content": [
                { "type": "text", "text": "a" },
                { "type": "tool_use", "id": "t", "name": "n", "input": {} },
                { "type": "text", "text": "b" }
            ],
            "stop_reason": "end_turn"
        }))
        .unwrap();

        assert_eq!(response.text(), "ab");
    }
}
