#![cfg(feature = "provider-anthropic")]

use std::sync::{Arc, Mutex};

use chrono::Utc;
use ioprovider::adapters::anthropic::{
    AnthropicProvider, AnthropicRequest, AnthropicResponse, AnthropicResponseBlock,
    AnthropicTransport,
};
use ioprovider::{
    AiConfig, Message, MessageContent, Model, ModelProvider, Provider, ProviderError,
    ProviderErrorKind, ProviderFuture, Role, SecretString, SecureCredentialManager, User,
};
use uuid::Uuid;

#[derive(Debug, Default)]
struct FakeTransport {
    captured: Mutex<Option<(AnthropicRequest, String)>>,
}

impl AnthropicTransport for FakeTransport {
    fn create_message<'a>(
        &'a self,
        request: AnthropicRequest,
        api_key: SecretString,
    ) -> ProviderFuture<'a, Result<AnthropicResponse, ProviderError>> {
        Box::pin(async move {
            *self.captured.lock().expect("capture lock") =
                Some((request, api_key.expose().to_string()));

            Ok(AnthropicResponse {
                id: "msg_1".to_string(),
                model: "claude-3-5-sonnet-20241022".to_string(),
                content: vec![AnthropicResponseBlock::Text {
                    text: "bonjour".to_string(),
                }],
                stop_reason: Some("end_turn".to_string()),
            })
        })
    }
}

fn config() -> AiConfig {
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
            name: "claude-3-5-sonnet-20241022".to_string(),
            description: None,
            created_at: now,
        },
        system_prompt: "Reply in French.".to_string(),
        created_at: now,
        updated_at: now,
        last_used_at: None,
    }
}

fn history() -> Vec<Message> {
    let now = Utc::now();
    vec![Message {
        id: Uuid::new_v4(),
        conversation_id: Uuid::nil(),
        user: Some(User {
            id: Uuid::new_v4(),
            name: "dave".to_string(),
            created_at: now,
            updated_at: now,
        }),
        role: Role::User,
        content: MessageContent::text("hello"),
        created_at: now,
    }]
}

#[tokio::test]
async fn anthropic_provider_sends_system_prompt_and_key() {
    let credentials = Arc::new(SecureCredentialManager::new());
    credentials
        .set_anthropic_api_key("sk-ant-test")
        .expect("key should set");
    let transport = Arc::new(FakeTransport::default());
    let provider = AnthropicProvider::new(credentials, transport.clone()).with_max_tokens(256);

    let reply = provider
        .send_message(&history(), &config())
        .await
        .expect("send should succeed");
    assert_eq!(reply.text, "bonjour");

    let (request, key) = transport
        .captured
        .lock()
        .expect("capture lock")
        .clone()
        .expect("request should be captured");
    assert_eq!(key, "sk-ant-test");
    assert_eq!(request.system.as_deref(), Some("Reply in French."));
    assert_eq!(request.max_tokens, 256);
    assert_eq!(request.messages.len(), 1);
    assert_eq!(request.messages[0].role, "user");
}

#[tokio::test]
async fn anthropic_provider_requires_credentials() {
    let provider = AnthropicProvider::new(
        Arc::new(SecureCredentialManager::new()),
        Arc::new(FakeTransport::default()),
    );

    let err = provider
        .send_message(&history(), &config())
        .await
        .expect_err("missing key must fail");
    assert_eq!(err.kind, ProviderErrorKind::Authentication);
    assert_eq!(provider.name(), "anthropic");
}
