#![cfg(feature = "provider-openai")]

use std::sync::{Arc, Mutex};

use chrono::Utc;
use ioprovider::adapters::openai::{
    OpenAiAuth, OpenAiInputItem, OpenAiInputPart, OpenAiProvider, OpenAiReasoningEffort,
    OpenAiRequest, OpenAiResponse, OpenAiTransport,
};
use ioprovider::{
    AiConfig, MediaItem, Message, MessageContent, Model, ModelProvider, Provider, ProviderError,
    ProviderErrorKind, ProviderFuture, ProviderRegistry, Role, SecureCredentialManager, User,
};
use uuid::Uuid;

#[derive(Debug, Default)]
struct FakeTransport {
    captured_request: Mutex<Option<OpenAiRequest>>,
    captured_key: Mutex<Option<String>>,
    fail_with: Option<ProviderError>,
}

impl OpenAiTransport for FakeTransport {
    fn create_response<'a>(
        &'a self,
        request: OpenAiRequest,
        auth: OpenAiAuth,
    ) -> ProviderFuture<'a, Result<OpenAiResponse, ProviderError>> {
        Box::pin(async move {
            *self.captured_request.lock().expect("request lock") = Some(request);
            let OpenAiAuth::ApiKey(key) = auth;
            *self.captured_key.lock().expect("key lock") = Some(key.expose().to_string());

            if let Some(error) = &self.fail_with {
                return Err(error.clone());
            }

            Ok(OpenAiResponse {
                id: "resp_1".to_string(),
                model: "gpt-5-nano".to_string(),
                output_text: "hello".to_string(),
            })
        })
    }
}

fn config(model: &str) -> AiConfig {
    let now = Utc::now();
    AiConfig {
        id: Uuid::new_v4(),
        name: "Io".to_string(),
        model: Model {
            id: Uuid::new_v4(),
            provider: Provider {
                id: Uuid::new_v4(),
                name: "openai".to_string(),
                created_at: now,
                updated_at: now,
            },
            name: model.to_string(),
            description: None,
            created_at: now,
        },
        system_prompt: "You are Io.".to_string(),
        created_at: now,
        updated_at: now,
        last_used_at: None,
    }
}

fn user_message(name: &str, content: MessageContent) -> Message {
    let now = Utc::now();
    Message {
        id: Uuid::new_v4(),
        conversation_id: Uuid::nil(),
        user: Some(User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        }),
        role: Role::User,
        content,
        created_at: now,
    }
}

fn assistant_message(text: &str) -> Message {
    Message {
        id: Uuid::new_v4(),
        conversation_id: Uuid::nil(),
        user: None,
        role: Role::Assistant,
        content: MessageContent::text(text),
        created_at: Utc::now(),
    }
}

fn credentials() -> Arc<SecureCredentialManager> {
    let credentials = Arc::new(SecureCredentialManager::new());
    credentials
        .set_openai_api_key("sk-test-123")
        .expect("key should set");
    credentials
}

#[tokio::test]
async fn openai_provider_flattens_multi_user_history() {
    let transport = Arc::new(FakeTransport::default());
    let provider = OpenAiProvider::new(credentials(), transport.clone());

    let history = vec![
        user_message("alice", MessageContent::text("hi")),
        assistant_message("hey alice"),
        user_message(
            "bob",
            MessageContent::text("what is this?")
                .with_media(MediaItem::new("image", "https://cdn/x.png").with_file_name("x.png")),
        ),
    ];

    let reply = provider
        .send_message(&history, &config("gpt-5-nano"))
        .await
        .expect("send should succeed");
    assert_eq!(reply, MessageContent::text("hello"));

    let request = transport
        .captured_request
        .lock()
        .expect("request lock")
        .clone()
        .expect("request should be captured");
    assert_eq!(request.model, "gpt-5-nano");
    assert_eq!(request.instructions.as_deref(), Some("You are Io."));
    assert_eq!(request.reasoning_effort, Some(OpenAiReasoningEffort::Low));
    assert_eq!(request.input.len(), 3);
    assert!(matches!(request.input[1], OpenAiInputItem::Output { .. }));

    let OpenAiInputItem::Input { parts, .. } = &request.input[2] else {
        panic!("bob's turn should be an input item");
    };
    assert_eq!(parts[0], OpenAiInputPart::Text("bob: what is this?".to_string()));
    assert_eq!(
        parts[1],
        OpenAiInputPart::Image {
            url: "https://cdn/x.png".to_string()
        }
    );

    assert_eq!(
        transport.captured_key.lock().expect("key lock").as_deref(),
        Some("sk-test-123")
    );
}

#[tokio::test]
async fn openai_provider_fails_without_credentials() {
    let transport = Arc::new(FakeTransport::default());
    let provider = OpenAiProvider::new(Arc::new(SecureCredentialManager::new()), transport.clone());

    let history = vec![user_message("alice", MessageContent::text("hi"))];
    let err = provider
        .send_message(&history, &config("gpt-5-mini"))
        .await
        .expect_err("missing key must fail");

    assert_eq!(err.kind, ProviderErrorKind::Authentication);
    assert!(transport.captured_request.lock().expect("request lock").is_none());
}

#[tokio::test]
async fn openai_provider_rejects_unsupported_model_before_network() {
    let transport = Arc::new(FakeTransport::default());
    let provider = OpenAiProvider::new(credentials(), transport.clone());

    let history = vec![user_message("alice", MessageContent::text("hi"))];
    let err = provider
        .send_message(&history, &config("gpt-4.1-nano"))
        .await
        .expect_err("model outside adapter set must fail");

    assert_eq!(err.kind, ProviderErrorKind::UnsupportedModel);
    assert!(transport.captured_request.lock().expect("request lock").is_none());
}

#[tokio::test]
async fn openai_provider_propagates_transport_failures() {
    let transport = Arc::new(FakeTransport {
        fail_with: Some(ProviderError::rate_limited("slow down")),
        ..FakeTransport::default()
    });
    let provider = OpenAiProvider::new(credentials(), transport)
        .with_reasoning_effort(OpenAiReasoningEffort::Medium);

    let history = vec![user_message("alice", MessageContent::text("hi"))];
    let err = provider
        .send_message(&history, &config("gpt-5-nano"))
        .await
        .expect_err("transport failure must surface");

    assert_eq!(err.kind, ProviderErrorKind::RateLimited);
    assert!(err.retryable);
}

#[tokio::test]
async fn registry_dispatches_by_provider_name() {
    let mut registry = ProviderRegistry::new();
    registry.register(OpenAiProvider::new(
        credentials(),
        Arc::new(FakeTransport::default()),
    ));

    let provider = registry.get("openai").expect("openai should be registered");
    let history = vec![user_message("alice", MessageContent::text("hi"))];
    let reply = provider
        .send_message(&history, &config("gpt-5-nano"))
        .await
        .expect("dispatch should succeed");

    assert_eq!(reply.text, "hello");
    assert!(registry.get("anthropic").is_none());
}
