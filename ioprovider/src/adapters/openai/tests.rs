//! Focused unit tests for OpenAI adapter internals.

#![cfg(test)]

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::{
    AiConfig, MediaItem, Message, MessageContent, Model, Provider, ProviderError,
    ProviderErrorKind, ProviderFuture, Role, SecureCredentialManager, User,
};

use super::provider::OpenAiProvider;
use super::serde_api::{OpenAiApiResponse, build_api_request};
use super::transport::OpenAiTransport;
use super::types::{OpenAiAuth, OpenAiInputItem, OpenAiInputPart, OpenAiRequest, OpenAiResponse};

#[derive(Debug)]
struct NoopTransport;

impl OpenAiTransport for NoopTransport {
    fn create_response<'a>(
        &'a self,
        _request: OpenAiRequest,
        _auth: OpenAiAuth,
    ) -> ProviderFuture<'a, Result<OpenAiResponse, ProviderError>> {
        Box::pin(async { Err(ProviderError::other("not used")) })
    }
}

fn provider() -> OpenAiProvider {
    OpenAiProvider::new(
        Arc::new(SecureCredentialManager::new()),
        Arc::new(NoopTransport),
    )
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
        system_prompt: "be brief".to_string(),
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
fn input_turn_prefixes_author_and_maps_media() {
    let content = MessageContent::text("look")
        .with_media(MediaItem::new("image", "https://x/a.png"))
        .with_media(MediaItem::new("video", "https://x/b.mp4"))
        .with_media(MediaItem::new("sticker", "https://x/c.webp"))
        .with_media(MediaItem::new("audio", "https://x/d.ogg"));
    let item = OpenAiInputItem::from_message(&message(Role::User, Some("alice"), content));

    let OpenAiInputItem::Input { parts, .. } = item else {
        panic!("user message should map to an input item");
    };
    assert_eq!(
        parts,
        vec![
            OpenAiInputPart::Text("alice: look".to_string()),
            OpenAiInputPart::Image {
                url: "https://x/a.png".to_string()
            },
            OpenAiInputPart::File {
                url: "https://x/b.mp4".to_string()
            },
            OpenAiInputPart::File {
                url: "https://x/d.ogg".to_string()
            },
        ]
    );
}

#[test]
fn input_turn_without_text_has_no_prefix_part() {
    let content = MessageContent::default().with_media(MediaItem::new("image", "https://x/a.png"));
    let item = OpenAiInputItem::from_message(&message(Role::User, Some("bob"), content));

    let OpenAiInputItem::Input { parts, .. } = item else {
        panic!("expected input item");
    };
    assert_eq!(parts.len(), 1);
    assert!(matches!(parts[0], OpenAiInputPart::Image { .. }));
}

#[test]
fn assistant_turn_becomes_completed_output_message() {
    let reply = message(Role::Assistant, None, MessageContent::text("hello"));
    let item = OpenAiInputItem::from_message(&reply);
    assert_eq!(
        item,
        OpenAiInputItem::Output {
            id: format!("msg_{}", reply.id),
            text: Some("hello".to_string()),
        }
    );

    let request = OpenAiRequest {
        model: "gpt-5-nano".to_string(),
        instructions: None,
        input: vec![item],
        reasoning_effort: None,
    };
    let json = serde_json::to_value(build_api_request(request).unwrap()).unwrap();
    assert_eq!(json["input"][0]["role"], "assistant");
    assert_eq!(json["input"][0]["status"], "completed");
    assert_eq!(json["input"][0]["content"][0]["type"], "output_text");
    assert!(json.get("instructions").is_none());
}

#[test]
fn request_maps_model_and_reasoning_per_supported_set() {
    let history = vec![message(Role::User, Some("alice"), MessageContent::text("hi"))];

    let nano = provider()
        .build_openai_request(&history, &config("gpt-5-nano"))
        .unwrap();
    let json = serde_json::to_value(build_api_request(nano).unwrap()).unwrap();
    assert_eq!(json["model"], "gpt-5-nano");
    assert_eq!(json["instructions"], "be brief");
    assert_eq!(json["reasoning"]["effort"], "low");
    assert_eq!(
        json["input"][0],
        json!({
            "type": "message",
            "role": "user",
            "content": [{ "type": "input_text", "text": "alice: hi" }]
        })
    );

    let chat = provider()
        .build_openai_request(&history, &config("gpt-5.1"))
        .unwrap();
    assert_eq!(chat.model, "gpt-5-chat-latest");
    assert_eq!(chat.reasoning_effort, None);
}

#[test]
fn catalog_model_outside_adapter_set_is_rejected() {
    let history = vec![message(Role::User, None, MessageContent::text("hi"))];
    let err = provider()
        .build_openai_request(&history, &config("gpt-4.1-nano"))
        .unwrap_err();

    assert_eq!(err.kind, ProviderErrorKind::UnsupportedModel);
    assert_eq!(err.message, "unknown or unsupported model: gpt-4.1-nano");
}

#[test]
fn response_output_text_concatenates_message_parts() {
    let raw = json!({
        "id": "resp_1",
        "model": "gpt-5-nano",
        "error": null,
        "output": [
            { "type": "reasoning", "id": "rs_1", "summary": [] },
            {
                "type": "message",
                "role": "assistant",
                "content": [
                    { "type": "output_text", "text": "hel", "annotations": [] },
                    { "type": "refusal", "refusal": "no" },
                    { "type": "output_text", "text": "lo", "annotations": [] }
                ]
            }
        ]
    });

    let parsed: OpenAiApiResponse = serde_json::from_value(raw).unwrap();
    let response = OpenAiResponse::try_from(parsed).unwrap();
    assert_eq!(response.output_text, "hello");
    assert_eq!(response.id, "resp_1");
}
