//! OpenAI Responses adapter types and domain conversion logic.

use std::fmt::Formatter;

use crate::{MediaKind, Message, Role, SecretString};

/// A Responses API call before wire encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiRequest {
    /// Vendor model identifier, already mapped from the catalog name.
    pub model: String,
    pub instructions: Option<String>,
    pub input: Vec<OpenAiInputItem>,
    pub reasoning_effort: Option<OpenAiReasoningEffort>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenAiInputItem {
    /// A user, system or developer turn.
    Input {
        role: OpenAiRole,
        parts: Vec<OpenAiInputPart>,
    },
    /// A previous assistant turn replayed as completed output.
    Output { id: String, text: Option<String> },
}

impl OpenAiInputItem {
    /// Flattens one stored message into a Responses input item.
    ///
    /// Authored text is prefixed with `"<name>: "` so several speakers fit one
    /// linear transcript. Unknown media kinds are dropped.
    pub fn from_message(message: &Message) -> Self {
        if message.role == Role::Assistant {
            let text = (!message.content.text.is_empty()).then(|| message.content.text.clone());
            return Self::Output {
                id: format!("msg_{}", message.id),
                text,
            };
        }

        let mut parts = Vec::with_capacity(message.content.media.len() + 1);
        let text = &message.content.text;
        if !text.is_empty() {
            let text = match message.author_name() {
                Some(author) => format!("{author}: {text}"),
                None => text.clone(),
            };
            parts.push(OpenAiInputPart::Text(text));
        }

        for item in &message.content.media {
            match item.kind() {
                Some(MediaKind::Image) => parts.push(OpenAiInputPart::Image {
                    url: item.url.clone(),
                }),
                Some(MediaKind::Video | MediaKind::File | MediaKind::Audio) => {
                    parts.push(OpenAiInputPart::File {
                        url: item.url.clone(),
                    })
                }
                None => {}
            }
        }

        Self::Input {
            role: message.role.into(),
            parts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenAiInputPart {
    Text(String),
    Image { url: String },
    File { url: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenAiRole {
    User,
    System,
    Developer,
}

impl OpenAiRole {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::System => "system",
            Self::Developer => "developer",
        }
    }
}

impl From<Role> for OpenAiRole {
    fn from(value: Role) -> Self {
        match value {
            Role::System => Self::System,
            Role::Developer => Self::Developer,
            Role::User | Role::Assistant => Self::User,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenAiReasoningEffort {
    Low,
    Medium,
    High,
}

impl OpenAiReasoningEffort {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiResponse {
    pub id: String,
    pub model: String,
    /// Concatenated `output_text` of every assistant output message.
    pub output_text: String,
}

#[derive(Clone, PartialEq, Eq)]
pub enum OpenAiAuth {
    ApiKey(SecretString),
}

impl std::fmt::Debug for OpenAiAuth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("OpenAiAuth::ApiKey([REDACTED])"),
        }
    }
}
