//! OpenAI Responses HTTP payload serde models and conversion helpers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ProviderError;

use super::types::{OpenAiInputItem, OpenAiInputPart, OpenAiRequest, OpenAiResponse};

pub(crate) fn build_api_request(request: OpenAiRequest) -> Result<OpenAiApiRequest, ProviderError> {
    if request.input.is_empty() {
        return Err(ProviderError::invalid_request(
            "OpenAI request requires at least one input item",
        ));
    }

    let input = request
        .input
        .into_iter()
        .map(OpenAiApiInputMessage::from)
        .collect::<Vec<_>>();

    Ok(OpenAiApiRequest {
        model: request.model,
        instructions: request.instructions.filter(|value| !value.is_empty()),
        input,
        reasoning: request.reasoning_effort.map(|effort| OpenAiApiReasoning {
            effort: effort.as_str(),
        }),
    })
}

pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<OpenAiApiErrorEnvelope>(body).ok()?;
    Some(parsed.error.message)
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiErrorEnvelope {
    pub error: OpenAiApiError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiError {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiRequest {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    pub input: Vec<OpenAiApiInputMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<OpenAiApiReasoning>,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiReasoning {
    pub effort: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiInputMessage {
    pub r#type: &'static str,
    pub role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<&'static str>,
    pub content: Vec<OpenAiApiContentPart>,
}

impl From<OpenAiInputItem> for OpenAiApiInputMessage {
    fn from(value: OpenAiInputItem) -> Self {
        match value {
            OpenAiInputItem::Input { role, parts } => Self {
                r#type: "message",
                role: role.as_str(),
                id: None,
                status: None,
                content: parts.into_iter().map(OpenAiApiContentPart::from).collect(),
            },
            OpenAiInputItem::Output { id, text } => Self {
                r#type: "message",
                role: "assistant",
                id: Some(id),
                status: Some("completed"),
                content: text
                    .into_iter()
                    .map(|text| OpenAiApiContentPart::OutputText {
                        text,
                        annotations: Vec::new(),
                    })
                    .collect(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum OpenAiApiContentPart {
    InputText { text: String },
    InputImage { image_url: String },
    InputFile { file_url: String },
    OutputText { text: String, annotations: Vec<Value> },
}

impl From<OpenAiInputPart> for OpenAiApiContentPart {
    fn from(value: OpenAiInputPart) -> Self {
        match value {
            OpenAiInputPart::Text(text) => Self::InputText { text },
            OpenAiInputPart::Image { url } => Self::InputImage { image_url: url },
            OpenAiInputPart::File { url } => Self::InputFile { file_url: url },
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiResponse {
    pub id: String,
    pub model: String,
    #[serde(default)]
    pub output: Vec<OpenAiApiOutputItem>,
    #[serde(default)]
    pub error: Option<OpenAiApiError>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum OpenAiApiOutputItem {
    Message {
        #[serde(default)]
        content: Vec<OpenAiApiOutputContent>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum OpenAiApiOutputContent {
    OutputText { text: String },
    #[serde(other)]
    Other,
}

impl TryFrom<OpenAiApiResponse> for OpenAiResponse {
    type Error = ProviderError;

    fn try_from(value: OpenAiApiResponse) -> Result<Self, Self::Error> {
        if let Some(error) = value.error {
            return Err(ProviderError::unavailable(error.message));
        }

        let output_text = value
            .output
            .into_iter()
            .filter_map(|item| match item {
                OpenAiApiOutputItem::Message { content } => Some(content),
                OpenAiApiOutputItem::Other => None,
            })
            .flatten()
            .filter_map(|content| match content {
                OpenAiApiOutputContent::OutputText { text } => Some(text),
                OpenAiApiOutputContent::Other => None,
            })
            .collect::<String>();

        Ok(Self {
            id: value.id,
            model: value.model,
            output_text,
        })
    }
}
