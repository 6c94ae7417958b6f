//! Small convenience constructors for message content.

use ioprovider::catalog::{PROVIDER_ANTHROPIC, PROVIDER_OPENAI};
use ioprovider::{MediaItem, MessageContent};

pub fn text(content: impl Into<String>) -> MessageContent {
    MessageContent::text(content)
}

pub fn image(url: impl Into<String>) -> MediaItem {
    MediaItem::new("image", url)
}

pub fn file(url: impl Into<String>, file_name: impl Into<String>) -> MediaItem {
    MediaItem::new("file", url).with_file_name(file_name)
}

/// Maps common spellings onto catalog provider names.
pub fn parse_provider_name(value: &str) -> Option<&'static str> {
    match value.trim().to_ascii_lowercase().as_str() {
        "openai" | "open-ai" | "gpt" => Some(PROVIDER_OPENAI),
        "anthropic" | "claude" => Some(PROVIDER_ANTHROPIC),
        _ => None,
    }
}
