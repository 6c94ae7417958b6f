//! Message content encoding for the store.
//!
//! Decoding is lenient: a stored blob that is not valid content JSON reads back
//! as empty content so one corrupt row cannot block history loading.
//!
//! ```rust
//! use iochat::codec::{decode_content, encode_content};
//! use ioprovider::MessageContent;
//!
//! let encoded = encode_content(&MessageContent::text("hi")).unwrap();
//! assert_eq!(decode_content(&encoded), MessageContent::text("hi"));
//! assert_eq!(decode_content("not json"), MessageContent::default());
//! ```

use ioprovider::{Message, MessageContent, Role};

use crate::{ChatError, StoredMessage};

pub fn encode_content(content: &MessageContent) -> Result<String, ChatError> {
    Ok(serde_json::to_string(content)?)
}

pub fn decode_content(raw: &str) -> MessageContent {
    match serde_json::from_str(raw) {
        Ok(content) => content,
        Err(error) => {
            tracing::warn!(error = %error, "stored message content is malformed; using empty content");
            MessageContent::default()
        }
    }
}

/// Converts a store row into a domain message.
///
/// A row whose role is not one of the known roles is skipped with a warning
/// so it cannot block the rest of the history.
pub fn message_from_stored(row: StoredMessage) -> Option<Message> {
    let Some(role) = Role::parse(&row.role) else {
        tracing::warn!(message_id = %row.id, role = %row.role, "skipping stored message with unknown role");
        return None;
    };

    Some(Message {
        id: row.id,
        conversation_id: row.conversation_id,
        user: row.user,
        role,
        content: decode_content(&row.content),
        created_at: row.created_at,
    })
}
