//! Chat messages and per-companion history.
//!
//! History for one (account, companion) pair is an append-ordered array
//! that is stored and rewritten as a whole after every turn.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Number of trailing messages sent to the model as conversation context.
pub const CONTEXT_MESSAGES: usize = 40;

/// Longest accepted user message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4000;

/// Largest accepted inline image, in base64 characters (~3 MB decoded).
pub const MAX_IMAGE_BASE64_LEN: usize = 4 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Companion,
}

/// Inline image sent with a user message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAttachment {
    pub mime_type: String,
    /// Base64 payload without a `data:` prefix.
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub sender: Sender,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageAttachment>,
    /// Base64 audio of a synthesized voice reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    pub created_at: Timestamp,
}

impl ChatMessage {
    pub fn from_user(text: impl Into<String>, image: Option<ImageAttachment>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            sender: Sender::User,
            text: text.into(),
            image,
            audio: None,
            created_at: Utc::now(),
        }
    }

    pub fn from_companion(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            sender: Sender::Companion,
            text: text.into(),
            image: None,
            audio: None,
            created_at: Utc::now(),
        }
    }
}

/// Check a user turn before it is sent to the model.
pub fn validate_user_turn(text: &str, image: Option<&ImageAttachment>) -> Result<(), CoreError> {
    if text.trim().is_empty() && image.is_none() {
        return Err(CoreError::Validation(
            "Message needs text or an image".into(),
        ));
    }
    if text.chars().count() > MAX_MESSAGE_CHARS {
        return Err(CoreError::Validation(format!(
            "Message exceeds {MAX_MESSAGE_CHARS} characters"
        )));
    }
    if let Some(img) = image {
        if !img.mime_type.starts_with("image/") {
            return Err(CoreError::Validation(format!(
                "Unsupported attachment type '{}'",
                img.mime_type
            )));
        }
        if img.data.len() > MAX_IMAGE_BASE64_LEN {
            return Err(CoreError::Validation("Image attachment is too large".into()));
        }
    }
    Ok(())
}

/// The trailing slice of `history` used as model context.
pub fn context_window(history: &[ChatMessage], n: usize) -> &[ChatMessage] {
    let start = history.len().saturating_sub(n);
    &history[start..]
}

/// Count user-sent messages at or after `since` across several histories.
pub fn count_user_messages_since<'a, I>(histories: I, since: Timestamp) -> u32
where
    I: IntoIterator<Item = &'a [ChatMessage]>,
{
    histories
        .into_iter()
        .flat_map(|h| h.iter())
        .filter(|m| m.sender == Sender::User && m.created_at >= since)
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_window_keeps_the_tail() {
        let history: Vec<_> = (0..5)
            .map(|i| ChatMessage::from_user(format!("m{i}"), None))
            .collect();
        let ctx = context_window(&history, 2);
        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx[0].text, "m3");
        assert_eq!(context_window(&history, 50).len(), 5);
    }

    #[test]
    fn counts_only_recent_user_messages() {
        let mut old = ChatMessage::from_user("yesterday", None);
        old.created_at = Utc::now() - chrono::Duration::days(1);
        let a = vec![old, ChatMessage::from_user("hi", None)];
        let b = vec![
            ChatMessage::from_companion("hello"),
            ChatMessage::from_user("again", None),
        ];
        let since = Utc::now() - chrono::Duration::hours(1);
        assert_eq!(count_user_messages_since([a.as_slice(), b.as_slice()], since), 2);
    }

    #[test]
    fn empty_turn_is_rejected() {
        assert!(validate_user_turn("  ", None).is_err());
        let img = ImageAttachment {
            mime_type: "image/png".into(),
            data: "iVBORw0KGgo=".into(),
        };
        assert!(validate_user_turn("", Some(&img)).is_ok());
    }

    #[test]
    fn non_image_attachment_is_rejected() {
        let pdf = ImageAttachment {
            mime_type: "application/pdf".into(),
            data: "JVBERi0=".into(),
        };
        assert!(validate_user_turn("look", Some(&pdf)).is_err());
    }

    #[test]
    fn messages_serialize_without_empty_media() {
        let msg = ChatMessage::from_companion("hey");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["sender"], "companion");
        assert!(json.get("image").is_none());
        assert!(json.get("audio").is_none());
    }
}
