//! Anthropic Messages API request payloads.
//!
//! Replies are kept as raw `serde_json::Value` envelopes so they can be
//! relayed to callers unmodified; see [`crate::ai::reply`] for reading them.

use serde::Serialize;

/// Request body for `POST /v1/messages`.
#[derive(Debug, Clone, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<Message>,
}

impl MessagesRequest {
    /// Single-turn user request.
    pub fn user(model: &str, max_tokens: u32, content: MessageContent) -> Self {
        Self {
            model: model.to_string(),
            max_tokens,
            messages: vec![Message {
                role: "user".to_string(),
                content,
            }],
        }
    }

    /// Text of the first text block across all messages.
    pub fn prompt_text(&self) -> Option<&str> {
        self.messages.iter().find_map(|m| match &m.content {
            MessageContent::Text(text) => Some(text.as_str()),
            MessageContent::Blocks(blocks) => blocks.iter().find_map(|b| match b {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Image { .. } => None,
            }),
        })
    }

    pub fn has_image(&self) -> bool {
        self.messages.iter().any(|m| match &m.content {
            MessageContent::Text(_) => false,
            MessageContent::Blocks(blocks) => blocks
                .iter()
                .any(|b| matches!(b, ContentBlock::Image { .. })),
        })
    }
}

/// Chat message object.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: String,
    pub content: MessageContent,
}

/// Plain string content or a list of typed blocks.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

/// One content segment in multipart message input.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Image { source: ImageSource },
    Text { text: String },
}

/// Inline base64 image payload.
#[derive(Debug, Clone, Serialize)]
pub struct ImageSource {
    #[serde(rename = "type")]
    pub source_type: String,
    pub media_type: String,
    pub data: String,
}

impl ImageSource {
    pub fn base64(media_type: &str, data: &str) -> Self {
        Self {
            source_type: "base64".to_string(),
            media_type: media_type.to_string(),
            data: data.to_string(),
        }
    }
}
