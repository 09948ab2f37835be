//! DeepSeek chat-completions wire types.
//!
//! The API is OpenAI-shaped: a `messages` array of role/content pairs in,
//! `choices[0].message.content` out, and SSE `data:` lines carrying
//! `choices[0].delta.content` fragments when streaming.

use serde::{Deserialize, Serialize};

use crate::core::conversation::{Role, Turn};

/// Request body for `POST {base_url}/chat/completions`.
#[derive(Serialize, Debug)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<WireMessage>,
    pub stream: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
}

/// Non-streaming response envelope.
#[derive(Deserialize, Debug)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
pub struct Choice {
    pub message: WireMessage,
}

/// One parsed SSE `data:` payload. Fields the stream omits (role deltas,
/// finish markers) default to empty rather than failing the parse.
#[derive(Deserialize, Debug)]
pub struct StreamEvent {
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
}

#[derive(Deserialize, Debug, Default)]
pub struct StreamChoice {
    #[serde(default)]
    pub delta: Delta,
}

#[derive(Deserialize, Debug, Default)]
pub struct Delta {
    #[serde(default)]
    pub content: Option<String>,
}

/// Converts conversation turns into the wire message array.
pub fn turns_to_wire(turns: &[Turn]) -> Vec<WireMessage> {
    turns
        .iter()
        .map(|t| WireMessage {
            role: t.role,
            content: t.content.clone(),
        })
        .collect()
}
