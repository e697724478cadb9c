//! Conversation and chat input types

use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, GatewayResult};

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User message
    User,
    /// Assistant (agent) message
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A text content part within a conversation turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSegment {
    /// The text content
    pub text: String,
}

impl TextSegment {
    /// Create a text segment
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// One turn of a conversation history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Who produced this turn
    pub role: Role,
    /// Content parts (text only)
    pub content: Vec<TextSegment>,
}

impl ConversationTurn {
    /// Create a user turn with a single text part
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![TextSegment::new(text)],
        }
    }

    /// Create an assistant turn with a single text part
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: vec![TextSegment::new(text)],
        }
    }
}

/// Validated chat input: either a single message or a full history
#[derive(Debug, Clone)]
pub enum ChatInput {
    /// Single user message (legacy clients)
    Message(String),
    /// Full conversation history (multi-turn clients)
    History(Vec<ConversationTurn>),
}

impl ChatInput {
    /// Build from the raw request parts, enforcing exactly-one-of.
    ///
    /// An empty history counts as absent.
    pub fn from_parts(
        message: Option<String>,
        messages: Option<Vec<ConversationTurn>>,
    ) -> GatewayResult<Self> {
        let messages = messages.filter(|m| !m.is_empty());
        match (message, messages) {
            (Some(m), None) => Ok(ChatInput::Message(m)),
            (None, Some(h)) => Ok(ChatInput::History(h)),
            _ => Err(GatewayError::MissingInput),
        }
    }

    /// Text of the most recent user-visible message, for logging
    pub fn latest_text(&self) -> &str {
        match self {
            ChatInput::Message(m) => m,
            ChatInput::History(turns) => turns
                .last()
                .and_then(|t| t.content.first())
                .map(|s| s.text.as_str())
                .unwrap_or_default(),
        }
    }
}
