//! Text generation seam.
//!
//! Story and lyric text come from whichever LLM backend the application wires
//! in; this module only fixes the shape of the call.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

impl FromStr for ChatRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(ChatRole::System),
            "user" => Ok(ChatRole::User),
            "assistant" => Ok(ChatRole::Assistant),
            _ => Err(format!("Invalid chat role: {}", s)),
        }
    }
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One turn of a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }
}

/// Input to a text generation model: a raw prompt or ordered chat turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextPrompt<'a> {
    Raw(&'a str),
    Chat(&'a [ChatMessage]),
}

impl TextPrompt<'_> {
    /// True when there is no non-whitespace content to send.
    pub fn is_empty(&self) -> bool {
        match self {
            TextPrompt::Raw(text) => text.trim().is_empty(),
            TextPrompt::Chat(turns) => turns.iter().all(|m| m.content.trim().is_empty()),
        }
    }

    /// Flatten the prompt for completion-style backends, one `role: content`
    /// line per chat turn.
    pub fn to_plain_text(&self) -> String {
        match self {
            TextPrompt::Raw(text) => text.to_string(),
            TextPrompt::Chat(turns) => turns
                .iter()
                .map(|m| format!("{}: {}", m.role, m.content))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl<'a> From<&'a str> for TextPrompt<'a> {
    fn from(text: &'a str) -> Self {
        TextPrompt::Raw(text)
    }
}

impl<'a> From<&'a String> for TextPrompt<'a> {
    fn from(text: &'a String) -> Self {
        TextPrompt::Raw(text)
    }
}

impl<'a> From<&'a [ChatMessage]> for TextPrompt<'a> {
    fn from(turns: &'a [ChatMessage]) -> Self {
        TextPrompt::Chat(turns)
    }
}

impl<'a> From<&'a Vec<ChatMessage>> for TextPrompt<'a> {
    fn from(turns: &'a Vec<ChatMessage>) -> Self {
        TextPrompt::Chat(turns)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum TextGenerationError {
    #[error("Prompt is empty")]
    EmptyPrompt,
    #[error("Text generation backend failed: {0}")]
    Backend(String),
}

/// Common interface for text generation backends.
pub trait TextGenerationModel {
    fn generate_text(&self, prompt: TextPrompt<'_>) -> Result<String, TextGenerationError>;
}
