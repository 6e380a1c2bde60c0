//! Data exchanged between pipeline stages.
//!
//! Field names serialise in camelCase so a browser front-end can consume the
//! same JSON shapes the mock functions have always produced.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Speech-to-text
// ---------------------------------------------------------------------------

/// One progressive transcript emission.
///
/// `text` always holds the full transcript so far, never just the new word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SttChunk {
    /// Transcript prefix recognised so far.
    pub text: String,
    /// Recogniser confidence in `[0.0, 1.0]`.
    pub confidence: f64,
    /// Wall-clock time of the emission, Unix epoch milliseconds.
    pub timestamp: i64,
}

// ---------------------------------------------------------------------------
// Language model
// ---------------------------------------------------------------------------

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single chat-completion message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One streamed completion token.
///
/// Tokens carry their own leading separator, so concatenating every `token`
/// in emission order rebuilds the response exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmToken {
    pub token: String,
    /// `true` only on the final token of a completion.
    pub done: bool,
}

// ---------------------------------------------------------------------------
// Text-to-speech
// ---------------------------------------------------------------------------

/// Mono PCM produced by a TTS stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizedAudio {
    /// 32-bit float samples.
    #[serde(rename = "audioBuffer")]
    pub samples: Vec<f32>,
    /// Length in seconds.
    pub duration: f64,
    /// Samples per second.
    pub sample_rate: u32,
}

// ---------------------------------------------------------------------------
// Tool calls / transforms
// ---------------------------------------------------------------------------

/// A named tool invocation with free-form JSON parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Map::new(),
        }
    }

    /// Builder-style parameter insertion.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

/// Result payload of a tool call.  Its shape depends on the tool name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub result: Value,
}

/// Output of a transform stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformOutput {
    pub data: Value,
}
