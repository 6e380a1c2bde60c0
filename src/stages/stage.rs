//! Stage capability traits and the shared [`StageError`].
//!
//! Streaming stages (STT, LLM) hand back a boxed [`Stream`](futures::Stream);
//! the caller pulls one item at a time, so a producer can never run ahead of
//! its consumer.  One-shot stages (TTS, tool, transform) are plain async
//! methods.
//!
//! All traits are object-safe and `Send + Sync` so implementations can be held
//! behind `Arc<dyn …>` and swapped at runtime.

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;
use thiserror::Error;

use crate::stages::types::{
    ChatMessage, LlmToken, SttChunk, SynthesizedAudio, ToolCall, ToolResult, TransformOutput,
};

// ---------------------------------------------------------------------------
// StageError
// ---------------------------------------------------------------------------

/// Why a stage failed.
///
/// The orchestrator renders any variant through `Display` into the `error`
/// field of its terminal event.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StageError {
    /// Generic stage failure with a human-readable reason.
    #[error("{0}")]
    Failed(String),

    /// HTTP transport or connection error talking to a real backend.
    #[error("backend request failed: {0}")]
    Backend(String),

    /// The backend did not answer within the configured timeout.
    #[error("stage timed out")]
    Timeout,

    /// The backend answered with something we could not decode.
    #[error("failed to parse backend response: {0}")]
    Parse(String),

    /// The backend answered with no usable content.
    #[error("backend returned an empty response")]
    EmptyResponse,
}

impl StageError {
    pub fn failed(message: impl Into<String>) -> Self {
        StageError::Failed(message.into())
    }
}

impl From<reqwest::Error> for StageError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            StageError::Timeout
        } else {
            StageError::Backend(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Stream aliases
// ---------------------------------------------------------------------------

/// Progressive transcript emissions.
pub type SttStream<'a> = BoxStream<'a, Result<SttChunk, StageError>>;

/// Streamed completion tokens.
pub type LlmStream<'a> = BoxStream<'a, Result<LlmToken, StageError>>;

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Speech-to-text.
///
/// Returning `Err` from `transcribe` means the stage refused to start at all;
/// an `Err` item inside the stream is a failure part-way through.
pub trait SttStage: Send + Sync {
    fn transcribe<'a>(&'a self, audio: &'a [u8]) -> Result<SttStream<'a>, StageError>;
}

/// Chat-completion language model.
pub trait LlmStage: Send + Sync {
    fn complete<'a>(&'a self, messages: &'a [ChatMessage]) -> Result<LlmStream<'a>, StageError>;
}

/// Text-to-speech.
#[async_trait]
pub trait TtsStage: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, StageError>;
}

/// Named tool invocation.
#[async_trait]
pub trait ToolStage: Send + Sync {
    async fn call(&self, call: &ToolCall) -> Result<ToolResult, StageError>;
}

/// Free-form data transform.
#[async_trait]
pub trait TransformStage: Send + Sync {
    async fn transform(&self, data: Value) -> Result<TransformOutput, StageError>;
}

// Compile-time assertion: every stage trait must be usable as a trait object.
const _: fn() = || {
    fn _assert_object_safe(
        _: Box<dyn SttStage>,
        _: Box<dyn LlmStage>,
        _: Box<dyn TtsStage>,
        _: Box<dyn ToolStage>,
        _: Box<dyn TransformStage>,
    ) {
    }
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_displays_bare_message() {
        assert_eq!(StageError::failed("mic unplugged").to_string(), "mic unplugged");
    }

    #[test]
    fn backend_display_mentions_cause() {
        let e = StageError::Backend("connection refused".into());
        assert!(e.to_string().contains("connection refused"));
    }

    #[test]
    fn timeout_display() {
        assert_eq!(StageError::Timeout.to_string(), "stage timed out");
    }
}
