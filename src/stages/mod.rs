//! Pipeline stages for the voice-agent simulator.
//!
//! Every stage of a voice agent (speech-to-text, language model,
//! text-to-speech, tool calls, data transforms) is expressed as a small
//! capability trait.  The orchestrator in [`crate::pipeline`] depends only on
//! those traits, so the mock implementations here can be swapped for real
//! backends (see [`ApiLlm`]) without touching orchestration logic.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐   ┌────────────┐   ┌────────────┐
//! │  SttStage  │──▶│  LlmStage  │──▶│  TtsStage  │
//! │ (stream of │   │ (stream of │   │ (one-shot  │
//! │  prefixes) │   │   tokens)  │   │   audio)   │
//! └────────────┘   └────────────┘   └────────────┘
//!
//! ToolStage / TransformStage: one-shot auxiliaries
//!
//! Jitter (seeded StdRng + Sleeper) ── shared by every mock
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use futures::StreamExt;
//! use voice_agent_sim::stages::{Jitter, MockStt, StageTiming, SttStage};
//!
//! # async fn example() {
//! let stt = MockStt::new(&StageTiming::default(), Arc::new(Jitter::from_entropy()));
//! let mut chunks = stt.transcribe(&[]).unwrap();
//! while let Some(Ok(chunk)) = chunks.next().await {
//!     println!("{} ({:.2})", chunk.text, chunk.confidence);
//! }
//! # }
//! ```

pub mod api;
pub mod llm;
pub mod stage;
pub mod stt;
pub mod timing;
pub mod tool;
pub mod transform;
pub mod tts;
pub mod types;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use api::ApiLlm;
pub use llm::{is_healthcare, tokenize_response, MockLlm};
pub use stage::{
    LlmStage, LlmStream, StageError, SttStage, SttStream, ToolStage, TransformStage, TtsStage,
};
pub use stt::{MockStt, SttFailure};
pub use timing::{DelayRange, Jitter, NoSleep, Sleeper, StageTiming, TokioSleeper};
pub use tool::MockTool;
pub use transform::{extract_entities, Entity, EntityKind, MockTransform, Sentiment, TextAnalysis};
pub use tts::{speech_duration, synthesize_tone, MockTts, TTS_SAMPLE_RATE};
pub use types::{
    ChatMessage, LlmToken, Role, SttChunk, SynthesizedAudio, ToolCall, ToolResult,
    TransformOutput,
};
