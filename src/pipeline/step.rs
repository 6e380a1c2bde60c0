//! Progress events emitted by the simulator.
//!
//! Every run produces a sequence of [`SimulationStep`]s:
//!
//! ```text
//! stt processing ─▶ stt streaming × N ─▶ stt completed
//!   ─▶ llm processing ─▶ llm streaming × M ─▶ llm completed
//!   ─▶ tts processing ─▶ tts completed
//!   ─▶ complete
//!
//! any failure ──▶ error   (terminal, nothing follows)
//! ```
//!
//! Exactly one `complete` or `error` event ends a run.

use serde::{Deserialize, Serialize};

use crate::stages::{SttChunk, SynthesizedAudio};

// ---------------------------------------------------------------------------
// StepKind / StepStatus
// ---------------------------------------------------------------------------

/// Pipeline stage an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Stt,
    Llm,
    Tts,
    Complete,
    Error,
}

impl StepKind {
    /// A short human-readable label suitable for a status column.
    pub fn label(&self) -> &'static str {
        match self {
            StepKind::Stt => "STT",
            StepKind::Llm => "LLM",
            StepKind::Tts => "TTS",
            StepKind::Complete => "Done",
            StepKind::Error => "Error",
        }
    }
}

/// Lifecycle state of the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Processing,
    Streaming,
    Completed,
    Error,
}

impl StepStatus {
    /// Returns `true` while the stage is still producing output.
    pub fn is_busy(&self) -> bool {
        matches!(self, StepStatus::Processing | StepStatus::Streaming)
    }
}

// ---------------------------------------------------------------------------
// StepData
// ---------------------------------------------------------------------------

/// End-of-run bundle carried by the `complete` event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub transcription: String,
    pub response: String,
    pub audio: SynthesizedAudio,
    /// Sum of the three stage latencies, milliseconds.
    pub total_latency: u64,
    pub stt_latency: u64,
    pub llm_latency: u64,
    pub tts_latency: u64,
}

/// Stage-specific payload.  Serialises without a tag, matching the shapes a
/// browser front-end expects for each `step`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StepData {
    /// `stt streaming`: the latest transcript prefix.
    Partial(SttChunk),
    /// `stt completed`: the final transcript.
    Transcription { text: String },
    /// `llm streaming`: the new token and everything so far.
    Token {
        token: String,
        #[serde(rename = "fullResponse")]
        full_response: String,
    },
    /// `llm completed`: the whole reply.
    Response { response: String },
    /// `tts completed`: the synthesised clip.
    Audio(SynthesizedAudio),
    /// `complete`: every artifact and latency of the run.
    Summary(ConversationSummary),
}

// ---------------------------------------------------------------------------
// SimulationStep
// ---------------------------------------------------------------------------

/// One progress event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationStep {
    pub step: StepKind,
    pub status: StepStatus,
    /// Human-readable progress description.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<StepData>,
    /// Stage latency in milliseconds; only on `completed` events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency: Option<u64>,
    /// Failure reason; only on `error` events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SimulationStep {
    pub fn processing(step: StepKind, message: impl Into<String>) -> Self {
        Self {
            step,
            status: StepStatus::Processing,
            message: message.into(),
            data: None,
            latency: None,
            error: None,
        }
    }

    pub fn streaming(step: StepKind, data: StepData, message: impl Into<String>) -> Self {
        Self {
            step,
            status: StepStatus::Streaming,
            message: message.into(),
            data: Some(data),
            latency: None,
            error: None,
        }
    }

    pub fn completed(
        step: StepKind,
        data: StepData,
        latency: u64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            step,
            status: StepStatus::Completed,
            message: message.into(),
            data: Some(data),
            latency: Some(latency),
            error: None,
        }
    }

    /// Terminal success event.
    pub fn complete(summary: ConversationSummary) -> Self {
        let total = summary.total_latency;
        Self::completed(
            StepKind::Complete,
            StepData::Summary(summary),
            total,
            "Conversation simulation complete",
        )
    }

    /// Terminal failure event.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            step: StepKind::Error,
            status: StepStatus::Error,
            message: "Simulation failed".into(),
            data: None,
            latency: None,
            error: Some(error.into()),
        }
    }

    /// `true` for the single event that ends a run.
    pub fn is_terminal(&self) -> bool {
        matches!(self.step, StepKind::Complete | StepKind::Error)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processing_and_streaming_are_busy() {
        assert!(StepStatus::Processing.is_busy());
        assert!(StepStatus::Streaming.is_busy());
        assert!(!StepStatus::Completed.is_busy());
        assert!(!StepStatus::Error.is_busy());
    }

    #[test]
    fn labels() {
        assert_eq!(StepKind::Stt.label(), "STT");
        assert_eq!(StepKind::Complete.label(), "Done");
    }

    #[test]
    fn failed_is_terminal_error() {
        let step = SimulationStep::failed("boom");
        assert!(step.is_terminal());
        assert_eq!(step.step, StepKind::Error);
        assert_eq!(step.status, StepStatus::Error);
        assert_eq!(step.error.as_deref(), Some("boom"));
        assert!(step.latency.is_none());
    }

    #[test]
    fn processing_has_no_latency_or_data() {
        let step = SimulationStep::processing(StepKind::Llm, "Generating response...");
        assert!(!step.is_terminal());
        assert!(step.data.is_none());
        assert!(step.latency.is_none());
    }

    #[test]
    fn serialises_browser_shape() {
        let step = SimulationStep::streaming(
            StepKind::Llm,
            StepData::Token {
                token: " there".into(),
                full_response: "Hi there".into(),
            },
            "Generating: \"Hi there\"",
        );
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["step"], "llm");
        assert_eq!(json["status"], "streaming");
        assert_eq!(json["data"]["token"], " there");
        assert_eq!(json["data"]["fullResponse"], "Hi there");
        assert!(json.get("latency").is_none());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn complete_carries_total_latency() {
        let step = SimulationStep::complete(ConversationSummary {
            transcription: "hi".into(),
            response: "hello".into(),
            audio: SynthesizedAudio {
                samples: vec![],
                duration: 1.0,
                sample_rate: 22_050,
            },
            total_latency: 30,
            stt_latency: 10,
            llm_latency: 15,
            tts_latency: 5,
        });
        assert!(step.is_terminal());
        assert_eq!(step.status, StepStatus::Completed);
        assert_eq!(step.latency, Some(30));
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["data"]["totalLatency"], 30);
        assert_eq!(json["data"]["audio"]["duration"], 1.0);
    }
}
