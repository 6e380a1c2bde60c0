//! Session record built up from a run's step events.
//!
//! A [`SimulationSession`] is what a dashboard keeps after a turn finishes:
//! the conversation as chat messages plus the latency and token metrics.
//!
//! ```text
//! Idle ──start()──▶ Running ──complete──▶ Completed
//!                           ──error─────▶ Error
//!                           ──stop()────▶ Completed
//! ```

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::step::{SimulationStep, StepData, StepKind, StepStatus};

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ---------------------------------------------------------------------------
// SessionStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Error,
}

impl SessionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "Idle",
            SessionStatus::Running => "Running",
            SessionStatus::Completed => "Completed",
            SessionStatus::Error => "Error",
        }
    }
}

// ---------------------------------------------------------------------------
// SessionMessage
// ---------------------------------------------------------------------------

/// Who a recorded message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Agent,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMessage {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub speaker: Speaker,
    pub content: String,
    /// RFC 3339, UTC.
    pub timestamp: String,
}

impl SessionMessage {
    fn new(speaker: Speaker, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            speaker,
            content: content.into(),
            timestamp: now_rfc3339(),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionMetrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetrics {
    pub total_latency: u64,
    pub stt_latency: u64,
    pub llm_latency: u64,
    pub tts_latency: u64,
    /// One per streamed LLM token.
    pub tokens_used: u32,
    pub error_count: u32,
}

// ---------------------------------------------------------------------------
// SimulationSession
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSession {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    pub status: SessionStatus,
    pub messages: Vec<SessionMessage>,
    pub metrics: SessionMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

impl SimulationSession {
    /// A fresh idle session.
    pub fn new(agent_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            agent_id,
            status: SessionStatus::Idle,
            messages: Vec::new(),
            metrics: SessionMetrics::default(),
            started_at: None,
            completed_at: None,
        }
    }

    pub fn start(&mut self) {
        self.status = SessionStatus::Running;
        self.started_at = Some(now_rfc3339());
        self.completed_at = None;
        log::debug!("session {}: started", self.id);
    }

    /// Manual stop.  Only a running session changes state.
    pub fn stop(&mut self) {
        if self.status == SessionStatus::Running {
            self.finish(SessionStatus::Completed);
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    /// Fold one step event into the record.
    pub fn record(&mut self, step: &SimulationStep) {
        match (step.step, step.status, &step.data) {
            (StepKind::Stt, StepStatus::Completed, Some(StepData::Transcription { text })) => {
                self.messages.push(SessionMessage::new(Speaker::User, text.clone()));
            }
            (StepKind::Llm, StepStatus::Streaming, _) => {
                self.metrics.tokens_used += 1;
            }
            (StepKind::Llm, StepStatus::Completed, Some(StepData::Response { response })) => {
                self.messages
                    .push(SessionMessage::new(Speaker::Agent, response.clone()));
            }
            (StepKind::Complete, _, Some(StepData::Summary(summary))) => {
                self.metrics.total_latency = summary.total_latency;
                self.metrics.stt_latency = summary.stt_latency;
                self.metrics.llm_latency = summary.llm_latency;
                self.metrics.tts_latency = summary.tts_latency;
                self.finish(SessionStatus::Completed);
            }
            (StepKind::Error, _, _) => {
                self.metrics.error_count += 1;
                let reason = step.error.as_deref().unwrap_or("unknown error");
                self.messages.push(SessionMessage::new(
                    Speaker::System,
                    format!("{}: {reason}", step.message),
                ));
                self.finish(SessionStatus::Error);
            }
            _ => {}
        }
    }

    fn finish(&mut self, status: SessionStatus) {
        self.status = status;
        self.completed_at = Some(now_rfc3339());
        log::debug!("session {}: {}", self.id, status.label());
    }
}

impl Default for SimulationSession {
    fn default() -> Self {
        Self::new(None)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
