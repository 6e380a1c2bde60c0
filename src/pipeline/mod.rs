//! Conversation pipeline for the voice-agent simulator.
//!
//! This module turns one simulated utterance into an ordered stream of
//! progress events and records finished runs.
//!
//! # Architecture
//!
//! ```text
//! StageSet { stt, llm, tts, tool, transform }   (Arc<dyn …> each)
//!        │
//!        ▼
//! VoiceAgentSimulator::simulate_conversation()  ← lazy Stream
//!        │
//!        ├─ stt   processing / streaming / completed
//!        ├─ llm   processing / streaming / completed
//!        ├─ tts   processing / completed
//!        └─ complete | error
//!              │
//!              ▼
//! SimulationSession::record(&step)  ← messages + metrics
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use voice_agent_sim::pipeline::{SimulationSession, VoiceAgentSimulator};
//!
//! #[tokio::main]
//! async fn main() {
//!     let simulator = VoiceAgentSimulator::default();
//!     let mut session = SimulationSession::default();
//!     session.start();
//!
//!     let mut steps = Box::pin(simulator.simulate_conversation(&[], None));
//!     while let Some(step) = steps.next().await {
//!         println!("{}: {}", step.step.label(), step.message);
//!         session.record(&step);
//!     }
//! }
//! ```

pub mod session;
pub mod simulator;
pub mod step;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use session::{SessionMessage, SessionMetrics, SessionStatus, SimulationSession, Speaker};
pub use simulator::{StageSet, VoiceAgentSimulator, DEFAULT_SYSTEM_PROMPT};
pub use step::{ConversationSummary, SimulationStep, StepData, StepKind, StepStatus};
