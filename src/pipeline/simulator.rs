//! Conversation simulator driving one STT → LLM → TTS turn.
//!
//! [`VoiceAgentSimulator`] owns a [`StageSet`] and turns a single simulated
//! utterance into a stream of [`SimulationStep`]s.
//!
//! # Pipeline flow
//!
//! ```text
//! stt.transcribe(audio)            refuses to start ─▶ error
//!   └─▶ stt processing
//!       └─▶ stt streaming per prefix                ─▶ stt completed
//! [system prompt, user transcript]
//!   └─▶ llm processing
//!       └─▶ llm streaming per token                 ─▶ llm completed
//!   └─▶ tts processing ─▶ tts.synthesize(response)  ─▶ tts completed
//!   └─▶ complete (transcript, reply, audio, latencies)
//!
//! any stage Err ─▶ error, stream ends
//! ```
//!
//! Stages run strictly one after another.  The returned stream is lazy and
//! pull-based: nothing happens until it is polled, and dropping it abandons
//! the run.

use std::sync::Arc;
use std::time::Instant;

use async_stream::stream;
use futures::{Stream, StreamExt};
use serde_json::Value;

use crate::config::{AppConfig, LlmProvider};
use crate::stages::{
    ApiLlm, ChatMessage, Jitter, LlmStage, MockLlm, MockStt, MockTool, MockTransform, MockTts,
    StageError, StageTiming, SttStage, ToolCall, ToolResult, ToolStage, TransformOutput,
    TransformStage, TtsStage,
};

use super::step::{ConversationSummary, SimulationStep, StepData, StepKind};

/// System prompt used when the caller supplies none.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

// ---------------------------------------------------------------------------
// StageSet
// ---------------------------------------------------------------------------

/// The five stage implementations a simulator runs with.
///
/// Defaults to the mocks; any stage can be replaced with a real backend.
///
/// ```rust
/// use std::sync::Arc;
/// use voice_agent_sim::pipeline::StageSet;
/// use voice_agent_sim::stages::{Jitter, MockStt, SttFailure, StageTiming};
///
/// let jitter = Arc::new(Jitter::instant(7));
/// let failing_stt = MockStt::new(&StageTiming::default(), jitter.clone())
///     .with_failure(SttFailure::OnStart("microphone unavailable".into()));
///
/// let stages = StageSet::mock(&StageTiming::default(), jitter)
///     .with_stt(Arc::new(failing_stt));
/// ```
#[derive(Clone)]
pub struct StageSet {
    pub stt: Arc<dyn SttStage>,
    pub llm: Arc<dyn LlmStage>,
    pub tts: Arc<dyn TtsStage>,
    pub tool: Arc<dyn ToolStage>,
    pub transform: Arc<dyn TransformStage>,
}

impl StageSet {
    /// All five mocks sharing one random source.
    pub fn mock(timing: &StageTiming, jitter: Arc<Jitter>) -> Self {
        Self {
            stt: Arc::new(MockStt::new(timing, Arc::clone(&jitter))),
            llm: Arc::new(MockLlm::new(timing, Arc::clone(&jitter))),
            tts: Arc::new(MockTts::new(timing, Arc::clone(&jitter))),
            tool: Arc::new(MockTool::new(timing, Arc::clone(&jitter))),
            transform: Arc::new(MockTransform::new(timing, jitter)),
        }
    }

    /// Stages as described by `config`: mocks with the configured timing and
    /// seed, and the API-backed LLM when one is selected.
    pub fn from_config(config: &AppConfig) -> Self {
        let sim = &config.simulation;
        let jitter = match (sim.seed, sim.instant) {
            (Some(seed), true) => Jitter::instant(seed),
            (Some(seed), false) => Jitter::seeded(seed),
            (None, true) => Jitter::instant(rand::random()),
            (None, false) => Jitter::from_entropy(),
        };

        let stages = Self::mock(&config.timing, Arc::new(jitter));
        match config.llm.provider {
            LlmProvider::Mock => stages,
            LlmProvider::OpenAiCompatible => {
                log::info!(
                    "llm stage: {} at {}",
                    config.llm.model,
                    config.llm.base_url
                );
                stages.with_llm(Arc::new(ApiLlm::from_config(&config.llm)))
            }
        }
    }

    pub fn with_stt(mut self, stt: Arc<dyn SttStage>) -> Self {
        self.stt = stt;
        self
    }

    pub fn with_llm(mut self, llm: Arc<dyn LlmStage>) -> Self {
        self.llm = llm;
        self
    }

    pub fn with_tts(mut self, tts: Arc<dyn TtsStage>) -> Self {
        self.tts = tts;
        self
    }

    pub fn with_tool(mut self, tool: Arc<dyn ToolStage>) -> Self {
        self.tool = tool;
        self
    }

    pub fn with_transform(mut self, transform: Arc<dyn TransformStage>) -> Self {
        self.transform = transform;
        self
    }
}

impl Default for StageSet {
    fn default() -> Self {
        Self::mock(&StageTiming::default(), Arc::new(Jitter::from_entropy()))
    }
}

// ---------------------------------------------------------------------------
// VoiceAgentSimulator
// ---------------------------------------------------------------------------

fn elapsed_ms(since: Instant) -> u64 {
    since.elapsed().as_millis() as u64
}

fn failure(error: StageError) -> SimulationStep {
    log::warn!("simulator: stage failed: {error}");
    SimulationStep::failed(error.to_string())
}

pub struct VoiceAgentSimulator {
    stages: StageSet,
    default_prompt: String,
}

impl VoiceAgentSimulator {
    pub fn new(stages: StageSet) -> Self {
        Self {
            stages,
            default_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Replace the prompt used when a run supplies none.
    pub fn with_default_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.default_prompt = prompt.into();
        self
    }

    pub fn stages(&self) -> &StageSet {
        &self.stages
    }

    /// Simulate one conversational turn.
    ///
    /// `audio` is handed to the STT stage untouched.  An empty or missing
    /// `system_prompt` falls back to the default prompt.  Each call returns a
    /// fresh stream.
    pub fn simulate_conversation<'a>(
        &'a self,
        audio: &'a [u8],
        system_prompt: Option<&'a str>,
    ) -> impl Stream<Item = SimulationStep> + Send + 'a {
        let prompt = system_prompt
            .filter(|p| !p.is_empty())
            .unwrap_or(&self.default_prompt);

        stream! {
            let started = Instant::now();

            // ── 1-3. Speech-to-text ───────────────────────────────────────
            // Opened before `stt processing` so a refusal to start is the only event.
            let mut chunks = match self.stages.stt.transcribe(audio) {
                Ok(chunks) => chunks,
                Err(e) => {
                    yield failure(e);
                    return;
                }
            };

            log::debug!("simulator: stt → processing");
            yield SimulationStep::processing(StepKind::Stt, "Converting speech to text...");

            let mut transcription = String::new();
            while let Some(chunk) = chunks.next().await {
                match chunk {
                    Ok(chunk) => {
                        transcription = chunk.text.clone();
                        let message = format!("Transcribing: \"{}\"", chunk.text);
                        yield SimulationStep::streaming(StepKind::Stt, StepData::Partial(chunk), message);
                    }
                    Err(e) => {
                        yield failure(e);
                        return;
                    }
                }
            }
            drop(chunks);

            let stt_latency = elapsed_ms(started);
            yield SimulationStep::completed(
                StepKind::Stt,
                StepData::Transcription { text: transcription.clone() },
                stt_latency,
                format!("Transcription complete: \"{transcription}\""),
            );

            // ── 4-6. Language model ───────────────────────────────────────
            let llm_started = Instant::now();
            log::debug!("simulator: llm → processing");
            yield SimulationStep::processing(StepKind::Llm, "Generating response...");

            let messages = [
                ChatMessage::system(prompt),
                ChatMessage::user(transcription.clone()),
            ];

            let mut tokens = match self.stages.llm.complete(&messages) {
                Ok(tokens) => tokens,
                Err(e) => {
                    yield failure(e);
                    return;
                }
            };

            let mut response = String::new();
            while let Some(token) = tokens.next().await {
                match token {
                    Ok(token) => {
                        response.push_str(&token.token);
                        let message = format!("Generating: \"{response}\"");
                        yield SimulationStep::streaming(
                            StepKind::Llm,
                            StepData::Token { token: token.token, full_response: response.clone() },
                            message,
                        );
                    }
                    Err(e) => {
                        yield failure(e);
                        return;
                    }
                }
            }
            drop(tokens);

            let llm_latency = elapsed_ms(llm_started);
            yield SimulationStep::completed(
                StepKind::Llm,
                StepData::Response { response: response.clone() },
                llm_latency,
                format!("Response generated: \"{response}\""),
            );

            // ── 7-9. Text-to-speech ───────────────────────────────────────
            let tts_started = Instant::now();
            log::debug!("simulator: tts → processing");
            yield SimulationStep::processing(StepKind::Tts, "Converting text to speech...");

            let audio = match self.stages.tts.synthesize(&response).await {
                Ok(audio) => audio,
                Err(e) => {
                    yield failure(e);
                    return;
                }
            };

            let tts_latency = elapsed_ms(tts_started);
            yield SimulationStep::completed(
                StepKind::Tts,
                StepData::Audio(audio.clone()),
                tts_latency,
                "Audio generation complete",
            );

            // ── 10. Summary ───────────────────────────────────────────────
            let total_latency = stt_latency + llm_latency + tts_latency;
            log::info!(
                "simulator: turn complete in {total_latency} ms (stt {stt_latency}, llm {llm_latency}, tts {tts_latency})"
            );
            yield SimulationStep::complete(ConversationSummary {
                transcription,
                response,
                audio,
                total_latency,
                stt_latency,
                llm_latency,
                tts_latency,
            });
        }
    }

    /// Run a turn to the end and collect every event.
    pub async fn run_turn(&self, audio: &[u8], system_prompt: Option<&str>) -> Vec<SimulationStep> {
        self.simulate_conversation(audio, system_prompt)
            .collect()
            .await
    }

    /// Invoke the tool stage.
    pub async fn call_tool(&self, call: &ToolCall) -> Result<ToolResult, StageError> {
        self.stages.tool.call(call).await
    }

    /// Invoke the transform stage.
    pub async fn transform(&self, data: Value) -> Result<TransformOutput, StageError> {
        self.stages.transform.transform(data).await
    }
}

impl Default for VoiceAgentSimulator {
    fn default() -> Self {
        Self::new(StageSet::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
