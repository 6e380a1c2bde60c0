//! Mock speech-to-text stage.
//!
//! [`MockStt`] ignores its audio input, picks one sentence from
//! [`SAMPLE_TRANSCRIPTS`] and reveals it word by word.  Each emission carries
//! the whole prefix so far, so the final emission equals the full sentence.
//!
//! A [`SttFailure`] can be injected to exercise the orchestrator's error path.

use std::sync::Arc;

use async_stream::stream;
use chrono::Utc;
use rand::Rng;

use crate::stages::stage::{StageError, SttStage, SttStream};
use crate::stages::timing::{DelayRange, Jitter, StageTiming};
use crate::stages::types::SttChunk;

/// Sentences the mock recogniser "hears".
pub const SAMPLE_TRANSCRIPTS: [&str; 5] = [
    "Hello, I'm having trouble with my account.",
    "I need to schedule an appointment for next week.",
    "Can you help me with my order status?",
    "I'm experiencing some technical difficulties.",
    "I'd like to update my personal information.",
];

/// Confidence values are drawn uniformly from this range.
const MIN_CONFIDENCE: f64 = 0.85;
const MAX_CONFIDENCE: f64 = 1.0;

// ---------------------------------------------------------------------------
// SttFailure
// ---------------------------------------------------------------------------

/// Where, if anywhere, the mock should fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SttFailure {
    /// Always succeed.
    #[default]
    Never,
    /// Refuse to start: `transcribe` itself returns `Err`.
    OnStart(String),
    /// Emit `words` prefixes, then yield an `Err` item.
    AfterWords { words: usize, message: String },
}

// ---------------------------------------------------------------------------
// MockStt
// ---------------------------------------------------------------------------

pub struct MockStt {
    startup: DelayRange,
    per_word: DelayRange,
    jitter: Arc<Jitter>,
    failure: SttFailure,
}

impl MockStt {
    pub fn new(timing: &StageTiming, jitter: Arc<Jitter>) -> Self {
        Self {
            startup: timing.stt_startup,
            per_word: timing.stt_word,
            jitter,
            failure: SttFailure::Never,
        }
    }

    pub fn with_failure(mut self, failure: SttFailure) -> Self {
        self.failure = failure;
        self
    }

    fn pick_transcript(&self) -> &'static str {
        let idx = self.jitter.rng().gen_range(0..SAMPLE_TRANSCRIPTS.len());
        SAMPLE_TRANSCRIPTS[idx]
    }

    fn draw_confidence(&self) -> f64 {
        self.jitter.rng().gen_range(MIN_CONFIDENCE..=MAX_CONFIDENCE)
    }
}

impl SttStage for MockStt {
    fn transcribe<'a>(&'a self, _audio: &'a [u8]) -> Result<SttStream<'a>, StageError> {
        if let SttFailure::OnStart(message) = &self.failure {
            return Err(StageError::failed(message.clone()));
        }

        let chunks = stream! {
            self.jitter.pause(self.startup).await;

            let transcript = self.pick_transcript();
            let mut text = String::with_capacity(transcript.len());

            for (i, word) in transcript.split(' ').enumerate() {
                if let SttFailure::AfterWords { words, message } = &self.failure {
                    if i == *words {
                        yield Err(StageError::failed(message.clone()));
                        return;
                    }
                }

                self.jitter.pause(self.per_word).await;

                if i > 0 {
                    text.push(' ');
                }
                text.push_str(word);

                yield Ok::<_, StageError>(SttChunk {
                    text: text.clone(),
                    confidence: self.draw_confidence(),
                    timestamp: Utc::now().timestamp_millis(),
                });
            }
        };

        let chunks: SttStream<'a> = Box::pin(chunks);
        Ok(chunks)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
