//! Mock text-to-speech stage.
//!
//! The "speech" is a decaying three-harmonic tone with a little noise: it
//! only has to look plausible in a waveform view.  It carries no intelligible
//! audio content.

use std::f64::consts::PI;
use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;

use crate::stages::stage::{StageError, TtsStage};
use crate::stages::timing::{DelayRange, Jitter, StageTiming};
use crate::stages::types::SynthesizedAudio;

/// Fixed output sample rate.
pub const TTS_SAMPLE_RATE: u32 = 22_050;

/// Seconds of audio per input character.
const SECS_PER_CHAR: f64 = 0.1;
/// Shortest clip ever produced.
const MIN_DURATION_SECS: f64 = 1.0;

/// Clip length for `text`: `max(1.0, 0.1 * chars)` seconds.
pub fn speech_duration(text: &str) -> f64 {
    (text.chars().count() as f64 * SECS_PER_CHAR).max(MIN_DURATION_SECS)
}

/// Render the placeholder waveform for `text`.
///
/// Sample `i` at `t = i / 22050`:
/// `exp(-2t) * (0.3 sin(2π·200t) + 0.2 sin(2π·400t) + 0.1 sin(2π·600t) + 0.05u)`
/// with `u` uniform in `[-1, 1]`.
pub fn synthesize_tone<R: Rng + ?Sized>(text: &str, rng: &mut R) -> SynthesizedAudio {
    let duration = speech_duration(text);
    let rate = f64::from(TTS_SAMPLE_RATE);
    let count = (rate * duration).floor() as usize;

    let samples = (0..count)
        .map(|i| {
            let t = i as f64 / rate;
            let fade = (-2.0 * t).exp();
            let noise: f64 = rng.gen_range(-1.0..=1.0);
            let tone = 0.3 * (2.0 * PI * 200.0 * t).sin()
                + 0.2 * (2.0 * PI * 400.0 * t).sin()
                + 0.1 * (2.0 * PI * 600.0 * t).sin()
                + 0.05 * noise;
            (fade * tone) as f32
        })
        .collect();

    SynthesizedAudio {
        samples,
        duration,
        sample_rate: TTS_SAMPLE_RATE,
    }
}

// ---------------------------------------------------------------------------
// MockTts
// ---------------------------------------------------------------------------

pub struct MockTts {
    delay: DelayRange,
    jitter: Arc<Jitter>,
}

impl MockTts {
    pub fn new(timing: &StageTiming, jitter: Arc<Jitter>) -> Self {
        Self {
            delay: timing.tts,
            jitter,
        }
    }
}

#[async_trait]
impl TtsStage for MockTts {
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, StageError> {
        self.jitter.pause(self.delay).await;
        let audio = synthesize_tone(text, &mut *self.jitter.rng());
        log::trace!(
            "mock tts: {} samples ({:.1}s)",
            audio.samples.len(),
            audio.duration
        );
        Ok(audio)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn short_text_is_one_second() {
        assert_eq!(speech_duration(""), 1.0);
        assert_eq!(speech_duration("hello"), 1.0);
    }

    #[test]
    fn long_text_scales_with_length() {
        let text = "x".repeat(25);
        assert!((speech_duration(&text) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn sample_count_is_floor_of_rate_times_duration() {
        let mut rng = StdRng::seed_from_u64(0);
        let text = "x".repeat(33); // 3.3 s
        let audio = synthesize_tone(&text, &mut rng);
        let expected = (22_050.0_f64 * audio.duration).floor() as usize;
        assert_eq!(audio.samples.len(), expected);
        assert_eq!(audio.sample_rate, TTS_SAMPLE_RATE);
    }

    #[test]
    fn samples_stay_within_envelope() {
        let mut rng = StdRng::seed_from_u64(1);
        let audio = synthesize_tone("hello there", &mut rng);
        // 0.3 + 0.2 + 0.1 + 0.05 bounds the mix; the decay only shrinks it.
        for (i, &s) in audio.samples.iter().enumerate() {
            let t = i as f64 / f64::from(TTS_SAMPLE_RATE);
            let bound = 0.65 * (-2.0 * t).exp() + 1e-6;
            assert!(f64::from(s).abs() <= bound, "sample {i} = {s}");
        }
    }

    #[test]
    fn first_sample_is_noise_only() {
        let mut rng = StdRng::seed_from_u64(2);
        let audio = synthesize_tone("a", &mut rng);
        assert!(audio.samples[0].abs() <= 0.05 + 1e-6);
    }

    #[tokio::test]
    async fn mock_returns_audio_for_text() {
        let tts = MockTts::new(&StageTiming::default(), Arc::new(Jitter::instant(3)));
        let audio = tts.synthesize("Let me check your order status.").await.unwrap();
        assert!((audio.duration - 3.1).abs() < 1e-9);
        let expected = (f64::from(TTS_SAMPLE_RATE) * audio.duration).floor() as usize;
        assert_eq!(audio.samples.len(), expected);
    }
}
