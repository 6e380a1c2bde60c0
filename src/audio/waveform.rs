//! Waveform amplitude data for visualisation.
//!
//! [`generate_waveform`] reduces a sample buffer to one RMS bar per window.
//! Windows are `step = max(1, len / width)` samples long (integer division),
//! start at every multiple of `step` and cover `[i, min(i + step, len))`, so
//! the output holds `ceil(len / step)` bars.  When `len` is not a multiple of
//! `width` that count exceeds `width`, and the trailing bar covers only the
//! short remainder.
//!
//! # Example
//!
//! ```rust
//! use voice_agent_sim::audio::generate_waveform;
//!
//! let audio: Vec<f32> = (0..22_050)
//!     .map(|i| (i as f32 * 0.01).sin() * 0.5)
//!     .collect();
//!
//! let bars = generate_waveform(&audio, 100);
//! assert_eq!(bars.len(), 101); // step 220, last window holds 50 samples
//! assert!(bars.iter().all(|&b| b >= 0.0));
//! ```

/// Bar count used when the caller does not choose one.
pub const DEFAULT_WAVEFORM_WIDTH: usize = 100;

/// Window length for `sample_count` samples spread over `width` bars.
///
/// A `width` of zero is treated as one.
pub fn window_size(sample_count: usize, width: usize) -> usize {
    (sample_count / width.max(1)).max(1)
}

/// Number of bars [`generate_waveform`] returns.
pub fn bar_count(sample_count: usize, width: usize) -> usize {
    sample_count.div_ceil(window_size(sample_count, width))
}

fn rms(window: &[f32]) -> f32 {
    let sum_sq: f64 = window.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    (sum_sq / window.len() as f64).sqrt() as f32
}

/// Root-mean-square of each window of `audio`.
///
/// Pure and deterministic: identical input yields identical output.
pub fn generate_waveform(audio: &[f32], width: usize) -> Vec<f32> {
    audio
        .chunks(window_size(audio.len(), width))
        .map(rms)
        .collect()
}

// ---------------------------------------------------------------------------
// WaveformData
// ---------------------------------------------------------------------------

/// Rendered bars plus a couple of helpers for display scaling.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformData {
    /// RMS amplitude per bar, always `>= 0.0`.
    pub bars: Vec<f32>,
}

impl WaveformData {
    pub fn compute(audio: &[f32], width: usize) -> Self {
        Self {
            bars: generate_waveform(audio, width),
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Peak bar value across the waveform (useful for normalisation).
    pub fn peak(&self) -> f32 {
        self.bars.iter().cloned().fold(0.0_f32, f32::max)
    }

    /// Bars scaled so the peak is `1.0`.  A silent waveform stays all zero.
    pub fn normalized(&self) -> Vec<f32> {
        let peak = self.peak();
        if peak == 0.0 {
            return self.bars.clone();
        }
        self.bars.iter().map(|b| b / peak).collect()
    }

    /// One-line text rendering using block characters, for terminals.
    pub fn sparkline(&self) -> String {
        const LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
        self.normalized()
            .iter()
            .map(|&b| {
                let idx = (b * (LEVELS.len() - 1) as f32).round() as usize;
                LEVELS[idx.min(LEVELS.len() - 1)]
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
