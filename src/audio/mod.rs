//! Audio helpers: waveform reduction for display.
//!
//! Synthesised clips from the TTS stage are far too long to draw sample by
//! sample; [`generate_waveform`] folds them into a fixed number of RMS bars.

pub mod waveform;

pub use waveform::{bar_count, generate_waveform, window_size, WaveformData, DEFAULT_WAVEFORM_WIDTH};
