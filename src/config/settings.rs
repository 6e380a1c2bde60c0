//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files.  Every section is
//! `#[serde(default)]`, so a partial `settings.toml` fills the gaps with
//! defaults.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::stages::StageTiming;

// ---------------------------------------------------------------------------
// SimulationConfig
// ---------------------------------------------------------------------------

/// Defaults for a simulated conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// System prompt used when the caller supplies none (or an empty one).
    pub default_system_prompt: String,
    /// Number of bars in the rendered waveform.
    pub waveform_width: usize,
    /// Fixed RNG seed; `None` seeds from the OS for every run.
    pub seed: Option<u64>,
    /// Skip all simulated delays.
    pub instant: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            default_system_prompt: crate::pipeline::DEFAULT_SYSTEM_PROMPT.into(),
            waveform_width: crate::audio::DEFAULT_WAVEFORM_WIDTH,
            seed: None,
            instant: false,
        }
    }
}

// ---------------------------------------------------------------------------
// LlmProvider
// ---------------------------------------------------------------------------

/// Selects which implementation backs the language-model stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    /// Canned replies, no network.
    Mock,
    /// Any OpenAI-compatible REST API (Ollama, OpenAI, Groq, LM Studio …).
    OpenAiCompatible,
}

impl Default for LlmProvider {
    fn default() -> Self {
        Self::Mock
    }
}

// ---------------------------------------------------------------------------
// LlmConfig
// ---------------------------------------------------------------------------

/// Settings for the language-model stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Which backend to use.
    pub provider: LlmProvider,
    /// Base URL of the API endpoint.
    ///
    /// - Ollama default: `http://localhost:11434`
    /// - OpenAI: `https://api.openai.com`
    pub base_url: String,
    /// API key; `None` for local providers.
    pub api_key: Option<String>,
    /// Model identifier sent to the API.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Completion length cap.
    pub max_tokens: u32,
    /// Maximum seconds to wait for a response before timing out.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            base_url: "http://localhost:11434".into(),
            api_key: None,
            model: "qwen2.5:3b".into(),
            temperature: 0.7,
            max_tokens: 256,
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use voice_agent_sim::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// println!("{}", config.simulation.default_system_prompt);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub simulation: SimulationConfig,
    /// Simulated delay table for the mock stages.
    pub timing: StageTiming,
    pub llm: LlmConfig,
}

impl AppConfig {
    /// Read `settings.toml` from the platform config dir, or defaults when it
    /// has not been written yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => toml::from_str(&text)
                .with_context(|| format!("parsing settings {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no settings at {}; using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e).with_context(|| format!("reading settings {}", path.display())),
        }
    }

    /// Write defaults to `path` unless a file is already there.
    ///
    /// Returns `true` when a file was written.  `overwrite` replaces an
    /// existing file.
    pub fn init_at(path: &Path, overwrite: bool) -> Result<bool> {
        if path.exists() && !overwrite {
            return Ok(false);
        }
        Self::default().save_to(path)?;
        Ok(true)
    }

    /// Write as pretty TOML, creating the parent directory if needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let text = toml::to_string_pretty(self).context("serialising settings")?;
        std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
