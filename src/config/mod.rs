//! Configuration module for the voice-agent simulator.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for the simulation
//! defaults, mock-stage timing and the language-model backend, `AppPaths`
//! for cross-platform config directories, and TOML persistence via
//! `AppConfig::load` / `AppConfig::save_to`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, LlmConfig, LlmProvider, SimulationConfig};
