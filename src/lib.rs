//! Voice-agent pipeline simulator.
//!
//! Exercises a conversational voice agent (speech-to-text, language model,
//! text-to-speech, plus tool and transform stubs) without any real speech or
//! model backend.  Each stage is a trait object, so a mock can be swapped for
//! a real implementation without touching the orchestrator.
//!
//! | Module | Role |
//! |--------|------|
//! | [`stages`] | stage traits, data types and the mock implementations |
//! | [`pipeline`] | the orchestrator, its progress events and session records |
//! | [`audio`] | waveform reduction for display |
//! | [`agents`] | persisted agent configurations |
//! | [`config`] | `settings.toml` and platform paths |

pub mod agents;
pub mod audio;
pub mod config;
pub mod pipeline;
pub mod stages;
