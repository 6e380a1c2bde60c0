//! Agent configurations.
//!
//! An agent is a named system prompt plus metadata (domain, tags, tool
//! definitions).  Running a simulation "as" an agent feeds its prompt to the
//! language-model stage and tags the session with its id.

pub mod registry;

pub use registry::{AgentConfig, AgentRegistry, AgentUpdate, NewAgent, RegistryError, ToolDef};
