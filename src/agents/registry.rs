//! Persisted agent configurations.
//!
//! [`AgentRegistry`] keeps every agent in a pretty-printed JSON array in the
//! platform config directory:
//!
//! | Platform | Path |
//! |----------|------|
//! | Windows  | `%APPDATA%\voice-agent-sim\agents.json` |
//! | macOS    | `~/Library/Application Support/voice-agent-sim/agents.json` |
//! | Linux    | `~/.config/voice-agent-sim/agents.json` |
//!
//! The file is rewritten after every mutation.

use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::config::AppPaths;

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}

// ---------------------------------------------------------------------------
// RegistryError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("agent registry I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("agent registry file {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no agent with id {0}")]
    NotFound(String),
}

// ---------------------------------------------------------------------------
// AgentConfig
// ---------------------------------------------------------------------------

/// A tool the agent's language model may call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDef {
    pub name: String,
    pub description: String,
    /// JSON schema for the tool's parameters.
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// e.g. `healthcare`, `support`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    pub system_prompt: String,
    #[serde(default)]
    pub tools: Vec<ToolDef>,
    #[serde(default = "default_version")]
    pub version: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub is_draft: bool,
    #[serde(default)]
    pub is_archived: bool,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

/// Fields supplied when creating an agent; the registry fills in the rest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewAgent {
    pub name: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub domain: Option<String>,
    pub system_prompt: String,
    pub tools: Vec<ToolDef>,
    pub is_draft: bool,
}

impl NewAgent {
    pub fn new(name: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            system_prompt: system_prompt.into(),
            ..Self::default()
        }
    }

    fn into_config(self, version: String, created_at: String) -> AgentConfig {
        AgentConfig {
            id: fresh_id(),
            name: self.name,
            description: self.description,
            tags: self.tags,
            domain: self.domain,
            system_prompt: self.system_prompt,
            tools: self.tools,
            version,
            updated_at: created_at.clone(),
            created_at,
            is_draft: self.is_draft,
            is_archived: false,
        }
    }
}

impl From<&AgentConfig> for NewAgent {
    fn from(agent: &AgentConfig) -> Self {
        Self {
            name: agent.name.clone(),
            description: agent.description.clone(),
            tags: agent.tags.clone(),
            domain: agent.domain.clone(),
            system_prompt: agent.system_prompt.clone(),
            tools: agent.tools.clone(),
            is_draft: agent.is_draft,
        }
    }
}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub domain: Option<String>,
    pub system_prompt: Option<String>,
    pub tools: Option<Vec<ToolDef>>,
    pub version: Option<String>,
    pub is_draft: Option<bool>,
    pub is_archived: Option<bool>,
}

impl AgentUpdate {
    fn apply(self, agent: &mut AgentConfig) {
        if let Some(name) = self.name {
            agent.name = name;
        }
        if let Some(description) = self.description {
            agent.description = Some(description);
        }
        if let Some(tags) = self.tags {
            agent.tags = tags;
        }
        if let Some(domain) = self.domain {
            agent.domain = Some(domain);
        }
        if let Some(prompt) = self.system_prompt {
            agent.system_prompt = prompt;
        }
        if let Some(tools) = self.tools {
            agent.tools = tools;
        }
        if let Some(version) = self.version {
            agent.version = version;
        }
        if let Some(draft) = self.is_draft {
            agent.is_draft = draft;
        }
        if let Some(archived) = self.is_archived {
            agent.is_archived = archived;
        }
    }
}

// ---------------------------------------------------------------------------
// AgentRegistry
// ---------------------------------------------------------------------------

pub struct AgentRegistry {
    agents: Vec<AgentConfig>,
    path: PathBuf,
}

impl AgentRegistry {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Load from the platform config directory.
    pub fn load() -> Result<Self, RegistryError> {
        Self::load_from(AppPaths::new().agents_file)
    }

    /// Load from an explicit path.  A missing file is an empty registry.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self, RegistryError> {
        let path = path.into();
        let agents = if path.exists() {
            let data = std::fs::read_to_string(&path).map_err(|source| RegistryError::Io {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&data).map_err(|source| RegistryError::Json {
                path: path.clone(),
                source,
            })?
        } else {
            Vec::new()
        };
        log::debug!("agents: loaded {} from {}", agents.len(), path.display());
        Ok(Self { agents, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn list(&self) -> &[AgentConfig] {
        &self.agents
    }

    pub fn get(&self, id: &str) -> Option<&AgentConfig> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn export(&self, id: &str) -> Option<AgentConfig> {
        self.get(id).cloned()
    }

    pub fn export_all(&self) -> Vec<AgentConfig> {
        self.agents.clone()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    pub fn create(&mut self, agent: NewAgent) -> Result<AgentConfig, RegistryError> {
        let agent = agent.into_config(default_version(), now_rfc3339());
        self.agents.push(agent.clone());
        self.save()?;
        Ok(agent)
    }

    /// Apply `update` and bump `updated_at`.
    pub fn update(&mut self, id: &str, update: AgentUpdate) -> Result<AgentConfig, RegistryError> {
        let agent = self
            .agents
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        update.apply(agent);
        agent.updated_at = now_rfc3339();
        let updated = agent.clone();
        self.save()?;
        Ok(updated)
    }

    /// Remove an agent, returning it.
    pub fn delete(&mut self, id: &str) -> Result<AgentConfig, RegistryError> {
        let index = self
            .agents
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        let removed = self.agents.remove(index);
        self.save()?;
        Ok(removed)
    }

    /// Copy an agent under a new id as a draft named `"<name> (Copy)"`.
    pub fn duplicate(&mut self, id: &str) -> Result<AgentConfig, RegistryError> {
        let original = self
            .get(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        let mut copy = NewAgent::from(original);
        copy.name = format!("{} (Copy)", original.name);
        copy.is_draft = true;
        let version = original.version.clone();

        let agent = copy.into_config(version, now_rfc3339());
        self.agents.push(agent.clone());
        self.save()?;
        Ok(agent)
    }

    /// Add an externally produced agent.  It always receives a fresh id.
    pub fn import(&mut self, mut agent: AgentConfig) -> Result<AgentConfig, RegistryError> {
        agent.id = fresh_id();
        agent.updated_at = now_rfc3339();
        self.agents.push(agent.clone());
        self.save()?;
        Ok(agent)
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    fn save(&self) -> Result<(), RegistryError> {
        let io_err = |source| RegistryError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let data = serde_json::to_string_pretty(&self.agents).map_err(|source| {
            RegistryError::Json {
                path: self.path.clone(),
                source,
            }
        })?;
        std::fs::write(&self.path, data).map_err(io_err)?;
        log::debug!("agents: saved {} to {}", self.agents.len(), self.path.display());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn registry_in_temp() -> (AgentRegistry, tempfile::TempDir) {
        let dir = tempdir().expect("temp dir");
        let registry = AgentRegistry::load_from(dir.path().join("agents.json")).unwrap();
        (registry, dir)
    }

    fn intake() -> NewAgent {
        NewAgent {
            domain: Some("healthcare".into()),
            tags: vec!["clinic".into()],
            ..NewAgent::new("Intake", "You are a medical intake assistant.")
        }
    }

    #[test]
    fn missing_file_is_empty() {
        let (registry, _dir) = registry_in_temp();
        assert!(registry.is_empty());
        assert!(registry.list().is_empty());
    }

    #[test]
    fn corrupt_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("agents.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            AgentRegistry::load_from(&path),
            Err(RegistryError::Json { .. })
        ));
    }

    #[test]
    fn create_assigns_id_and_timestamps() {
        let (mut registry, _dir) = registry_in_temp();
        let agent = registry.create(intake()).unwrap();

        assert!(!agent.id.is_empty());
        assert_eq!(agent.created_at, agent.updated_at);
        assert_eq!(agent.version, "1.0.0");
        assert!(!agent.is_archived);
        assert_eq!(registry.get(&agent.id), Some(&agent));
    }

    #[test]
    fn every_mutation_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("agents.json");
        let mut registry = AgentRegistry::load_from(&path).unwrap();
        let agent = registry.create(intake()).unwrap();

        let reloaded = AgentRegistry::load_from(&path).unwrap();
        assert_eq!(reloaded.list(), &[agent.clone()]);

        registry.delete(&agent.id).unwrap();
        let reloaded = AgentRegistry::load_from(&path).unwrap();
        assert!(reloaded.is_empty());
    }

    #[test]
    fn update_changes_fields_and_bumps_updated_at() {
        let (mut registry, _dir) = registry_in_temp();
        let agent = registry.create(intake()).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));

        let updated = registry
            .update(
                &agent.id,
                AgentUpdate {
                    name: Some("Triage".into()),
                    is_archived: Some(true),
                    ..AgentUpdate::default()
                },
            )
            .unwrap();

        assert_eq!(updated.name, "Triage");
        assert!(updated.is_archived);
        assert_eq!(updated.system_prompt, agent.system_prompt);
        assert_eq!(updated.created_at, agent.created_at);
        assert!(updated.updated_at > agent.updated_at);
    }

    #[test]
    fn unknown_id_is_not_found() {
        let (mut registry, _dir) = registry_in_temp();
        assert!(matches!(
            registry.update("nope", AgentUpdate::default()),
            Err(RegistryError::NotFound(_))
        ));
        assert!(matches!(registry.delete("nope"), Err(RegistryError::NotFound(_))));
        assert!(matches!(registry.duplicate("nope"), Err(RegistryError::NotFound(_))));
        assert!(registry.export("nope").is_none());
    }

    #[test]
    fn duplicate_is_draft_copy_with_fresh_id() {
        let (mut registry, _dir) = registry_in_temp();
        let agent = registry.create(intake()).unwrap();

        let copy = registry.duplicate(&agent.id).unwrap();

        assert_ne!(copy.id, agent.id);
        assert_eq!(copy.name, "Intake (Copy)");
        assert!(copy.is_draft);
        assert_eq!(copy.system_prompt, agent.system_prompt);
        assert_eq!(copy.domain, agent.domain);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn import_always_assigns_fresh_id() {
        let (mut registry, _dir) = registry_in_temp();
        let agent = registry.create(intake()).unwrap();
        let exported = registry.export(&agent.id).unwrap();

        let imported = registry.import(exported).unwrap();

        assert_ne!(imported.id, agent.id);
        assert_eq!(imported.name, agent.name);
        assert_eq!(registry.export_all().len(), 2);
    }

    #[test]
    fn serialises_camel_case() {
        let (mut registry, _dir) = registry_in_temp();
        let agent = registry.create(intake()).unwrap();
        let json = serde_json::to_value(&agent).unwrap();
        assert_eq!(json["systemPrompt"], "You are a medical intake assistant.");
        assert_eq!(json["isDraft"], false);
        assert!(json.get("description").is_none());
    }

    #[test]
    fn minimal_json_fills_defaults() {
        let json = r#"[{
            "id": "a1",
            "name": "Support",
            "systemPrompt": "Be kind.",
            "createdAt": "2024-01-01T00:00:00.000Z",
            "updatedAt": "2024-01-01T00:00:00.000Z"
        }]"#;
        let dir = tempdir().unwrap();
        let path = dir.path().join("agents.json");
        std::fs::write(&path, json).unwrap();

        let registry = AgentRegistry::load_from(&path).unwrap();
        let agent = registry.get("a1").unwrap();
        assert_eq!(agent.version, "1.0.0");
        assert!(agent.tools.is_empty());
        assert!(!agent.is_draft);
    }
}
