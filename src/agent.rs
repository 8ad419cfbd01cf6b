//! Declarative definition of the reviver agent.
//!
//! The model runtime lives elsewhere; this is everything it needs to know:
//! who the agent is, which model drives it, and which tools it may call.

use std::sync::Arc;

use serde::Serialize;

use crate::config::ReviverConfig;
use crate::gateway::Gateway;
use crate::instructions::REPO_REVIVER_INSTRUCTION;
use crate::tools::{ToolDefinition, ToolRegistry};

/// Name of the production agent.
pub const AGENT_NAME: &str = "repo_reviver";

/// An agent: identity, model, instruction text and tool set.
pub struct AgentDefinition {
    /// Agent name.
    pub name: String,
    /// Model identifier.
    pub model: String,
    /// One-line description.
    pub description: String,
    /// System instruction.
    pub instruction: String,
    /// Callable tools.
    pub tools: ToolRegistry,
    /// Delegate agents. The reviver runs as a single agent.
    pub sub_agents: Vec<AgentDefinition>,
}

/// Serializable view of an agent, for printing and inspection.
#[derive(Debug, Serialize)]
pub struct AgentSummary {
    pub name: String,
    pub model: String,
    pub description: String,
    pub instruction: String,
    pub tools: Vec<ToolDefinition>,
    pub sub_agents: Vec<AgentSummary>,
}

impl AgentDefinition {
    /// Builds the production reviver: one agent holding the four codespace
    /// tools directly, with no sub-agents.
    pub fn repo_reviver(config: &ReviverConfig, gateway: Arc<Gateway>) -> Self {
        Self {
            name: AGENT_NAME.to_string(),
            model: config.model.clone(),
            description: "Analyzes and revives GitHub repositories using cloud-based GitHub Codespaces"
                .to_string(),
            instruction: REPO_REVIVER_INSTRUCTION.to_string(),
            tools: ToolRegistry::codespace_tools(&gateway),
            sub_agents: Vec::new(),
        }
    }

    /// Returns a serializable summary.
    pub fn summary(&self) -> AgentSummary {
        AgentSummary {
            name: self.name.clone(),
            model: self.model.clone(),
            description: self.description.clone(),
            instruction: self.instruction.clone(),
            tools: self.tools.definitions(),
            sub_agents: self.sub_agents.iter().map(Self::summary).collect(),
        }
    }
}
