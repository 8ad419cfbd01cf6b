//! Repo Reviver - tool gateway for LLM agents that revive GitHub repositories
//!
//! This library turns a small vocabulary of agent actions (create a codespace,
//! run commands in it, clone, branch, commit, push, open issues) into `gh` and
//! `git` invocations and hands every outcome back as a uniform result envelope.

pub mod agent;
pub mod config;
pub mod error;
pub mod exec;
pub mod gateway;
pub mod instructions;
pub mod outcome;
pub mod research;
pub mod tools;

pub use agent::{AgentDefinition, AgentSummary, AGENT_NAME};
pub use config::{GatewaySettings, ReviverConfig, Validate, ValidationResult};
pub use error::{Error, Result};
pub use exec::{CommandExecutor, CommandOutput, CommandSpec, ProcessExecutor};
pub use gateway::{normalize_repo_ref, Gateway};
pub use outcome::{CodespaceRecord, OperationResult, Payload};
pub use tools::{GatewayOp, GatewayTool, ResearchTool, ToolDefinition, ToolHandler, ToolRegistry};
