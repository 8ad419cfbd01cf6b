//! Agent-callable tools.
//!
//! - [`ToolRegistry`] maps tool names to handlers and dispatches calls
//! - [`GatewayTool`] exposes each gateway operation
//! - [`ResearchTool`] exposes the research helpers

mod gateway;
mod registry;
mod research;

use std::sync::Arc;

pub use gateway::{GatewayOp, GatewayTool};
pub use registry::{ToolDefinition, ToolHandler, ToolRegistry};
pub use research::ResearchTool;

use crate::gateway::Gateway;

impl ToolRegistry {
    /// Registry holding the given gateway operations.
    pub fn for_ops(ops: &[GatewayOp], gateway: &Arc<Gateway>) -> Self {
        let mut registry = Self::new();
        for op in ops {
            registry.register(GatewayTool::new(*op, Arc::clone(gateway)));
        }
        registry
    }

    /// The four codespace lifecycle tools.
    pub fn codespace_tools(gateway: &Arc<Gateway>) -> Self {
        Self::for_ops(GatewayOp::CODESPACE, gateway)
    }

    /// Clone, branch, commit, push, read and write against local clones.
    pub fn local_git_tools(gateway: &Arc<Gateway>) -> Self {
        Self::for_ops(GatewayOp::LOCAL_GIT, gateway)
    }

    /// Issue creation and PR comments.
    pub fn github_tools(gateway: &Arc<Gateway>) -> Self {
        Self::for_ops(GatewayOp::GITHUB, gateway)
    }

    /// Search, deployment templates and repository survey.
    pub fn research_tools() -> Self {
        let mut registry = Self::new();
        for tool in ResearchTool::ALL {
            registry.register(*tool);
        }
        registry
    }

    /// Every tool this crate provides.
    pub fn all_tools(gateway: &Arc<Gateway>) -> Self {
        let mut registry = Self::codespace_tools(gateway);
        registry
            .extend(Self::local_git_tools(gateway))
            .extend(Self::github_tools(gateway))
            .extend(Self::research_tools());
        registry
    }
}
