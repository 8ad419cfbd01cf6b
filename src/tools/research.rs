//! Research helpers exposed as agent tools.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::error::Error;
use crate::outcome::OperationResult;
use crate::research;

use super::registry::{ToolDefinition, ToolHandler};

/// The research helpers available to the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResearchTool {
    SearchWeb,
    GenerateDeploymentConfig,
    AnalyzeRepoStructure,
}

impl ResearchTool {
    /// All research tools.
    pub const ALL: &'static [ResearchTool] = &[
        ResearchTool::SearchWeb,
        ResearchTool::GenerateDeploymentConfig,
        ResearchTool::AnalyzeRepoStructure,
    ];
}

#[derive(Deserialize)]
struct SearchArgs {
    query: String,
}

#[derive(Deserialize)]
struct DeployArgs {
    platform: String,
    app_name: String,
}

#[derive(Deserialize)]
struct AnalyzeArgs {
    #[serde(default = "current_dir")]
    repo_path: PathBuf,
}

fn current_dir() -> PathBuf {
    PathBuf::from(".")
}

#[async_trait]
impl ToolHandler for ResearchTool {
    fn definition(&self) -> ToolDefinition {
        match self {
            Self::SearchWeb => ToolDefinition::new(
                "search_web",
                "Searches for migration guidance, dependency fixes and documentation.",
            )
            .with_parameters(json!({
                "type": "object",
                "properties": { "query": { "type": "string" } },
                "required": ["query"],
            })),
            Self::GenerateDeploymentConfig => ToolDefinition::new(
                "generate_deployment_config",
                "Generates deployment instructions. Supported platforms: Cloud Run, GitHub Pages, Defang.",
            )
            .with_parameters(json!({
                "type": "object",
                "properties": {
                    "platform": { "type": "string" },
                    "app_name": { "type": "string" },
                },
                "required": ["platform", "app_name"],
            })),
            Self::AnalyzeRepoStructure => ToolDefinition::new(
                "analyze_repo_structure",
                "Lists files in a local clone and detects key build and packaging files.",
            )
            .with_parameters(json!({
                "type": "object",
                "properties": { "repo_path": { "type": "string" } },
                "required": [],
            })),
        }
    }

    async fn execute(&self, input: serde_json::Value) -> OperationResult {
        let input = if input.is_null() { json!({}) } else { input };
        let name = self.definition().name;
        let invalid = |e: serde_json::Error| -> OperationResult {
            Error::InvalidArguments(format!("{}: {}", name, e)).into()
        };

        match self {
            Self::SearchWeb => match serde_json::from_value::<SearchArgs>(input) {
                Ok(args) => research::search_web(&args.query),
                Err(e) => invalid(e),
            },
            Self::GenerateDeploymentConfig => match serde_json::from_value::<DeployArgs>(input) {
                Ok(args) => research::generate_deployment_config(&args.platform, &args.app_name),
                Err(e) => invalid(e),
            },
            Self::AnalyzeRepoStructure => match serde_json::from_value::<AnalyzeArgs>(input) {
                Ok(args) => {
                    let path = args.repo_path;
                    tokio::task::spawn_blocking(move || research::analyze_repo_structure(&path))
                        .await
                        .unwrap_or_else(|e| OperationResult::error(e.to_string()))
                }
                Err(e) => invalid(e),
            },
        }
    }
}
