//! Gateway operations exposed as agent tools.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::error::Error;
use crate::gateway::Gateway;
use crate::outcome::OperationResult;

use super::registry::{ToolDefinition, ToolHandler};

/// Every operation the gateway offers as a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayOp {
    CreateCodespace,
    RunInCodespace,
    DeleteCodespace,
    ListCodespaces,
    CloneRepo,
    CreateBranch,
    CommitChanges,
    PushBranch,
    ReadFile,
    WriteFile,
    CreateIssue,
    CommentOnPr,
}

impl GatewayOp {
    /// Codespace lifecycle operations.
    pub const CODESPACE: &'static [GatewayOp] = &[
        GatewayOp::CreateCodespace,
        GatewayOp::RunInCodespace,
        GatewayOp::DeleteCodespace,
        GatewayOp::ListCodespaces,
    ];

    /// Local working-copy operations.
    pub const LOCAL_GIT: &'static [GatewayOp] = &[
        GatewayOp::CloneRepo,
        GatewayOp::CreateBranch,
        GatewayOp::CommitChanges,
        GatewayOp::PushBranch,
        GatewayOp::ReadFile,
        GatewayOp::WriteFile,
    ];

    /// GitHub API operations.
    pub const GITHUB: &'static [GatewayOp] = &[GatewayOp::CreateIssue, GatewayOp::CommentOnPr];

    /// Tool name the model calls.
    pub fn name(self) -> &'static str {
        match self {
            Self::CreateCodespace => "create_codespace",
            Self::RunInCodespace => "run_in_codespace",
            Self::DeleteCodespace => "delete_codespace",
            Self::ListCodespaces => "list_codespaces",
            Self::CloneRepo => "clone_repo",
            Self::CreateBranch => "create_branch",
            Self::CommitChanges => "commit_changes",
            Self::PushBranch => "push_branch",
            Self::ReadFile => "read_file",
            Self::WriteFile => "write_file",
            Self::CreateIssue => "create_issue",
            Self::CommentOnPr => "comment_on_pr",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Self::CreateCodespace => {
                "Creates a GitHub Codespace for repository analysis. Accepts owner/repo or a \
                 full GitHub URL. Returns codespace_name. The codespace auto-deletes after its \
                 retention period."
            }
            Self::RunInCodespace => {
                "Executes shell commands (multi-line supported) in a codespace. Returns output \
                 and stderr. Commands are cut off after the run timeout."
            }
            Self::DeleteCodespace => "Deletes a codespace. Always call this when finished.",
            Self::ListCodespaces => {
                "Lists active codespaces with name, repository, state and createdAt, plus a count."
            }
            Self::CloneRepo => {
                "Clones a repository locally. Returns the local path used by the other git tools."
            }
            Self::CreateBranch => "Creates and checks out a new git branch in a local clone.",
            Self::CommitChanges => "Stages all changes in a local clone and commits them.",
            Self::PushBranch => "Pushes a branch of a local clone to origin.",
            Self::ReadFile => "Reads a file from a local clone.",
            Self::WriteFile => {
                "Writes a file in a local clone, creating parent directories as needed."
            }
            Self::CreateIssue => "Creates a GitHub issue. Returns the gh output (the issue URL).",
            Self::CommentOnPr => "Comments on a pull request. Returns the gh output.",
        }
    }

    fn parameters(self) -> serde_json::Value {
        let string = json!({ "type": "string" });
        match self {
            Self::CreateCodespace => schema(&[("repo_url", &string, true)]),
            Self::RunInCodespace => schema(&[
                ("codespace_name", &string, true),
                ("commands", &string, true),
            ]),
            Self::DeleteCodespace => schema(&[("codespace_name", &string, true)]),
            Self::ListCodespaces => schema(&[]),
            Self::CloneRepo => schema(&[("repo_url", &string, true), ("target_dir", &string, false)]),
            Self::CreateBranch | Self::PushBranch => schema(&[
                ("repo_path", &string, true),
                ("branch_name", &string, true),
            ]),
            Self::CommitChanges => schema(&[("repo_path", &string, true), ("message", &string, true)]),
            Self::ReadFile => schema(&[("repo_path", &string, true), ("file_path", &string, true)]),
            Self::WriteFile => schema(&[
                ("repo_path", &string, true),
                ("file_path", &string, true),
                ("content", &string, true),
            ]),
            Self::CreateIssue => schema(&[
                ("title", &string, true),
                ("body", &string, true),
                ("repo", &string, false),
            ]),
            Self::CommentOnPr => schema(&[
                ("pr_number", &json!({ "type": "integer", "minimum": 1 }), true),
                ("body", &string, true),
                ("repo", &string, false),
            ]),
        }
    }

    /// Returns true for operations that change remote or local state.
    pub fn is_mutating(self) -> bool {
        !matches!(self, Self::ListCodespaces | Self::ReadFile)
    }
}

fn schema(fields: &[(&str, &serde_json::Value, bool)]) -> serde_json::Value {
    let properties: serde_json::Map<String, serde_json::Value> = fields
        .iter()
        .map(|(name, ty, _)| (name.to_string(), (*ty).clone()))
        .collect();
    let required: Vec<&str> = fields
        .iter()
        .filter(|(_, _, required)| *required)
        .map(|(name, _, _)| *name)
        .collect();
    json!({ "type": "object", "properties": properties, "required": required })
}

#[derive(Deserialize)]
struct RepoUrlArgs {
    repo_url: String,
}

#[derive(Deserialize)]
struct RunArgs {
    codespace_name: String,
    commands: String,
}

#[derive(Deserialize)]
struct CodespaceArgs {
    codespace_name: String,
}

#[derive(Deserialize)]
struct CloneArgs {
    repo_url: String,
    #[serde(default)]
    target_dir: Option<PathBuf>,
}

#[derive(Deserialize)]
struct BranchArgs {
    repo_path: PathBuf,
    branch_name: String,
}

#[derive(Deserialize)]
struct CommitArgs {
    repo_path: PathBuf,
    message: String,
}

#[derive(Deserialize)]
struct ReadArgs {
    repo_path: PathBuf,
    file_path: String,
}

#[derive(Deserialize)]
struct WriteArgs {
    repo_path: PathBuf,
    file_path: String,
    content: String,
}

#[derive(Deserialize)]
struct IssueArgs {
    title: String,
    body: String,
    #[serde(default)]
    repo: Option<String>,
}

#[derive(Deserialize)]
struct CommentArgs {
    pr_number: u64,
    body: String,
    #[serde(default)]
    repo: Option<String>,
}

/// Binds one [`GatewayOp`] to a shared gateway.
pub struct GatewayTool {
    op: GatewayOp,
    gateway: Arc<Gateway>,
}

impl GatewayTool {
    /// Creates a tool for `op`.
    pub fn new(op: GatewayOp, gateway: Arc<Gateway>) -> Self {
        Self { op, gateway }
    }
}

fn parse<T: DeserializeOwned>(op: GatewayOp, input: serde_json::Value) -> Result<T, OperationResult> {
    // Argument-less calls may arrive as null.
    let input = if input.is_null() { json!({}) } else { input };
    serde_json::from_value(input).map_err(|e| {
        Error::InvalidArguments(format!("{}: {}", op.name(), e)).into()
    })
}

#[async_trait]
impl ToolHandler for GatewayTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.op.name(), self.op.description())
            .with_parameters(self.op.parameters())
    }

    fn is_mutating(&self) -> bool {
        self.op.is_mutating()
    }

    async fn execute(&self, input: serde_json::Value) -> OperationResult {
        match self.run(input).await {
            Ok(result) | Err(result) => result,
        }
    }
}

impl GatewayTool {
    async fn run(&self, input: serde_json::Value) -> Result<OperationResult, OperationResult> {
        let gateway = &self.gateway;
        let op = self.op;
        Ok(match op {
            GatewayOp::CreateCodespace => {
                let args: RepoUrlArgs = parse(op, input)?;
                gateway.create_codespace(&args.repo_url).await
            }
            GatewayOp::RunInCodespace => {
                let args: RunArgs = parse(op, input)?;
                gateway
                    .run_in_codespace(&args.codespace_name, &args.commands)
                    .await
            }
            GatewayOp::DeleteCodespace => {
                let args: CodespaceArgs = parse(op, input)?;
                gateway.delete_codespace(&args.codespace_name).await
            }
            GatewayOp::ListCodespaces => gateway.list_codespaces().await,
            GatewayOp::CloneRepo => {
                let args: CloneArgs = parse(op, input)?;
                gateway
                    .clone_repo(&args.repo_url, args.target_dir.as_deref())
                    .await
            }
            GatewayOp::CreateBranch => {
                let args: BranchArgs = parse(op, input)?;
                gateway.create_branch(&args.repo_path, &args.branch_name).await
            }
            GatewayOp::CommitChanges => {
                let args: CommitArgs = parse(op, input)?;
                gateway.commit_changes(&args.repo_path, &args.message).await
            }
            GatewayOp::PushBranch => {
                let args: BranchArgs = parse(op, input)?;
                gateway.push_branch(&args.repo_path, &args.branch_name).await
            }
            GatewayOp::ReadFile => {
                let args: ReadArgs = parse(op, input)?;
                gateway.read_file(&args.repo_path, &args.file_path).await
            }
            GatewayOp::WriteFile => {
                let args: WriteArgs = parse(op, input)?;
                gateway
                    .write_file(&args.repo_path, &args.file_path, &args.content)
                    .await
            }
            GatewayOp::CreateIssue => {
                let args: IssueArgs = parse(op, input)?;
                gateway
                    .create_issue(&args.title, &args.body, args.repo.as_deref())
                    .await
            }
            GatewayOp::CommentOnPr => {
                let args: CommentArgs = parse(op, input)?;
                gateway
                    .comment_on_pr(args.pr_number, &args.body, args.repo.as_deref())
                    .await
            }
        })
    }
}
