//! Codespace lifecycle: create, run, delete, list.

use crate::error::{Error, Result};
use crate::outcome::{CodespaceRecord, OperationResult, Payload};

use super::{normalize_repo_ref, Gateway};

/// Fields requested from `gh codespace list`.
const LIST_FIELDS: &str = "name,repository,state,createdAt";

impl Gateway {
    /// Creates a codespace for `repo_url` (`owner/repo` or a full URL).
    ///
    /// The codespace auto-deletes after the configured retention period.
    pub async fn create_codespace(&self, repo_url: &str) -> OperationResult {
        let repo = normalize_repo_ref(repo_url);
        tracing::info!(repo = %repo, "creating codespace");

        let result = self.try_create_codespace(&repo).await;
        OperationResult::from_result(result, |payload| match payload {
            Payload::CodespaceCreated { codespace_name } => {
                Some(format!("Codespace created: {}", codespace_name))
            }
            _ => None,
        })
    }

    async fn try_create_codespace(&self, repo: &str) -> Result<Payload> {
        let spec = self.gh().args([
            "codespace",
            "create",
            "-R",
            repo,
            "-m",
            self.settings.machine_type.as_str(),
            "--retention-period",
            self.settings.retention_period.as_str(),
        ]);
        let output = self.run_checked(spec, None).await?;

        let name = output.first_line().ok_or_else(|| {
            Error::MalformedOutput("Failed to extract codespace name from output".to_string())
        })?;

        tracing::info!(codespace = %name, "codespace created");
        Ok(Payload::CodespaceCreated {
            codespace_name: name.to_string(),
        })
    }

    /// Runs `commands` inside a codespace.
    ///
    /// The command text is piped to `gh codespace ssh` on stdin, so multi-line
    /// scripts and embedded quotes need no escaping.
    pub async fn run_in_codespace(&self, codespace_name: &str, commands: &str) -> OperationResult {
        tracing::info!(codespace = %codespace_name, "running commands in codespace");

        let spec = self
            .gh()
            .args(["codespace", "ssh", "-c", codespace_name])
            .stdin(commands)
            .timeout(self.settings.run_timeout());

        let result = self
            .run_checked(spec, Some("Command failed"))
            .await
            .map(|output| Payload::CommandOutput {
                output: output.stdout,
                stderr: (!output.stderr.is_empty()).then_some(output.stderr),
            });
        OperationResult::from_result(result, |_| None)
    }

    /// Force-deletes a codespace.
    pub async fn delete_codespace(&self, codespace_name: &str) -> OperationResult {
        tracing::info!(codespace = %codespace_name, "deleting codespace");

        let spec = self
            .gh()
            .args(["codespace", "delete", "-c", codespace_name, "--force"]);

        let result = self
            .run_checked(spec, Some("Deletion failed"))
            .await
            .map(|_| Payload::CodespaceDeleted {
                codespace_name: codespace_name.to_string(),
            });
        OperationResult::from_result(result, |_| {
            Some(format!("Deleted codespace: {}", codespace_name))
        })
    }

    /// Lists every codespace visible to the authenticated user.
    pub async fn list_codespaces(&self) -> OperationResult {
        let result = self.try_list_codespaces().await;
        OperationResult::from_result(result, |_| None)
    }

    async fn try_list_codespaces(&self) -> Result<Payload> {
        let spec = self
            .gh()
            .args(["codespace", "list", "--json", LIST_FIELDS]);
        let output = self
            .run_checked(spec, Some("Failed to list codespaces"))
            .await?;

        let codespaces: Vec<CodespaceRecord> = serde_json::from_str(&output.stdout)?;
        tracing::debug!(count = codespaces.len(), "listed codespaces");

        Ok(Payload::Codespaces {
            count: codespaces.len(),
            codespaces,
        })
    }
}
