//! GitHub API actions through the `gh` CLI.

use crate::exec::CommandSpec;
use crate::outcome::{OperationResult, Payload};

use super::Gateway;

impl Gateway {
    /// Opens an issue. Without `repo`, gh resolves the repository from the
    /// current directory.
    pub async fn create_issue(&self, title: &str, body: &str, repo: Option<&str>) -> OperationResult {
        tracing::info!(repo = ?repo, title = %title, "creating issue");

        let spec = with_repo(
            self.gh()
                .args(["issue", "create", "--title", title, "--body", body]),
            repo,
        );
        self.raw_output(spec).await
    }

    /// Comments on a pull request.
    pub async fn comment_on_pr(&self, pr_number: u64, body: &str, repo: Option<&str>) -> OperationResult {
        tracing::info!(repo = ?repo, pr = pr_number, "commenting on pull request");

        let spec = with_repo(
            self.gh()
                .args(["pr", "comment"])
                .arg(pr_number.to_string())
                .args(["--body", body]),
            repo,
        );
        self.raw_output(spec).await
    }

    async fn raw_output(&self, spec: CommandSpec) -> OperationResult {
        let result = self
            .run_checked(spec, None)
            .await
            .map(|output| Payload::CommandText {
                output: output.stdout,
            });
        OperationResult::from_result(result, |_| None)
    }
}

fn with_repo(spec: CommandSpec, repo: Option<&str>) -> CommandSpec {
    match repo {
        Some(repo) => spec.args(["--repo", repo]),
        None => spec,
    }
}
