//! Local working-copy operations through the `git` CLI.

use std::path::Path;

use crate::error::Result;
use crate::exec::CommandSpec;
use crate::outcome::{OperationResult, Payload};

use super::Gateway;

impl Gateway {
    /// Clones `repo_url` into `target_dir`, or into the default clone root.
    pub async fn clone_repo(&self, repo_url: &str, target_dir: Option<&Path>) -> OperationResult {
        let target = match target_dir {
            Some(dir) => dir.to_path_buf(),
            None => self.default_clone_target(repo_url),
        };
        tracing::info!(url = %repo_url, target = ?target, "cloning repository");

        let result = self.try_clone(repo_url, &target).await;
        OperationResult::from_result(result, |_| {
            Some(format!("Successfully cloned to {}", target.display()))
        })
    }

    async fn try_clone(&self, repo_url: &str, target: &Path) -> Result<Payload> {
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let spec = CommandSpec::new(&self.settings.git_program)
            .args(["clone", repo_url])
            .arg(target.to_string_lossy());
        self.run_checked(spec, None).await?;

        Ok(Payload::Cloned {
            path: target.to_string_lossy().into_owned(),
        })
    }

    /// Creates and checks out `branch_name` in the working copy.
    pub async fn create_branch(&self, repo_path: &Path, branch_name: &str) -> OperationResult {
        tracing::info!(repo = ?repo_path, branch = %branch_name, "creating branch");

        let spec = self.git_in(repo_path).args(["checkout", "-b", branch_name]);
        let result = self
            .run_checked(spec, None)
            .await
            .map(|_| Payload::Branch {
                branch: branch_name.to_string(),
                output: None,
            });
        OperationResult::from_result(result, |_| None)
    }

    /// Stages everything and commits it with `message`.
    ///
    /// A staging failure and a commit failure are reported the same way.
    pub async fn commit_changes(&self, repo_path: &Path, message: &str) -> OperationResult {
        tracing::info!(repo = ?repo_path, "committing changes");

        let result = self.try_commit(repo_path, message).await;
        OperationResult::from_result(result, |_| None)
    }

    async fn try_commit(&self, repo_path: &Path, message: &str) -> Result<Payload> {
        self.run_checked(self.git_in(repo_path).args(["add", "."]), None)
            .await?;
        self.run_checked(self.git_in(repo_path).args(["commit", "-m", message]), None)
            .await?;

        Ok(Payload::Committed {
            message: message.to_string(),
        })
    }

    /// Pushes `branch_name` to `origin`.
    pub async fn push_branch(&self, repo_path: &Path, branch_name: &str) -> OperationResult {
        tracing::info!(repo = ?repo_path, branch = %branch_name, "pushing branch");

        let spec = self.git_in(repo_path).args(["push", "origin", branch_name]);
        let result = self
            .run_checked(spec, None)
            .await
            .map(|output| Payload::Branch {
                branch: branch_name.to_string(),
                output: Some(output.stdout),
            });
        OperationResult::from_result(result, |_| None)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use crate::config::GatewaySettings;
    use crate::exec::fake::ScriptedExecutor;

    use super::*;

    fn gateway(executor: ScriptedExecutor, clone_root: PathBuf) -> (Gateway, Arc<ScriptedExecutor>) {
        let executor = Arc::new(executor);
        let settings = GatewaySettings {
            clone_root,
            ..Default::default()
        };
        (Gateway::with_executor(settings, executor.clone()), executor)
    }

    #[tokio::test]
    async fn clone_defaults_under_clone_root_and_creates_it() {
        let temp = tempfile::TempDir::new().unwrap();
        let root = temp.path().join("clones");
        let (gateway, executor) = gateway(ScriptedExecutor::new().ok(""), root.clone());

        let result = gateway
            .clone_repo("https://github.com/o/widget.git", None)
            .await;

        let expected = root.join("widget");
        assert_eq!(
            result,
            OperationResult::success_with_message(
                Payload::Cloned {
                    path: expected.to_string_lossy().into_owned(),
                },
                format!("Successfully cloned to {}", expected.display()),
            )
        );
        assert!(root.is_dir());

        let call = &executor.calls()[0];
        assert_eq!(call.program, "git");
        assert_eq!(
            call.args,
            vec![
                "clone".to_string(),
                "https://github.com/o/widget.git".to_string(),
                expected.to_string_lossy().into_owned(),
            ]
        );
        assert!(call.cwd.is_none());
    }

    #[tokio::test]
    async fn clone_failure_surfaces_stderr() {
        let temp = tempfile::TempDir::new().unwrap();
        let (gateway, _) = gateway(
            ScriptedExecutor::new().fail(128, "", "fatal: repository not found\n"),
            temp.path().to_path_buf(),
        );

        let result = gateway
            .clone_repo("https://github.com/o/missing", Some(&temp.path().join("x")))
            .await;

        assert_eq!(result.error_message(), Some("fatal: repository not found\n"));
    }

    #[tokio::test]
    async fn branch_runs_checkout_in_working_copy() {
        let (gateway, executor) = gateway(ScriptedExecutor::new().ok(""), PathBuf::from("/tmp"));

        let result = gateway
            .create_branch(Path::new("/work/widget"), "fix/revival-1")
            .await;

        assert_eq!(
            result.payload(),
            Some(&Payload::Branch {
                branch: "fix/revival-1".to_string(),
                output: None,
            })
        );
        let call = &executor.calls()[0];
        assert_eq!(call.args, vec!["checkout", "-b", "fix/revival-1"]);
        assert_eq!(call.cwd.as_deref(), Some(Path::new("/work/widget")));
    }

    #[tokio::test]
    async fn commit_stages_then_commits() {
        let (gateway, executor) =
            gateway(ScriptedExecutor::new().ok("").ok("[main abc123] fix\n"), PathBuf::from("/tmp"));

        let result = gateway
            .commit_changes(Path::new("/work/widget"), "Revival: update deps")
            .await;

        assert_eq!(
            result.payload(),
            Some(&Payload::Committed {
                message: "Revival: update deps".to_string(),
            })
        );
        let calls = executor.calls();
        assert_eq!(calls[0].args, vec!["add", "."]);
        assert_eq!(calls[1].args, vec!["commit", "-m", "Revival: update deps"]);
    }

    #[tokio::test]
    async fn commit_stops_after_staging_failure() {
        let (gateway, executor) = gateway(
            ScriptedExecutor::new().fail(128, "", "fatal: not a git repository\n"),
            PathBuf::from("/tmp"),
        );

        let result = gateway.commit_changes(Path::new("/nowhere"), "msg").await;

        assert_eq!(result.error_message(), Some("fatal: not a git repository\n"));
        assert_eq!(executor.calls().len(), 1);
    }

    #[tokio::test]
    async fn commit_with_nothing_to_commit_is_an_error() {
        let (gateway, _) = gateway(
            ScriptedExecutor::new()
                .ok("")
                .fail(1, "nothing to commit, working tree clean\n", ""),
            PathBuf::from("/tmp"),
        );

        let result = gateway.commit_changes(Path::new("/work"), "msg").await;

        assert_eq!(
            result,
            OperationResult::Error {
                error: "git exited with status 1".to_string(),
                output: Some("nothing to commit, working tree clean\n".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn push_returns_branch_and_output() {
        let (gateway, executor) =
            gateway(ScriptedExecutor::new().ok("Everything up-to-date\n"), PathBuf::from("/tmp"));

        let result = gateway
            .push_branch(Path::new("/work/widget"), "fix/revival-1")
            .await;

        assert_eq!(
            result.payload(),
            Some(&Payload::Branch {
                branch: "fix/revival-1".to_string(),
                output: Some("Everything up-to-date\n".to_string()),
            })
        );
        assert_eq!(
            executor.calls()[0].args,
            vec!["push", "origin", "fix/revival-1"]
        );
    }
}
