//! External command gateway.
//!
//! Translates a fixed vocabulary of agent actions into `gh`/`git`
//! invocations (or local file access) and folds every outcome into an
//! [`OperationResult`]. No operation keeps state between calls; handles such
//! as a codespace name or a working-copy path are threaded through by the
//! caller.
//!
//! Every public method is infallible from the caller's point of view: errors
//! come back as `OperationResult::Error`, never as a panic or `Err`.

mod codespace;
mod files;
mod git;
mod github;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::GatewaySettings;
use crate::error::Result;
use crate::exec::{CommandExecutor, CommandOutput, CommandSpec, ProcessExecutor};

/// Runs agent actions against `gh`, `git` and the local filesystem.
#[derive(Clone)]
pub struct Gateway {
    executor: Arc<dyn CommandExecutor>,
    settings: GatewaySettings,
}

impl Gateway {
    /// Creates a gateway that spawns real processes.
    pub fn new(settings: GatewaySettings) -> Self {
        Self::with_executor(settings, Arc::new(ProcessExecutor::new()))
    }

    /// Creates a gateway over a custom executor.
    pub fn with_executor(settings: GatewaySettings, executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor, settings }
    }

    fn gh(&self) -> CommandSpec {
        CommandSpec::new(&self.settings.gh_program)
    }

    fn git_in(&self, repo_path: &Path) -> CommandSpec {
        CommandSpec::new(&self.settings.git_program).current_dir(repo_path)
    }

    /// Runs `spec` and fails on a non-zero exit.
    ///
    /// Without an explicit `fallback`, an empty stderr is reported as the
    /// program's exit status.
    async fn run_checked(&self, spec: CommandSpec, fallback: Option<&str>) -> Result<CommandOutput> {
        let program = spec.program.clone();
        let output = self.executor.execute(spec).await?;
        let fallback = match fallback {
            Some(text) => text.to_string(),
            None => exit_fallback(&program, &output),
        };
        output.into_checked(&fallback)
    }

    /// Default clone target for `repo_url` under the configured clone root.
    pub fn default_clone_target(&self, repo_url: &str) -> PathBuf {
        self.settings.clone_root.join(repo_name_from_url(repo_url))
    }
}

/// Normalizes a repository reference to `owner/repo`.
///
/// Full URLs (anything starting with `http`) keep their last two path
/// segments. Other input is returned unchanged.
pub fn normalize_repo_ref(repo: &str) -> String {
    if !repo.starts_with("http") {
        return repo.to_string();
    }

    let segments: Vec<&str> = repo.trim_end_matches('/').split('/').collect();
    let start = segments.len().saturating_sub(2);
    segments[start..].join("/")
}

/// Last path segment of a repository URL, without a `.git` suffix.
pub fn repo_name_from_url(repo_url: &str) -> String {
    let last = repo_url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    last.strip_suffix(".git").unwrap_or(last).to_string()
}

fn exit_fallback(program: &str, output: &CommandOutput) -> String {
    match output.code {
        Some(code) => format!("{} exited with status {}", program, code),
        None => format!("{} was terminated by a signal", program),
    }
}
