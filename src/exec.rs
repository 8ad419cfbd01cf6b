//! External process execution.
//!
//! All `gh` and `git` invocations go through the [`CommandExecutor`] trait so
//! operations can be exercised against scripted output in tests.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::{Error, Result};

/// A single external process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program to run (resolved through `PATH`).
    pub program: String,
    /// Argument vector, passed without a shell.
    pub args: Vec<String>,
    /// Working directory. Inherits the current directory if unset.
    pub cwd: Option<PathBuf>,
    /// Text written to the child's stdin, which is then closed.
    pub stdin: Option<String>,
    /// Wall-clock budget. Unbounded if unset.
    pub timeout: Option<Duration>,
}

impl CommandSpec {
    /// Creates a spec for `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            stdin: None,
            timeout: None,
        }
    }

    /// Appends a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the working directory.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Sets the text piped to stdin.
    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// Sets the wall-clock budget.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Renders the invocation for log lines.
    pub fn display(&self) -> String {
        let mut rendered = self.program.clone();
        for arg in &self.args {
            rendered.push(' ');
            rendered.push_str(arg);
        }
        rendered
    }
}

/// Captured result of a process that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code, or `None` if the process was killed by a signal.
    pub code: Option<i32>,
    /// Captured stdout (lossily decoded).
    pub stdout: String,
    /// Captured stderr (lossily decoded).
    pub stderr: String,
}

impl CommandOutput {
    /// Returns true if the process exited with status zero.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// First line of stdout, trimmed. Empty output yields `None`.
    pub fn first_line(&self) -> Option<&str> {
        self.stdout
            .trim()
            .lines()
            .next()
            .map(str::trim)
            .filter(|line| !line.is_empty())
    }

    /// Converts a non-zero exit into [`Error::CommandFailed`].
    ///
    /// The diagnostic is stderr verbatim, or `fallback` when stderr is empty.
    /// Partial stdout is kept so the caller can surface it.
    pub fn into_checked(self, fallback: &str) -> Result<Self> {
        if self.success() {
            return Ok(self);
        }

        let diagnostic = if self.stderr.is_empty() {
            fallback.to_string()
        } else {
            self.stderr
        };
        let output = (!self.stdout.is_empty()).then_some(self.stdout);

        Err(Error::CommandFailed { diagnostic, output })
    }
}

/// Runs external processes.
///
/// Implementations return `Err` only when the process could not be started
/// or exceeded its timeout. A non-zero exit is reported through
/// [`CommandOutput::code`].
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Runs the command to completion and captures its output.
    async fn execute(&self, spec: CommandSpec) -> Result<CommandOutput>;
}

/// Executor backed by real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    /// Creates a new process executor.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn execute(&self, spec: CommandSpec) -> Result<CommandOutput> {
        tracing::debug!(
            command = %spec.display(),
            cwd = ?spec.cwd,
            stdin = spec.stdin.is_some(),
            "running external command"
        );

        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(if spec.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .kill_on_drop(true);

        if let Some(dir) = &spec.cwd {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|source| Error::Spawn {
            program: spec.program.clone(),
            source,
        })?;

        let pipe = child.stdin.take();
        let input = spec.stdin.clone();
        // stdin is fed while stdout and stderr drain, all inside the budget.
        let run = async move {
            let feed = async move {
                if let (Some(mut pipe), Some(input)) = (pipe, input) {
                    // The child may exit without reading stdin; its exit
                    // status decides the outcome.
                    if let Err(e) = pipe.write_all(input.as_bytes()).await {
                        tracing::debug!(error = %e, "child closed stdin early");
                    }
                }
            };
            let ((), waited) = tokio::join!(feed, child.wait_with_output());
            waited
        };

        let waited = match spec.timeout {
            Some(budget) => match tokio::time::timeout(budget, run).await {
                Ok(waited) => waited,
                Err(_) => {
                    tracing::warn!(
                        command = %spec.display(),
                        timeout_secs = budget.as_secs(),
                        "external command timed out"
                    );
                    return Err(Error::Timeout(budget));
                }
            },
            None => run.await,
        };

        let output = waited.map_err(|source| Error::Spawn {
            program: spec.program.clone(),
            source,
        })?;

        let result = CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !result.success() {
            tracing::warn!(
                command = %spec.display(),
                code = ?result.code,
                "external command failed"
            );
        }

        Ok(result)
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! Scripted executor for operation tests.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Replays queued responses and records every spec it receives.
    #[derive(Default)]
    pub struct ScriptedExecutor {
        responses: Mutex<VecDeque<Result<CommandOutput>>>,
        calls: Mutex<Vec<CommandSpec>>,
    }

    impl ScriptedExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queues a successful exit with the given stdout.
        pub fn ok(self, stdout: &str) -> Self {
            self.push(Ok(CommandOutput {
                code: Some(0),
                stdout: stdout.to_string(),
                stderr: String::new(),
            }))
        }

        /// Queues a non-zero exit.
        pub fn fail(self, code: i32, stdout: &str, stderr: &str) -> Self {
            self.push_output(code, stdout, stderr)
        }

        /// Queues an exit with both streams populated.
        pub fn push_output(self, code: i32, stdout: &str, stderr: &str) -> Self {
            self.push(Ok(CommandOutput {
                code: Some(code),
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            }))
        }

        /// Queues an executor-level error.
        pub fn err(self, err: Error) -> Self {
            self.push(Err(err))
        }

        fn push(self, response: Result<CommandOutput>) -> Self {
            self.responses.lock().unwrap().push_back(response);
            self
        }

        pub fn calls(&self) -> Vec<CommandSpec> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandExecutor for ScriptedExecutor {
        async fn execute(&self, spec: CommandSpec) -> Result<CommandOutput> {
            self.calls.lock().unwrap().push(spec.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| panic!("unexpected command: {}", spec.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_builder_collects_arguments() {
        let spec = CommandSpec::new("gh")
            .args(["codespace", "ssh"])
            .arg("-c")
            .arg("otter")
            .stdin("ls\n")
            .timeout(Duration::from_secs(300));

        assert_eq!(spec.args, vec!["codespace", "ssh", "-c", "otter"]);
        assert_eq!(spec.stdin.as_deref(), Some("ls\n"));
        assert_eq!(spec.display(), "gh codespace ssh -c otter");
    }

    #[test]
    fn first_line_is_trimmed_and_non_empty() {
        let output = CommandOutput {
            code: Some(0),
            stdout: "cheerful-otter-xyz123\nsecond line\n".to_string(),
            stderr: String::new(),
        };
        assert_eq!(output.first_line(), Some("cheerful-otter-xyz123"));

        let empty = CommandOutput {
            code: Some(0),
            stdout: "  \n".to_string(),
            stderr: String::new(),
        };
        assert_eq!(empty.first_line(), None);
    }

    #[test]
    fn into_checked_uses_fallback_for_empty_stderr() {
        let output = CommandOutput {
            code: Some(1),
            stdout: String::new(),
            stderr: String::new(),
        };
        let err = output.into_checked("Deletion failed").unwrap_err();
        assert_eq!(err.to_string(), "Deletion failed");
    }

    #[test]
    fn into_checked_keeps_partial_stdout() {
        let output = CommandOutput {
            code: Some(2),
            stdout: "partial".to_string(),
            stderr: "broken pipe".to_string(),
        };
        match output.into_checked("Command failed") {
            Err(Error::CommandFailed { diagnostic, output }) => {
                assert_eq!(diagnostic, "broken pipe");
                assert_eq!(output.as_deref(), Some("partial"));
            }
            other => panic!("expected CommandFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn process_executor_pipes_stdin() {
        let output = ProcessExecutor::new()
            .execute(CommandSpec::new("cat").stdin("echo 'quoted' \"text\"\n"))
            .await
            .unwrap();

        assert!(output.success());
        assert_eq!(output.stdout, "echo 'quoted' \"text\"\n");
    }

    #[tokio::test]
    async fn process_executor_reports_non_zero_exit() {
        let output = ProcessExecutor::new()
            .execute(CommandSpec::new("sh").args(["-c", "echo oops >&2; exit 3"]))
            .await
            .unwrap();

        assert_eq!(output.code, Some(3));
        assert_eq!(output.stderr, "oops\n");
    }

    #[tokio::test]
    async fn process_executor_enforces_timeout() {
        let result = ProcessExecutor::new()
            .execute(
                CommandSpec::new("sleep")
                    .arg("5")
                    .timeout(Duration::from_millis(100)),
            )
            .await;

        assert!(matches!(result, Err(Error::Timeout(_))));
    }

    #[tokio::test]
    async fn timeout_covers_unread_stdin() {
        let start = std::time::Instant::now();
        let result = ProcessExecutor::new()
            .execute(
                CommandSpec::new("sleep")
                    .arg("4")
                    .stdin("x".repeat(1 << 20))
                    .timeout(Duration::from_millis(200)),
            )
            .await;

        assert!(matches!(result, Err(Error::Timeout(_))), "{:?}", result);
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn large_stdin_and_stdout_do_not_deadlock() {
        let script = "y".repeat(1 << 20);
        let output = ProcessExecutor::new()
            .execute(
                CommandSpec::new("cat")
                    .stdin(script.clone())
                    .timeout(Duration::from_secs(30)),
            )
            .await
            .unwrap();

        assert!(output.success());
        assert_eq!(output.stdout.len(), script.len());
    }

    #[tokio::test]
    async fn process_executor_reports_missing_program() {
        let result = ProcessExecutor::new()
            .execute(CommandSpec::new("definitely-not-a-real-program-xyz"))
            .await;

        assert!(matches!(result, Err(Error::Spawn { .. })));
    }
}
