//! Repo Reviver CLI
//!
//! Drives the gateway directly, one operation per invocation, and prints the
//! result envelope as JSON on stdout. Logs go to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use repo_reviver::{
    AgentDefinition, Gateway, OperationResult, ReviverConfig, ToolRegistry, Validate,
};

/// Agent tool gateway for reviving GitHub repositories.
#[derive(Parser)]
#[command(name = "repo-reviver", version, about, long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "REPO_REVIVER_CONFIG")]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the reviver agent definition
    Agent,

    /// List every available tool
    Tools,

    /// Dispatch one tool call through the registry
    Call {
        /// Tool name
        tool: String,
        /// JSON arguments object
        #[arg(long, default_value = "{}")]
        args: String,
    },

    /// Codespace lifecycle
    #[command(subcommand)]
    Codespace(CodespaceCommand),

    /// Clone a repository
    Clone {
        repo_url: String,
        /// Target directory (defaults under the clone root)
        target_dir: Option<PathBuf>,
    },

    /// Create and check out a branch
    Branch { repo_path: PathBuf, branch_name: String },

    /// Stage everything and commit
    Commit { repo_path: PathBuf, message: String },

    /// Push a branch to origin
    Push { repo_path: PathBuf, branch_name: String },

    /// Read a file from a working copy
    Read { repo_path: PathBuf, file_path: String },

    /// Write a file in a working copy
    Write {
        repo_path: PathBuf,
        file_path: String,
        content: String,
    },

    /// Create a GitHub issue
    Issue {
        title: String,
        body: String,
        #[arg(long)]
        repo: Option<String>,
    },

    /// Comment on a pull request
    Comment {
        pr_number: u64,
        body: String,
        #[arg(long)]
        repo: Option<String>,
    },
}

#[derive(Subcommand)]
enum CodespaceCommand {
    /// Create a codespace for owner/repo or a repository URL
    Create { repo_url: String },
    /// Run commands in a codespace (reads stdin when no commands are given)
    Run {
        codespace_name: String,
        commands: Option<String>,
    },
    /// Delete a codespace
    Delete { codespace_name: String },
    /// List codespaces
    List,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = ?path, "loaded .env");
    }

    let cli = Cli::parse();

    let config = match ReviverConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    match config.validate().into_result() {
        Ok(warnings) => {
            for warning in warnings {
                tracing::warn!("{}", warning);
            }
        }
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    }

    let gateway = Arc::new(Gateway::new(config.gateway.clone()));

    let result = match cli.command {
        Command::Agent => {
            let agent = AgentDefinition::repo_reviver(&config, gateway);
            print_json(&agent.summary(), cli.pretty);
            return;
        }
        Command::Tools => {
            let registry = ToolRegistry::all_tools(&gateway);
            for definition in registry.definitions() {
                println!("{:<28} {}", definition.name, definition.description);
            }
            return;
        }
        Command::Call { tool, args } => match serde_json::from_str(&args) {
            Ok(input) => ToolRegistry::all_tools(&gateway).dispatch(&tool, input).await,
            Err(e) => OperationResult::error(format!("invalid --args JSON: {}", e)),
        },
        Command::Codespace(CodespaceCommand::Create { repo_url }) => {
            gateway.create_codespace(&repo_url).await
        }
        Command::Codespace(CodespaceCommand::Run {
            codespace_name,
            commands,
        }) => match commands.map(Ok).unwrap_or_else(read_stdin) {
            Ok(commands) => gateway.run_in_codespace(&codespace_name, &commands).await,
            Err(e) => OperationResult::error(format!("failed to read stdin: {}", e)),
        },
        Command::Codespace(CodespaceCommand::Delete { codespace_name }) => {
            gateway.delete_codespace(&codespace_name).await
        }
        Command::Codespace(CodespaceCommand::List) => gateway.list_codespaces().await,
        Command::Clone {
            repo_url,
            target_dir,
        } => gateway.clone_repo(&repo_url, target_dir.as_deref()).await,
        Command::Branch {
            repo_path,
            branch_name,
        } => gateway.create_branch(&repo_path, &branch_name).await,
        Command::Commit { repo_path, message } => {
            gateway.commit_changes(&repo_path, &message).await
        }
        Command::Push {
            repo_path,
            branch_name,
        } => gateway.push_branch(&repo_path, &branch_name).await,
        Command::Read {
            repo_path,
            file_path,
        } => gateway.read_file(&repo_path, &file_path).await,
        Command::Write {
            repo_path,
            file_path,
            content,
        } => gateway.write_file(&repo_path, &file_path, &content).await,
        Command::Issue { title, body, repo } => {
            gateway.create_issue(&title, &body, repo.as_deref()).await
        }
        Command::Comment {
            pr_number,
            body,
            repo,
        } => gateway.comment_on_pr(pr_number, &body, repo.as_deref()).await,
    };

    print_json(&result.to_json(), cli.pretty);

    if !result.is_success() {
        std::process::exit(1);
    }
}

fn read_stdin() -> std::io::Result<String> {
    std::io::read_to_string(std::io::stdin())
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match rendered {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("failed to render output: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn pretty_is_accepted_after_the_subcommand() {
        let cli = Cli::try_parse_from(["repo-reviver", "tools", "--pretty"]).unwrap();
        assert!(cli.pretty);
        assert!(matches!(cli.command, Command::Tools));
    }

    #[test]
    fn compact_json_is_the_default() {
        let cli = Cli::try_parse_from(["repo-reviver", "codespace", "list"]).unwrap();
        assert!(!cli.pretty);
        assert!(matches!(
            cli.command,
            Command::Codespace(CodespaceCommand::List)
        ));
    }
}
