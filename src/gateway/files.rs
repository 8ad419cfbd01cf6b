//! Reading and writing files inside a working copy.

use std::path::Path;

use crate::error::Result;
use crate::outcome::{OperationResult, Payload};

use super::Gateway;

impl Gateway {
    /// Reads `file_path` relative to the working copy at `repo_path`.
    pub async fn read_file(&self, repo_path: &Path, file_path: &str) -> OperationResult {
        let full_path = repo_path.join(file_path);
        tracing::debug!(path = ?full_path, "reading file");

        let result = tokio::fs::read_to_string(&full_path)
            .await
            .map(|content| Payload::FileContent { content })
            .map_err(Into::into);
        OperationResult::from_result(result, |_| None)
    }

    /// Writes `content` to `file_path` relative to the working copy,
    /// creating missing parent directories.
    pub async fn write_file(&self, repo_path: &Path, file_path: &str, content: &str) -> OperationResult {
        let result = write_file(&repo_path.join(file_path), content)
            .await
            .map(|_| Payload::FileWritten {
                path: file_path.to_string(),
            });
        OperationResult::from_result(result, |_| None)
    }
}

async fn write_file(full_path: &Path, content: &str) -> Result<()> {
    tracing::debug!(path = ?full_path, bytes = content.len(), "writing file");

    if let Some(parent) = full_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(full_path, content).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use crate::config::GatewaySettings;

    use super::*;

    #[tokio::test]
    async fn write_creates_missing_directories() {
        let repo = TempDir::new().unwrap();
        let gateway = Gateway::new(GatewaySettings::default());

        let result = gateway
            .write_file(repo.path(), "config/ci/build.yml", "steps: []\n")
            .await;

        assert_eq!(
            result,
            OperationResult::success(Payload::FileWritten {
                path: "config/ci/build.yml".to_string(),
            })
        );
        let written = std::fs::read_to_string(repo.path().join("config/ci/build.yml")).unwrap();
        assert_eq!(written, "steps: []\n");
    }

    #[tokio::test]
    async fn read_returns_file_content() {
        let repo = TempDir::new().unwrap();
        std::fs::write(repo.path().join("package.json"), "{\"name\":\"x\"}").unwrap();
        let gateway = Gateway::new(GatewaySettings::default());

        let result = gateway.read_file(repo.path(), "package.json").await;

        assert_eq!(
            result.payload(),
            Some(&Payload::FileContent {
                content: "{\"name\":\"x\"}".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn read_missing_file_is_an_error() {
        let repo = TempDir::new().unwrap();
        let gateway = Gateway::new(GatewaySettings::default());

        let result = gateway.read_file(repo.path(), "nope.txt").await;

        assert!(!result.is_success());
        assert!(result.error_message().is_some_and(|e| !e.is_empty()));
    }

    #[tokio::test]
    async fn write_overwrites_existing_file() {
        let repo = TempDir::new().unwrap();
        let gateway = Gateway::new(GatewaySettings::default());

        gateway.write_file(repo.path(), "README.md", "old").await;
        let result = gateway.write_file(repo.path(), "README.md", "new").await;

        assert!(result.is_success());
        assert_eq!(
            std::fs::read_to_string(repo.path().join("README.md")).unwrap(),
            "new"
        );
    }
}
