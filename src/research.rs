//! Helpers for the research side of a revival: migration lookups,
//! deployment snippets and a quick repository survey.

use std::path::Path;

use walkdir::WalkDir;

use crate::error::Result;
use crate::outcome::{OperationResult, Payload};

/// Build and packaging files worth calling out in a survey.
pub const KEY_FILES: &[&str] = &[
    "Dockerfile",
    "package.json",
    "requirements.txt",
    "go.mod",
    "pom.xml",
    "build.gradle",
    "Makefile",
    "README.md",
];

/// How many files a survey lists before truncating.
const SURVEY_FILE_LIMIT: usize = 20;

/// Deployment targets with a canned configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    CloudRun,
    GitHubPages,
    Defang,
}

impl Platform {
    /// Parses a platform name case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "cloud run" => Some(Self::CloudRun),
            "github pages" => Some(Self::GitHubPages),
            "defang" => Some(Self::Defang),
            _ => None,
        }
    }

    /// Renders deployment instructions for `app_name`.
    pub fn render(self, app_name: &str) -> String {
        match self {
            Self::CloudRun => format!(
                "# Cloud Run Deployment\ngcloud run deploy {} --source . --region us-central1 --allow-unauthenticated\n",
                app_name
            ),
            Self::GitHubPages => "# GitHub Pages\n\
                 1. Go to Settings > Pages\n\
                 2. Select Source: GitHub Actions or Deploy from branch\n"
                .to_string(),
            Self::Defang => "# Defang\ndefang compose up\n".to_string(),
        }
    }
}

/// Returns placeholder search results for `query`.
///
/// There is no search backend; the agent gets a fixed pointer list.
pub fn search_web(query: &str) -> OperationResult {
    tracing::debug!(query = %query, "simulated web search");
    OperationResult::success(Payload::Report {
        text: format!(
            "Simulated search results for: {query}\n\
             1. Official Documentation: https://example.com/docs\n\
             2. StackOverflow: How to fix {query}..."
        ),
    })
}

/// Generates deployment instructions for `platform`.
pub fn generate_deployment_config(platform: &str, app_name: &str) -> OperationResult {
    match Platform::parse(platform) {
        Some(platform) => OperationResult::success(Payload::Report {
            text: platform.render(app_name),
        }),
        None => OperationResult::error(
            "Unknown platform. Supported: Cloud Run, GitHub Pages, Defang.",
        ),
    }
}

/// Surveys a local checkout: a truncated file list plus detected key files.
pub fn analyze_repo_structure(repo_path: &Path) -> OperationResult {
    let result = survey(repo_path).map(|text| Payload::Report { text });
    OperationResult::from_result(result, |_| None)
}

fn survey(repo_path: &Path) -> Result<String> {
    let mut files = Vec::new();
    let walker = WalkDir::new(repo_path)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.file_name() != ".git");

    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        files.push(entry.path().display().to_string());
        if files.len() == SURVEY_FILE_LIMIT {
            break;
        }
    }

    let found: Vec<&str> = KEY_FILES
        .iter()
        .copied()
        .filter(|name| repo_path.join(name).exists())
        .collect();

    Ok(format!(
        "Files found (truncated): {:?}\n\nKey configuration files detected: {}",
        files,
        found.join(", ")
    ))
}
