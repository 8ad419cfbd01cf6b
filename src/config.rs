//! Startup configuration.
//!
//! Built once in `main` from defaults, an optional TOML file and the
//! environment, then passed by reference to whatever needs it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default model for the reviver agent.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default Vertex AI location.
pub const DEFAULT_LOCATION: &str = "global";

/// Smallest (and cheapest) codespace machine type.
pub const DEFAULT_MACHINE_TYPE: &str = "basicLinux32gb";

/// Codespaces auto-delete after this long.
pub const DEFAULT_RETENTION_PERIOD: &str = "1h";

/// Budget for a single in-codespace command run.
pub const DEFAULT_RUN_TIMEOUT_SECS: u64 = 300;

/// Settings consumed by the command gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewaySettings {
    /// GitHub CLI binary.
    pub gh_program: String,
    /// Git binary.
    pub git_program: String,
    /// Machine type passed to `gh codespace create -m`.
    pub machine_type: String,
    /// Retention period passed to `gh codespace create --retention-period`.
    pub retention_period: String,
    /// Wall-clock budget for `gh codespace ssh`, in seconds.
    pub run_timeout_secs: u64,
    /// Parent directory for clones without an explicit target.
    pub clone_root: PathBuf,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            gh_program: "gh".to_string(),
            git_program: "git".to_string(),
            machine_type: DEFAULT_MACHINE_TYPE.to_string(),
            retention_period: DEFAULT_RETENTION_PERIOD.to_string(),
            run_timeout_secs: DEFAULT_RUN_TIMEOUT_SECS,
            clone_root: std::env::temp_dir().join("repo-reviver"),
        }
    }
}

impl GatewaySettings {
    /// Returns the in-codespace run budget.
    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }
}

/// Process-wide configuration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviverConfig {
    /// Use Vertex AI rather than AI Studio.
    pub use_vertexai: bool,
    /// Model driving the agent.
    pub model: String,
    /// Google Cloud project (Vertex AI only).
    pub cloud_project: Option<String>,
    /// Google Cloud location (Vertex AI only).
    pub cloud_location: String,
    /// AI Studio API key. Never serialized.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Command gateway settings.
    pub gateway: GatewaySettings,
}

impl Default for ReviverConfig {
    fn default() -> Self {
        Self {
            use_vertexai: true,
            model: DEFAULT_MODEL.to_string(),
            cloud_project: None,
            cloud_location: DEFAULT_LOCATION.to_string(),
            api_key: None,
            gateway: GatewaySettings::default(),
        }
    }
}

impl std::fmt::Debug for ReviverConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviverConfig")
            .field("use_vertexai", &self.use_vertexai)
            .field("model", &self.model)
            .field("cloud_project", &self.cloud_project)
            .field("cloud_location", &self.cloud_location)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("gateway", &self.gateway)
            .finish()
    }
}

impl ReviverConfig {
    /// Loads configuration from defaults, an optional TOML file and the
    /// process environment (highest precedence).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(base.with_env(|key| std::env::var(key).ok()))
    }

    /// Parses a TOML configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Applies environment overrides through `lookup`.
    ///
    /// Tests pass a closure over a map instead of touching process state.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("GOOGLE_GENAI_USE_VERTEXAI") {
            self.use_vertexai = parse_flag(&value);
        }
        if let Some(model) = lookup("REPO_REVIVER_MODEL") {
            self.model = model;
        }
        if let Some(project) = lookup("GOOGLE_CLOUD_PROJECT") {
            self.cloud_project = Some(project);
        }
        if let Some(location) = lookup("GOOGLE_CLOUD_LOCATION") {
            self.cloud_location = location;
        }
        if let Some(key) = lookup("GOOGLE_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(gh) = lookup("REPO_REVIVER_GH") {
            self.gateway.gh_program = gh;
        }
        if let Some(git) = lookup("REPO_REVIVER_GIT") {
            self.gateway.git_program = git;
        }
        if let Some(root) = lookup("REPO_REVIVER_CLONE_ROOT") {
            self.gateway.clone_root = PathBuf::from(root);
        }
        self
    }
}

/// Accepts `true`, `1` and `yes` (any case) as enabled.
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}

/// Parses a retention period like `30m`, `1h` or `2d`.
pub fn parse_retention_period(value: &str) -> Option<Duration> {
    let value = value.trim();
    let unit = value.chars().last()?;
    let amount: u64 = value[..value.len() - unit.len_utf8()].parse().ok()?;
    let secs = match unit {
        'm' => amount.checked_mul(60)?,
        'h' => amount.checked_mul(3600)?,
        'd' => amount.checked_mul(86_400)?,
        _ => return None,
    };
    Some(Duration::from_secs(secs))
}

/// Problems found in a reviver config before the gateway starts.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// Settings the binary refuses to start with.
    pub errors: Vec<String>,
    /// Settings that work but are likely wrong, logged at startup.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// True when the gateway can start.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Records a setting that blocks startup.
    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    /// Records a setting worth logging.
    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Folds the gateway section's findings into the top-level result.
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Returns the warnings, or every error joined into one `Error::Config`.
    pub fn into_result(self) -> Result<Vec<String>> {
        if self.is_valid() {
            Ok(self.warnings)
        } else {
            Err(Error::Config(self.errors.join("; ")))
        }
    }
}

/// Config sections that can be checked before use.
pub trait Validate {
    /// Checks this section without touching `gh`, `git` or the network.
    fn validate(&self) -> ValidationResult;
}

impl Validate for GatewaySettings {
    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.run_timeout_secs == 0 {
            result.add_error("run_timeout_secs must be greater than zero");
        }

        match parse_retention_period(&self.retention_period) {
            None => result.add_error(format!(
                "retention_period '{}' must look like 30m, 1h or 2d",
                self.retention_period
            )),
            // The two limits are set independently; a long run near the end
            // of the window can outlive the codespace.
            Some(retention) if self.run_timeout() >= retention => result.add_warning(format!(
                "run timeout ({}s) is not shorter than the codespace retention period ({})",
                self.run_timeout_secs, self.retention_period
            )),
            Some(_) => {}
        }

        if self.machine_type.trim().is_empty() {
            result.add_error("machine_type cannot be empty");
        }

        result
    }
}

impl Validate for ReviverConfig {
    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.model.trim().is_empty() {
            result.add_error("model cannot be empty");
        }

        if self.use_vertexai {
            if self.cloud_project.is_none() {
                result.add_warning(
                    "Vertex AI is enabled but GOOGLE_CLOUD_PROJECT is not set",
                );
            }
        } else if self.api_key.is_none() {
            result.add_warning("AI Studio mode requires GOOGLE_API_KEY");
        }

        result.merge(self.gateway.validate());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_production_values() {
        let config = ReviverConfig::default();
        assert!(config.use_vertexai);
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.cloud_location, "global");
        assert_eq!(config.gateway.machine_type, "basicLinux32gb");
        assert_eq!(config.gateway.retention_period, "1h");
        assert_eq!(config.gateway.run_timeout(), Duration::from_secs(300));
        assert!(config.gateway.clone_root.ends_with("repo-reviver"));
    }

    #[test]
    fn env_overrides_apply() {
        let config = ReviverConfig::default().with_env(env(&[
            ("GOOGLE_GENAI_USE_VERTEXAI", "False"),
            ("REPO_REVIVER_MODEL", "gemini-2.5-pro"),
            ("GOOGLE_API_KEY", "secret"),
            ("REPO_REVIVER_CLONE_ROOT", "/work/clones"),
        ]));

        assert!(!config.use_vertexai);
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.gateway.clone_root, PathBuf::from("/work/clones"));
    }

    #[test]
    fn vertex_flag_accepts_common_truthy_values() {
        for value in ["true", "TRUE", "1", "yes", " Yes "] {
            assert!(parse_flag(value), "{value} should enable");
        }
        for value in ["false", "0", "no", ""] {
            assert!(!parse_flag(value), "{value} should disable");
        }
    }

    #[test]
    fn toml_file_fills_missing_fields_with_defaults() {
        let config = ReviverConfig::from_toml(
            r#"
            model = "gemini-2.0-flash"

            [gateway]
            retention_period = "30m"
            "#,
        )
        .unwrap();

        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.gateway.retention_period, "30m");
        assert_eq!(config.gateway.gh_program, "gh");
        assert!(config.use_vertexai);
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let err = ReviverConfig::from_toml("model = [").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = ReviverConfig {
            api_key: Some("super-secret".to_string()),
            ..Default::default()
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn api_key_is_not_serialized() {
        let config = ReviverConfig {
            api_key: Some("super-secret".to_string()),
            ..Default::default()
        };
        let rendered = toml::to_string(&config).unwrap();
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn retention_period_parses_units() {
        assert_eq!(parse_retention_period("30m"), Some(Duration::from_secs(1800)));
        assert_eq!(parse_retention_period("1h"), Some(Duration::from_secs(3600)));
        assert_eq!(parse_retention_period("2d"), Some(Duration::from_secs(172_800)));
        assert_eq!(parse_retention_period("1w"), None);
        assert_eq!(parse_retention_period("h"), None);
        assert_eq!(parse_retention_period(""), None);
    }

    #[test]
    fn overflowing_retention_is_a_validation_error() {
        assert_eq!(parse_retention_period("999999999999999999d"), None);

        let settings = GatewaySettings {
            retention_period: "999999999999999999d".to_string(),
            ..Default::default()
        };
        let result = settings.validate();
        assert!(!result.is_valid());
        assert!(result.errors[0].contains("retention_period"));
    }

    #[test]
    fn default_gateway_settings_are_valid() {
        let result = GatewaySettings::default().validate();
        assert!(result.is_valid());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn run_timeout_past_retention_warns() {
        let settings = GatewaySettings {
            retention_period: "5m".to_string(),
            run_timeout_secs: 300,
            ..Default::default()
        };
        let result = settings.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.contains("retention")));
    }

    #[test]
    fn zero_timeout_and_bad_retention_fail() {
        let settings = GatewaySettings {
            retention_period: "forever".to_string(),
            run_timeout_secs: 0,
            ..Default::default()
        };
        let result = settings.validate();
        assert_eq!(result.errors.len(), 2);
        assert!(result.into_result().is_err());
    }

    #[test]
    fn ai_studio_without_key_warns() {
        let config = ReviverConfig {
            use_vertexai: false,
            ..Default::default()
        };
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.contains("GOOGLE_API_KEY")));
    }

    #[test]
    fn empty_model_fails() {
        let config = ReviverConfig {
            model: "  ".to_string(),
            cloud_project: Some("proj".to_string()),
            ..Default::default()
        };
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.contains("model")));
    }
}
