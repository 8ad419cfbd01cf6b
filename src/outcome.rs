//! The uniform result envelope returned by every gateway operation.
//!
//! Agents only ever see this value: either a success carrying an
//! operation-specific payload, or an error carrying a diagnostic string.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A codespace as reported by `gh codespace list --json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodespaceRecord {
    /// Codespace handle.
    pub name: String,
    /// Repository the codespace was created for (`owner/repo`).
    pub repository: String,
    /// Provider-reported state, e.g. `Available` or `Shutdown`.
    pub state: String,
    /// Creation timestamp as reported by the provider.
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

/// Operation-specific success fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    /// A new codespace handle.
    CodespaceCreated { codespace_name: String },
    /// Output of a command run inside a codespace.
    CommandOutput {
        output: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        stderr: Option<String>,
    },
    /// A codespace that was deleted.
    CodespaceDeleted { codespace_name: String },
    /// All codespaces visible to the authenticated user.
    Codespaces {
        codespaces: Vec<CodespaceRecord>,
        count: usize,
    },
    /// Local path of a fresh clone.
    Cloned { path: String },
    /// A branch that was created or pushed.
    Branch {
        branch: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        output: Option<String>,
    },
    /// A commit that was recorded.
    Committed { message: String },
    /// Content read from the working copy.
    FileContent { content: String },
    /// Relative path that was written.
    FileWritten { path: String },
    /// Raw output of a gh API action (issue URL, comment URL).
    CommandText { output: String },
    /// Free-form text produced by a research helper.
    Report { text: String },
}

/// The envelope handed back to the calling policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum OperationResult {
    Success {
        #[serde(flatten)]
        payload: Payload,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Error {
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        output: Option<String>,
    },
}

impl OperationResult {
    /// Creates a success envelope without a message.
    pub fn success(payload: Payload) -> Self {
        Self::Success {
            payload,
            message: None,
        }
    }

    /// Creates a success envelope with a human-readable annotation.
    pub fn success_with_message(payload: Payload, message: impl Into<String>) -> Self {
        Self::Success {
            payload,
            message: Some(message.into()),
        }
    }

    /// Creates an error envelope.
    pub fn error(error: impl Into<String>) -> Self {
        Self::Error {
            error: error.into(),
            output: None,
        }
    }

    /// Folds an internal result into an envelope.
    ///
    /// `message` is only consulted on success.
    pub fn from_result<F>(result: Result<Payload>, message: F) -> Self
    where
        F: FnOnce(&Payload) -> Option<String>,
    {
        match result {
            Ok(payload) => {
                let message = message(&payload);
                Self::Success { payload, message }
            }
            Err(e) => e.into(),
        }
    }

    /// Returns true for a success envelope.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the diagnostic of an error envelope.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error { error, .. } => Some(error),
            Self::Success { .. } => None,
        }
    }

    /// Returns the payload of a success envelope.
    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Self::Success { payload, .. } => Some(payload),
            Self::Error { .. } => None,
        }
    }

    /// Returns the success annotation, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success { message, .. } => message.as_deref(),
            Self::Error { .. } => None,
        }
    }

    /// Serializes the envelope as the JSON object the agent consumes.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            serde_json::json!({ "status": "error", "error": e.to_string() })
        })
    }
}

impl From<Error> for OperationResult {
    fn from(err: Error) -> Self {
        let output = match &err {
            Error::CommandFailed { output, .. } => output.clone(),
            _ => None,
        };
        Self::Error {
            error: err.to_string(),
            output,
        }
    }
}
