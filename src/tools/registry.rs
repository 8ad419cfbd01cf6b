//! Tool registry and handler trait.
//!
//! The registry is the agent's entire action set: a mapping from tool name to
//! a handler plus the JSON schema the model sees.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::Instrument;

use crate::outcome::OperationResult;

/// Name, usage text and argument schema of a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Name the model calls the tool by.
    pub name: String,
    /// Usage contract shown to the model.
    pub description: String,
    /// JSON schema of the arguments object.
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Creates a definition with an empty argument schema.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: serde_json::json!({ "type": "object", "properties": {} }),
        }
    }

    /// Sets the argument schema.
    pub fn with_parameters(mut self, parameters: serde_json::Value) -> Self {
        self.parameters = parameters;
        self
    }
}

/// A callable tool.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Returns the tool definition.
    fn definition(&self) -> ToolDefinition;

    /// Returns true if the tool changes remote or local state.
    fn is_mutating(&self) -> bool {
        false
    }

    /// Runs the tool. Failures are reported inside the envelope.
    async fn execute(&self, input: serde_json::Value) -> OperationResult;
}

/// Registry of available tools, in registration order.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
    order: Vec<String>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler. A later registration under the same name
    /// replaces the earlier one but keeps its position.
    pub fn register(&mut self, handler: impl ToolHandler + 'static) -> &mut Self {
        self.register_arc(Arc::new(handler))
    }

    /// Registers a shared handler.
    pub fn register_arc(&mut self, handler: Arc<dyn ToolHandler>) -> &mut Self {
        let name = handler.definition().name;
        if self.handlers.insert(name.clone(), handler).is_none() {
            self.order.push(name);
        }
        self
    }

    /// Merges another registry into this one.
    pub fn extend(&mut self, other: ToolRegistry) -> &mut Self {
        let ToolRegistry { mut handlers, order } = other;
        for name in order {
            if let Some(handler) = handlers.remove(&name) {
                self.register_arc(handler);
            }
        }
        self
    }

    /// Gets a handler by tool name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.handlers.get(name).cloned()
    }

    /// Checks if a tool exists.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Tool names in registration order.
    pub fn tool_names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// Tool definitions in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.handlers.get(name))
            .map(|handler| handler.definition())
            .collect()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Dispatches one tool call.
    ///
    /// An unknown tool name becomes an error envelope like any other failure.
    pub async fn dispatch(&self, tool_name: &str, input: serde_json::Value) -> OperationResult {
        let Some(handler) = self.get(tool_name) else {
            tracing::warn!(tool = %tool_name, "unknown tool requested");
            return OperationResult::error(format!("unknown tool: {}", tool_name));
        };

        let call_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("tool_call", tool = %tool_name, call_id = %call_id);
        let start = Instant::now();

        let result = handler.execute(input).instrument(span.clone()).await;

        span.in_scope(|| {
            tracing::info!(
                success = result.is_success(),
                duration_ms = start.elapsed().as_millis() as u64,
                "tool call finished"
            );
        });

        result
    }
}
