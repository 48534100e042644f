//! MCP tool implementations
//!
//! A single tool is exposed:
//! - `ring`: pop up a notification and return the user's answer

use crate::correlator::RequestCorrelator;
use crate::error::{Result, RingError};
use crate::types::NotificationRequest;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Name of the notification tool
pub const RING_TOOL: &str = "ring";

/// Tool schema definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,

    pub description: String,

    /// JSON Schema for input parameters
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Dispatches tool calls to the correlator
#[derive(Debug, Clone)]
pub struct ToolHandler {
    correlator: RequestCorrelator,
}

impl ToolHandler {
    pub fn new(correlator: RequestCorrelator) -> Self {
        Self { correlator }
    }

    pub fn correlator(&self) -> &RequestCorrelator {
        &self.correlator
    }

    /// Get list of all available tools
    pub fn list_tools(&self) -> Vec<Tool> {
        vec![Tool {
            name: RING_TOOL.to_string(),
            description: "Ring a notification bell with an always-on-top popup. The user can type a response and click 'Answer', or click 'Dismiss' to close without responding. Returns the user's response if they answered.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "title": {
                        "type": "string",
                        "description": "The title of the notification (e.g., 'Task Complete')"
                    },
                    "message": {
                        "type": "string",
                        "description": "The message to display (e.g., 'Your build has finished successfully!')"
                    }
                },
                "required": ["title", "message"]
            }),
        }]
    }

    /// Execute a tool call, returning the text result
    pub async fn execute(&self, tool_name: &str, params: Value) -> Result<String> {
        debug!("Executing tool: {}", tool_name);

        match tool_name {
            RING_TOOL => self.ring(params).await,
            _ => {
                warn!("Unknown tool: {}", tool_name);
                Err(RingError::UnsupportedOperation(tool_name.to_string()))
            }
        }
    }

    async fn ring(&self, params: Value) -> Result<String> {
        let request: NotificationRequest = serde_json::from_value(params)
            .map_err(|e| RingError::InvalidArguments(e.to_string()))?;

        let outcome = self.correlator.ring(&request).await?;
        Ok(outcome.to_string())
    }
}
