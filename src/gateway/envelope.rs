//! Uniform response envelope.
//!
//! The envelope is the only representation that ever crosses the boundary
//! back to the caller — raw errors or unstructured text never do.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Uniform success/error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
}

impl ResponseEnvelope {
    /// Success envelope wrapping a (masked) result.
    pub fn success(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            tool_name: None,
            arguments: None,
        }
    }

    /// Error envelope with a human-readable reason.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            tool_name: None,
            arguments: None,
        }
    }

    pub fn with_tool_name(mut self, name: impl Into<String>) -> Self {
        self.tool_name = Some(name.into());
        self
    }

    /// Attach the request arguments. Callers must mask them first.
    pub fn with_arguments(mut self, arguments: Value) -> Self {
        self.arguments = Some(arguments);
        self
    }

    /// Render as pretty JSON for transport. Serialization of this type
    /// cannot fail; the fallback is never expected to be taken.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self)
            .unwrap_or_else(|_| r#"{"success":false,"error":"serialization failure"}"#.into())
    }
}
