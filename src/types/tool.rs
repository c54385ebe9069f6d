//! Function-tool definitions in the chat completions wire shape

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Tool definition (for function calling)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub tool_type: String, // "function"
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>, // JSON Schema
}

impl ToolDefinition {
    pub fn function(
        name: impl Into<String>,
        description: Option<String>,
        parameters: Option<Value>,
    ) -> Self {
        Self {
            tool_type: "function".into(),
            function: FunctionDefinition {
                name: name.into(),
                description,
                parameters,
            },
        }
    }

    /// Wrap a bare legacy `functions` entry into the tools shape.
    pub fn from_legacy_function(function: Value) -> Value {
        json!({ "type": "function", "function": function })
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Which tool, if any, the model must call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolChoice {
    Auto,
    None,
    Required,
    Function(String),
}

impl ToolChoice {
    pub fn to_value(&self) -> Value {
        match self {
            Self::Auto => Value::String("auto".into()),
            Self::None => Value::String("none".into()),
            Self::Required => Value::String("required".into()),
            Self::Function(name) => json!({
                "type": "function",
                "function": { "name": name }
            }),
        }
    }

    /// Convert a legacy `function_call` value (`"auto"`, `"none"` or `{"name": ...}`).
    pub fn from_legacy_function_call(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if s == "auto" => Some(Self::Auto),
            Value::String(s) if s == "none" => Some(Self::None),
            Value::Object(map) => map
                .get("name")
                .and_then(Value::as_str)
                .map(|name| Self::Function(name.to_string())),
            _ => None,
        }
    }
}
