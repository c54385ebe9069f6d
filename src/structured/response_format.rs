//! `response_format` handling for structured output.
//!
//! The format object is opaque: it is forwarded verbatim and never checked
//! against JSON Schema. This module only classifies it (to know whether the
//! request asks for structured output) and parses the user's JSON text.

use serde_json::{json, Map, Value};

use crate::drivers::Diagnostic;

/// Example shown to users as the starting point for a format object.
pub const DEFAULT_RESPONSE_FORMAT: &str = r#"{
  "type": "json_schema",
  "json_schema": {
    "schema": {
      "type": "object",
      "properties": {
        "answer": {
          "type": "number"
        }
      },
      "required": ["answer"]
    }
  }
}"#;

/// Classification of a `response_format` object by its `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseFormatKind {
    /// `{"type": "json_schema", ...}` - output constrained to a schema
    JsonSchema,
    /// `{"type": "json_object"}` - any valid JSON
    JsonObject,
    /// `{"type": "text"}`
    Text,
    /// Missing or unrecognized `type`; assumed to be a complete format object already.
    Opaque,
}

impl ResponseFormatKind {
    pub fn of(format: &Value) -> Self {
        match format.get("type").and_then(Value::as_str) {
            Some("json_schema") => Self::JsonSchema,
            Some("json_object") => Self::JsonObject,
            Some("text") => Self::Text,
            _ => Self::Opaque,
        }
    }

    /// Whether the format constrains output to a caller-supplied schema.
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::JsonSchema)
    }
}

/// Wrap a bare JSON Schema into a `json_schema` format object.
///
/// The schema's own keys are spread into the `json_schema` member next to
/// `name` and `strict`.
pub fn json_schema_format(
    schema: &Value,
    name: &str,
    description: Option<&str>,
    strict: bool,
) -> Value {
    let mut inner = Map::new();
    inner.insert("name".into(), Value::String(name.to_string()));
    inner.insert("strict".into(), Value::Bool(strict));
    if let Some(obj) = schema.as_object() {
        for (k, v) in obj {
            inner.insert(k.clone(), v.clone());
        }
    }
    if let Some(desc) = description {
        inner.insert("description".into(), Value::String(desc.to_string()));
    }
    json!({ "type": "json_schema", "json_schema": inner })
}

/// Parse user-entered format text.
///
/// Blank text and `{}` mean "no response_format". Unparseable text is not an
/// error: the request proceeds without a format and a diagnostic says why.
pub fn parse_response_format(text: &str) -> (Option<Value>, Option<Diagnostic>) {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "{}" {
        return (None, None);
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(v) => (Some(v), None),
        Err(e) => (
            None,
            Some(Diagnostic::InvalidResponseFormatJson {
                message: e.to_string(),
            }),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_type() {
        assert_eq!(
            ResponseFormatKind::of(&json!({"type": "json_schema", "json_schema": {}})),
            ResponseFormatKind::JsonSchema
        );
        assert_eq!(
            ResponseFormatKind::of(&json!({"type": "json_object"})),
            ResponseFormatKind::JsonObject
        );
        assert_eq!(
            ResponseFormatKind::of(&json!({"schema": {"type": "object"}})),
            ResponseFormatKind::Opaque
        );
        assert!(!ResponseFormatKind::JsonObject.is_structured());
    }

    #[test]
    fn default_template_parses_as_json_schema() {
        let (format, diag) = parse_response_format(DEFAULT_RESPONSE_FORMAT);
        assert!(diag.is_none());
        assert_eq!(
            ResponseFormatKind::of(&format.unwrap()),
            ResponseFormatKind::JsonSchema
        );
    }

    #[test]
    fn schema_keys_spread_into_json_schema() {
        let format = json_schema_format(
            &json!({"schema": {"type": "object"}}),
            "response",
            Some("answer only"),
            true,
        );
        assert_eq!(format["type"], "json_schema");
        assert_eq!(format["json_schema"]["name"], "response");
        assert_eq!(format["json_schema"]["strict"], true);
        assert_eq!(format["json_schema"]["schema"]["type"], "object");
        assert_eq!(format["json_schema"]["description"], "answer only");
    }

    #[test]
    fn blank_and_empty_object_mean_no_format() {
        assert_eq!(parse_response_format("  "), (None, None));
        assert_eq!(parse_response_format("{}"), (None, None));
    }

    #[test]
    fn malformed_text_yields_diagnostic_not_error() {
        let (format, diag) = parse_response_format("{\"type\": ");
        assert!(format.is_none());
        assert!(matches!(
            diag,
            Some(Diagnostic::InvalidResponseFormatJson { .. })
        ));
    }
}
