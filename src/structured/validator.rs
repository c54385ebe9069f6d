//! Response validator for JSON-mode tests.
//!
//! Checks that assistant content is JSON and, when an expected shape is given,
//! that every top-level key of the shape is present in the content. This is a
//! shallow key-presence check: types, formats and nested `required` lists
//! inside a schema-shaped expectation are not enforced.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

use crate::structured::response_format::DEFAULT_RESPONSE_FORMAT;

/// At most this many missing keys are reported.
pub const MAX_REPORTED_MISSING_KEYS: usize = 3;

/// Outcome of validating assistant content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "missing_keys", rename_all = "snake_case")]
pub enum ValidationOutcome {
    NotJson,
    ValidJsonNoSchema,
    ValidJsonSchemaMatch,
    /// Sorted, capped at [`MAX_REPORTED_MISSING_KEYS`].
    ValidJsonMissingKeys(Vec<String>),
    /// Content is valid JSON; the expected shape itself did not parse.
    ValidJsonInvalidSchema,
}

impl ValidationOutcome {
    /// Whether the content itself parsed as JSON.
    pub fn is_json(&self) -> bool {
        !matches!(self, Self::NotJson)
    }

    /// Short status label, as shown next to a response.
    pub fn label(&self) -> String {
        match self {
            Self::NotJson => "JSON Valid: ✗ - Response is not JSON".to_string(),
            Self::ValidJsonNoSchema => "JSON Valid: ✓".to_string(),
            Self::ValidJsonSchemaMatch => "JSON Valid: ✓ Structure matches".to_string(),
            Self::ValidJsonMissingKeys(keys) => {
                format!("JSON Valid: ⚠ Missing keys: {}", keys.join(", "))
            }
            Self::ValidJsonInvalidSchema => "JSON Valid: ✓ (Invalid expected format)".to_string(),
        }
    }
}

impl std::fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

/// Validate `content` against an optional expected shape.
pub fn validate(content: &str, expected_shape: Option<&str>) -> ValidationOutcome {
    let actual: Value = match serde_json::from_str(content.trim()) {
        Ok(v) => v,
        Err(_) => return ValidationOutcome::NotJson,
    };

    let shape = match expected_shape.map(str::trim) {
        Some(s) if !is_placeholder(s) => s,
        _ => return ValidationOutcome::ValidJsonNoSchema,
    };

    let expected: Value = match serde_json::from_str(shape) {
        Ok(v) => v,
        Err(_) => return ValidationOutcome::ValidJsonInvalidSchema,
    };

    match (expected.as_object(), actual.as_object()) {
        (Some(expected), Some(actual)) => {
            let missing: BTreeSet<&String> = expected
                .keys()
                .filter(|k| !actual.contains_key(k.as_str()))
                .collect();
            if missing.is_empty() {
                ValidationOutcome::ValidJsonSchemaMatch
            } else {
                ValidationOutcome::ValidJsonMissingKeys(
                    missing
                        .into_iter()
                        .take(MAX_REPORTED_MISSING_KEYS)
                        .cloned()
                        .collect(),
                )
            }
        }
        // Non-object on either side: nothing to compare.
        _ => ValidationOutcome::ValidJsonNoSchema,
    }
}

fn is_placeholder(shape: &str) -> bool {
    shape.is_empty() || shape == "{}" || shape == DEFAULT_RESPONSE_FORMAT.trim()
}
