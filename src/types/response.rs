//! Normalized view of a chat completion response

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::drivers::Diagnostic;

/// Token usage; absent fields default to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

/// Provider-specific provenance data. Empty for providers without search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Auxiliary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_results: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_questions: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<Value>>,
}

impl Auxiliary {
    pub fn is_empty(&self) -> bool {
        self.search_results.is_none() && self.related_questions.is_none() && self.images.is_none()
    }
}

/// Result of interpreting a decoded response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResult {
    pub assistant_content: String,
    /// Refusal text when the model declined to answer.
    pub refusal: Option<String>,
    pub finish_reason: Option<String>,
    pub usage: Usage,
    pub tool_calls: Vec<Value>,
    pub auxiliary: Auxiliary,
    pub diagnostics: Vec<Diagnostic>,
    /// The unmodified decoded body.
    pub raw: Value,
}

impl ApiResult {
    pub fn is_refused(&self) -> bool {
        self.refusal.is_some()
    }

    /// Content parsed as JSON for structured-output requests.
    ///
    /// Non-JSON content is wrapped as `{"content": ...}`; refusals yield `None`.
    pub fn structured(&self) -> Option<Value> {
        if self.is_refused() {
            return None;
        }
        match serde_json::from_str::<Value>(&self.assistant_content) {
            Ok(v) => Some(v),
            Err(_) => Some(json!({ "content": self.assistant_content })),
        }
    }

    /// Number of search results attached to the response, if the provider sent any list.
    pub fn source_count(&self) -> Option<usize> {
        self.auxiliary.search_results.as_ref().map(Vec::len)
    }
}
