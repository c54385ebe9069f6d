//! Plain-text rendering of a run for display.

use serde_json::Value;

use crate::structured::ValidationOutcome;
use crate::types::ApiResult;

fn text_of(v: Option<&Value>) -> Option<String> {
    v.map(|v| match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

/// Assistant content followed by search results and related questions.
pub fn response_text(result: &ApiResult) -> String {
    let mut out = match &result.refusal {
        Some(reason) => format!("[Refused] {reason}"),
        None => result.assistant_content.clone(),
    };

    if let Some(results) = result
        .auxiliary
        .search_results
        .as_ref()
        .filter(|r| !r.is_empty())
    {
        out.push_str("\n\n--- Search Results Used ---\n");
        for (i, item) in results.iter().enumerate() {
            let title = text_of(item.get("title")).unwrap_or_else(|| "Untitled".into());
            let url = text_of(item.get("url")).unwrap_or_else(|| "N/A".into());
            out.push_str(&format!("\n{}. {}\n", i + 1, title));
            out.push_str(&format!("   URL: {}\n", url));
            if let Some(date) = text_of(item.get("published_date").or_else(|| item.get("date"))) {
                out.push_str(&format!("   Published: {}\n", date));
            }
        }
    }

    if let Some(questions) = result
        .auxiliary
        .related_questions
        .as_ref()
        .filter(|q| !q.is_empty())
    {
        out.push_str("\n\n--- Related Questions ---\n");
        for (i, q) in questions.iter().enumerate() {
            let q = text_of(Some(q)).unwrap_or_default();
            out.push_str(&format!("{}. {}\n", i + 1, q));
        }
    }

    out
}

/// `Tokens - Input: N, Output: N, Total: N[, Sources: N]`, or `Tokens: N/A`
/// when the body had no usage block.
pub fn usage_line(result: &ApiResult) -> String {
    if result.raw.get("usage").is_none() {
        return "Tokens: N/A".to_string();
    }
    let u = &result.usage;
    let mut line = format!(
        "Tokens - Input: {}, Output: {}, Total: {}",
        u.input_tokens, u.output_tokens, u.total_tokens
    );
    if let Some(sources) = result.source_count() {
        line.push_str(&format!(", Sources: {}", sources));
    }
    line
}

pub fn response_time_line(seconds: f64) -> String {
    format!("Response Time: {:.2}s", seconds)
}

pub fn validation_line(outcome: Option<&ValidationOutcome>) -> String {
    match outcome {
        Some(o) => o.label(),
        None => "JSON Valid: N/A".to_string(),
    }
}

/// The raw body, pretty-printed.
pub fn raw_json(result: &ApiResult) -> String {
    serde_json::to_string_pretty(&result.raw).unwrap_or_else(|_| result.raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::{ProviderDriver, SonarDriver};
    use serde_json::json;

    fn sonar_result() -> ApiResult {
        SonarDriver.interpret(json!({
            "choices": [{"message": {"content": "Rust 1.80 shipped LazyCell."}}],
            "search_results": [
                {
                    "title": "Announcing Rust 1.80",
                    "url": "https://blog.rust-lang.org/",
                    "date": "2024-07-25"
                },
                {"url": "https://example.com"}
            ],
            "related_questions": ["What is LazyLock?"],
            "usage": {"prompt_tokens": 9, "completion_tokens": 8, "total_tokens": 17}
        }))
    }

    #[test]
    fn content_with_sources_and_questions() {
        let text = response_text(&sonar_result());
        assert!(text.starts_with("Rust 1.80 shipped LazyCell.\n\n--- Search Results Used ---\n"));
        assert!(text.contains(
            "\n1. Announcing Rust 1.80\n   URL: https://blog.rust-lang.org/\n   Published: 2024-07-25\n"
        ));
        assert!(text.contains("\n2. Untitled\n   URL: https://example.com\n"));
        assert!(text.ends_with("--- Related Questions ---\n1. What is LazyLock?\n"));
    }

    #[test]
    fn usage_line_counts_sources() {
        assert_eq!(
            usage_line(&sonar_result()),
            "Tokens - Input: 9, Output: 8, Total: 17, Sources: 2"
        );
        let bare = SonarDriver.interpret(json!({"choices": []}));
        assert_eq!(usage_line(&bare), "Tokens: N/A");
    }

    #[test]
    fn time_and_validation_lines() {
        assert_eq!(response_time_line(1.234), "Response Time: 1.23s");
        assert_eq!(validation_line(None), "JSON Valid: N/A");
        assert_eq!(
            validation_line(Some(&ValidationOutcome::NotJson)),
            "JSON Valid: ✗ - Response is not JSON"
        );
    }
}
