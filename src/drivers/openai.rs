//! OpenAI Chat Completions driver.
//!
//! The shared builder already covers sampling, tools and `response_format`.
//! This driver adds the reasoning knobs of the GPT-5 family
//! (`reasoning_effort`, `verbosity`), which the standard GPT family rejects.

use serde_json::{Map, Value};

use crate::protocol::{ProviderCapability, ProviderKind};
use crate::types::{Param, RequestParameters};

use super::{put, ProviderDriver};

#[derive(Debug, Default, Clone, Copy)]
pub struct OpenAiDriver;

impl ProviderDriver for OpenAiDriver {
    fn provider(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn apply_extensions(
        &self,
        cap: &ProviderCapability,
        params: &RequestParameters,
        body: &mut Map<String, Value>,
    ) {
        if cap.accepts(Param::ReasoningEffort) {
            if let Some(effort) = params.reasoning_effort {
                put(body, "reasoning_effort", effort.as_str());
            }
        }
        if cap.accepts(Param::Verbosity) {
            if let Some(verbosity) = params.verbosity {
                put(body, "verbosity", verbosity.as_str());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::{build, Diagnostic};
    use crate::protocol::lookup;
    use crate::types::{ChatMessage, ReasoningEffort, Verbosity};
    use serde_json::json;

    fn params(model: &str) -> RequestParameters {
        RequestParameters::new(model, vec![ChatMessage::user("What is 2+2?")])
    }

    #[test]
    fn reasoning_knobs_for_gpt5() {
        let mut p = params("gpt-5-nano");
        p.reasoning_effort = Some(ReasoningEffort::Minimal);
        p.verbosity = Some(Verbosity::Low);
        p.seed = Some(42);
        p.stop = vec!["\n\n".into()];
        let req = build(lookup("gpt-5-nano").unwrap(), &p);
        assert_eq!(req.payload["reasoning_effort"], "minimal");
        assert_eq!(req.payload["verbosity"], "low");
        assert_eq!(req.payload["seed"], 42);
        assert_eq!(req.payload["stop"], json!(["\n\n"]));
        assert!(req.headers.is_empty());
    }

    #[test]
    fn standard_family_rejects_reasoning_knobs() {
        let mut p = params("gpt-4o-mini");
        p.reasoning_effort = Some(ReasoningEffort::High);
        p.temperature = Some(0.3);
        p.logprobs = Some(true);
        p.top_logprobs = Some(2);
        let req = build(lookup("gpt-4o-mini").unwrap(), &p);
        assert!(req.payload.get("reasoning_effort").is_none());
        assert_eq!(req.payload["temperature"], 0.3);
        assert_eq!(req.payload["logprobs"], true);
        assert_eq!(req.payload["top_logprobs"], 2);
        assert_eq!(
            req.diagnostics,
            vec![Diagnostic::UnsupportedParameter {
                param: Param::ReasoningEffort,
                model: "gpt-4o-mini".into()
            }]
        );
    }

    #[test]
    fn gpt5_drops_sampling_knobs() {
        let mut p = params("gpt-5");
        p.frequency_penalty = Some(0.5);
        p.logit_bias = Some(Map::from_iter([("50256".to_string(), json!(-100))]));
        p.max_tokens = Some(256);
        let req = build(lookup("gpt-5").unwrap(), &p);
        assert!(req.payload.get("frequency_penalty").is_none());
        assert!(req.payload.get("logit_bias").is_none());
        assert_eq!(req.payload["max_tokens"], 256);
        assert_eq!(req.diagnostics.len(), 2);
    }

    #[test]
    fn tool_calls_surface_in_result() {
        let body = json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{"id": "call_1", "type": "function", "function": {"name": "lookup", "arguments": "{}"}}]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 20, "completion_tokens": 5, "total_tokens": 25}
        });
        let result = OpenAiDriver.interpret(body);
        assert_eq!(result.assistant_content, "");
        assert_eq!(result.tool_calls.len(), 1);
        assert_eq!(result.finish_reason.as_deref(), Some("tool_calls"));
        assert!(result.auxiliary.is_empty());
    }
}
