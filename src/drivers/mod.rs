//! Provider 驱动抽象层 — 请求构建与响应解析的按厂商分发
//!
//! Provider drivers: one closed set of variants (Perplexity Sonar, OpenAI)
//! behind the [`ProviderDriver`] trait. A driver is selected once from the
//! capability table and then turns [`RequestParameters`] into a wire payload
//! and a decoded body into an [`ApiResult`].
//!
//! Parameters a family does not accept are dropped with a [`Diagnostic`]
//! instead of failing the request.

pub mod openai;
pub mod sonar;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::protocol::{ProviderCapability, ProviderKind};
use crate::structured::ResponseFormatKind;
use crate::types::{ApiResult, Auxiliary, Param, RequestParameters, Usage};

pub use openai::OpenAiDriver;
pub use sonar::SonarDriver;

/// Path appended to each provider's base URL.
pub const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// Non-fatal notes produced while building a request or interpreting a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Supplied but not accepted by the model family; left out of the payload.
    UnsupportedParameter { param: Param, model: String },
    /// Caller's temperature replaced by the family's fixed value.
    FixedTemperature {
        model: String,
        requested: f64,
        applied: f64,
    },
    /// `parallel_tool_calls` forced to `false` because structured output was requested.
    ParallelToolCallsForced,
    /// Tool settings supplied without any tools; left out of the payload.
    ToolSettingsWithoutTools { param: Param },
    /// The response_format text did not parse; the request was sent without one.
    InvalidResponseFormatJson { message: String },
    /// A form field could not be parsed and was left out.
    InvalidField { field: String, value: String },
    /// The response carried no choices.
    NoChoices,
    /// The model declined to answer.
    Refused { reason: String },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedParameter { param, model } => {
                write!(f, "{param} is not supported by {model}, parameter ignored")
            }
            Self::FixedTemperature {
                model,
                requested,
                applied,
            } => write!(
                f,
                "{model} only supports temperature={applied:.1}, ignoring provided value of {requested}"
            ),
            Self::ParallelToolCallsForced => f.write_str(
                "parallel_tool_calls forced to false: structured output is incompatible with parallel tool calls",
            ),
            Self::ToolSettingsWithoutTools { param } => {
                write!(f, "{param} ignored because no tools were supplied")
            }
            Self::InvalidResponseFormatJson { message } => {
                write!(f, "response_format is not valid JSON ({message}), sending none")
            }
            Self::InvalidField { field, value } => {
                write!(f, "could not parse {field} value '{value}', field ignored")
            }
            Self::NoChoices => f.write_str("response contained no choices"),
            Self::Refused { reason } => write!(f, "model refused: {reason}"),
        }
    }
}

/// A fully assembled request, ready for the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltRequest {
    pub provider: ProviderKind,
    /// Path relative to the provider base URL.
    pub path: &'static str,
    /// Extra headers beyond auth and content type.
    pub headers: Vec<(&'static str, &'static str)>,
    /// JSON object body.
    pub payload: Value,
    pub diagnostics: Vec<Diagnostic>,
}

/// Provider-specific request/response adaptation.
pub trait ProviderDriver: Send + Sync + std::fmt::Debug {
    fn provider(&self) -> ProviderKind;

    /// Headers this provider needs on every request.
    fn extra_headers(&self) -> Vec<(&'static str, &'static str)> {
        Vec::new()
    }

    /// Write family-specific parameters into the body.
    fn apply_extensions(
        &self,
        cap: &ProviderCapability,
        params: &RequestParameters,
        body: &mut Map<String, Value>,
    );

    /// Provider-specific provenance carried next to `choices`.
    fn extract_auxiliary(&self, _body: &Value) -> Auxiliary {
        Auxiliary::default()
    }

    /// Build the wire payload for this provider.
    fn build_request(&self, cap: &ProviderCapability, params: &RequestParameters) -> BuiltRequest {
        let (mut body, diagnostics) = build_standard(cap, params);
        self.apply_extensions(cap, params, &mut body);

        for d in &diagnostics {
            warn!(provider = %self.provider(), "{}", d);
        }

        BuiltRequest {
            provider: self.provider(),
            path: CHAT_COMPLETIONS_PATH,
            headers: self.extra_headers(),
            payload: Value::Object(body),
            diagnostics,
        }
    }

    /// Normalize a decoded response body. Never fails; the raw body is always kept.
    fn interpret(&self, body: Value) -> ApiResult {
        let auxiliary = self.extract_auxiliary(&body);
        interpret_chat_completion(body, auxiliary)
    }
}

/// Select the driver for a provider.
pub fn create_driver(provider: ProviderKind) -> Box<dyn ProviderDriver> {
    match provider {
        ProviderKind::Perplexity => Box::new(SonarDriver),
        ProviderKind::OpenAi => Box::new(OpenAiDriver),
    }
}

/// Build the payload for `params` under the given capability record.
pub fn build(cap: &ProviderCapability, params: &RequestParameters) -> BuiltRequest {
    create_driver(cap.provider).build_request(cap, params)
}

pub(crate) fn put(body: &mut Map<String, Value>, key: &str, value: impl Into<Value>) {
    body.insert(key.to_string(), value.into());
}

/// Core fields, sampling, response_format and tools, shared by every provider.
fn build_standard(
    cap: &ProviderCapability,
    params: &RequestParameters,
) -> (Map<String, Value>, Vec<Diagnostic>) {
    let mut body = Map::new();
    let mut diagnostics = Vec::new();
    // Lookup ignores surrounding whitespace; the wire id must match it.
    let model = params.model.trim();

    put(&mut body, "model", model);
    put(
        &mut body,
        "messages",
        serde_json::to_value(&params.messages).unwrap_or(Value::Array(Vec::new())),
    );
    put(&mut body, "stream", false);

    if let Some(fixed) = cap.fixed_temperature {
        put(&mut body, "temperature", fixed);
        if let Some(requested) = params.temperature {
            if (requested - fixed).abs() > f64::EPSILON {
                diagnostics.push(Diagnostic::FixedTemperature {
                    model: model.to_string(),
                    requested,
                    applied: fixed,
                });
            }
        }
    }

    for param in params.supplied() {
        if param == Param::Temperature && cap.fixed_temperature.is_some() {
            continue;
        }
        if !cap.accepts(param) {
            diagnostics.push(Diagnostic::UnsupportedParameter {
                param,
                model: model.to_string(),
            });
        }
    }

    let accepted = |p: Param| cap.accepts(p);

    if accepted(Param::Temperature) {
        if let Some(t) = params.temperature {
            put(&mut body, "temperature", t);
        }
    }
    if accepted(Param::TopP) {
        if let Some(v) = params.top_p {
            put(&mut body, "top_p", v);
        }
    }
    if accepted(Param::FrequencyPenalty) {
        if let Some(v) = params.frequency_penalty {
            put(&mut body, "frequency_penalty", v);
        }
    }
    if accepted(Param::PresencePenalty) {
        if let Some(v) = params.presence_penalty {
            put(&mut body, "presence_penalty", v);
        }
    }
    if let Some(v) = params.max_tokens {
        put(&mut body, "max_tokens", v);
    }
    if accepted(Param::Seed) {
        if let Some(v) = params.seed {
            put(&mut body, "seed", v);
        }
    }
    if accepted(Param::Stop) && !params.stop.is_empty() {
        put(&mut body, "stop", params.stop.clone());
    }
    if accepted(Param::N) {
        if let Some(v) = params.n {
            put(&mut body, "n", v);
        }
    }
    if accepted(Param::User) {
        if let Some(v) = &params.user {
            put(&mut body, "user", v.as_str());
        }
    }
    if accepted(Param::LogitBias) {
        if let Some(v) = &params.logit_bias {
            put(&mut body, "logit_bias", Value::Object(v.clone()));
        }
    }
    if accepted(Param::Logprobs) {
        if let Some(v) = params.logprobs {
            put(&mut body, "logprobs", v);
        }
    }
    if accepted(Param::TopLogprobs) {
        if let Some(v) = params.top_logprobs {
            put(&mut body, "top_logprobs", v);
        }
    }

    let mut structured = false;
    if accepted(Param::ResponseFormat) {
        if let Some(format) = &params.response_format {
            let kind = ResponseFormatKind::of(format);
            debug!(?kind, "forwarding response_format");
            structured = kind.is_structured();
            put(&mut body, "response_format", format.clone());
        }
    }

    if cap.supports_tools {
        if params.tools.is_empty() {
            if params.tool_choice.is_some() {
                diagnostics.push(Diagnostic::ToolSettingsWithoutTools {
                    param: Param::ToolChoice,
                });
            }
            if params.parallel_tool_calls.is_some() {
                diagnostics.push(Diagnostic::ToolSettingsWithoutTools {
                    param: Param::ParallelToolCalls,
                });
            }
        } else {
            put(&mut body, "tools", params.tools.clone());
            if let Some(choice) = &params.tool_choice {
                put(&mut body, "tool_choice", choice.clone());
            }
            if structured {
                if params.parallel_tool_calls == Some(true) {
                    diagnostics.push(Diagnostic::ParallelToolCallsForced);
                }
                put(&mut body, "parallel_tool_calls", false);
            } else if let Some(parallel) = params.parallel_tool_calls {
                put(&mut body, "parallel_tool_calls", parallel);
            }
        }
    }

    (body, diagnostics)
}

/// Loose truthiness for provider flags such as `refusal`.
fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Extract content, usage and tool calls from a chat completion body.
pub(crate) fn interpret_chat_completion(body: Value, auxiliary: Auxiliary) -> ApiResult {
    let mut diagnostics = Vec::new();
    let mut assistant_content = String::new();
    let mut refusal = None;
    let mut finish_reason = None;
    let mut tool_calls = Vec::new();

    let first = body
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first());

    match first {
        None => diagnostics.push(Diagnostic::NoChoices),
        Some(choice) => {
            finish_reason = choice
                .get("finish_reason")
                .and_then(Value::as_str)
                .map(String::from);
            let message = choice.get("message");
            tool_calls = message
                .and_then(|m| m.get("tool_calls"))
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();

            match message.and_then(|m| m.get("refusal")).filter(|r| is_truthy(r)) {
                Some(r) => {
                    let reason = r
                        .as_str()
                        .map(String::from)
                        .unwrap_or_else(|| r.to_string());
                    diagnostics.push(Diagnostic::Refused {
                        reason: reason.clone(),
                    });
                    refusal = Some(reason);
                }
                None => {
                    assistant_content = message
                        .and_then(|m| m.get("content"))
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string();
                }
            }
        }
    }

    let usage = body
        .get("usage")
        .map(|u| Usage {
            input_tokens: u.get("prompt_tokens").and_then(Value::as_u64).unwrap_or(0),
            output_tokens: u
                .get("completion_tokens")
                .and_then(Value::as_u64)
                .unwrap_or(0),
            total_tokens: u.get("total_tokens").and_then(Value::as_u64).unwrap_or(0),
        })
        .unwrap_or_default();

    ApiResult {
        assistant_content,
        refusal,
        finish_reason,
        usage,
        tool_calls,
        auxiliary,
        diagnostics,
        raw: body,
    }
}
