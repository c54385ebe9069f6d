//! Flat test form and its normalization into [`RequestParameters`].
//!
//! The form holds raw text exactly as a user typed it (or as a saved test
//! file stored it). Normalization never fails: fields that do not parse are
//! dropped and reported as [`Diagnostic::InvalidField`].

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::str::FromStr;

use crate::drivers::Diagnostic;
use crate::protocol::{self, ProviderCapability};
use crate::structured::parse_response_format;
use crate::types::message::conversation;
use crate::types::{
    ContextSize, Param, ReasoningEffort, RecencyFilter, RequestParameters, ToolChoice,
    ToolDefinition, UserLocation, Verbosity,
};

pub const DEFAULT_MODEL: &str = "sonar";
pub const DEFAULT_TEMPERATURE: f64 = 0.2;
pub const DEFAULT_RECENCY_FILTER: &str = "none";
pub const DEFAULT_CONTEXT_SIZE: &str = "low";

/// Accept strings, numbers, booleans and null where text is expected.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}

/// Accept a number, a numeric string, or null/blank (no temperature).
fn lenient_temperature<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

fn flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes"
        ),
        _ => false,
    }
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(flag(&Value::deserialize(deserializer)?))
}

/// Like [`lenient_bool`], but null or blank means "not set".
fn lenient_opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        other => Some(flag(&other)),
    })
}

/// A null nested object loads as its default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> Option<f64> {
    Some(DEFAULT_TEMPERATURE)
}

fn default_recency() -> String {
    DEFAULT_RECENCY_FILTER.to_string()
}

fn default_context_size() -> String {
    DEFAULT_CONTEXT_SIZE.to_string()
}

/// All user-editable fields of one test, in persisted layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestForm {
    #[serde(default = "default_model", deserialize_with = "lenient_string")]
    pub model: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub prompt: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub system_prompt: String,
    /// Reference URL for the search provider.
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub search_params: SearchParamsForm,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: LocationForm,
    #[serde(default, deserialize_with = "null_as_default")]
    pub llm_params: LlmParamsForm,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub use_json: bool,
    /// Response format text, also the expected shape for validation.
    #[serde(default, alias = "expected_json", deserialize_with = "lenient_string")]
    pub json_format: String,
}

impl Default for TestForm {
    fn default() -> Self {
        Self {
            model: default_model(),
            prompt: String::new(),
            system_prompt: String::new(),
            url: String::new(),
            search_params: SearchParamsForm::default(),
            location: LocationForm::default(),
            llm_params: LlmParamsForm::default(),
            use_json: false,
            json_format: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParamsForm {
    /// Comma-separated; `-domain` excludes.
    #[serde(default, deserialize_with = "lenient_string")]
    pub domain_filter: String,
    #[serde(default = "default_recency", deserialize_with = "lenient_string")]
    pub recency_filter: String,
    #[serde(default = "default_context_size", deserialize_with = "lenient_string")]
    pub context_size: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub after_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub before_date: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub return_images: bool,
    #[serde(
        default,
        rename = "return_questions",
        alias = "return_related_questions",
        deserialize_with = "lenient_bool"
    )]
    pub return_related_questions: bool,
}

impl Default for SearchParamsForm {
    fn default() -> Self {
        Self {
            domain_filter: String::new(),
            recency_filter: default_recency(),
            context_size: default_context_size(),
            after_date: String::new(),
            before_date: String::new(),
            return_images: false,
            return_related_questions: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationForm {
    #[serde(default, deserialize_with = "lenient_string")]
    pub latitude: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub longitude: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub country: String,
}

/// Sampling and OpenAI-specific fields, as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmParamsForm {
    #[serde(default = "default_temperature", deserialize_with = "lenient_temperature")]
    pub temperature: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub max_tokens: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub top_p: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub frequency_penalty: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub presence_penalty: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub seed: String,
    /// Comma-separated stop sequences.
    #[serde(default, deserialize_with = "lenient_string")]
    pub stop: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub n: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub user: String,
    /// JSON object text, token id to bias.
    #[serde(default, deserialize_with = "lenient_string")]
    pub logit_bias: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub logprobs: bool,
    #[serde(default, deserialize_with = "lenient_string")]
    pub top_logprobs: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub reasoning_effort: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub verbosity: String,
    /// JSON array text: tool objects or bare legacy function definitions.
    #[serde(default, deserialize_with = "lenient_string")]
    pub tools: String,
    /// `auto`, `none`, `required`, a function name, or JSON.
    #[serde(default, deserialize_with = "lenient_string")]
    pub tool_choice: String,
    #[serde(default, deserialize_with = "lenient_opt_bool")]
    pub parallel_tool_calls: Option<bool>,
}

impl Default for LlmParamsForm {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: String::new(),
            top_p: String::new(),
            frequency_penalty: String::new(),
            presence_penalty: String::new(),
            seed: String::new(),
            stop: String::new(),
            n: String::new(),
            user: String::new(),
            logit_bias: String::new(),
            logprobs: false,
            top_logprobs: String::new(),
            reasoning_effort: String::new(),
            verbosity: String::new(),
            tools: String::new(),
            tool_choice: String::new(),
            parallel_tool_calls: None,
        }
    }
}

/// Normalized parameters plus the fields that could not be used.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub params: RequestParameters,
    pub diagnostics: Vec<Diagnostic>,
}

/// Collects parse failures while reading text fields.
struct FieldReader {
    diagnostics: Vec<Diagnostic>,
}

impl FieldReader {
    fn invalid(&mut self, field: &str, value: &str) {
        self.diagnostics.push(Diagnostic::InvalidField {
            field: field.to_string(),
            value: value.to_string(),
        });
    }

    /// Blank is "not supplied"; anything else must parse.
    fn parse<T: FromStr>(&mut self, field: &str, raw: &str) -> Option<T> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.parse::<T>() {
            Ok(v) => Some(v),
            Err(_) => {
                self.invalid(field, trimmed);
                None
            }
        }
    }

    fn json(&mut self, field: &str, raw: &str) -> Option<Value> {
        self.parse::<Value>(field, raw)
    }
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(String::from)
        .collect()
}

impl TestForm {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    /// Expected shape for validation, when JSON output was requested.
    pub fn expected_shape(&self) -> Option<&str> {
        self.use_json.then_some(self.json_format.as_str())
    }

    /// Turn the raw fields into provider-agnostic parameters.
    ///
    /// The search context size has a non-blank default; it is only forwarded
    /// to models that accept it unless the user changed it.
    pub fn normalize(&self) -> Normalized {
        let mut reader = FieldReader {
            diagnostics: Vec::new(),
        };
        let model = self.model.trim().to_string();
        let capability: Option<&ProviderCapability> = protocol::lookup(&model).ok();
        let accepts = |p: Param| capability.map_or(true, |c| c.accepts(p));

        let mut params = RequestParameters::new(
            model,
            conversation(Some(self.system_prompt.as_str()), &self.prompt),
        );

        // search augmentation
        let search = &self.search_params;
        params.reference_url = non_blank(&self.url);
        params.domain_filter = split_list(&search.domain_filter);
        params.recency_filter =
            reader.parse::<RecencyFilter>("recency_filter", &search.recency_filter);
        let context_size = reader.parse::<ContextSize>("context_size", &search.context_size);
        let default_context = search
            .context_size
            .trim()
            .eq_ignore_ascii_case(DEFAULT_CONTEXT_SIZE);
        if accepts(Param::ContextSize) || !default_context {
            params.context_size = context_size;
        }
        params.after_date = non_blank(&search.after_date);
        params.before_date = non_blank(&search.before_date);
        params.return_images = search.return_images;
        params.return_related_questions = search.return_related_questions;

        let loc = &self.location;
        if !loc.latitude.trim().is_empty() && !loc.longitude.trim().is_empty() {
            let mut location = UserLocation::new(loc.latitude.trim(), loc.longitude.trim());
            if let Some(country) = non_blank(&loc.country) {
                location = location.with_country(country);
            }
            params.user_location = Some(location);
        }

        // sampling
        let llm = &self.llm_params;
        params.temperature = llm.temperature;
        params.max_tokens = reader.parse("max_tokens", &llm.max_tokens);
        params.top_p = reader.parse("top_p", &llm.top_p);
        params.frequency_penalty = reader.parse("frequency_penalty", &llm.frequency_penalty);
        params.presence_penalty = reader.parse("presence_penalty", &llm.presence_penalty);
        params.seed = reader.parse("seed", &llm.seed);
        params.stop = split_list(&llm.stop);
        params.n = reader.parse("n", &llm.n);
        params.user = non_blank(&llm.user);
        params.logit_bias = match reader.json("logit_bias", &llm.logit_bias) {
            Some(Value::Object(map)) => Some(map),
            Some(_) => {
                reader.invalid("logit_bias", llm.logit_bias.trim());
                None
            }
            None => None,
        };
        params.logprobs = llm.logprobs.then_some(true);
        params.top_logprobs = reader.parse("top_logprobs", &llm.top_logprobs);

        // reasoning
        params.reasoning_effort =
            reader.parse::<ReasoningEffort>("reasoning_effort", &llm.reasoning_effort);
        params.verbosity = reader.parse::<Verbosity>("verbosity", &llm.verbosity);

        // structured output
        if self.use_json {
            let (format, diagnostic) = parse_response_format(&self.json_format);
            params.response_format = format;
            reader.diagnostics.extend(diagnostic);
        }

        // tools
        params.tools = match reader.json("tools", &llm.tools) {
            Some(Value::Array(items)) => items.into_iter().map(normalize_tool).collect(),
            Some(single @ Value::Object(_)) => vec![normalize_tool(single)],
            Some(_) => {
                reader.invalid("tools", llm.tools.trim());
                Vec::new()
            }
            None => Vec::new(),
        };
        params.tool_choice = parse_tool_choice(&mut reader, &llm.tool_choice);
        params.parallel_tool_calls = llm.parallel_tool_calls;

        Normalized {
            params,
            diagnostics: reader.diagnostics,
        }
    }
}

/// Tool objects pass through; bare function definitions get wrapped.
fn normalize_tool(tool: Value) -> Value {
    if tool.get("type").is_some() {
        tool
    } else {
        ToolDefinition::from_legacy_function(tool)
    }
}

fn parse_tool_choice(reader: &mut FieldReader, raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    match trimmed {
        "" => None,
        "auto" => Some(ToolChoice::Auto.to_value()),
        "none" => Some(ToolChoice::None.to_value()),
        "required" => Some(ToolChoice::Required.to_value()),
        json if json.starts_with('{') => {
            let value = reader.json("tool_choice", json)?;
            if value.get("type").is_some() {
                Some(value)
            } else {
                match ToolChoice::from_legacy_function_call(&value) {
                    Some(choice) => Some(choice.to_value()),
                    None => {
                        reader.invalid("tool_choice", json);
                        None
                    }
                }
            }
        }
        name => Some(ToolChoice::Function(name.to_string()).to_value()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;
    use serde_json::json;

    #[test]
    fn system_prompt_precedes_prompt() {
        let mut form = TestForm::new("sonar", "  What is Rust?  ");
        form.system_prompt = "Answer briefly.".into();
        let n = form.normalize();
        let roles: Vec<Role> = n.params.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User]);
        assert_eq!(n.params.messages[1].content, "What is Rust?");
        assert_eq!(n.params.temperature, Some(DEFAULT_TEMPERATURE));
    }

    #[test]
    fn blank_system_prompt_is_skipped() {
        let mut form = TestForm::new("sonar", "hi");
        form.system_prompt = "  \n".into();
        assert_eq!(form.normalize().params.messages.len(), 1);
    }

    #[test]
    fn search_fields() {
        let mut form = TestForm::new("sonar-pro", "news");
        form.url = " https://example.com ".into();
        form.search_params.domain_filter = "a.com, -b.com,,c.com , d.com".into();
        form.search_params.recency_filter = "Month".into();
        form.search_params.context_size = "high".into();
        form.location = LocationForm {
            latitude: "48.85".into(),
            longitude: "2.35".into(),
            country: "".into(),
        };
        let n = form.normalize();
        assert!(n.diagnostics.is_empty());
        let p = n.params;
        assert_eq!(p.reference_url.as_deref(), Some("https://example.com"));
        assert_eq!(p.domain_filter, vec!["a.com", "-b.com", "c.com", "d.com"]);
        assert_eq!(p.recency_filter, Some(RecencyFilter::Month));
        assert_eq!(p.context_size, Some(ContextSize::High));
        assert_eq!(p.user_location, Some(UserLocation::new("48.85", "2.35")));
    }

    #[test]
    fn default_context_size_not_forced_on_other_providers() {
        let n = TestForm::new("gpt-4o", "hi").normalize();
        assert_eq!(n.params.context_size, None);
        let n = TestForm::new("sonar", "hi").normalize();
        assert_eq!(n.params.context_size, Some(ContextSize::Low));
    }

    #[test]
    fn unparseable_numbers_become_diagnostics() {
        let mut form = TestForm::new("gpt-4o", "hi");
        form.llm_params.max_tokens = "lots".into();
        form.llm_params.top_p = "0.9".into();
        form.llm_params.seed = "7".into();
        form.search_params.recency_filter = "fortnight".into();
        let n = form.normalize();
        assert_eq!(n.params.max_tokens, None);
        assert_eq!(n.params.top_p, Some(0.9));
        assert_eq!(n.params.seed, Some(7));
        assert_eq!(n.params.recency_filter, None);
        assert_eq!(
            n.diagnostics,
            vec![
                Diagnostic::InvalidField {
                    field: "recency_filter".into(),
                    value: "fortnight".into()
                },
                Diagnostic::InvalidField {
                    field: "max_tokens".into(),
                    value: "lots".into()
                },
            ]
        );
    }

    #[test]
    fn json_format_only_used_when_enabled() {
        let mut form = TestForm::new("gpt-5", "2+2?");
        form.json_format = r#"{"type": "json_object"}"#.into();
        assert!(form.normalize().params.response_format.is_none());
        assert_eq!(form.expected_shape(), None);

        form.use_json = true;
        assert_eq!(
            form.normalize().params.response_format,
            Some(json!({"type": "json_object"}))
        );

        form.json_format = "{ broken".into();
        let n = form.normalize();
        assert!(n.params.response_format.is_none());
        assert!(matches!(
            n.diagnostics.as_slice(),
            [Diagnostic::InvalidResponseFormatJson { .. }]
        ));
    }

    #[test]
    fn tools_and_tool_choice() {
        let mut form = TestForm::new("gpt-5", "weather?");
        form.llm_params.tools =
            r#"[{"name": "get_weather", "parameters": {"type": "object"}}]"#.into();
        form.llm_params.tool_choice = "get_weather".into();
        let p = form.normalize().params;
        assert_eq!(p.tools[0]["type"], "function");
        assert_eq!(p.tools[0]["function"]["name"], "get_weather");
        assert_eq!(
            p.tool_choice,
            Some(json!({"type": "function", "function": {"name": "get_weather"}}))
        );

        form.llm_params.tool_choice = r#"{"name": "get_weather"}"#.into();
        assert_eq!(
            form.normalize().params.tool_choice,
            Some(json!({"type": "function", "function": {"name": "get_weather"}}))
        );

        form.llm_params.tool_choice = "required".into();
        assert_eq!(form.normalize().params.tool_choice, Some(json!("required")));
    }

    #[test]
    fn lenient_deserialization() {
        let form: TestForm = serde_json::from_value(json!({
            "model": "sonar",
            "llm_params": {"temperature": "0.7", "max_tokens": 500, "top_p": null},
            "location": {"latitude": 40.7, "longitude": -74.0},
            "search_params": {"return_questions": true},
            "expected_json": "{\"a\": 1}"
        }))
        .unwrap();
        assert_eq!(form.llm_params.temperature, Some(0.7));
        assert_eq!(form.llm_params.max_tokens, "500");
        assert_eq!(form.llm_params.top_p, "");
        assert_eq!(form.location.latitude, "40.7");
        assert!(form.search_params.return_related_questions);
        assert_eq!(form.search_params.recency_filter, "none");
        assert_eq!(form.search_params.context_size, "low");
        assert_eq!(form.json_format, "{\"a\": 1}");
        assert_eq!(form.prompt, "");
    }

    #[test]
    fn null_sections_and_text_flags_load() {
        let form: TestForm = serde_json::from_value(json!({
            "model": "gpt-4o",
            "search_params": null,
            "location": null,
            "llm_params": {"parallel_tool_calls": "true"}
        }))
        .unwrap();
        assert_eq!(form.search_params, SearchParamsForm::default());
        assert_eq!(form.location, LocationForm::default());
        assert_eq!(form.llm_params.parallel_tool_calls, Some(true));
        assert_eq!(form.llm_params.temperature, Some(DEFAULT_TEMPERATURE));

        let form: TestForm =
            serde_json::from_value(json!({"llm_params": null})).unwrap();
        assert_eq!(form.llm_params, LlmParamsForm::default());

        let form: TestForm = serde_json::from_value(json!({
            "llm_params": {"parallel_tool_calls": ""}
        }))
        .unwrap();
        assert_eq!(form.llm_params.parallel_tool_calls, None);
    }
}
