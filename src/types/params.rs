//! Provider-agnostic request parameters.
//!
//! [`RequestParameters`] is the normalized bag of optional fields a caller
//! fills in. Nothing here knows which provider will receive the request; the
//! capability table decides which fields make it onto the wire.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::message::ChatMessage;

/// Hard API-side limit on the number of search domain filters.
pub const MAX_DOMAIN_FILTERS: usize = 3;

/// Normalized, provider-agnostic request parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestParameters {
    pub model: String,
    pub messages: Vec<ChatMessage>,

    // sampling
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub frequency_penalty: Option<f64>,
    pub presence_penalty: Option<f64>,
    pub max_tokens: Option<u32>,
    pub seed: Option<i64>,
    pub stop: Vec<String>,
    pub n: Option<u32>,
    pub user: Option<String>,
    pub logit_bias: Option<Map<String, Value>>,

    // search augmentation
    pub reference_url: Option<String>,
    pub domain_filter: Vec<String>,
    pub recency_filter: Option<RecencyFilter>,
    pub after_date: Option<String>,
    pub before_date: Option<String>,
    pub context_size: Option<ContextSize>,
    pub return_images: bool,
    pub return_related_questions: bool,
    pub user_location: Option<UserLocation>,

    // reasoning augmentation
    pub reasoning_effort: Option<ReasoningEffort>,
    pub verbosity: Option<Verbosity>,

    /// Opaque, JSON-schema-shaped format object.
    pub response_format: Option<Value>,

    // tool use
    pub tools: Vec<Value>,
    pub tool_choice: Option<Value>,
    pub parallel_tool_calls: Option<bool>,

    // diagnostics
    pub logprobs: Option<bool>,
    pub top_logprobs: Option<u32>,
}

impl RequestParameters {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            ..Default::default()
        }
    }

    /// Every optional parameter the caller actually supplied, in wire order.
    ///
    /// Defaults (`false` booleans, empty lists, `RecencyFilter::None`) count as
    /// not supplied.
    pub fn supplied(&self) -> Vec<Param> {
        let mut out = Vec::new();
        let mut mark = |present: bool, p: Param| {
            if present {
                out.push(p);
            }
        };
        mark(self.temperature.is_some(), Param::Temperature);
        mark(self.top_p.is_some(), Param::TopP);
        mark(self.frequency_penalty.is_some(), Param::FrequencyPenalty);
        mark(self.presence_penalty.is_some(), Param::PresencePenalty);
        mark(self.max_tokens.is_some(), Param::MaxTokens);
        mark(self.seed.is_some(), Param::Seed);
        mark(!self.stop.is_empty(), Param::Stop);
        mark(self.n.is_some(), Param::N);
        mark(self.user.is_some(), Param::User);
        mark(self.logit_bias.is_some(), Param::LogitBias);
        mark(self.reference_url.is_some(), Param::ReferenceUrl);
        mark(!self.domain_filter.is_empty(), Param::DomainFilter);
        mark(
            self.recency_filter.is_some_and(|r| r != RecencyFilter::None),
            Param::RecencyFilter,
        );
        mark(self.after_date.is_some(), Param::AfterDate);
        mark(self.before_date.is_some(), Param::BeforeDate);
        mark(self.context_size.is_some(), Param::ContextSize);
        mark(self.return_images, Param::ReturnImages);
        mark(self.return_related_questions, Param::ReturnRelatedQuestions);
        mark(self.user_location.is_some(), Param::UserLocation);
        mark(self.reasoning_effort.is_some(), Param::ReasoningEffort);
        mark(self.verbosity.is_some(), Param::Verbosity);
        mark(self.response_format.is_some(), Param::ResponseFormat);
        mark(!self.tools.is_empty(), Param::Tools);
        mark(self.tool_choice.is_some(), Param::ToolChoice);
        mark(self.parallel_tool_calls.is_some(), Param::ParallelToolCalls);
        mark(self.logprobs.is_some(), Param::Logprobs);
        mark(self.top_logprobs.is_some(), Param::TopLogprobs);
        out
    }

    /// The last user message, if any.
    pub fn prompt_message(&self) -> Option<&ChatMessage> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == crate::types::Role::User)
    }

    /// The user prompt text.
    pub fn prompt(&self) -> Option<&str> {
        self.prompt_message().map(|m| m.content.as_str())
    }
}

/// Identifier for every optional request parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Param {
    Temperature,
    TopP,
    FrequencyPenalty,
    PresencePenalty,
    MaxTokens,
    Seed,
    Stop,
    N,
    User,
    LogitBias,
    ReferenceUrl,
    DomainFilter,
    RecencyFilter,
    AfterDate,
    BeforeDate,
    ContextSize,
    ReturnImages,
    ReturnRelatedQuestions,
    UserLocation,
    ReasoningEffort,
    Verbosity,
    ResponseFormat,
    Tools,
    ToolChoice,
    ParallelToolCalls,
    Logprobs,
    TopLogprobs,
}

impl Param {
    /// Caller-facing parameter name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::TopP => "top_p",
            Self::FrequencyPenalty => "frequency_penalty",
            Self::PresencePenalty => "presence_penalty",
            Self::MaxTokens => "max_tokens",
            Self::Seed => "seed",
            Self::Stop => "stop",
            Self::N => "n",
            Self::User => "user",
            Self::LogitBias => "logit_bias",
            Self::ReferenceUrl => "reference_url",
            Self::DomainFilter => "domain_filter",
            Self::RecencyFilter => "recency_filter",
            Self::AfterDate => "after_date",
            Self::BeforeDate => "before_date",
            Self::ContextSize => "context_size",
            Self::ReturnImages => "return_images",
            Self::ReturnRelatedQuestions => "return_related_questions",
            Self::UserLocation => "user_location",
            Self::ReasoningEffort => "reasoning_effort",
            Self::Verbosity => "verbosity",
            Self::ResponseFormat => "response_format",
            Self::Tools => "tools",
            Self::ToolChoice => "tool_choice",
            Self::ParallelToolCalls => "parallel_tool_calls",
            Self::Logprobs => "logprobs",
            Self::TopLogprobs => "top_logprobs",
        }
    }
}

impl std::fmt::Display for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Declares a lowercase string enum with `as_str`, `Display` and `FromStr`.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($s => Ok($name::$variant),)+
                    other => Err(format!("Unknown {}: {}", stringify!($name), other)),
                }
            }
        }
    };
}

string_enum!(
    /// Search recency window. `None` means "omit the field entirely".
    RecencyFilter {
        None => "none",
        Hour => "hour",
        Day => "day",
        Week => "week",
        Month => "month",
    }
);

string_enum!(
    /// How much retrieved web context the search provider feeds the model.
    ContextSize {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
);

string_enum!(
    ReasoningEffort {
        Minimal => "minimal",
        Low => "low",
        Medium => "medium",
        High => "high",
    }
);

string_enum!(
    Verbosity {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
);

/// Approximate user location as typed by the user.
///
/// Coordinates stay as text; the request builder only attaches the location
/// when both parse as floating point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLocation {
    pub lat: String,
    pub lon: String,
    pub country: Option<String>,
}

impl UserLocation {
    pub fn new(lat: impl Into<String>, lon: impl Into<String>) -> Self {
        Self {
            lat: lat.into(),
            lon: lon.into(),
            country: None,
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Parsed `(lat, lon)`, or `None` if either coordinate is not a float.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let lat = self.lat.trim().parse::<f64>().ok()?;
        let lon = self.lon.trim().parse::<f64>().ok()?;
        Some((lat, lon))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_enums_parse_case_insensitively() {
        assert_eq!("Week".parse::<RecencyFilter>().unwrap(), RecencyFilter::Week);
        assert_eq!(" none ".parse::<RecencyFilter>().unwrap(), RecencyFilter::None);
        assert_eq!("minimal".parse::<ReasoningEffort>().unwrap(), ReasoningEffort::Minimal);
        assert!("year".parse::<RecencyFilter>().is_err());
        assert!("minimal".parse::<Verbosity>().is_err());
    }

    #[test]
    fn recency_none_is_not_supplied() {
        let mut params = RequestParameters::new("sonar", vec![]);
        params.recency_filter = Some(RecencyFilter::None);
        assert!(!params.supplied().contains(&Param::RecencyFilter));

        params.recency_filter = Some(RecencyFilter::Day);
        assert!(params.supplied().contains(&Param::RecencyFilter));
    }

    #[test]
    fn location_requires_both_coordinates() {
        assert_eq!(
            UserLocation::new("37.7749", "-122.4194").coordinates(),
            Some((37.7749, -122.4194))
        );
        assert_eq!(UserLocation::new("37.7749", "").coordinates(), None);
        assert_eq!(UserLocation::new("north", "1.0").coordinates(), None);
    }
}
