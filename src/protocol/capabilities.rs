//! 能力声明表 — 每个模型家族接受哪些请求参数
//!
//! Static per-family capability records. The request builder consults these,
//! never the caller, to decide which supplied parameters reach the wire.

use serde::Serialize;

use crate::protocol::ProviderKind;
use crate::types::Param;

/// Model families with distinct parameter rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    /// Perplexity Sonar: search-augmented chat completions.
    Sonar,
    /// OpenAI reasoning models: fixed temperature, no sampling knobs.
    Gpt5,
    /// OpenAI standard chat models.
    Gpt,
}

/// Which request parameters a model family accepts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderCapability {
    pub family: ModelFamily,
    pub provider: ProviderKind,
    pub supports_temperature: bool,
    pub supports_top_p: bool,
    pub supports_penalties: bool,
    pub supports_logprobs: bool,
    pub supports_logit_bias: bool,
    pub supports_tools: bool,
    pub supports_response_format: bool,
    /// Sent for every request in place of the caller's temperature.
    pub fixed_temperature: Option<f64>,
    /// Family-specific parameters beyond the standard sampling set.
    pub extra_params: &'static [Param],
}

const SONAR_EXTRAS: &[Param] = &[
    Param::ReferenceUrl,
    Param::DomainFilter,
    Param::RecencyFilter,
    Param::AfterDate,
    Param::BeforeDate,
    Param::ContextSize,
    Param::ReturnImages,
    Param::ReturnRelatedQuestions,
    Param::UserLocation,
];

const GPT5_EXTRAS: &[Param] = &[
    Param::Seed,
    Param::Stop,
    Param::N,
    Param::User,
    Param::ReasoningEffort,
    Param::Verbosity,
];

const GPT_EXTRAS: &[Param] = &[Param::Seed, Param::Stop, Param::N, Param::User];

pub static SONAR: ProviderCapability = ProviderCapability {
    family: ModelFamily::Sonar,
    provider: ProviderKind::Perplexity,
    supports_temperature: true,
    supports_top_p: true,
    supports_penalties: true,
    supports_logprobs: false,
    supports_logit_bias: false,
    supports_tools: false,
    supports_response_format: true,
    fixed_temperature: None,
    extra_params: SONAR_EXTRAS,
};

pub static GPT5: ProviderCapability = ProviderCapability {
    family: ModelFamily::Gpt5,
    provider: ProviderKind::OpenAi,
    supports_temperature: false,
    supports_top_p: false,
    supports_penalties: false,
    supports_logprobs: false,
    supports_logit_bias: false,
    supports_tools: true,
    supports_response_format: true,
    fixed_temperature: Some(1.0),
    extra_params: GPT5_EXTRAS,
};

pub static GPT: ProviderCapability = ProviderCapability {
    family: ModelFamily::Gpt,
    provider: ProviderKind::OpenAi,
    supports_temperature: true,
    supports_top_p: true,
    supports_penalties: true,
    supports_logprobs: true,
    supports_logit_bias: true,
    supports_tools: true,
    supports_response_format: true,
    fixed_temperature: None,
    extra_params: GPT_EXTRAS,
};

impl ModelFamily {
    pub fn capability(&self) -> &'static ProviderCapability {
        match self {
            Self::Sonar => &SONAR,
            Self::Gpt5 => &GPT5,
            Self::Gpt => &GPT,
        }
    }
}

impl ProviderCapability {
    /// Whether a supplied parameter may be serialized for this family.
    ///
    /// Temperature under a fixed override is reported separately by the
    /// builder, so it is not "accepted" here.
    pub fn accepts(&self, param: Param) -> bool {
        match param {
            Param::Temperature => self.supports_temperature && self.fixed_temperature.is_none(),
            Param::TopP => self.supports_top_p,
            Param::FrequencyPenalty | Param::PresencePenalty => self.supports_penalties,
            Param::Logprobs | Param::TopLogprobs => self.supports_logprobs,
            Param::LogitBias => self.supports_logit_bias,
            Param::Tools | Param::ToolChoice | Param::ParallelToolCalls => self.supports_tools,
            Param::ResponseFormat => self.supports_response_format,
            Param::MaxTokens => true,
            other => self.extra_params.contains(&other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasoning_family_rejects_sampling_knobs() {
        for p in [
            Param::Temperature,
            Param::TopP,
            Param::FrequencyPenalty,
            Param::PresencePenalty,
            Param::Logprobs,
            Param::TopLogprobs,
            Param::LogitBias,
        ] {
            assert!(!GPT5.accepts(p), "{p} should be rejected");
        }
        assert!(GPT5.accepts(Param::ReasoningEffort));
        assert!(GPT5.accepts(Param::MaxTokens));
    }

    #[test]
    fn search_params_belong_to_sonar_only() {
        assert!(SONAR.accepts(Param::DomainFilter));
        assert!(!GPT.accepts(Param::DomainFilter));
        assert!(!SONAR.accepts(Param::Tools));
        assert!(!SONAR.accepts(Param::ReasoningEffort));
    }
}
