//! 能力表模块：模型到提供方及参数规则的静态映射。
//!
//! # Provider Capability Table
//!
//! Maps a model identifier to its provider and to the static
//! [`ProviderCapability`] record of its family. Pure lookups: no I/O, no
//! mutation.
//!
//! ```rust
//! use prompt_tester::protocol::{lookup, ProviderKind};
//!
//! let cap = lookup("gpt-5").unwrap();
//! assert_eq!(cap.provider, ProviderKind::OpenAi);
//! assert_eq!(cap.fixed_temperature, Some(1.0));
//! assert!(lookup("llama-3").is_err());
//! ```

pub mod capabilities;
pub mod catalog;

use serde::{Deserialize, Serialize};

use crate::error::Error;

pub use capabilities::{ModelFamily, ProviderCapability};
pub use catalog::{model_info, ModelInfo, MODELS};

/// The backing LLM services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Search-augmented provider (Perplexity Sonar).
    Perplexity,
    /// General-purpose provider (OpenAI).
    OpenAi,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::Perplexity, ProviderKind::OpenAi];

    pub fn id(&self) -> &'static str {
        match self {
            Self::Perplexity => "perplexity",
            Self::OpenAi => "openai",
        }
    }

    /// Environment variable holding the bearer token.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Self::Perplexity => "PERPLEXITY_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
        }
    }

    /// Environment variable overriding the base URL.
    pub fn base_url_env(&self) -> &'static str {
        match self {
            Self::Perplexity => "PERPLEXITY_BASE_URL",
            Self::OpenAi => "OPENAI_BASE_URL",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Perplexity => "https://api.perplexity.ai",
            Self::OpenAi => "https://api.openai.com/v1",
        }
    }

    /// Models served by this provider, in catalog order.
    pub fn models(&self) -> impl Iterator<Item = &'static ModelInfo> + '_ {
        MODELS
            .iter()
            .filter(move |m| m.family.capability().provider == *self)
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Perplexity => "Perplexity",
            Self::OpenAi => "OpenAI",
        })
    }
}

/// Resolve a model identifier to its family's capability record.
pub fn lookup(model: &str) -> Result<&'static ProviderCapability, Error> {
    model_info(model)
        .map(|m| m.family.capability())
        .ok_or_else(|| Error::UnknownModel {
            model: model.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_sonar_model_resolves_to_perplexity() {
        for m in ProviderKind::Perplexity.models() {
            assert_eq!(lookup(m.id).unwrap().provider, ProviderKind::Perplexity);
        }
        assert_eq!(ProviderKind::Perplexity.models().count(), 5);
    }

    #[test]
    fn unknown_model_is_an_error() {
        match lookup("claude-3-opus") {
            Err(Error::UnknownModel { model }) => assert_eq!(model, "claude-3-opus"),
            other => panic!("expected UnknownModel, got {other:?}"),
        }
    }

    #[test]
    fn reasoning_and_standard_openai_families_differ() {
        assert_eq!(lookup("gpt-5-nano").unwrap().family, ModelFamily::Gpt5);
        assert_eq!(lookup("gpt-4o").unwrap().family, ModelFamily::Gpt);
        assert_eq!(lookup("gpt-4o").unwrap().fixed_temperature, None);
    }
}
