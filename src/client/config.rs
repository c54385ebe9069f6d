//! Client configuration: credentials and endpoints per provider.
//!
//! Values come from the process environment (`ClientConfig::from_env`) or are
//! set programmatically, which is how tests point the client at a mock server.
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `PERPLEXITY_API_KEY` / `OPENAI_API_KEY` | bearer tokens; blank counts as absent |
//! | `PERPLEXITY_BASE_URL` / `OPENAI_BASE_URL` | endpoint overrides |
//! | `AI_HTTP_TIMEOUT_SECS` | optional request timeout; unset means none |
//! | `AI_PROXY_URL` | optional proxy for all requests |

use std::env;
use std::time::Duration;
use url::Url;

use crate::protocol::ProviderKind;
use crate::{Error, ErrorContext, Result};

#[derive(Clone)]
pub struct ClientConfig {
    perplexity_api_key: Option<String>,
    openai_api_key: Option<String>,
    perplexity_base_url: String,
    openai_base_url: String,
    timeout: Option<Duration>,
    proxy: Option<String>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |k: &Option<String>| k.as_ref().map(|_| "<redacted>");
        f.debug_struct("ClientConfig")
            .field("perplexity_api_key", &redact(&self.perplexity_api_key))
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("perplexity_base_url", &self.perplexity_base_url)
            .field("openai_base_url", &self.openai_base_url)
            .field("timeout", &self.timeout)
            .field("proxy", &self.proxy)
            .finish()
    }
}

fn parse_base_url(value: &str, field: &str) -> Result<Url> {
    let url = Url::parse(value.trim()).map_err(|e| {
        Error::configuration_with_context(
            format!("invalid base URL '{}'", value),
            ErrorContext::new()
                .with_field_path(field)
                .with_details(e.to_string())
                .with_source("client_config"),
        )
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::configuration_with_context(
            format!("unsupported URL scheme '{}'", url.scheme()),
            ErrorContext::new()
                .with_field_path(field)
                .with_details("expected http or https")
                .with_source("client_config"),
        ));
    }
    Ok(url)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ClientConfig {
    /// Default endpoints, no credentials.
    pub fn new() -> Self {
        Self {
            perplexity_api_key: None,
            openai_api_key: None,
            perplexity_base_url: ProviderKind::Perplexity.default_base_url().to_string(),
            openai_base_url: ProviderKind::OpenAi.default_base_url().to_string(),
            timeout: None,
            proxy: None,
        }
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new();
        for provider in ProviderKind::ALL {
            if let Some(key) = non_blank(env::var(provider.api_key_env()).ok()) {
                config = config.with_api_key(provider, key);
            }
            if let Some(url) = non_blank(env::var(provider.base_url_env()).ok()) {
                config = config.with_base_url(provider, &url)?;
            }
        }

        if let Some(raw) = non_blank(env::var("AI_HTTP_TIMEOUT_SECS").ok()) {
            let secs = raw.parse::<u64>().map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid timeout '{}'", raw),
                    ErrorContext::new()
                        .with_field_path("AI_HTTP_TIMEOUT_SECS")
                        .with_details(e.to_string())
                        .with_source("client_config"),
                )
            })?;
            config.timeout = Some(Duration::from_secs(secs.max(1)));
        }
        config.proxy = non_blank(env::var("AI_PROXY_URL").ok());

        Ok(config)
    }

    pub fn with_api_key(mut self, provider: ProviderKind, key: impl Into<String>) -> Self {
        let key = non_blank(Some(key.into()));
        match provider {
            ProviderKind::Perplexity => self.perplexity_api_key = key,
            ProviderKind::OpenAi => self.openai_api_key = key,
        }
        self
    }

    /// Override a provider's base URL (mock servers, proxies, gateways).
    pub fn with_base_url(mut self, provider: ProviderKind, url: &str) -> Result<Self> {
        let url = parse_base_url(url, provider.base_url_env())?.to_string();
        match provider {
            ProviderKind::Perplexity => self.perplexity_base_url = url,
            ProviderKind::OpenAi => self.openai_base_url = url,
        }
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn api_key(&self, provider: ProviderKind) -> Option<&str> {
        match provider {
            ProviderKind::Perplexity => self.perplexity_api_key.as_deref(),
            ProviderKind::OpenAi => self.openai_api_key.as_deref(),
        }
    }

    pub fn base_url(&self, provider: ProviderKind) -> &str {
        match provider {
            ProviderKind::Perplexity => self.perplexity_base_url.as_str(),
            ProviderKind::OpenAi => self.openai_base_url.as_str(),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    /// Providers with a credential loaded.
    pub fn available_providers(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|p| self.api_key(*p).is_some())
            .collect()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_public_endpoints() {
        let config = ClientConfig::new();
        assert_eq!(
            config.base_url(ProviderKind::Perplexity),
            "https://api.perplexity.ai"
        );
        assert_eq!(
            config.base_url(ProviderKind::OpenAi),
            "https://api.openai.com/v1"
        );
        assert!(config.available_providers().is_empty());
        assert!(config.timeout().is_none());
    }

    #[test]
    fn blank_keys_count_as_absent() {
        let config = ClientConfig::new()
            .with_api_key(ProviderKind::Perplexity, "   ")
            .with_api_key(ProviderKind::OpenAi, "sk-test");
        assert_eq!(config.available_providers(), vec![ProviderKind::OpenAi]);
    }

    #[test]
    fn invalid_base_url_is_configuration_error() {
        let err = ClientConfig::new()
            .with_base_url(ProviderKind::OpenAi, "not a url")
            .unwrap_err();
        assert!(err.is_config());
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("OPENAI_BASE_URL")
        );

        let err = ClientConfig::new()
            .with_base_url(ProviderKind::OpenAi, "ftp://example.com")
            .unwrap_err();
        assert!(err.to_string().contains("unsupported URL scheme"));
    }

    #[test]
    fn base_url_override_is_normalized() {
        let config = ClientConfig::new()
            .with_base_url(ProviderKind::Perplexity, " http://127.0.0.1:1234 ")
            .unwrap();
        assert_eq!(
            config.base_url(ProviderKind::Perplexity),
            "http://127.0.0.1:1234/"
        );
    }

    #[test]
    fn debug_never_prints_keys() {
        let config = ClientConfig::new().with_api_key(ProviderKind::OpenAi, "sk-secret");
        let shown = format!("{config:?}");
        assert!(!shown.contains("sk-secret"));
        assert!(shown.contains("<redacted>"));
    }
}
