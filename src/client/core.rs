use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::info;

use crate::client::config::ClientConfig;
use crate::client::preflight::preflight;
use crate::drivers::{create_driver, BuiltRequest, Diagnostic};
use crate::protocol::{ProviderCapability, ProviderKind};
use crate::transport::HttpTransport;
use crate::types::{ApiResult, RequestParameters};
use crate::Result;

/// Prompt test client.
///
/// Stateless apart from its configuration: each call resolves the model,
/// builds a payload, sends it once and interprets the body.
#[derive(Debug, Clone)]
pub struct PromptClient {
    config: ClientConfig,
}

/// A request that passed preflight and is ready to send.
///
/// Produced synchronously by [`PromptClient::prepare`]; [`PromptClient::execute`]
/// performs the blocking network call.
#[derive(Clone)]
pub struct PreparedRequest {
    pub model: String,
    pub capability: &'static ProviderCapability,
    pub request: BuiltRequest,
    api_key: String,
}

impl std::fmt::Debug for PreparedRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedRequest")
            .field("model", &self.model)
            .field("family", &self.capability.family)
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

impl PreparedRequest {
    pub fn provider(&self) -> ProviderKind {
        self.capability.provider
    }

    /// Diagnostics raised while building the payload.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.request.diagnostics
    }
}

/// One completed test run.
#[derive(Debug, Clone, Serialize)]
pub struct TestRun {
    pub model: String,
    pub provider: ProviderKind,
    pub started_at: DateTime<Local>,
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
    /// The payload as sent.
    pub request: Value,
    pub build_diagnostics: Vec<Diagnostic>,
    pub result: ApiResult,
}

impl TestRun {
    /// Build and response diagnostics together, build first.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.build_diagnostics
            .iter()
            .chain(self.result.diagnostics.iter())
    }

    /// Elapsed wall-clock time in seconds.
    pub fn response_time(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }
}

impl PromptClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(ClientConfig::from_env()?))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Run the configuration checks and build the payload. No I/O.
    pub fn prepare(&self, params: &RequestParameters) -> Result<PreparedRequest> {
        let cleared = preflight(&self.config, params)?;
        let request =
            create_driver(cleared.capability.provider).build_request(cleared.capability, params);
        Ok(PreparedRequest {
            model: params.model.trim().to_string(),
            capability: cleared.capability,
            request,
            api_key: cleared.api_key.to_string(),
        })
    }

    /// Send a prepared request and interpret the response. Blocks.
    pub fn execute(&self, prepared: PreparedRequest) -> Result<TestRun> {
        let provider = prepared.provider();
        let transport = HttpTransport::new(
            self.config.base_url(provider),
            prepared.api_key.as_str(),
            self.config.timeout(),
            self.config.proxy(),
        )?;

        let started_at = Local::now();
        let started = Instant::now();
        let body = transport.send(&prepared.request)?;
        let elapsed = started.elapsed();

        let result = create_driver(provider).interpret(body);
        info!(
            model = %prepared.model,
            input_tokens = result.usage.input_tokens,
            output_tokens = result.usage.output_tokens,
            elapsed_ms = elapsed.as_millis() as u64,
            "test run complete"
        );

        Ok(TestRun {
            model: prepared.model,
            provider,
            started_at,
            elapsed,
            request: prepared.request.payload,
            build_diagnostics: prepared.request.diagnostics,
            result,
        })
    }

    /// `prepare` then `execute`.
    pub fn run(&self, params: &RequestParameters) -> Result<TestRun> {
        let prepared = self.prepare(params)?;
        self.execute(prepared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;

    #[test]
    fn prepare_builds_without_network() {
        let client = PromptClient::new(
            ClientConfig::new().with_api_key(ProviderKind::OpenAi, "sk-test"),
        );
        let mut params = RequestParameters::new("gpt-5-mini", vec![ChatMessage::user("hi")]);
        params.top_p = Some(0.9);
        let prepared = client.prepare(&params).unwrap();
        assert_eq!(prepared.provider(), ProviderKind::OpenAi);
        assert_eq!(prepared.request.payload["temperature"], 1.0);
        assert_eq!(prepared.diagnostics().len(), 1);
        assert!(!format!("{prepared:?}").contains("sk-test"));
    }

    #[test]
    fn prepare_surfaces_config_errors() {
        let client = PromptClient::new(ClientConfig::new());
        let params = RequestParameters::new("sonar", vec![ChatMessage::user("hi")]);
        let err = client.prepare(&params).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn prepare_trims_model_id() {
        let client = PromptClient::new(
            ClientConfig::new().with_api_key(ProviderKind::Perplexity, "pplx-test"),
        );
        let params = RequestParameters::new("  sonar-pro\n", vec![ChatMessage::user("hi")]);
        let prepared = client.prepare(&params).unwrap();
        assert_eq!(prepared.model, "sonar-pro");
        assert_eq!(prepared.request.payload["model"], "sonar-pro");
    }
}
