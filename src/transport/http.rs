use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::Proxy;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

use crate::drivers::BuiltRequest;
use crate::{Error, ErrorContext, Result};

/// Blocking HTTP transport for one provider endpoint.
///
/// Issues a single non-streaming POST per request. No retries: a failed call
/// is reported once and the caller decides what to do.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl HttpTransport {
    /// `timeout: None` lets a call run until the server answers or the
    /// connection fails.
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
        proxy: Option<&str>,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid base URL '{}'", base_url),
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("http_transport"),
            )
        })?;

        let mut builder = reqwest::blocking::Client::builder().timeout(timeout);

        if let Some(proxy_url) = proxy {
            let proxy = Proxy::all(proxy_url).map_err(TransportError::Http)?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full endpoint URL for a path relative to the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// POST the payload and decode the JSON body.
    ///
    /// `stream` is always forced to `false`.
    pub fn send(&self, request: &BuiltRequest) -> Result<Value> {
        let url = self.endpoint(request.path);

        let mut payload = request.payload.clone();
        if let Some(obj) = payload.as_object_mut() {
            obj.insert("stream".to_string(), Value::Bool(false));
        }

        let mut req = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json(&payload);
        for (name, value) in &request.headers {
            req = req.header(*name, *value);
        }

        debug!(%url, "sending chat completion request");
        let started = Instant::now();
        let response = req.send().map_err(TransportError::Http)?;
        let status = response.status();
        let text = response.text().map_err(TransportError::Http)?;

        let model = payload
            .get("model")
            .and_then(Value::as_str)
            .unwrap_or_default();
        info!(
            provider = %request.provider,
            model,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "chat completion finished"
        );

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &text));
        }

        serde_json::from_str(&text).map_err(|e| Error::Decode {
            message: e.to_string(),
            body: text,
        })
    }
}

/// Build an [`Error::Api`] from a non-success response body.
///
/// Uses `error.message` / `error.type` when the body carries them, the raw
/// body text otherwise.
pub(crate) fn api_error(status: u16, body: &str) -> Error {
    let parsed = serde_json::from_str::<Value>(body).ok();
    match parsed.as_ref().and_then(|v| v.get("error")) {
        Some(Value::Object(err)) => Error::Api {
            status,
            message: err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error")
                .to_string(),
            error_type: err.get("type").and_then(Value::as_str).map(String::from),
        },
        Some(Value::String(message)) => Error::Api {
            status,
            message: message.clone(),
            error_type: None,
        },
        _ => Error::Api {
            status,
            message: body.to_string(),
            error_type: None,
        },
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}
