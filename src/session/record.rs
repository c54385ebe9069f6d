//! Saved test files.
//!
//! A record is the form snapshot plus the last raw response and a timestamp,
//! written as one flat JSON object. Files carry no version field, so every
//! key is optional on load.

use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::session::form::{lenient_string, TestForm};
use crate::{Error, ErrorContext, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
    #[serde(flatten)]
    pub form: TestForm,
    /// Raw response body of the run being saved.
    #[serde(default)]
    pub response: Value,
    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: String,
}

/// Local time in ISO 8601 without offset, e.g. `2025-03-01T14:05:09.123456`.
pub fn iso_timestamp() -> String {
    Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

impl TestRecord {
    pub fn new(form: TestForm, response: Value) -> Self {
        Self {
            form,
            response,
            timestamp: iso_timestamp(),
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| {
            Error::configuration_with_context(
                "failed to load test",
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("record_loader"),
            )
        })
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a record. Nothing is returned unless the whole file parses.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let record = Self::from_json_str(&text).map_err(|e| match e {
            Error::Configuration { message, context } => Error::Configuration {
                message,
                context: context.with_field_path(path.display().to_string()),
            },
            other => other,
        })?;
        info!(path = %path.display(), model = %record.form.model, "test loaded");
        Ok(record)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json_string()?)?;
        info!(path = %path.display(), "test saved");
        Ok(())
    }
}
