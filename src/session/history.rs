//! In-memory run history and its JSON export.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::client::TestRun;
use crate::session::form::TestForm;
use crate::session::record::iso_timestamp;
use crate::Result;

/// One successful run, as exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub model: String,
    pub prompt: String,
    pub url: String,
    pub domain_filter: String,
    pub recency_filter: String,
    pub context_size: String,
    pub response: Value,
    /// Seconds.
    pub response_time: f64,
}

impl HistoryEntry {
    /// Entry for `run`, with the form fields as they were when it was submitted.
    pub fn new(form: &TestForm, run: &TestRun) -> Self {
        Self {
            timestamp: iso_timestamp(),
            model: run.model.clone(),
            prompt: form.prompt.trim().to_string(),
            url: form.url.trim().to_string(),
            domain_filter: form.search_params.domain_filter.trim().to_string(),
            recency_filter: form.search_params.recency_filter.clone(),
            context_size: form.search_params.context_size.clone(),
            response: run.result.raw.clone(),
            response_time: run.response_time(),
        }
    }
}

/// Write entries as a pretty-printed JSON array, in run order.
pub fn export(entries: &[HistoryEntry], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, serde_json::to_string_pretty(entries)?)?;
    info!(path = %path.display(), entries = entries.len(), "history exported");
    Ok(())
}
