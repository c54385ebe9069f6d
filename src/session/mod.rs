//! 会话模块：表单、当前结果、历史记录与后台执行。
//!
//! # Session
//!
//! Application state for interactive testing, owned in one place:
//!
//! - the [`TestForm`] being edited,
//! - at most one run in flight,
//! - the most recent successful run ([`RunReport`]),
//! - the ordered history of successful runs.
//!
//! [`Session::submit`] performs every configuration check synchronously and
//! hands the network call to a blocking worker. [`Session::complete`] awaits
//! it and applies the outcome on the caller's task; the worker never touches
//! session state. Errors leave the session ready for the next run.
//!
//! ```rust,no_run
//! use prompt_tester::client::PromptClient;
//! use prompt_tester::session::{Session, TestForm};
//!
//! # async fn demo() -> prompt_tester::Result<()> {
//! let mut session = Session::new(PromptClient::from_env()?);
//! session.form = TestForm::new("sonar", "What changed in the latest Rust release?");
//! let report = session.run().await?;
//! println!("{}", prompt_tester::session::render::response_text(&report.run.result));
//! # Ok(())
//! # }
//! ```

pub mod form;
pub mod history;
pub mod record;
pub mod render;

use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::client::{PromptClient, TestRun};
use crate::drivers::Diagnostic;
use crate::structured::{validate, ValidationOutcome};
use crate::{Error, ErrorContext, Result};

pub use form::{LlmParamsForm, LocationForm, Normalized, SearchParamsForm, TestForm};
pub use history::HistoryEntry;
pub use record::TestRecord;

/// A completed run with everything shown next to it.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run: TestRun,
    /// Form fields that could not be parsed.
    pub form_diagnostics: Vec<Diagnostic>,
    /// Present when JSON output was requested.
    pub validation: Option<ValidationOutcome>,
}

impl RunReport {
    /// Form, build and response diagnostics, in that order.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.form_diagnostics.iter().chain(self.run.diagnostics())
    }
}

struct PendingRun {
    form: TestForm,
    form_diagnostics: Vec<Diagnostic>,
    handle: JoinHandle<Result<TestRun>>,
}

pub struct Session {
    client: Arc<PromptClient>,
    pub form: TestForm,
    pending: Option<PendingRun>,
    current: Option<RunReport>,
    history: Vec<HistoryEntry>,
}

impl Session {
    pub fn new(client: PromptClient) -> Self {
        Self {
            client: Arc::new(client),
            form: TestForm::default(),
            pending: None,
            current: None,
            history: Vec::new(),
        }
    }

    pub fn client(&self) -> &PromptClient {
        &self.client
    }

    /// Whether a run is in flight; the trigger stays disabled until it completes.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn current(&self) -> Option<&RunReport> {
        self.current.as_ref()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Validate the form, build the request and start the call on a blocking worker.
    ///
    /// Configuration errors are returned here and nothing is sent. Must be
    /// called from within a Tokio runtime.
    pub fn submit(&mut self) -> Result<()> {
        if self.pending.is_some() {
            return Err(Error::RunInFlight);
        }

        let Normalized {
            params,
            diagnostics: form_diagnostics,
        } = self.form.normalize();
        for d in &form_diagnostics {
            warn!("{}", d);
        }

        let prepared = self.client.prepare(&params)?;

        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            Error::runtime_with_context(
                "no async runtime available for the test run",
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("session"),
            )
        })?;
        let client = Arc::clone(&self.client);
        let handle = runtime.spawn_blocking(move || client.execute(prepared));
        debug!(model = %params.model, "test run submitted");

        self.pending = Some(PendingRun {
            form: self.form.clone(),
            form_diagnostics,
            handle,
        });
        Ok(())
    }

    /// Wait for the in-flight run and apply its outcome.
    ///
    /// On success the run becomes current, is validated when JSON output was
    /// requested and is appended to history. On failure the error is
    /// returned and the previous current run is kept.
    pub async fn complete(&mut self) -> Result<&RunReport> {
        let pending = self.pending.take().ok_or_else(|| {
            Error::runtime_with_context(
                "no test run in progress",
                ErrorContext::new().with_source("session"),
            )
        })?;

        let run = pending.handle.await.map_err(|e| {
            Error::runtime_with_context(
                "test run worker failed",
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("session"),
            )
        })??;

        let validation = pending
            .form
            .expected_shape()
            .map(|shape| validate(&run.result.assistant_content, Some(shape)));

        self.history.push(HistoryEntry::new(&pending.form, &run));
        Ok(&*self.current.insert(RunReport {
            run,
            form_diagnostics: pending.form_diagnostics,
            validation,
        }))
    }

    /// `submit` then `complete`.
    pub async fn run(&mut self) -> Result<&RunReport> {
        self.submit()?;
        self.complete().await
    }

    /// Clear the prompt and reference URL.
    pub fn clear(&mut self) {
        self.form.prompt.clear();
        self.form.url.clear();
    }

    /// Save the current form together with the last response.
    pub fn save_record(&self, path: impl AsRef<Path>) -> Result<TestRecord> {
        let current = self
            .current
            .as_ref()
            .ok_or(Error::NothingToSave { what: "test" })?;
        let mut form = self.form.clone();
        if !form.use_json {
            form.json_format.clear();
        }
        let record = TestRecord::new(form, current.run.result.raw.clone());
        record.save(path)?;
        Ok(record)
    }

    /// Replace the form with a saved test. The form is untouched if loading fails.
    pub fn load_record(&mut self, path: impl AsRef<Path>) -> Result<&TestForm> {
        let record = TestRecord::load(path)?;
        self.form = record.form;
        Ok(&self.form)
    }

    /// Export the history, returning the number of entries written.
    pub fn export_history(&self, path: impl AsRef<Path>) -> Result<usize> {
        if self.history.is_empty() {
            return Err(Error::NothingToSave {
                what: "test history",
            });
        }
        history::export(&self.history, path)?;
        Ok(self.history.len())
    }
}
