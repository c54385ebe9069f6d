use crate::protocol::ProviderKind;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "config.openai_base_url", "record.llm_params")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected format, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "client_config", "record_loader")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the prompt tester.
///
/// Configuration errors are raised before any network action; runtime errors
/// come out of the background call and are surfaced as a single message.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Unknown model '{model}'")]
    UnknownModel { model: String },

    #[error("Missing API key for {provider}: set {env_var}")]
    MissingCredential {
        provider: ProviderKind,
        env_var: &'static str,
    },

    #[error("Please enter a prompt")]
    EmptyPrompt,

    #[error("A test run is already in progress")]
    RunInFlight,

    #[error("No {what} to save")]
    NothingToSave { what: &'static str },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Network error during API request: {0}")]
    Transport(#[from] crate::transport::TransportError),

    #[error("API request failed with status {status}: {message}{}", format_error_type(.error_type))]
    Api {
        status: u16,
        message: String,
        error_type: Option<String>,
    },

    #[error("Failed to decode API response: {message}")]
    Decode { message: String, body: String },

    #[error("Runtime error: {message}{}", format_context(.context))]
    Runtime {
        message: String,
        context: ErrorContext,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

fn format_error_type(error_type: &Option<String>) -> String {
    match error_type {
        Some(t) => format!(" (Type: {})", t),
        None => String::new(),
    }
}

impl Error {
    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Create a new runtime error with structured context
    pub fn runtime_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Runtime {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } | Error::Runtime { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Errors detected before any network action, reported synchronously.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::UnknownModel { .. }
                | Error::MissingCredential { .. }
                | Error::EmptyPrompt
                | Error::Configuration { .. }
        )
    }

    /// Errors produced by the network call itself.
    pub fn is_runtime(&self) -> bool {
        matches!(
            self,
            Error::Transport(_) | Error::Api { .. } | Error::Decode { .. } | Error::Runtime { .. }
        )
    }
}
