//! Structured output: `response_format` handling and response validation.
//!
//! - [`ResponseFormatKind`]: classify a format object by its `type`
//! - [`parse_response_format`]: turn user-entered JSON text into a format object
//! - [`validate`]: shallow check of assistant content against an expected shape
//!
//! # Examples
//!
//! ```
//! use prompt_tester::structured::{validate, ValidationOutcome};
//!
//! let outcome = validate(r#"{"answer": 4}"#, Some(r#"{"answer": 0, "unit": ""}"#));
//! assert_eq!(outcome, ValidationOutcome::ValidJsonMissingKeys(vec!["unit".into()]));
//! ```

pub mod response_format;
pub mod validator;

pub use response_format::{
    json_schema_format, parse_response_format, ResponseFormatKind, DEFAULT_RESPONSE_FORMAT,
};
pub use validator::{validate, ValidationOutcome, MAX_REPORTED_MISSING_KEYS};
