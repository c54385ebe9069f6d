//! # prompt-tester
//!
//! 面向两家托管大模型 API 的手动提示词测试工具核心库。
//!
//! Core of a manual prompt tester for two hosted chat-completion APIs: a
//! search-augmented provider (Perplexity Sonar) and a general-purpose
//! provider (OpenAI).
//!
//! ## Overview
//!
//! A test run takes a flat set of user-entered fields, normalizes them into
//! provider-agnostic [`RequestParameters`], assembles the wire payload the
//! selected model accepts, sends one request, and interprets the response
//! into an [`ApiResult`]. JSON output can then be checked against an expected
//! shape.
//!
//! - **Capability-driven**: a static table decides which parameters reach the
//!   wire; unsupported ones become [`Diagnostic`]s, never errors
//! - **Closed provider set**: one [`ProviderDriver`](drivers::ProviderDriver)
//!   per provider, chosen once per request
//! - **Raw retained**: the unmodified response body is kept for display and export
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use prompt_tester::{ChatMessage, PromptClient, RequestParameters};
//!
//! fn main() -> prompt_tester::Result<()> {
//!     let client = PromptClient::from_env()?;
//!
//!     let mut params = RequestParameters::new("sonar", vec![ChatMessage::user("ping")]);
//!     params.temperature = Some(0.2);
//!
//!     let run = client.run(&params)?;
//!     println!("{}", run.result.assistant_content);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`protocol`] | Capability table and model catalog |
//! | [`types`] | Messages, request parameters, normalized results |
//! | [`drivers`] | Request building and response interpretation per provider |
//! | [`structured`] | `response_format` handling and response validation |
//! | [`transport`] | Blocking HTTP transport |
//! | [`client`] | Configuration and the request/response cycle |
//! | [`session`] | Form normalization, saved tests, history, background runs |
//! | [`tokens`] | Cost estimation |

pub mod client;
pub mod drivers;
pub mod protocol;
pub mod session;
pub mod structured;
pub mod tokens;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use client::{ClientConfig, PromptClient, TestRun};
pub use drivers::{BuiltRequest, Diagnostic};
pub use protocol::{lookup, ModelFamily, ProviderCapability, ProviderKind};
pub use structured::{validate, ValidationOutcome};
pub use types::{ApiResult, ChatMessage, RequestParameters, Role, Usage};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
