//! 类型系统模块：请求参数、消息与归一化响应。
//!
//! # Types Module
//!
//! Core data types shared by the request builder, transport, and session layers.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ChatMessage`] | One conversation turn (system, user, or assistant) |
//! | [`RequestParameters`] | Normalized, provider-agnostic parameter bag |
//! | [`Param`] | Identifier for each optional request parameter |
//! | [`ApiResult`] | Normalized response: content, usage, provenance, raw body |
//! | [`ToolDefinition`] | Function-tool definition in wire shape |
//!
//! ## Example
//!
//! ```rust
//! use prompt_tester::types::{ChatMessage, RecencyFilter, RequestParameters};
//!
//! let mut params = RequestParameters::new("sonar", vec![ChatMessage::user("ping")]);
//! params.temperature = Some(0.2);
//! params.recency_filter = Some(RecencyFilter::Week);
//! ```

pub mod message;
pub mod params;
pub mod response;
pub mod tool;

pub use message::{ChatMessage, Role};
pub use params::{
    ContextSize, Param, ReasoningEffort, RecencyFilter, RequestParameters, UserLocation,
    Verbosity, MAX_DOMAIN_FILTERS,
};
pub use response::{ApiResult, Auxiliary, Usage};
pub use tool::{ToolChoice, ToolDefinition};
