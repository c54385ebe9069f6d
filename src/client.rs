//! Prompt test client: configuration, preflight, and the single request/response cycle.
//!
//! Keep the public surface small: [`ClientConfig`] says where and with which
//! credentials, [`PromptClient`] turns [`RequestParameters`](crate::types::RequestParameters)
//! into a [`TestRun`].

pub mod config;
pub mod core;
mod preflight;

pub use self::config::ClientConfig;
pub use self::core::{PreparedRequest, PromptClient, TestRun};
