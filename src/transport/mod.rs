//! 传输层 — 单次阻塞式 HTTP 调用
//!
//! HTTP transport: one authenticated, non-streaming POST per test run, with
//! non-success statuses mapped to [`Error::Api`](crate::Error::Api) and
//! undecodable bodies to [`Error::Decode`](crate::Error::Decode).

pub mod http;

pub use http::{HttpTransport, TransportError};
