//! HTTP transport adapter.
//!
//! [`ApiService`] turns an `http::Request<Vec<u8>>` into a dispatch call and
//! the outcome into an `http::Response<Vec<u8>>`. Any server loop that speaks
//! the `http` types can drive it.

mod service;

pub use service::{context_from_headers, ApiService, REQUEST_ID_HEADER};
