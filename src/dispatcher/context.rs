use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use smallvec::SmallVec;

use crate::ids::RequestId;
use crate::router::ParamVec;

/// Maximum inline headers/cookies before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Header/cookie storage. Names are `Arc<str>` so repeated names share one
/// allocation; values are per-request strings.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Per-call state threaded through the hook and the handler.
///
/// The transport creates one per inbound request; the dispatcher fills in
/// [`path_params`](Self::path_params) after matching, and a hook may attach
/// [`claims`](Self::claims). Cloning produces a full structural copy, which is
/// what handlers registered with an owned context receive.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Correlation id used in every log line for this call
    pub request_id: RequestId,
    /// Path variables captured by the matched route
    pub path_params: ParamVec,
    /// Request headers as received by the transport
    pub headers: HeaderVec,
    /// Cookies parsed from the `Cookie` header
    pub cookies: HeaderVec,
    /// Authenticated identity attached by a hook. Opaque to the dispatcher.
    pub claims: Option<Value>,
    /// Headers the handler wants the transport to add to the response
    pub response_headers: HeaderVec,
}

impl RequestContext {
    /// Create an empty context with a fresh request id.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper to add a request header.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((Arc::from(name), value.into()));
        self
    }

    /// Builder-style helper to add a cookie.
    #[must_use]
    pub fn with_cookie(mut self, name: &str, value: impl Into<String>) -> Self {
        self.cookies.push((Arc::from(name), value.into()));
        self
    }

    /// Get a path parameter by name
    ///
    /// Uses "last write wins" semantics: if a pattern repeats a variable name,
    /// the capture furthest along the path is returned.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Convert path_params to a HashMap. Later duplicates overwrite earlier ones.
    #[must_use]
    pub fn path_params_map(&self) -> HashMap<String, String> {
        self.path_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get a cookie by name
    #[inline]
    #[must_use]
    pub fn get_cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Append a response header. Repeated names are kept, which is what
    /// `Set-Cookie` needs.
    pub fn add_response_header(&mut self, name: &str, value: impl Into<String>) {
        self.response_headers.push((Arc::from(name), value.into()));
    }

    /// Replace any response header with the same name (case-insensitive).
    pub fn set_response_header(&mut self, name: &str, value: impl Into<String>) {
        self.response_headers
            .retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.response_headers.push((Arc::from(name), value.into()));
    }
}

/// Parse a `Cookie` header value into name/value pairs.
///
/// Malformed pairs (no `=`) are skipped.
#[must_use]
pub fn parse_cookie_header(header: &str) -> HeaderVec {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((Arc::from(name), value.trim().to_string()))
        })
        .collect()
}
