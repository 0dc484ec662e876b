//! # Security Module
//!
//! Seam between the dispatcher and whatever signs and verifies tokens.
//!
//! The dispatcher never inspects identities. A [`ClaimsProvider`] turns a raw
//! token into an opaque claims value, and the
//! [`AuthorizerHook`](crate::middleware::AuthorizerHook) attaches that value
//! to the [`RequestContext`](crate::RequestContext) before the handler runs.
//!
//! ```rust
//! use dispatch_core::security::{ClaimsProvider, StaticClaimsProvider};
//! use serde_json::json;
//!
//! let provider = StaticClaimsProvider::new()
//!     .with_token("test123", json!({ "sub": "alice" }));
//! assert_eq!(provider.parse_token("test123").unwrap()["sub"], "alice");
//! assert!(provider.parse_token("other").is_err());
//! ```

use std::collections::HashMap;

use serde_json::Value;

/// Parses a token into claims.
///
/// Implementations wrap the real token service (JWT verification, session
/// lookup, ...). Errors are never shown to the caller verbatim; the hook
/// replaces them with a generic message.
pub trait ClaimsProvider: Send + Sync {
    fn parse_token(&self, token: &str) -> anyhow::Result<Value>;
}

/// Fixed token → claims table, for development setups and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticClaimsProvider {
    tokens: HashMap<String, Value>,
}

impl StaticClaimsProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>, claims: Value) -> Self {
        self.tokens.insert(token.into(), claims);
        self
    }
}

impl ClaimsProvider for StaticClaimsProvider {
    fn parse_token(&self, token: &str) -> anyhow::Result<Value> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unknown token"))
    }
}
