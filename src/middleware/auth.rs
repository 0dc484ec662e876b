use std::sync::Arc;

use tracing::{debug, warn};

use super::{HookInput, PreRequestHook};
use crate::security::ClaimsProvider;

/// Cookie the authorizer falls back to when no `Authorization` header is sent
pub const DEFAULT_AUTH_COOKIE: &str = "dispatch-auth";

/// Hook that requires a valid token and attaches its claims to the context.
///
/// The token is read from the `Authorization` header (an optional `Bearer `
/// prefix is stripped) or, if that header is absent, from the auth cookie.
pub struct AuthorizerHook {
    provider: Arc<dyn ClaimsProvider>,
    cookie_name: String,
}

impl AuthorizerHook {
    pub fn new(provider: Arc<dyn ClaimsProvider>) -> Self {
        Self {
            provider,
            cookie_name: DEFAULT_AUTH_COOKIE.to_string(),
        }
    }

    /// Override the cookie the token is read from.
    #[must_use]
    pub fn cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    fn token<'a>(&self, input: &'a HookInput<'_>) -> Option<&'a str> {
        let from_header = input.ctx.get_header("authorization").map(|h| {
            h.strip_prefix("Bearer ")
                .or_else(|| h.strip_prefix("bearer "))
                .unwrap_or(h)
                .trim()
        });
        // A blank header counts as absent so the cookie still applies
        from_header
            .filter(|t| !t.is_empty())
            .or_else(|| input.ctx.get_cookie(&self.cookie_name))
            .filter(|t| !t.is_empty())
    }
}

impl PreRequestHook for AuthorizerHook {
    fn before(&self, input: &mut HookInput<'_>) -> anyhow::Result<()> {
        let Some(token) = self.token(input) else {
            debug!(request_id = %input.ctx.request_id, "No authorization token presented");
            anyhow::bail!("Missing authorization token");
        };

        let claims = match self.provider.parse_token(token) {
            Ok(claims) => claims,
            Err(err) => {
                warn!(
                    request_id = %input.ctx.request_id,
                    error = %err,
                    "Authorization token rejected"
                );
                anyhow::bail!("Invalid authorization token");
            }
        };

        input.ctx.claims = Some(claims);
        Ok(())
    }
}
