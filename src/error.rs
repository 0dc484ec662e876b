use std::error::Error as StdError;
use std::fmt;

use crate::codec::CodecError;

/// Errors surfaced by route registration and [`Dispatcher::call`](crate::dispatcher::Dispatcher::call).
///
/// Hook and handler errors are carried as [`anyhow::Error`] and displayed
/// verbatim, so the transport sees exactly what the hook or handler said.
/// Panics never appear here with their original detail: they collapse into
/// [`DispatchError::Internal`].
#[derive(Debug)]
pub enum DispatchError {
    /// A route template could not be parsed. Raised at registration time only.
    MalformedPattern {
        /// The offending template
        template: String,
    },
    /// No registered route matches the method and path.
    NotFound {
        /// Request method
        method: String,
        /// Request path
        path: String,
    },
    /// The payload could not be decoded into the handler's payload type.
    BadRequest(CodecError),
    /// The route's pre-request hook rejected the call.
    Hook(anyhow::Error),
    /// The handler returned an error. This is the ordinary business failure path.
    Handler(anyhow::Error),
    /// A hook or handler panicked, or a result could not be converted.
    Internal,
}

impl DispatchError {
    /// Wire status the transport should use for this error.
    ///
    /// Only `NotFound` and `BadRequest` are client-caused; everything else is
    /// reported as a server fault.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            DispatchError::NotFound { .. } => 404,
            DispatchError::BadRequest(_) => 400,
            _ => 500,
        }
    }

    /// True when the error came from the handler's own return value.
    #[must_use]
    pub fn is_handler_error(&self) -> bool {
        matches!(self, DispatchError::Handler(_))
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::MalformedPattern { template } => {
                write!(f, "Invalid path: {template}")
            }
            DispatchError::NotFound { .. } => write!(f, "Path not found"),
            DispatchError::BadRequest(err) => write!(f, "{err}"),
            DispatchError::Hook(err) => write!(f, "{err}"),
            DispatchError::Handler(err) => write!(f, "{err}"),
            DispatchError::Internal => write!(f, "Internal error"),
        }
    }
}

// Wrapped errors are displayed verbatim, so `source` skips them and points at
// their cause. Otherwise a chain renders the same message twice.
impl StdError for DispatchError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            DispatchError::BadRequest(err) => err.source(),
            DispatchError::Hook(err) | DispatchError::Handler(err) => err.chain().nth(1),
            _ => None,
        }
    }
}

impl From<CodecError> for DispatchError {
    fn from(err: CodecError) -> Self {
        DispatchError::BadRequest(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        let not_found = DispatchError::NotFound {
            method: "DELETE".into(),
            path: "/unknown".into(),
        };
        assert_eq!(not_found.status_code(), 404);

        let bad = DispatchError::BadRequest(CodecError::Json(
            serde_json::from_slice::<serde_json::Value>(b"{\"x\":").unwrap_err(),
        ));
        assert_eq!(bad.status_code(), 400);

        assert_eq!(DispatchError::Internal.status_code(), 500);
        assert_eq!(
            DispatchError::Hook(anyhow::anyhow!("denied")).status_code(),
            500
        );
        assert_eq!(
            DispatchError::Handler(anyhow::anyhow!("nope")).status_code(),
            500
        );
    }

    #[test]
    fn test_hook_and_handler_messages_pass_through() {
        assert_eq!(DispatchError::Hook(anyhow::anyhow!("ERROR")).to_string(), "ERROR");
        assert_eq!(
            DispatchError::Handler(anyhow::anyhow!("PANICKING")).to_string(),
            "PANICKING"
        );
        assert_eq!(DispatchError::Internal.to_string(), "Internal error");
    }

    fn chain_messages(err: &DispatchError) -> Vec<String> {
        let mut out = vec![err.to_string()];
        let mut next = err.source();
        while let Some(cause) = next {
            out.push(cause.to_string());
            next = cause.source();
        }
        out
    }

    #[test]
    fn test_error_chain_does_not_repeat_messages() {
        let plain = DispatchError::Handler(anyhow::anyhow!("ERROR"));
        assert!(plain.source().is_none());
        assert_eq!(chain_messages(&plain), ["ERROR"]);

        let wrapped = DispatchError::Hook(
            anyhow::Error::new(std::io::Error::other("disk unavailable"))
                .context("token store lookup failed"),
        );
        assert_eq!(
            chain_messages(&wrapped),
            ["token store lookup failed", "disk unavailable"]
        );

        let bad = DispatchError::from(CodecError::Json(
            serde_json::from_slice::<serde_json::Value>(b"[1,").unwrap_err(),
        ));
        assert_eq!(chain_messages(&bad).len(), 1);
    }
}
