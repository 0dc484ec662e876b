//! Per-request correlation ids.
//!
//! Every call carries a [`RequestId`] in its context. The transport adopts the
//! caller's `X-Request-Id` when it holds a ULID and mints a fresh one otherwise,
//! then echoes the id back so client and server logs can be joined.

use std::fmt;
use std::str::FromStr;

use ulid::Ulid;

/// ULID-backed correlation id, sortable by creation time.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct RequestId(Ulid);

impl RequestId {
    /// Mint a new id from the current time.
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Adopt an inbound header value, or mint a new id when it is absent or
    /// not a ULID. Surrounding whitespace is ignored.
    #[must_use]
    pub fn from_header_or_new(header_value: Option<&str>) -> Self {
        match header_value.map(str::parse::<Self>) {
            Some(Ok(id)) => id,
            _ => Self::new(),
        }
    }

    #[must_use]
    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for RequestId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s.trim()).map(Self)
    }
}
