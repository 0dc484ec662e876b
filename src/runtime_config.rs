//! # Runtime Configuration Module
//!
//! Environment-variable configuration for the dispatcher and the transport
//! adapter.
//!
//! ## Environment Variables
//!
//! ### `DISPATCH_CAPTURE_BACKTRACE`
//!
//! `true` (default) forces a backtrace capture whenever a handler or hook
//! panics, regardless of `RUST_BACKTRACE`. `false` defers to `RUST_BACKTRACE`.
//!
//! ### `DISPATCH_CORS_ALLOW_ORIGIN`
//!
//! Value of `Access-Control-Allow-Origin` set by
//! [`ApiService`](crate::server::ApiService). Default: `*`.
//!
//! ## Usage
//!
//! ```rust
//! use dispatch_core::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("CORS origin: {}", config.cors_allow_origin);
//! ```

use std::env;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Force backtrace capture on panics (default: true)
    pub capture_backtrace: bool,
    /// `Access-Control-Allow-Origin` value (default: `*`)
    pub cors_allow_origin: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            capture_backtrace: true,
            cors_allow_origin: "*".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables. Unset or invalid values
    /// fall back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            capture_backtrace: lookup("DISPATCH_CAPTURE_BACKTRACE")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.capture_backtrace),
            cors_allow_origin: lookup("DISPATCH_CORS_ALLOW_ORIGIN")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.cors_allow_origin),
        }
    }
}

pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> RuntimeConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RuntimeConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert!(config.capture_backtrace);
        assert_eq!(config.cors_allow_origin, "*");
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DISPATCH_CAPTURE_BACKTRACE", "off"),
            ("DISPATCH_CORS_ALLOW_ORIGIN", "https://example.com"),
        ]);
        assert!(!config.capture_backtrace);
        assert_eq!(config.cors_allow_origin, "https://example.com");
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("DISPATCH_CAPTURE_BACKTRACE", "maybe"),
            ("DISPATCH_CORS_ALLOW_ORIGIN", "  "),
        ]);
        assert_eq!(config, RuntimeConfig::default());
    }
}
