//! # Router Module
//!
//! Path matching and route resolution.
//!
//! ## Overview
//!
//! - [`PathPattern`] parses a template such as `GET/users/{id}` into a method
//!   and ordered literal/variable segments, and matches concrete requests.
//! - [`RegistryBuilder`] collects routes at startup; [`Registry`] is the frozen
//!   table the dispatcher reads.
//!
//! ## Matching rules
//!
//! 1. The method must be byte-equal (no case folding).
//! 2. One leading `/` is dropped from the request path, then it is split on `/`.
//! 3. The segment count must equal the pattern's exactly.
//! 4. Literals must be byte-equal; variables capture whatever is there.
//!
//! The first registered route that matches wins, even if a later one is a
//! "better" fit.
//!
//! ## Example
//!
//! ```rust
//! use dispatch_core::router::PathPattern;
//!
//! let pattern = PathPattern::parse("GET/users/{id}").unwrap();
//! let params = pattern.matches("GET", "/users/123").unwrap();
//! assert_eq!(&*params[0].0, "id");
//! assert_eq!(params[0].1, "123");
//! ```

mod core;
mod pattern;

pub use core::{ParamVec, Registry, RegistryBuilder, Route, MAX_INLINE_PARAMS};
pub use pattern::{PathPattern, Segment};
