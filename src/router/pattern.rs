//! Route template parsing and matching.
//!
//! A template looks like `GET/users/{id}/posts`. Everything before the first
//! `/` is the method; the remainder is split on `/` into literal and variable
//! segments. Matching is exact: same method, same segment count, and every
//! literal byte-equal.

use std::fmt;
use std::sync::Arc;

use super::core::ParamVec;
use crate::error::DispatchError;

/// One segment of a [`PathPattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the concrete segment exactly
    Literal(String),
    /// Captures the concrete segment under this name
    Variable(Arc<str>),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        // `{}` alone is a literal: a variable needs at least one name byte
        if raw.len() >= 3 && raw.starts_with('{') && raw.ends_with('}') {
            Segment::Variable(Arc::from(&raw[1..raw.len() - 1]))
        } else {
            Segment::Literal(raw.to_string())
        }
    }
}

/// A parsed route template: a method plus ordered segment matchers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    method: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse a template in the format `METHOD/seg1/{var}/seg3`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MalformedPattern`] when the template has no
    /// `/`-separated method prefix (this includes the empty template).
    pub fn parse(template: &str) -> Result<Self, DispatchError> {
        let Some((method, rest)) = template.split_once('/') else {
            return Err(DispatchError::MalformedPattern {
                template: template.to_string(),
            });
        };

        Ok(Self {
            method: method.to_string(),
            segments: rest.split('/').map(Segment::parse).collect(),
        })
    }

    /// Method token this pattern matches, compared case-sensitively.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Segment matchers in path order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Names of the variables this pattern captures, in path order.
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Variable(name) => Some(name.as_ref()),
            Segment::Literal(_) => None,
        })
    }

    /// Match a concrete request against this pattern.
    ///
    /// Returns the captured path variables on success. A single leading `/` is
    /// stripped from `path` before splitting. Nothing is returned on failure,
    /// not even the variables captured before the mismatching segment.
    #[must_use]
    pub fn matches(&self, method: &str, path: &str) -> Option<ParamVec> {
        if method != self.method {
            return None;
        }

        let path = path.strip_prefix('/').unwrap_or(path);
        // Count first so a length mismatch never allocates
        if path.split('/').count() != self.segments.len() {
            return None;
        }

        let mut params = ParamVec::new();
        for (expected, actual) in self.segments.iter().zip(path.split('/')) {
            match expected {
                Segment::Variable(name) => params.push((Arc::clone(name), actual.to_string())),
                Segment::Literal(lit) if lit == actual => {}
                Segment::Literal(_) => return None,
            }
        }
        Some(params)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.method)?;
        for segment in &self.segments {
            match segment {
                Segment::Literal(lit) => write!(f, "/{lit}")?,
                Segment::Variable(name) => write!(f, "/{{{name}}}")?,
            }
        }
        Ok(())
    }
}
