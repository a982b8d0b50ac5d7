//! Dotted field paths over decoded JSON.
//!
//! A path such as `presentation.slides.*.elements.*.action` walks object
//! fields, fans out over collections at `*` and can pick a single array
//! element with `[n]`. Evaluation never fails: a missing field or a value of
//! the wrong shape simply contributes nothing.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

/// A parsed path to zero or more nodes in a JSON document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    /// The raw path string
    pub raw: String,
    /// Parsed path segments
    pub segments: Vec<PathSegment>,
}

/// A segment in a field path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A named object field (e.g. "questions")
    Field(String),
    /// An array index (e.g. [0])
    Index(usize),
    /// Every element of an array, or every value of an object
    Wildcard,
}

/// Error returned for unusable path strings
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid field path '{raw}': {reason}")]
pub struct PathError {
    pub raw: String,
    pub reason: String,
}

impl FieldPath {
    /// Parse a dotted path
    pub fn parse(path: &str) -> Result<Self, PathError> {
        let invalid = |reason: &str| PathError {
            raw: path.to_string(),
            reason: reason.to_string(),
        };

        if path.trim().is_empty() {
            return Err(invalid("path is empty"));
        }

        let mut segments = Vec::new();
        for part in path.split('.') {
            let part = part.trim();
            if part.is_empty() {
                return Err(invalid("empty segment"));
            }

            if part == "*" {
                segments.push(PathSegment::Wildcard);
            } else if let Some(inner) = part.strip_prefix('[').and_then(|p| p.strip_suffix(']')) {
                let index = inner
                    .parse::<usize>()
                    .map_err(|_| invalid("array index must be a non-negative integer"))?;
                segments.push(PathSegment::Index(index));
            } else {
                segments.push(PathSegment::Field(part.to_string()));
            }
        }

        Ok(Self {
            raw: path.to_string(),
            segments,
        })
    }

    /// Resolve the path against `root`, returning matches in document order
    pub fn resolve<'a>(&self, root: &'a Value) -> Vec<&'a Value> {
        let mut current = vec![root];

        for segment in &self.segments {
            let mut next = Vec::with_capacity(current.len());
            for value in current {
                match segment {
                    PathSegment::Field(name) => {
                        if let Some(child) = value.get(name.as_str()) {
                            next.push(child);
                        }
                    }
                    PathSegment::Index(index) => {
                        if let Some(child) = value.as_array().and_then(|a| a.get(*index)) {
                            next.push(child);
                        }
                    }
                    PathSegment::Wildcard => match value {
                        Value::Array(items) => next.extend(items.iter()),
                        Value::Object(map) => next.extend(map.values()),
                        _ => {}
                    },
                }
            }
            if next.is_empty() {
                return next;
            }
            current = next;
        }

        current
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
