//! Path pattern matching for the dispatch table.

use regex::Regex;

use crate::error::{Result, RouterError};
use crate::request::PathParams;

/// A segment in a path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A literal string segment.
    Literal(String),
    /// A parameter segment (e.g., {id}).
    Param(String),
    /// A wildcard segment (matches remainder of path).
    Wildcard(String),
}

/// A compiled path pattern for matching URLs.
#[derive(Debug, Clone)]
pub struct PathPattern {
    /// The original pattern string.
    pattern: String,
    /// Parsed segments.
    segments: Vec<PathSegment>,
    /// Compiled regex for matching.
    regex: Regex,
    /// Parameter names in order.
    param_names: Vec<String>,
}

impl PathPattern {
    /// Parses a path pattern string.
    ///
    /// Pattern syntax:
    /// - `/users` - Literal path
    /// - `/users/{id}` - Path with parameter
    /// - `/files/{*path}` - Wildcard parameter (matches rest of path)
    ///
    /// A trailing slash is optional when matching.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidPattern`] if the path is not absolute,
    /// a brace segment is malformed, a wildcard is not the last segment, or
    /// a parameter name repeats.
    ///
    /// # Example
    ///
    /// ```
    /// use oxide_subrouter::PathPattern;
    ///
    /// let pattern = PathPattern::new("/posts/{id}/comments/{comment_id}").unwrap();
    /// let params = pattern.match_path("/posts/123/comments/456").unwrap();
    /// assert_eq!(params.get("id"), Some("123"));
    /// assert_eq!(params.get("comment_id"), Some("456"));
    /// ```
    pub fn new(pattern: &str) -> Result<Self> {
        if !pattern.starts_with('/') {
            return Err(RouterError::invalid(pattern, "path must start with '/'"));
        }

        let mut segments = Vec::new();
        let mut param_names: Vec<String> = Vec::new();
        let mut regex_str = String::from("^");

        let parts: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
        for (i, part) in parts.iter().enumerate() {
            regex_str.push('/');

            let segment = parse_segment(pattern, part)?;
            match &segment {
                PathSegment::Literal(s) => regex_str.push_str(&regex::escape(s)),
                PathSegment::Param(name) => {
                    regex_str.push_str("([^/]+)");
                    param_names.push(name.clone());
                }
                PathSegment::Wildcard(name) => {
                    if i + 1 != parts.len() {
                        return Err(RouterError::invalid(
                            pattern,
                            "wildcard must be the last segment",
                        ));
                    }
                    regex_str.push_str("(.+)");
                    param_names.push(name.clone());
                }
            }
            segments.push(segment);
        }

        for (i, name) in param_names.iter().enumerate() {
            if param_names[..i].contains(name) {
                return Err(RouterError::invalid(
                    pattern,
                    format!("duplicate parameter name {name:?}"),
                ));
            }
        }

        regex_str.push_str("/?$");

        let regex = Regex::new(&regex_str)
            .map_err(|e| RouterError::invalid(pattern, e.to_string()))?;

        Ok(Self {
            pattern: pattern.to_string(),
            segments,
            regex,
            param_names,
        })
    }

    /// Attempts to match a path against this pattern.
    ///
    /// Returns extracted parameters if the path matches.
    pub fn match_path(&self, path: &str) -> Option<PathParams> {
        let caps = self.regex.captures(path)?;

        let mut params = PathParams::new();

        for (i, name) in self.param_names.iter().enumerate() {
            if let Some(value) = caps.get(i + 1) {
                params.insert(name.clone(), value.as_str());
            }
        }

        Some(params)
    }

    /// Returns the original pattern string.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the parameter names.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// The pattern with parameter names erased.
    ///
    /// Two patterns with the same shape match exactly the same paths, so the
    /// dispatch table uses this to detect conflicting registrations.
    pub fn shape(&self) -> String {
        let mut shape = String::new();
        for segment in &self.segments {
            shape.push('/');
            match segment {
                PathSegment::Literal(s) => shape.push_str(s),
                PathSegment::Param(_) => shape.push_str("{}"),
                PathSegment::Wildcard(_) => shape.push_str("{*}"),
            }
        }
        if shape.is_empty() {
            shape.push('/');
        }
        shape
    }

    /// Per-segment weights: literal 2, parameter 1, wildcard 0.
    ///
    /// Among patterns matching the same path, the one whose weights compare
    /// greatest (lexicographically, from the first segment) is the most
    /// specific.
    pub fn specificity(&self) -> Vec<u8> {
        self.segments
            .iter()
            .map(|segment| match segment {
                PathSegment::Literal(_) => 2,
                PathSegment::Param(_) => 1,
                PathSegment::Wildcard(_) => 0,
            })
            .collect()
    }
}

fn parse_segment(pattern: &str, part: &str) -> Result<PathSegment> {
    let Some(inner) = part.strip_prefix('{') else {
        if part.contains(['{', '}']) {
            return Err(RouterError::invalid(
                pattern,
                format!("stray brace in segment {part:?}"),
            ));
        }
        return Ok(PathSegment::Literal(part.to_string()));
    };

    let inner = inner.strip_suffix('}').ok_or_else(|| {
        RouterError::invalid(pattern, format!("unclosed parameter in segment {part:?}"))
    })?;
    let (wildcard, name) = match inner.strip_prefix('*') {
        Some(name) => (true, name),
        None => (false, inner),
    };

    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(RouterError::invalid(
            pattern,
            format!("bad parameter name in segment {part:?}"),
        ));
    }

    Ok(if wildcard {
        PathSegment::Wildcard(name.to_string())
    } else {
        PathSegment::Param(name.to_string())
    })
}
