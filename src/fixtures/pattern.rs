//! Canonical route pattern model.
//!
//! # Grammar
//! ```text
//! pattern  = "/" segment *( "/" segment )
//! segment  = literal | ":" name | "*" name     ; "*" only in the last segment
//! name     = 1*( ALPHA / DIGIT / "_" )
//! ```
//!
//! # Design Decisions
//! - One canonical source string per route; adapters render it in their own
//!   placeholder syntax so every router sees the same logical route set
//! - Parameters always span a whole segment
//! - Matching never allocates; captured values borrow from the request path

use std::collections::HashSet;
use std::fmt;

/// Placeholder syntax understood by a routing engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternSyntax {
    /// `:name` and `*name`.
    Colon,
    /// `{name}` and `{*name}`.
    Brace,
}

/// A single path segment of a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Literal(String),
    Param(String),
    CatchAll(String),
}

/// Reasons a pattern string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("pattern must start with '/'")]
    NotAbsolute,

    #[error("parameter name is empty")]
    EmptyParamName,

    #[error("invalid parameter name: {0}")]
    InvalidParamName(String),

    #[error("duplicate parameter name: {0}")]
    DuplicateParamName(String),

    #[error("catch-all must be the last segment")]
    CatchAllNotLast,

    #[error("segment mixes literal text and a placeholder: {0}")]
    MixedSegment(String),

    #[error("reserved character {0:?} in literal segment")]
    ReservedCharacter(char),
}

/// A parsed route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    segments: Vec<Segment>,
}

impl Pattern {
    /// Parse a canonical (`:name` / `*name`) pattern.
    pub fn parse(source: &str) -> Result<Self, PatternError> {
        let body = source.strip_prefix('/').ok_or(PatternError::NotAbsolute)?;
        let raw: Vec<&str> = body.split('/').collect();
        let last = raw.len() - 1;

        let mut seen = HashSet::new();
        let mut segments = Vec::with_capacity(raw.len());

        for (i, part) in raw.into_iter().enumerate() {
            let segment = if let Some(name) = part.strip_prefix(':') {
                Segment::Param(validate_name(name, part)?.to_string())
            } else if let Some(name) = part.strip_prefix('*') {
                if i != last {
                    return Err(PatternError::CatchAllNotLast);
                }
                Segment::CatchAll(validate_name(name, part)?.to_string())
            } else {
                if part.contains([':', '*']) {
                    return Err(PatternError::MixedSegment(part.to_string()));
                }
                if let Some(c) = part.chars().find(|c| matches!(c, '{' | '}' | '?' | '#')) {
                    return Err(PatternError::ReservedCharacter(c));
                }
                Segment::Literal(part.to_string())
            };

            if let Segment::Param(name) | Segment::CatchAll(name) = &segment {
                if !seen.insert(name.clone()) {
                    return Err(PatternError::DuplicateParamName(name.clone()));
                }
            }
            segments.push(segment);
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The canonical source text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of captured values, catch-all included.
    pub fn param_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| !matches!(s, Segment::Literal(_)))
            .count()
    }

    pub fn literal_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count()
    }

    pub fn has_catch_all(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::CatchAll(_)))
    }

    /// True when the pattern contains no placeholder.
    pub fn is_static(&self) -> bool {
        self.param_count() == 0
    }

    /// Parameter names in declaration order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) | Segment::CatchAll(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Ordering key used to pick between overlapping patterns.
    /// Higher wins: more literal segments, then no catch-all.
    pub fn specificity(&self) -> (usize, bool) {
        (self.literal_count(), !self.has_catch_all())
    }

    /// Render the pattern in the given placeholder syntax.
    pub fn render(&self, syntax: PatternSyntax) -> String {
        if syntax == PatternSyntax::Colon {
            return self.source.clone();
        }
        let mut out = String::with_capacity(self.source.len() + self.segments.len() * 2);
        for segment in &self.segments {
            out.push('/');
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Param(name) => {
                    out.push('{');
                    out.push_str(name);
                    out.push('}');
                }
                Segment::CatchAll(name) => {
                    out.push_str("{*");
                    out.push_str(name);
                    out.push('}');
                }
            }
        }
        out
    }

    /// Match `path` against this pattern, reporting each captured
    /// `(name, value)` to `visit` in declaration order.
    ///
    /// `visit` may be called for a prefix of the parameters before the
    /// match fails; callers must discard captures when `false` is returned.
    pub fn match_path<'s, 'p>(&'s self, path: &'p str, mut visit: impl FnMut(&'s str, &'p str)) -> bool {
        let Some(mut rest) = path.strip_prefix('/') else {
            return false;
        };
        let last = self.segments.len().saturating_sub(1);

        for (i, segment) in self.segments.iter().enumerate() {
            // May capture nothing: `/src/` matches `/src/*filepath`.
            if let Segment::CatchAll(name) = segment {
                visit(name, rest);
                return true;
            }

            let (head, tail) = match rest.find('/') {
                Some(idx) => (&rest[..idx], Some(&rest[idx + 1..])),
                None => (rest, None),
            };

            match segment {
                Segment::Literal(text) if head != text.as_str() => return false,
                Segment::Param(_) if head.is_empty() => return false,
                Segment::Param(name) => visit(name, head),
                _ => {}
            }

            match tail {
                Some(next) if i < last => rest = next,
                Some(_) => return false,
                None => return i == last,
            }
        }
        false
    }

    /// Owned captures for `path`, or `None` when it does not match.
    pub fn captures(&self, path: &str) -> Option<Vec<(String, String)>> {
        let mut params = Vec::new();
        self.match_path(path, |name, value| params.push((name.to_string(), value.to_string())))
            .then_some(params)
    }
}

fn validate_name<'a>(name: &'a str, segment: &str) -> Result<&'a str, PatternError> {
    if name.is_empty() {
        return Err(PatternError::EmptyParamName);
    }
    if !name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return Err(PatternError::InvalidParamName(segment.to_string()));
    }
    Ok(name)
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
