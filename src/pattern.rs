//! File matching for the include/exclude options.
//!
//! A literal matches when the identifier ends with it or contains it anywhere.
//! `"main.tsx"` therefore also excludes `/src/domain.tsx`. Keep it that way;
//! existing configurations rely on the loose match.

use regex::Regex;
use serde::Deserialize;

use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "PatternSpec")]
pub enum Pattern {
    Literal(String),
    Regex(Regex),
    /// Matches when any member matches; evaluated in order, stops at the first hit.
    Any(Vec<Pattern>),
}

/// Wire shape accepted in JSON configuration.
#[derive(Deserialize)]
#[serde(untagged)]
enum PatternSpec {
    Literal(String),
    Regex { regex: String },
    Any(Vec<PatternSpec>),
}

impl TryFrom<PatternSpec> for Pattern {
    type Error = regex::Error;

    fn try_from(spec: PatternSpec) -> std::result::Result<Self, Self::Error> {
        Ok(match spec {
            PatternSpec::Literal(s) => Pattern::Literal(s),
            PatternSpec::Regex { regex } => Pattern::Regex(Regex::new(&regex)?),
            PatternSpec::Any(items) => Pattern::Any(
                items
                    .into_iter()
                    .map(Pattern::try_from)
                    .collect::<std::result::Result<_, _>>()?,
            ),
        })
    }
}

impl Pattern {
    pub fn literal(s: impl Into<String>) -> Self {
        Pattern::Literal(s.into())
    }

    pub fn regex(re: &str) -> Result<Self> {
        Ok(Pattern::Regex(Regex::new(re)?))
    }

    pub fn any<I, P>(items: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Pattern>,
    {
        Pattern::Any(items.into_iter().map(Into::into).collect())
    }

    pub fn matches(&self, id: &str) -> bool {
        match self {
            Pattern::Literal(s) => id.ends_with(s.as_str()) || id.contains(s.as_str()),
            Pattern::Regex(re) => re.is_match(id),
            Pattern::Any(items) => items.iter().any(|p| p.matches(id)),
        }
    }
}

impl From<&str> for Pattern {
    fn from(s: &str) -> Self {
        Pattern::Literal(s.to_string())
    }
}

impl From<String> for Pattern {
    fn from(s: String) -> Self {
        Pattern::Literal(s)
    }
}

impl From<Regex> for Pattern {
    fn from(re: Regex) -> Self {
        Pattern::Regex(re)
    }
}

/// Whether a normalized file id is eligible for tagging at all.
///
/// `base_path` must already be trimmed of its surrounding slashes.
pub fn in_scope(id: &str, include: &Pattern, exclude: &Pattern, base_path: &str) -> bool {
    include.matches(id) && !exclude.matches(id) && id.contains(&format!("/{base_path}/"))
}
