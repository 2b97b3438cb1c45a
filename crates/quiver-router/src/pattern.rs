//! Match expressions used to select routes.

use std::fmt;

use regex::Regex;

use crate::error::RouterError;

/// Pattern input accepted by [`Router::add`](crate::Router::add).
///
/// Literal text is matched exactly. Expression sources are compiled when the
/// route is added, and precompiled expressions are used unchanged.
#[derive(Debug, Clone)]
pub enum PatternSpec {
    /// Exact job-type text.
    Literal(String),
    /// Uncompiled regular expression source.
    Expression(String),
    /// Regular expression compiled by the caller.
    Compiled(Regex),
}

impl PatternSpec {
    /// Builds an expression pattern from regular expression source.
    #[must_use]
    pub fn expression(source: impl Into<String>) -> Self {
        Self::Expression(source.into())
    }

    /// Interprets a declaration key: `/source/` is an expression, anything
    /// else is literal text.
    pub(crate) fn from_key(key: &str) -> Self {
        key.strip_prefix('/')
            .and_then(|rest| rest.strip_suffix('/'))
            .map_or_else(
                || Self::Literal(key.to_owned()),
                |source| Self::Expression(source.to_owned()),
            )
    }
}

impl From<&str> for PatternSpec {
    fn from(value: &str) -> Self {
        Self::Literal(value.to_owned())
    }
}

impl From<String> for PatternSpec {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

impl From<Regex> for PatternSpec {
    fn from(value: Regex) -> Self {
        Self::Compiled(value)
    }
}

impl From<&Regex> for PatternSpec {
    fn from(value: &Regex) -> Self {
        Self::Compiled(value.clone())
    }
}

/// A compiled route pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    literal: Option<String>,
}

impl Pattern {
    /// Compiles literal text into an anchored exact-match expression.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidPattern`] if the escaped text exceeds the
    /// regex engine's size limits.
    pub fn literal(text: &str) -> Result<Self, RouterError> {
        let source = format!(r"\A{}\z", regex::escape(text));
        let regex = Regex::new(&source).map_err(|error| RouterError::invalid_pattern(text, &error))?;
        Ok(Self {
            regex,
            literal: Some(text.to_owned()),
        })
    }

    /// Compiles regular expression source. The expression is not anchored.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidPattern`] when the source does not parse.
    pub fn expression(source: &str) -> Result<Self, RouterError> {
        let regex =
            Regex::new(source).map_err(|error| RouterError::invalid_pattern(source, &error))?;
        Ok(Self::from(regex))
    }

    /// Reports whether `job_type` matches this pattern.
    #[must_use]
    pub fn is_match(&self, job_type: &str) -> bool {
        self.regex.is_match(job_type)
    }

    /// Returns the literal text when the pattern was built from one.
    #[must_use]
    pub fn as_literal(&self) -> Option<&str> {
        self.literal.as_deref()
    }

    /// Returns the compiled expression source.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self {
        Self {
            regex,
            literal: None,
        }
    }
}

impl TryFrom<PatternSpec> for Pattern {
    type Error = RouterError;

    fn try_from(spec: PatternSpec) -> Result<Self, Self::Error> {
        match spec {
            PatternSpec::Literal(text) => Self::literal(&text),
            PatternSpec::Expression(source) => Self::expression(&source),
            PatternSpec::Compiled(regex) => Ok(Self::from(regex)),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = &self.literal {
            return write!(f, "{text:?}");
        }
        write!(f, "/{}/", self.regex.as_str())
    }
}
