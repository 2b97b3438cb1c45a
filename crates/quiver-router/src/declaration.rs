//! Declarative registration of several routes sharing one option set.
//!
//! A declaration mirrors the way applications describe their routing table:
//! a handful of `pattern => handler` pairs plus options that apply to all of
//! them. Tables loaded from configuration use the same shape, where bare
//! identifier keys are options and every other key is a pattern.

use serde_json::Value;

use crate::error::RouterError;
use crate::pattern::PatternSpec;
use crate::router::RouteOptions;
use crate::target::Target;

/// A batch of routes registered with one [`Router::declare`](crate::Router::declare) call.
#[derive(Debug, Clone)]
pub struct Declaration<H> {
    pairs: Vec<(PatternSpec, Target<H>)>,
    options: RouteOptions,
}

impl<H> Declaration<H> {
    /// Starts an empty declaration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pairs: Vec::new(),
            options: RouteOptions::new(),
        }
    }

    /// Adds a `pattern => target` pair.
    #[must_use]
    pub fn route(mut self, pattern: impl Into<PatternSpec>, target: Target<H>) -> Self {
        self.pairs.push((pattern.into(), target));
        self
    }

    /// Sets an option shared by every pattern in the declaration.
    #[must_use]
    pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Number of `pattern => target` pairs collected so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Reports whether the declaration holds no routes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Options shared by the declared routes.
    #[must_use]
    pub fn options(&self) -> &RouteOptions {
        &self.options
    }

    pub(crate) fn into_parts(self) -> (Vec<(PatternSpec, Target<H>)>, RouteOptions) {
        (self.pairs, self.options)
    }

    /// Splits a table into routes and shared options.
    ///
    /// Identifier-like keys (`[A-Za-z_][A-Za-z0-9_]*`) become options. Every
    /// other key is a pattern whose value must be a string naming a handler in
    /// the router's registry. Keys wrapped in slashes, such as `/^report\./`,
    /// are regular expressions; the rest are matched literally. Pattern order
    /// follows the table's key order.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidDeclaration`] when a pattern key maps to
    /// anything other than a non-empty string.
    pub fn from_table(table: &RouteOptions) -> Result<Self, RouterError> {
        let mut declaration = Self::new();
        for (key, value) in table {
            if is_identifier(key) {
                declaration.options.insert(key.clone(), value.clone());
                continue;
            }
            let name = match value {
                Value::String(name) if !name.is_empty() => name,
                Value::String(_) => {
                    return Err(RouterError::invalid_declaration(
                        key,
                        "handler name must not be empty",
                    ));
                }
                other => {
                    return Err(RouterError::invalid_declaration(
                        key,
                        format!("expected a handler name, found {other}"),
                    ));
                }
            };
            declaration
                .pairs
                .push((PatternSpec::from_key(key), Target::symbol(name.as_str())));
        }
        Ok(declaration)
    }
}

impl<H> Default for Declaration<H> {
    fn default() -> Self {
        Self::new()
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
