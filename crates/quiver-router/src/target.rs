//! Route targets and the registry used to resolve symbolic handler names.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type Constructor<H> = Arc<dyn Fn() -> H + Send + Sync>;

/// Destination of a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target<H> {
    /// A handler value returned as-is.
    Handler(H),
    /// A handler name looked up in the router's registry at routing time.
    Symbol(String),
}

impl<H> Target<H> {
    /// Targets a handler value directly.
    #[must_use]
    pub fn handler(handler: H) -> Self {
        Self::Handler(handler)
    }

    /// Targets a handler by its registered name.
    #[must_use]
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol(name.into())
    }
}

/// Name to constructor mapping populated at start-up.
///
/// Symbolic targets are late-bound: a route may name a handler before it is
/// registered, and the lookup happens the first time a matching job type is
/// routed.
pub struct HandlerRegistry<H> {
    constructors: HashMap<String, Constructor<H>>,
}

impl<H> HandlerRegistry<H> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Registers `constructor` under `name`, replacing any earlier entry.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn() -> H + Send + Sync + 'static,
    {
        self.constructors.insert(name.into(), Arc::new(constructor));
        self
    }

    /// Reports whether a handler is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Builds the handler registered under `name`.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<H> {
        self.constructors.get(name).map(|constructor| constructor())
    }
}

impl<H> Default for HandlerRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> fmt::Debug for HandlerRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("HandlerRegistry")
            .field("handlers", &names)
            .finish()
    }
}
