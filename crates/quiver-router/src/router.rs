//! Ordered, memoising job-type router.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use serde_json::{Map, Value};
use tracing::debug;

use crate::declaration::Declaration;
use crate::error::RouterError;
use crate::pattern::{Pattern, PatternSpec};
use crate::target::{HandlerRegistry, Target};

/// Tracing target for routing decisions.
pub(crate) const ROUTER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::router");

/// Free-form options attached to a route. The router stores them but never
/// interprets them.
pub type RouteOptions = Map<String, Value>;

/// A registered `(pattern, target, options)` triple.
#[derive(Debug, Clone)]
pub struct Route<H> {
    pattern: Pattern,
    target: Target<H>,
    options: RouteOptions,
}

impl<H> Route<H> {
    /// Pattern selecting the job types this route handles.
    #[must_use]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Handler value or symbolic name the route resolves to.
    #[must_use]
    pub fn target(&self) -> &Target<H> {
        &self.target
    }

    /// Options supplied when the route was added.
    #[must_use]
    pub fn options(&self) -> &RouteOptions {
        &self.options
    }
}

/// Routes job types to handlers using first-match semantics.
///
/// Each type string is resolved at most once; later calls return the cached
/// answer even when routes have been added in between.
pub struct Router<H> {
    routes: Vec<Route<H>>,
    registry: HandlerRegistry<H>,
    cache: Mutex<HashMap<String, Option<H>>>,
}

impl<H> Router<H> {
    /// Creates a router with no routes and an empty handler registry.
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(HandlerRegistry::new())
    }

    /// Creates a router resolving symbolic targets against `registry`.
    #[must_use]
    pub fn with_registry(registry: HandlerRegistry<H>) -> Self {
        Self {
            routes: Vec::new(),
            registry,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Mutable access to the handler registry, for start-up registration.
    pub fn registry_mut(&mut self) -> &mut HandlerRegistry<H> {
        &mut self.registry
    }

    /// Registered routes in insertion order.
    #[must_use]
    pub fn routes(&self) -> &[Route<H>] {
        &self.routes
    }

    /// Appends a route. Duplicate patterns are kept; the earliest one wins.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidPattern`] if the pattern cannot be
    /// compiled.
    pub fn add(
        &mut self,
        pattern: impl Into<PatternSpec>,
        target: Target<H>,
        options: RouteOptions,
    ) -> Result<(), RouterError> {
        let pattern = Pattern::try_from(pattern.into())?;
        self.routes.push(Route {
            pattern,
            target,
            options,
        });
        Ok(())
    }

    /// Adds every pattern of `declaration`, each carrying the shared options.
    ///
    /// Patterns are compiled up front, so a bad pattern leaves the router
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidPattern`] if any pattern cannot be
    /// compiled.
    pub fn declare(&mut self, declaration: Declaration<H>) -> Result<(), RouterError> {
        let (pairs, options) = declaration.into_parts();
        let compiled = pairs
            .into_iter()
            .map(|(spec, target)| Pattern::try_from(spec).map(|pattern| (pattern, target)))
            .collect::<Result<Vec<_>, _>>()?;
        self.routes
            .extend(compiled.into_iter().map(|(pattern, target)| Route {
                pattern,
                target,
                options: options.clone(),
            }));
        Ok(())
    }
}

impl<H: Clone> Router<H> {
    /// Resolves `job_type` to a handler, or `None` when no route matches.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::UnknownHandler`] when the first matching route
    /// names a handler missing from the registry. Failed resolutions are not
    /// cached.
    pub fn route(&self, job_type: &str) -> Result<Option<H>, RouterError> {
        if let Some(cached) = self.lock_cache().get(job_type) {
            return Ok(cached.clone());
        }

        let resolved = self.resolve(job_type)?;
        let mut cache = self.lock_cache();
        // Another caller may have resolved the same type meanwhile; the first
        // stored answer is the one that sticks.
        Ok(cache
            .entry(job_type.to_owned())
            .or_insert(resolved)
            .clone())
    }

    fn resolve(&self, job_type: &str) -> Result<Option<H>, RouterError> {
        let Some(route) = self
            .routes
            .iter()
            .find(|route| route.pattern.is_match(job_type))
        else {
            debug!(target: ROUTER_TARGET, job_type, "no route matched");
            return Ok(None);
        };

        debug!(
            target: ROUTER_TARGET,
            job_type,
            pattern = %route.pattern,
            "route matched"
        );
        match &route.target {
            Target::Handler(handler) => Ok(Some(handler.clone())),
            Target::Symbol(name) => self
                .registry
                .resolve(name)
                .map(Some)
                .ok_or_else(|| RouterError::UnknownHandler {
                    name: name.clone(),
                    job_type: job_type.to_owned(),
                }),
        }
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, Option<H>>> {
        // Entries are written whole, so a poisoned cache is still consistent.
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<H> Default for Router<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> fmt::Debug for Router<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let patterns: Vec<String> = self
            .routes
            .iter()
            .map(|route| route.pattern.to_string())
            .collect();
        f.debug_struct("Router")
            .field("patterns", &patterns)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
