//! Job-type routing for Quiver workers.
//!
//! A [`Router`] maps opaque job-type strings onto handlers. Routes are kept in
//! insertion order and the first pattern that matches a type wins, so a more
//! specific literal registered early shadows a broader expression registered
//! later. Targets may be handler values or symbolic names looked up in the
//! router's [`HandlerRegistry`] when a type is first routed.
//!
//! Resolutions are memoised per type string. Once a type has been routed the
//! answer is fixed for the lifetime of the router, including "no handler",
//! even if matching routes are added afterwards.
//!
//! # Example
//!
//! ```
//! use quiver_router::{Router, RouteOptions, Target};
//!
//! let mut router: Router<&'static str> = Router::new();
//! router.add("import", Target::handler("importer"), RouteOptions::new())?;
//! assert_eq!(router.route("import")?, Some("importer"));
//! assert_eq!(router.route("export")?, None);
//! # Ok::<(), quiver_router::RouterError>(())
//! ```

mod declaration;
mod error;
mod pattern;
mod router;
mod target;

pub use declaration::Declaration;
pub use error::RouterError;
pub use pattern::{Pattern, PatternSpec};
pub use router::{Route, RouteOptions, Router};
pub use target::{HandlerRegistry, Target};

#[cfg(test)]
mod tests;
