//! Route registry - ordered, first-match-wins lookup.
//!
//! Routes are appended to a [`RegistryBuilder`] during startup and frozen into
//! a [`Registry`] before any dispatch happens. The frozen registry has no
//! mutation API at all, so concurrent lookups need no locking.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;
use tracing::{debug, info};

use super::pattern::PathPattern;
use crate::codec::{JsonCodec, PayloadCodec};
use crate::error::DispatchError;
use crate::middleware::PreRequestHook;
use crate::typed::Endpoint;

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Captured path variables in path order.
///
/// Names are shared with the route's pattern (`Arc<str>`), values are the
/// concrete request segments.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// A registered (pattern, handler, optional hook) triple.
pub struct Route<C: PayloadCodec = JsonCodec> {
    pattern: PathPattern,
    template: Arc<str>,
    endpoint: Box<dyn Endpoint<C>>,
    hook: Option<Arc<dyn PreRequestHook>>,
}

impl<C: PayloadCodec> Route<C> {
    /// The parsed pattern
    #[must_use]
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// The template string the route was registered with
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    pub(crate) fn endpoint(&self) -> &dyn Endpoint<C> {
        self.endpoint.as_ref()
    }

    pub(crate) fn hook(&self) -> Option<&dyn PreRequestHook> {
        self.hook.as_deref()
    }
}

impl<C: PayloadCodec> fmt::Debug for Route<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("template", &self.template)
            .field("has_hook", &self.hook.is_some())
            .finish()
    }
}

/// Startup-time builder for a [`Registry`].
///
/// Registration order is match priority: when two patterns match the same
/// request, the one registered first wins.
pub struct RegistryBuilder<C: PayloadCodec = JsonCodec> {
    routes: Vec<Route<C>>,
}

impl RegistryBuilder<JsonCodec> {
    /// Create an empty builder for the JSON codec.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: PayloadCodec> Default for RegistryBuilder<C> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<C: PayloadCodec> RegistryBuilder<C> {
    /// Register a route without a pre-request hook.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MalformedPattern`] if `template` cannot be parsed.
    /// Callers are expected to abort startup on this error.
    pub fn register<E>(&mut self, template: &str, endpoint: E) -> Result<&mut Self, DispatchError>
    where
        E: Endpoint<C> + 'static,
    {
        self.add_route(template, Box::new(endpoint), None)
    }

    /// Register a route guarded by a single pre-request hook.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MalformedPattern`] if `template` cannot be parsed.
    pub fn register_with_hook<E, H>(
        &mut self,
        template: &str,
        endpoint: E,
        hook: H,
    ) -> Result<&mut Self, DispatchError>
    where
        E: Endpoint<C> + 'static,
        H: PreRequestHook + 'static,
    {
        self.add_route(template, Box::new(endpoint), Some(Arc::new(hook)))
    }

    /// Register a route from already-boxed parts. The hook may be shared
    /// between routes.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MalformedPattern`] if `template` cannot be parsed.
    pub fn add_route(
        &mut self,
        template: &str,
        endpoint: Box<dyn Endpoint<C>>,
        hook: Option<Arc<dyn PreRequestHook>>,
    ) -> Result<&mut Self, DispatchError> {
        let pattern = PathPattern::parse(template)?;

        debug!(
            template = %template,
            has_hook = hook.is_some(),
            priority = self.routes.len(),
            "Route registered"
        );

        self.routes.push(Route {
            pattern,
            template: Arc::from(template),
            endpoint,
            hook,
        });
        Ok(self)
    }

    /// Number of routes registered so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// True when nothing has been registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Freeze the table. No routes can be added afterwards.
    #[must_use]
    pub fn build(self) -> Registry<C> {
        let routes_summary: Vec<&str> = self
            .routes
            .iter()
            .take(10)
            .map(|r| r.template.as_ref())
            .collect();

        info!(
            routes_count = self.routes.len(),
            routes_summary = ?routes_summary,
            "Routing table frozen"
        );

        Registry {
            routes: self.routes,
        }
    }
}

impl<C: PayloadCodec> fmt::Debug for RegistryBuilder<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("routes", &self.routes)
            .finish()
    }
}

/// Frozen, read-only route table.
pub struct Registry<C: PayloadCodec = JsonCodec> {
    routes: Vec<Route<C>>,
}

impl<C: PayloadCodec> Registry<C> {
    /// Find the first route matching `method` and `path`.
    ///
    /// Scans in registration order, so this is O(routes × segments). Route
    /// tables are small and static, which keeps this cheap in practice.
    #[must_use]
    pub fn lookup(&self, method: &str, path: &str) -> Option<(&Route<C>, ParamVec)> {
        self.routes
            .iter()
            .find_map(|route| route.pattern.matches(method, path).map(|params| (route, params)))
    }

    /// Number of registered routes
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// True when the table has no routes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Registered templates in priority order
    pub fn templates(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|r| r.template.as_ref())
    }
}

impl<C: PayloadCodec> fmt::Debug for Registry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.routes.iter()).finish()
    }
}
