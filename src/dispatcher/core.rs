//! Dispatcher core - the call boundary.
//!
//! Everything a hook or handler does runs inside `catch_unwind`. A panic is
//! logged once with a backtrace and turned into [`DispatchError::Internal`];
//! it never unwinds past [`Dispatcher::call`].

use std::any::Any;
use std::backtrace::Backtrace;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use tracing::{debug, error, info, warn};

use super::context::RequestContext;
use super::panics::{self, BoundaryGuard};
use crate::codec::{JsonCodec, PayloadCodec};
use crate::error::DispatchError;
use crate::middleware::HookInput;
use crate::router::{Registry, Route};
use crate::runtime_config::RuntimeConfig;
use crate::typed::Outcome;

/// Maps (method, path, context, payload) onto a registered handler.
///
/// Synchronous: matching, binding and the handler itself run to completion
/// on the calling thread. Share it between workers behind an `Arc`.
pub struct Dispatcher<C: PayloadCodec = JsonCodec> {
    registry: Registry<C>,
    codec: C,
    config: RuntimeConfig,
}

impl Dispatcher<JsonCodec> {
    /// Create a JSON dispatcher over a frozen registry.
    #[must_use]
    pub fn new(registry: Registry<JsonCodec>) -> Self {
        Self::with_codec(registry, JsonCodec)
    }
}

impl<C: PayloadCodec> Dispatcher<C> {
    /// Create a dispatcher with a custom payload codec.
    #[must_use]
    pub fn with_codec(registry: Registry<C>, codec: C) -> Self {
        panics::install_hook();
        Self {
            registry,
            codec,
            config: RuntimeConfig::default(),
        }
    }

    /// Replace the runtime configuration.
    #[must_use]
    pub fn with_config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// The frozen routing table.
    #[must_use]
    pub fn registry(&self) -> &Registry<C> {
        &self.registry
    }

    /// Codec used to bind payloads and convert results.
    #[must_use]
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Runtime configuration this dispatcher was built with.
    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Dispatch a call.
    ///
    /// Looks up the first route matching `method` and `path`, stores the
    /// captured variables on `ctx`, runs the route's hook (if any), then binds
    /// and invokes the handler.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::NotFound`] when no route matches
    /// - [`DispatchError::Hook`] when the hook rejects the call
    /// - [`DispatchError::BadRequest`] when the payload does not decode
    /// - [`DispatchError::Handler`] when the handler returns an error
    /// - [`DispatchError::Internal`] when the hook or handler panics
    pub fn call(
        &self,
        method: &str,
        path: &str,
        ctx: &mut RequestContext,
        payload: &[u8],
    ) -> Outcome<C::Value> {
        let Some((route, path_params)) = self.registry.lookup(method, path) else {
            warn!(
                request_id = %ctx.request_id,
                method = %method,
                path = %path,
                "No route matched"
            );
            return Err(DispatchError::NotFound {
                method: method.to_string(),
                path: path.to_string(),
            });
        };

        debug!(
            request_id = %ctx.request_id,
            method = %method,
            path = %path,
            route = %route.template(),
            path_params = ?path_params,
            "Route matched"
        );
        ctx.path_params = path_params;

        let start = Instant::now();
        let boundary = BoundaryGuard::enter(self.config.capture_backtrace);
        let result = catch_unwind(AssertUnwindSafe(|| {
            self.run(route, method, path, ctx, payload)
        }));

        match result {
            Ok(outcome) => {
                info!(
                    request_id = %ctx.request_id,
                    route = %route.template(),
                    execution_time_us = start.elapsed().as_micros() as u64,
                    success = outcome.is_ok(),
                    "Handler execution complete"
                );
                outcome
            }
            Err(panic) => {
                // Falls back to a boundary-side capture if another hook replaced ours
                let (location, backtrace) = match boundary.take_report() {
                    Some(report) => (report.location, report.backtrace),
                    None => ("<unknown>".to_string(), Backtrace::capture()),
                };
                drop(boundary);
                error!(
                    request_id = %ctx.request_id,
                    route = %route.template(),
                    method = %method,
                    path = %path,
                    panic_message = %panic_message(panic.as_ref()),
                    location = %location,
                    backtrace = %backtrace,
                    "Handler panicked - CRITICAL"
                );
                Err(DispatchError::Internal)
            }
        }
    }

    fn run(
        &self,
        route: &Route<C>,
        method: &str,
        path: &str,
        ctx: &mut RequestContext,
        payload: &[u8],
    ) -> Outcome<C::Value> {
        let Some(hook) = route.hook() else {
            return route.endpoint().invoke(&self.codec, ctx, payload);
        };

        let mut input = HookInput {
            method: method.to_string(),
            path: path.to_string(),
            ctx,
            payload: payload.to_vec(),
        };
        if let Err(err) = hook.before(&mut input) {
            debug!(
                request_id = %input.ctx.request_id,
                route = %route.template(),
                error = %err,
                "Pre-request hook rejected call"
            );
            return Err(DispatchError::Hook(err));
        }

        // The hook may have rewritten method/path; they are not a routing key
        if input.method != method || input.path != path {
            debug!(
                request_id = %input.ctx.request_id,
                route = %route.template(),
                rewritten_method = %input.method,
                rewritten_path = %input.path,
                "Hook rewrote method/path; dispatching to the originally matched route"
            );
        }

        let HookInput { ctx, payload, .. } = input;
        route.endpoint().invoke(&self.codec, ctx, &payload)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        *s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}
