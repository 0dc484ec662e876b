//! # Dispatcher Module
//!
//! The dispatch engine: route lookup, hook execution, payload binding, handler
//! invocation, result normalization and panic isolation.
//!
//! ## Call flow
//!
//! ```text
//! Dispatcher::call(method, path, ctx, payload)
//!     → Registry::lookup            (NotFound if nothing matches)
//!     → ctx.path_params = captures
//!     → hook.before(&mut input)     (Hook error aborts the call)
//!     → codec.decode::<P>(payload)  (BadRequest, handler not run)
//!     → handler(...)                (Responder → Outcome)
//! ```
//!
//! Hook and handler run inside a single `catch_unwind` boundary. A panic is
//! logged once, with the location and backtrace of the panic site, and
//! returned as
//! [`DispatchError::Internal`](crate::DispatchError::Internal).
//!
//! ## Example
//!
//! ```rust
//! use dispatch_core::{handler, Dispatcher, RegistryBuilder, RequestContext};
//!
//! let mut builder = RegistryBuilder::new();
//! builder
//!     .register("GET/user/{id}", handler::with_context(|ctx: &mut RequestContext| {
//!         ctx.get_path_param("id").map(str::to_string)
//!     }))
//!     .expect("valid template");
//! let dispatcher = Dispatcher::new(builder.build());
//!
//! let mut ctx = RequestContext::new();
//! let value = dispatcher.call("GET", "/user/42", &mut ctx, b"{}").unwrap();
//! assert_eq!(value, Some(serde_json::json!("42")));
//! ```

mod context;
mod core;
mod panics;

pub use context::{parse_cookie_header, HeaderVec, RequestContext, MAX_INLINE_HEADERS};
pub use core::Dispatcher;
