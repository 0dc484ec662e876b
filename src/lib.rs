//! # dispatch-core
//!
//! A small, synchronous request-dispatch engine. Handlers are registered
//! against templates such as `GET/user/{id}`; a call names a method, a path, a
//! per-request context and a raw payload, and the engine finds the first
//! matching route, runs its optional pre-request hook, decodes the payload
//! into the handler's declared type, invokes the handler and normalizes its
//! result. Panics inside hooks and handlers never escape a call.
//!
//! ## Architecture
//!
//! - **[`router`]** - route templates ([`PathPattern`]) and the first-match
//!   routing table ([`RegistryBuilder`] / [`Registry`])
//! - **[`dispatcher`]** - [`RequestContext`] and the [`Dispatcher`] call boundary
//! - **[`typed`]** - handler shapes ([`handler`]) and result normalization
//!   ([`Responder`])
//! - **[`codec`]** - the injected payload codec; [`JsonCodec`] by default
//! - **[`middleware`]** - pre-request hooks, including [`AuthorizerHook`](middleware::AuthorizerHook)
//! - **[`security`]** - the [`ClaimsProvider`](security::ClaimsProvider) seam
//! - **[`server`]** - [`ApiService`](server::ApiService), an adapter between
//!   `http` request/response types and the dispatcher
//! - **[`runtime_config`]** and **[`logging`]** - environment-driven setup
//!
//! ### Request flow
//!
//! ```text
//! http::Request ─► ApiService::handle
//!                    ├─ OPTIONS ─► 200 + CORS headers
//!                    └─ Dispatcher::call(method, path, ctx, payload)
//!                         ├─ Registry::lookup        no match ─► 404
//!                         ├─ hook.before(&mut input) error    ─► 500
//!                         ├─ codec.decode::<P>()      error    ─► 400
//!                         └─ handler ─► Responder ─► Outcome ─► encoded body
//! ```
//!
//! ## Quick start
//!
//! ```rust
//! use dispatch_core::{handler, Dispatcher, RegistryBuilder, RequestContext};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Greeting {
//!     name: String,
//! }
//!
//! let mut builder = RegistryBuilder::new();
//! builder
//!     .register("GET/user/{id}", handler::with_context(|ctx: &mut RequestContext| {
//!         ctx.get_path_param("id").map(str::to_string)
//!     }))
//!     .expect("valid template");
//! builder
//!     .register("POST/greet", handler::with_payload(|g: Greeting| format!("hello {}", g.name)))
//!     .expect("valid template");
//! let dispatcher = Dispatcher::new(builder.build());
//!
//! let mut ctx = RequestContext::new();
//! let id = dispatcher.call("GET", "/user/42", &mut ctx, b"{}").unwrap();
//! assert_eq!(id, Some(serde_json::json!("42")));
//!
//! let mut ctx = RequestContext::new();
//! let greeting = dispatcher
//!     .call("POST", "/greet", &mut ctx, br#"{"name":"ada"}"#)
//!     .unwrap();
//! assert_eq!(greeting, Some(serde_json::json!("hello ada")));
//! ```
//!
//! ## Logging
//!
//! The crate emits `tracing` events only. Binaries install a subscriber with
//! [`logging::init_logging`], configured through `DISPATCH_LOG_*` variables.

pub mod codec;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod router;
pub mod runtime_config;
pub mod security;
pub mod server;
pub mod typed;

pub use codec::{CodecError, JsonCodec, PayloadCodec};
pub use dispatcher::{Dispatcher, RequestContext};
pub use error::DispatchError;
pub use ids::RequestId;
pub use router::{PathPattern, Registry, RegistryBuilder};
pub use typed::{handler, Endpoint, Json, Outcome, Responder};
