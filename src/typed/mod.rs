//! # Typed Module
//!
//! Handler shapes and result normalization.
//!
//! ## Overview
//!
//! A handler accepts at most two inputs: the request context and a payload
//! decoded from the raw request bytes. Instead of discovering the handler's
//! parameters at call time, the route registration picks an adapter from
//! [`handler`] that fixes the shape:
//!
//! - [`handler::no_args`] - `Fn() -> R`
//! - [`handler::with_context`] - `Fn(&mut RequestContext) -> R`
//! - [`handler::with_owned_context`] - `Fn(RequestContext) -> R`
//! - [`handler::with_payload`] - `Fn(P) -> R`
//! - [`handler::with_context_and_payload`] - `Fn(&mut RequestContext, P) -> R`
//! - [`handler::with_owned_context_and_payload`] - `Fn(RequestContext, P) -> R`
//!
//! A handler with two payload parameters, two context parameters, or three
//! inputs simply has no adapter, so the mistake is a compile error rather than
//! a request-time fault.
//!
//! ## Return values
//!
//! The return type `R` must implement [`Responder`], which maps it to an
//! [`Outcome`]: `()` and `None` are "no value", a bare `anyhow::Error` is a
//! failure, `Result<T, E>` is the value/error pair, and strings, numbers,
//! `serde_json::Value` or anything wrapped in [`Json`] is a value.
//!
//! ```rust
//! use dispatch_core::typed::{handler, Json};
//! use dispatch_core::RequestContext;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize)]
//! struct GetPetRequest {
//!     pet_id: String,
//! }
//!
//! #[derive(Serialize)]
//! struct Pet {
//!     id: String,
//!     name: String,
//! }
//!
//! fn get_pet(_ctx: &mut RequestContext, req: GetPetRequest) -> anyhow::Result<Json<Pet>> {
//!     Ok(Json(Pet { id: req.pet_id, name: "Fluffy".to_string() }))
//! }
//!
//! let _endpoint = handler::with_context_and_payload(get_pet);
//! ```

mod core;

pub use core::*;
