mod auth;
mod core;

pub use auth::{AuthorizerHook, DEFAULT_AUTH_COOKIE};
pub use core::{hook_fn, FnHook, HookInput, PreRequestHook};
