use crate::dispatcher::RequestContext;

/// The call data a pre-request hook may inspect and rewrite.
///
/// Rewriting `method` or `path` does not re-route the call: the dispatcher
/// always runs the handler of the route that originally matched. The rewritten
/// context and payload are what the handler receives.
#[derive(Debug)]
pub struct HookInput<'a> {
    pub method: String,
    pub path: String,
    pub ctx: &'a mut RequestContext,
    pub payload: Vec<u8>,
}

/// A single pre-handler guard/transformation attached to a route.
///
/// Returning an error aborts the call before the handler runs; the error is
/// handed to the caller unchanged.
pub trait PreRequestHook: Send + Sync {
    fn before(&self, input: &mut HookInput<'_>) -> anyhow::Result<()>;
}

/// Closure-backed hook, built by [`hook_fn`].
pub struct FnHook<F> {
    f: F,
}

/// Wrap a closure as a [`PreRequestHook`].
///
/// ```rust
/// use dispatch_core::middleware::{hook_fn, HookInput};
///
/// let _require_admin = hook_fn(|input: &mut HookInput<'_>| {
///     if input.ctx.get_path_param("user") != Some("admin") {
///         anyhow::bail!("ERROR");
///     }
///     Ok(())
/// });
/// ```
pub fn hook_fn<F>(f: F) -> FnHook<F>
where
    F: Fn(&mut HookInput<'_>) -> anyhow::Result<()> + Send + Sync,
{
    FnHook { f }
}

impl<F> PreRequestHook for FnHook<F>
where
    F: Fn(&mut HookInput<'_>) -> anyhow::Result<()> + Send + Sync,
{
    fn before(&self, input: &mut HookInput<'_>) -> anyhow::Result<()> {
        (self.f)(input)
    }
}
