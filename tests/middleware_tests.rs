use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dispatch_core::middleware::{
    hook_fn, AuthorizerHook, HookInput, PreRequestHook, DEFAULT_AUTH_COOKIE,
};
use dispatch_core::security::{ClaimsProvider, StaticClaimsProvider};
use dispatch_core::{handler, DispatchError, Dispatcher, RegistryBuilder, RequestContext};
use serde_json::{json, Value};

fn provider() -> Arc<dyn ClaimsProvider> {
    Arc::new(StaticClaimsProvider::new().with_token("test123", json!({"sub": "alice"})))
}

fn whoami_dispatcher(hook: AuthorizerHook) -> Dispatcher {
    let mut builder = RegistryBuilder::new();
    builder
        .register_with_hook(
            "GET/me",
            handler::with_context(|ctx: &mut RequestContext| ctx.claims.clone()),
            hook,
        )
        .unwrap();
    Dispatcher::new(builder.build())
}

#[test]
fn test_authorizer_attaches_claims_from_header() {
    let dispatcher = whoami_dispatcher(AuthorizerHook::new(provider()));
    let mut ctx = RequestContext::new().with_header("Authorization", "Bearer test123");

    let claims = dispatcher.call("GET", "/me", &mut ctx, b"").unwrap();
    assert_eq!(claims, Some(json!({"sub": "alice"})));
    assert_eq!(ctx.claims, Some(json!({"sub": "alice"})));
}

#[test]
fn test_authorizer_falls_back_to_cookie() {
    let dispatcher = whoami_dispatcher(AuthorizerHook::new(provider()));
    let mut ctx = RequestContext::new().with_cookie(DEFAULT_AUTH_COOKIE, "test123");
    assert!(dispatcher.call("GET", "/me", &mut ctx, b"").unwrap().is_some());

    let dispatcher = whoami_dispatcher(AuthorizerHook::new(provider()).cookie_name("sid"));
    let mut ctx = RequestContext::new().with_cookie("sid", "test123");
    assert!(dispatcher.call("GET", "/me", &mut ctx, b"").unwrap().is_some());
}

#[test]
fn test_authorizer_rejections_hide_provider_error() {
    let dispatcher = whoami_dispatcher(AuthorizerHook::new(provider()));

    let err = dispatcher
        .call("GET", "/me", &mut RequestContext::new(), b"")
        .unwrap_err();
    assert!(matches!(err, DispatchError::Hook(_)));
    assert_eq!(err.to_string(), "Missing authorization token");

    let mut ctx = RequestContext::new().with_header("authorization", "Bearer nope");
    let err = dispatcher.call("GET", "/me", &mut ctx, b"").unwrap_err();
    assert_eq!(err.to_string(), "Invalid authorization token");
    assert!(ctx.claims.is_none());
}

struct CountingHook {
    calls: AtomicUsize,
}

impl PreRequestHook for CountingHook {
    fn before(&self, input: &mut HookInput<'_>) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        input.ctx.add_response_header("x-hooked", "yes");
        Ok(())
    }
}

#[test]
fn test_shared_hook_across_routes() {
    let hook = Arc::new(CountingHook {
        calls: AtomicUsize::new(0),
    });
    let shared: Arc<dyn PreRequestHook> = Arc::clone(&hook) as Arc<dyn PreRequestHook>;

    let mut builder = RegistryBuilder::new();
    builder
        .add_route(
            "GET/a",
            Box::new(handler::no_args(|| "a")),
            Some(Arc::clone(&shared)),
        )
        .unwrap()
        .add_route("GET/b", Box::new(handler::no_args(|| "b")), Some(shared))
        .unwrap()
        .add_route("GET/open", Box::new(handler::no_args(|| "open")), None)
        .unwrap();
    let dispatcher = Dispatcher::new(builder.build());

    for path in ["/a", "/b", "/open"] {
        let mut ctx = RequestContext::new();
        dispatcher.call("GET", path, &mut ctx, b"").unwrap();
        let hooked = ctx
            .response_headers
            .iter()
            .any(|(k, v)| k.as_ref() == "x-hooked" && v == "yes");
        assert_eq!(hooked, path != "/open", "{path}");
    }
    assert_eq!(hook.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_hook_runs_before_payload_decode() {
    let mut builder = RegistryBuilder::new();
    builder
        .register_with_hook(
            "POST/strict",
            handler::with_payload(|v: Value| v),
            hook_fn(|_input: &mut HookInput<'_>| anyhow::bail!("denied")),
        )
        .unwrap();
    let dispatcher = Dispatcher::new(builder.build());

    // A hook rejection wins over an undecodable payload
    let err = dispatcher
        .call("POST", "/strict", &mut RequestContext::new(), b"{")
        .unwrap_err();
    assert_eq!(err.to_string(), "denied");
}
