use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::error;

use crate::codec::PayloadCodec;
use crate::dispatcher::RequestContext;
use crate::error::DispatchError;

/// Normalized result of a dispatch call: a value, nothing, or an error.
pub type Outcome<V> = Result<Option<V>, DispatchError>;

/// A handler bound to one of the supported shapes.
///
/// Implemented by the adapters in [`handler`]; the registry stores routes as
/// `Box<dyn Endpoint<C>>`, so the shape is fixed when the route is registered
/// and never inspected at call time.
pub trait Endpoint<C: PayloadCodec>: Send + Sync {
    /// Bind arguments, run the handler and normalize what it returned.
    fn invoke(&self, codec: &C, ctx: &mut RequestContext, payload: &[u8]) -> Outcome<C::Value>;
}

/// Conversion from a handler's return value into an [`Outcome`].
///
/// | return type                         | outcome                         |
/// |-------------------------------------|---------------------------------|
/// | `()`                                | `Ok(None)`                      |
/// | `Option<T>`                         | `None` → `Ok(None)`, else `T`   |
/// | `anyhow::Error`                     | `Err(Handler(e))`               |
/// | `Result<T, E>`                      | `Ok(t)` → `T`, `Err(e)` → `Err(Handler(e))` |
/// | `Json<T>`, strings, numbers, `bool`, `serde_json::Value` | `Ok(Some(value))` |
pub trait Responder<C: PayloadCodec> {
    /// Normalize into an outcome, converting values with `codec`.
    fn into_outcome(self, codec: &C) -> Outcome<C::Value>;
}

/// Wrapper marking any `Serialize` type as a successful handler value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Json<T>(pub T);

fn serialize_value<C: PayloadCodec, T: Serialize + ?Sized>(codec: &C, value: &T) -> Outcome<C::Value> {
    match codec.to_value(value) {
        Ok(v) => Ok(Some(v)),
        Err(err) => {
            error!(error = %err, "Failed to convert handler result");
            Err(DispatchError::Internal)
        }
    }
}

impl<C: PayloadCodec> Responder<C> for () {
    fn into_outcome(self, _codec: &C) -> Outcome<C::Value> {
        Ok(None)
    }
}

impl<C: PayloadCodec, T: Responder<C>> Responder<C> for Option<T> {
    fn into_outcome(self, codec: &C) -> Outcome<C::Value> {
        match self {
            Some(value) => value.into_outcome(codec),
            None => Ok(None),
        }
    }
}

impl<C: PayloadCodec> Responder<C> for anyhow::Error {
    fn into_outcome(self, _codec: &C) -> Outcome<C::Value> {
        Err(DispatchError::Handler(self))
    }
}

impl<C, T, E> Responder<C> for Result<T, E>
where
    C: PayloadCodec,
    T: Responder<C>,
    E: Into<anyhow::Error>,
{
    fn into_outcome(self, codec: &C) -> Outcome<C::Value> {
        match self {
            Ok(value) => value.into_outcome(codec),
            Err(err) => Err(DispatchError::Handler(err.into())),
        }
    }
}

impl<C: PayloadCodec, T: Serialize> Responder<C> for Json<T> {
    fn into_outcome(self, codec: &C) -> Outcome<C::Value> {
        serialize_value(codec, &self.0)
    }
}

macro_rules! value_responder {
    ($($ty:ty),* $(,)?) => {
        $(
            impl<C: PayloadCodec> Responder<C> for $ty {
                fn into_outcome(self, codec: &C) -> Outcome<C::Value> {
                    serialize_value(codec, &self)
                }
            }
        )*
    };
}

value_responder!(
    String,
    &'static str,
    bool,
    i32,
    i64,
    u32,
    u64,
    usize,
    f64,
    serde_json::Value,
);

/// Adapters that fix a handler's shape at registration time.
///
/// Pick the adapter matching the handler's parameters:
///
/// ```rust
/// use dispatch_core::typed::{handler, Json};
/// use dispatch_core::RequestContext;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct NewItem { name: String }
///
/// let _ping = handler::no_args(|| "pong");
/// let _whoami = handler::with_context(|ctx: &mut RequestContext| {
///     ctx.get_path_param("id").map(str::to_string)
/// });
/// let _create = handler::with_payload(|item: NewItem| Json(item.name));
/// ```
pub mod handler {
    use super::*;

    /// Handler taking no arguments
    pub struct NoArgs<F, R> {
        f: F,
        _shape: PhantomData<fn() -> R>,
    }

    /// Handler taking the caller's context by mutable reference
    pub struct CtxOnly<F, R> {
        f: F,
        _shape: PhantomData<fn() -> R>,
    }

    /// Handler taking a private copy of the context
    pub struct CtxOwned<F, R> {
        f: F,
        _shape: PhantomData<fn() -> R>,
    }

    /// Handler taking a decoded payload
    pub struct PayloadOnly<F, P, R> {
        f: F,
        _shape: PhantomData<fn(P) -> R>,
    }

    /// Handler taking the context by mutable reference and a decoded payload
    pub struct CtxAndPayload<F, P, R> {
        f: F,
        _shape: PhantomData<fn(P) -> R>,
    }

    /// Handler taking a copy of the context and a decoded payload
    pub struct OwnedCtxAndPayload<F, P, R> {
        f: F,
        _shape: PhantomData<fn(P) -> R>,
    }

    pub fn no_args<F, R>(f: F) -> NoArgs<F, R>
    where
        F: Fn() -> R + Send + Sync,
    {
        NoArgs { f, _shape: PhantomData }
    }

    /// Mutations the handler makes to the context are visible to the caller.
    pub fn with_context<F, R>(f: F) -> CtxOnly<F, R>
    where
        F: Fn(&mut RequestContext) -> R + Send + Sync,
    {
        CtxOnly { f, _shape: PhantomData }
    }

    /// The handler receives a clone; its mutations are not visible to the caller.
    pub fn with_owned_context<F, R>(f: F) -> CtxOwned<F, R>
    where
        F: Fn(RequestContext) -> R + Send + Sync,
    {
        CtxOwned { f, _shape: PhantomData }
    }

    pub fn with_payload<F, P, R>(f: F) -> PayloadOnly<F, P, R>
    where
        F: Fn(P) -> R + Send + Sync,
        P: DeserializeOwned,
    {
        PayloadOnly { f, _shape: PhantomData }
    }

    pub fn with_context_and_payload<F, P, R>(f: F) -> CtxAndPayload<F, P, R>
    where
        F: Fn(&mut RequestContext, P) -> R + Send + Sync,
        P: DeserializeOwned,
    {
        CtxAndPayload { f, _shape: PhantomData }
    }

    pub fn with_owned_context_and_payload<F, P, R>(f: F) -> OwnedCtxAndPayload<F, P, R>
    where
        F: Fn(RequestContext, P) -> R + Send + Sync,
        P: DeserializeOwned,
    {
        OwnedCtxAndPayload { f, _shape: PhantomData }
    }

    impl<C, F, R> Endpoint<C> for NoArgs<F, R>
    where
        C: PayloadCodec,
        F: Fn() -> R + Send + Sync,
        R: Responder<C>,
    {
        fn invoke(&self, codec: &C, _ctx: &mut RequestContext, _payload: &[u8]) -> Outcome<C::Value> {
            (self.f)().into_outcome(codec)
        }
    }

    impl<C, F, R> Endpoint<C> for CtxOnly<F, R>
    where
        C: PayloadCodec,
        F: Fn(&mut RequestContext) -> R + Send + Sync,
        R: Responder<C>,
    {
        fn invoke(&self, codec: &C, ctx: &mut RequestContext, _payload: &[u8]) -> Outcome<C::Value> {
            (self.f)(ctx).into_outcome(codec)
        }
    }

    impl<C, F, R> Endpoint<C> for CtxOwned<F, R>
    where
        C: PayloadCodec,
        F: Fn(RequestContext) -> R + Send + Sync,
        R: Responder<C>,
    {
        fn invoke(&self, codec: &C, ctx: &mut RequestContext, _payload: &[u8]) -> Outcome<C::Value> {
            (self.f)(ctx.clone()).into_outcome(codec)
        }
    }

    impl<C, F, P, R> Endpoint<C> for PayloadOnly<F, P, R>
    where
        C: PayloadCodec,
        F: Fn(P) -> R + Send + Sync,
        P: DeserializeOwned,
        R: Responder<C>,
    {
        fn invoke(&self, codec: &C, _ctx: &mut RequestContext, payload: &[u8]) -> Outcome<C::Value> {
            let input = codec.decode::<P>(payload)?;
            (self.f)(input).into_outcome(codec)
        }
    }

    impl<C, F, P, R> Endpoint<C> for CtxAndPayload<F, P, R>
    where
        C: PayloadCodec,
        F: Fn(&mut RequestContext, P) -> R + Send + Sync,
        P: DeserializeOwned,
        R: Responder<C>,
    {
        fn invoke(&self, codec: &C, ctx: &mut RequestContext, payload: &[u8]) -> Outcome<C::Value> {
            let input = codec.decode::<P>(payload)?;
            (self.f)(ctx, input).into_outcome(codec)
        }
    }

    impl<C, F, P, R> Endpoint<C> for OwnedCtxAndPayload<F, P, R>
    where
        C: PayloadCodec,
        F: Fn(RequestContext, P) -> R + Send + Sync,
        P: DeserializeOwned,
        R: Responder<C>,
    {
        fn invoke(&self, codec: &C, ctx: &mut RequestContext, payload: &[u8]) -> Outcome<C::Value> {
            let input = codec.decode::<P>(payload)?;
            (self.f)(ctx.clone(), input).into_outcome(codec)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::JsonCodec;
    use serde::Deserialize;
    use serde_json::json;

    fn normalize<R: Responder<JsonCodec>>(r: R) -> Outcome<serde_json::Value> {
        r.into_outcome(&JsonCodec)
    }

    #[test]
    fn test_unit_is_absent() {
        assert!(matches!(normalize(()), Ok(None)));
    }

    #[test]
    fn test_none_is_absent() {
        assert!(matches!(normalize(None::<String>), Ok(None)));
        assert!(matches!(normalize(Ok::<Option<String>, anyhow::Error>(None)), Ok(None)));
    }

    #[test]
    fn test_single_value_is_result() {
        assert_eq!(normalize("42").unwrap(), Some(json!("42")));
        assert_eq!(normalize(7_i64).unwrap(), Some(json!(7)));
        assert_eq!(
            normalize(Json(vec![1, 2])).unwrap(),
            Some(json!([1, 2]))
        );
    }

    #[test]
    fn test_single_error_is_failure() {
        let err = normalize(anyhow::anyhow!("PANICKING")).unwrap_err();
        assert!(err.is_handler_error());
        assert_eq!(err.to_string(), "PANICKING");
    }

    #[test]
    fn test_value_error_pair() {
        let ok: Result<&'static str, anyhow::Error> = Ok("OK");
        assert_eq!(normalize(ok).unwrap(), Some(json!("OK")));

        let failed: Result<&'static str, std::io::Error> =
            Err(std::io::Error::other("disk on fire"));
        let err = normalize(failed).unwrap_err();
        assert!(err.is_handler_error());
        assert_eq!(err.to_string(), "disk on fire");
    }

    #[derive(Deserialize)]
    struct Input {
        #[serde(rename = "foo")]
        var1: String,
    }

    #[test]
    fn test_payload_decode_failure_skips_handler() {
        let called = std::sync::atomic::AtomicBool::new(false);
        let endpoint = handler::with_payload(|input: Input| {
            called.store(true, std::sync::atomic::Ordering::SeqCst);
            input.var1
        });
        let mut ctx = RequestContext::new();
        let err = Endpoint::<JsonCodec>::invoke(&endpoint, &JsonCodec, &mut ctx, b"{\"foo\":")
            .unwrap_err();
        assert!(matches!(err, DispatchError::BadRequest(_)));
        assert!(!called.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn test_owned_context_does_not_leak_mutations() {
        let endpoint = handler::with_owned_context(|mut ctx: RequestContext| {
            ctx.claims = Some(json!("changed"));
        });
        let mut ctx = RequestContext::new();
        Endpoint::<JsonCodec>::invoke(&endpoint, &JsonCodec, &mut ctx, b"").unwrap();
        assert!(ctx.claims.is_none());
    }

    #[test]
    fn test_borrowed_context_mutations_are_visible() {
        let endpoint = handler::with_context(|ctx: &mut RequestContext| {
            ctx.claims = Some(json!("changed"));
        });
        let mut ctx = RequestContext::new();
        Endpoint::<JsonCodec>::invoke(&endpoint, &JsonCodec, &mut ctx, b"").unwrap();
        assert_eq!(ctx.claims, Some(json!("changed")));
    }
}
