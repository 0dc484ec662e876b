use std::sync::Arc;
use std::time::Instant;

use http::header::{
    HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE, COOKIE, X_CONTENT_TYPE_OPTIONS,
};
use http::{HeaderMap, Method, Request, Response, StatusCode};
use tracing::{error, info, warn};

use crate::codec::{JsonCodec, PayloadCodec};
use crate::dispatcher::{parse_cookie_header, Dispatcher, RequestContext};
use crate::error::DispatchError;
use crate::ids::RequestId;
use crate::runtime_config::RuntimeConfig;

const ALLOW_METHODS: &str = "PUT, POST, GET, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Request id header honored on inbound requests and echoed on responses.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Adapts `http` requests onto [`Dispatcher::call`].
///
/// Owns no sockets: a server loop hands each decoded request to
/// [`handle`](Self::handle) and writes the returned response. Cheap to clone;
/// clones share the dispatcher.
pub struct ApiService<C: PayloadCodec = JsonCodec> {
    dispatcher: Arc<Dispatcher<C>>,
    config: RuntimeConfig,
}

impl<C: PayloadCodec> Clone for ApiService<C> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: Arc::clone(&self.dispatcher),
            config: self.config.clone(),
        }
    }
}

impl<C: PayloadCodec> ApiService<C> {
    /// Wrap a dispatcher, reusing its runtime configuration for CORS.
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher<C>>) -> Self {
        let config = dispatcher.config().clone();
        Self { dispatcher, config }
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Arc<Dispatcher<C>> {
        &self.dispatcher
    }

    /// Handle one request end to end.
    ///
    /// Never fails: dispatch errors become 4xx/5xx responses with the error
    /// text as a plain body.
    pub fn handle(&self, req: Request<Vec<u8>>) -> Response<Vec<u8>> {
        let start = Instant::now();
        let (parts, body) = req.into_parts();
        let method = parts.method.as_str().to_string();
        let path = parts.uri.path().to_string();

        let mut response = if parts.method == Method::OPTIONS {
            plain_response(StatusCode::OK, Vec::new())
        } else {
            let mut ctx = context_from_headers(&parts.headers);
            let outcome = self.dispatcher.call(&method, &path, &mut ctx, &body);
            let mut response = self.outcome_response(outcome);
            copy_response_headers(&ctx, response.headers_mut());
            if let Ok(value) = HeaderValue::from_str(&ctx.request_id.to_string()) {
                response
                    .headers_mut()
                    .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
            }
            response
        };

        self.apply_cors(response.headers_mut());

        let status = response.status();
        info!(
            "{:?} {} {} - {} {}",
            start.elapsed(),
            method,
            path,
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        );
        response
    }

    fn outcome_response(
        &self,
        outcome: Result<Option<C::Value>, DispatchError>,
    ) -> Response<Vec<u8>> {
        let codec = self.dispatcher.codec();
        let encoded = outcome.and_then(|value| {
            let value = match value {
                Some(value) => codec.encode(&value),
                None => codec.to_value(&()).and_then(|null| codec.encode(&null)),
            };
            value.map_err(|err| {
                error!(error = %err, "Failed to encode handler result");
                DispatchError::Internal
            })
        });

        match encoded {
            Ok(bytes) => {
                let mut response = Response::new(bytes);
                response
                    .headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::from_static(codec.content_type()));
                response
            }
            Err(err) => error_response(&err),
        }
    }

    fn apply_cors(&self, headers: &mut HeaderMap) {
        match HeaderValue::from_str(&self.config.cors_allow_origin) {
            Ok(origin) => {
                headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
            }
            Err(_) => warn!(
                origin = %self.config.cors_allow_origin,
                "Invalid CORS origin, header not set"
            ),
        }
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        );
    }
}

/// Build a [`RequestContext`] from inbound headers.
///
/// The request id is taken from `X-Request-Id` when it holds a valid ULID.
#[must_use]
pub fn context_from_headers(headers: &HeaderMap) -> RequestContext {
    let mut ctx = RequestContext::new();
    for (name, value) in headers {
        let Ok(value) = value.to_str() else {
            continue;
        };
        if *name == COOKIE {
            ctx.cookies.extend(parse_cookie_header(value));
        }
        ctx.headers.push((Arc::from(name.as_str()), value.to_string()));
    }
    ctx.request_id = RequestId::from_header_or_new(ctx.get_header(REQUEST_ID_HEADER));
    ctx
}

fn copy_response_headers(ctx: &RequestContext, headers: &mut HeaderMap) {
    for (name, value) in &ctx.response_headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.append(name, value);
            }
            _ => warn!(
                request_id = %ctx.request_id,
                header = %name,
                "Dropping invalid response header"
            ),
        }
    }
}

fn error_response(err: &DispatchError) -> Response<Vec<u8>> {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() && !err.is_handler_error() {
        error!(error = %err, "Dispatch failed");
    }
    plain_response(status, format!("{err}\n").into_bytes())
}

fn plain_response(status: StatusCode, body: Vec<u8>) -> Response<Vec<u8>> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    response
}
