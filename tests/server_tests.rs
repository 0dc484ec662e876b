use std::sync::Arc;

use dispatch_core::runtime_config::RuntimeConfig;
use dispatch_core::server::{ApiService, REQUEST_ID_HEADER};
use dispatch_core::{handler, Dispatcher, Json, RegistryBuilder, RequestContext, RequestId};
use http::{Method, Request, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use tracing_util::TestTracing;

#[derive(Deserialize)]
struct NewPet {
    name: String,
}

fn service(config: RuntimeConfig) -> ApiService {
    let mut builder = RegistryBuilder::new();
    builder
        .register(
            "GET/pets/{id}",
            handler::with_context(|ctx: &mut RequestContext| {
                ctx.add_response_header("Cache-Control", "no-store");
                Json(json!({ "id": ctx.get_path_param("id") }))
            }),
        )
        .unwrap()
        .register(
            "POST/pets",
            handler::with_payload(|pet: NewPet| -> anyhow::Result<String> {
                if pet.name.is_empty() {
                    anyhow::bail!("name must not be empty");
                }
                Ok(pet.name)
            }),
        )
        .unwrap()
        .register("DELETE/pets/{id}", handler::no_args(|| ()))
        .unwrap()
        .register(
            "GET/crash",
            handler::no_args(|| -> &'static str { panic!("boom") }),
        )
        .unwrap();
    let dispatcher = Dispatcher::new(builder.build()).with_config(config);
    ApiService::new(Arc::new(dispatcher))
}

fn default_service() -> ApiService {
    service(RuntimeConfig {
        capture_backtrace: false,
        ..RuntimeConfig::default()
    })
}

fn request(method: Method, uri: &str, body: &[u8]) -> Request<Vec<u8>> {
    let mut req = Request::new(body.to_vec());
    *req.method_mut() = method;
    *req.uri_mut() = uri.parse().unwrap();
    req
}

fn body_json(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}

#[test]
fn test_success_is_encoded_as_json() {
    let svc = default_service();
    let res = svc.handle(request(Method::GET, "/pets/7?verbose=1", b""));

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert_eq!(res.headers()["cache-control"], "no-store");
    assert_eq!(body_json(res.body()), json!({"id": "7"}));
}

#[test]
fn test_cors_headers_on_every_response() {
    let svc = service(RuntimeConfig {
        capture_backtrace: false,
        cors_allow_origin: "https://app.example.com".to_string(),
    });

    for res in [
        svc.handle(request(Method::GET, "/pets/1", b"")),
        svc.handle(request(Method::GET, "/missing", b"")),
        svc.handle(request(Method::OPTIONS, "/anything", b"")),
    ] {
        let headers = res.headers();
        assert_eq!(headers["access-control-allow-origin"], "https://app.example.com");
        assert_eq!(
            headers["access-control-allow-methods"],
            "PUT, POST, GET, DELETE, OPTIONS"
        );
        assert_eq!(
            headers["access-control-allow-headers"],
            "Content-Type, Authorization"
        );
    }
}

#[test]
fn test_options_preflight_is_empty_ok() {
    let svc = default_service();
    let res = svc.handle(request(Method::OPTIONS, "/pets/1", b""));
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.body().is_empty());
}

#[test]
fn test_error_status_mapping() {
    let svc = default_service();

    let res = svc.handle(request(Method::GET, "/nope", b""));
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.body(), b"Path not found\n");

    let res = svc.handle(request(Method::POST, "/pets", b"{\"name\":"));
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.headers()["x-content-type-options"], "nosniff");

    let res = svc.handle(request(Method::POST, "/pets", br#"{"name":""}"#));
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.body(), b"name must not be empty\n");

    let res = svc.handle(request(Method::GET, "/crash", b""));
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.body(), b"Internal error\n");
}

#[test]
fn test_empty_result_encodes_null() {
    let svc = default_service();
    let res = svc.handle(request(Method::DELETE, "/pets/3", b""));
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.body(), b"null");
}

#[test]
fn test_request_id_is_propagated() {
    let svc = default_service();
    let id = RequestId::new();
    let mut req = request(Method::GET, "/pets/1", b"");
    req.headers_mut()
        .insert(REQUEST_ID_HEADER, id.to_string().parse().unwrap());

    let res = svc.handle(req);
    assert_eq!(res.headers()[REQUEST_ID_HEADER], id.to_string().as_str());
}

#[test]
fn test_access_log_line() {
    let logs = TestTracing::init();
    let svc = default_service();
    let _ = svc.handle(request(Method::GET, "/nope", b""));
    assert_eq!(
        logs.count(tracing::Level::INFO, "GET /nope - 404 Not Found"),
        1
    );
}
