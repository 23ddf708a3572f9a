//! Integration tests for the authentication filter.
//!
//! Drives a probe router through the filter with tower's `oneshot`,
//! covering bypass decisions, failure-response shaping, and context
//! propagation to downstream handlers.

use axum::{
    Json, Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    routing::{get, post},
};
use beargate::{
    AuthConfig,
    context::RequestContext,
    filter::{AuthFilter, MSG_INVALID_JWT, MSG_NO_VALID_HEADER},
    respond::TEXT_PLAIN_UTF8,
};
use jsonwebtoken::{EncodingKey, Header};
use serde_json::{Value, json};
use tower::ServiceExt;

const SECRET: &str = "jwt-test";

fn config(require_authorized: bool, exclude_paths: &[&str]) -> AuthConfig {
    AuthConfig {
        secret_key: SECRET.to_string(),
        require_authorized,
        exclude_paths: exclude_paths.iter().map(|s| s.to_string()).collect(),
    }
}

/// Mint a token signed with `secret` from a JSON claim object.
fn mint_token(secret: &str, claims: &Value) -> String {
    jsonwebtoken::encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

fn far_future() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
        + 3600
}

fn full_claims() -> Value {
    json!({
        "exp": far_future(),
        "user.id": "1",
        "user.code": "tester",
        "user.name": "Tester",
        "roles": "ADMIN,COMMON,TEST",
    })
}

/// Probe handler reporting whether a context binding was present.
async fn probe(context: Option<RequestContext>) -> Json<Value> {
    let body = match context {
        Some(context) => {
            let identity = context.identity();
            json!({
                "bound": true,
                "user_id": identity.user_id,
                "account": identity.account,
                "name": identity.name,
                "roles": identity.roles,
                "extras": identity.extras,
            })
        }
        None => json!({ "bound": false }),
    };
    Json(body)
}

/// Handler that requires the context and answers 204, like a mutating
/// endpoint would.
async fn no_content(_context: RequestContext) -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Build a probe app with the filter applied to every route.
fn probe_app(config: &AuthConfig) -> Router {
    let filter = AuthFilter::new(config).expect("valid test config");
    filter.apply(
        Router::new()
            .route("/", get(probe))
            .route("/index.html", get(probe))
            .route("/index.htm", get(probe))
            .route("/test", post(probe).options(probe))
            .route("/nocontent", post(no_content))
            .route("/open/info", get(probe).post(probe))
            .route("/secure/info", get(probe)),
    )
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, String) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}

fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn request_with_auth(method: Method, uri: &str, authorization: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, authorization)
        .body(Body::empty())
        .unwrap()
}

fn parse(body: &str) -> Value {
    serde_json::from_str(body).unwrap()
}

// =============================================================================
// Bypass decisions
// =============================================================================

#[tokio::test]
async fn test_root_aliases_bypass_regardless_of_configuration() {
    for path in ["/", "/index.html", "/index.htm"] {
        let app = probe_app(&config(true, &[]));
        let (status, _, body) = send(app, request(Method::GET, path)).await;

        assert_eq!(status, StatusCode::OK, "{path}");
        assert_eq!(parse(&body)["bound"], json!(false), "{path}");
    }
}

#[tokio::test]
async fn test_options_requests_bypass_unconditionally() {
    let app = probe_app(&config(true, &[]));
    let (status, _, body) = send(app, request(Method::OPTIONS, "/test")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body)["bound"], json!(false));
}

#[tokio::test]
async fn test_excluded_path_bypasses() {
    let app = probe_app(&config(true, &["GET:/open"]));
    let (status, _, body) = send(app, request(Method::GET, "/open/info")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body)["bound"], json!(false));
}

#[tokio::test]
async fn test_bare_exclusion_rule_defaults_to_get() {
    let app = probe_app(&config(true, &["/open"]));
    let (status, _, body) = send(app, request(Method::GET, "/open/info")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body)["bound"], json!(false));
}

#[tokio::test]
async fn test_exclusion_rule_method_mismatch_still_enforces() {
    let app = probe_app(&config(true, &["GET:/open"]));
    let (status, _, _) = send(app, request(Method::POST, "/open/info")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unexcluded_path_enforces() {
    let app = probe_app(&config(true, &["GET:/open"]));
    let (status, _, _) = send(app, request(Method::GET, "/secure/info")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_enforcement_disabled_bypasses_everything() {
    let app = probe_app(&config(false, &[]));
    let (status, _, body) = send(app, request(Method::POST, "/test")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body)["bound"], json!(false));
}

// =============================================================================
// Failure shaping
// =============================================================================

#[tokio::test]
async fn test_missing_header_rejected_with_exact_body() {
    let app = probe_app(&config(true, &[]));
    let (status, headers, body) = send(app, request(Method::POST, "/test")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        headers.get(header::CONTENT_TYPE).unwrap(),
        TEXT_PLAIN_UTF8
    );
    assert_eq!(body, MSG_NO_VALID_HEADER);
}

#[tokio::test]
async fn test_wrong_scheme_rejected_like_missing_header() {
    for authorization in ["Basic abc", "bearer abc", "Bearer"] {
        let app = probe_app(&config(true, &[]));
        let (status, headers, body) =
            send(app, request_with_auth(Method::POST, "/test", authorization)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED, "{authorization}");
        assert_eq!(
            headers.get(header::CONTENT_TYPE).unwrap(),
            TEXT_PLAIN_UTF8,
            "{authorization}"
        );
        assert_eq!(body, MSG_NO_VALID_HEADER, "{authorization}");
    }
}

#[tokio::test]
async fn test_invalid_token_rejected_with_exact_body() {
    let tampered = mint_token("other-secret", &full_claims());
    for token in ["garbage", tampered.as_str()] {
        let app = probe_app(&config(true, &[]));
        let (status, headers, body) = send(
            app,
            request_with_auth(Method::POST, "/test", &format!("Bearer {token}")),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), TEXT_PLAIN_UTF8);
        assert_eq!(body, MSG_INVALID_JWT);
    }
}

#[tokio::test]
async fn test_expired_token_rejected() {
    use std::time::{SystemTime, UNIX_EPOCH};
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();
    let token = mint_token(SECRET, &json!({ "exp": now - 50, "user.id": "1" }));

    let app = probe_app(&config(true, &[]));
    let (status, _, body) = send(
        app,
        request_with_auth(Method::POST, "/test", &format!("Bearer {token}")),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, MSG_INVALID_JWT);
}

// =============================================================================
// Context propagation
// =============================================================================

#[tokio::test]
async fn test_valid_token_binds_identity() {
    let token = mint_token(SECRET, &full_claims());
    let app = probe_app(&config(true, &[]));
    let (status, _, body) = send(
        app,
        request_with_auth(Method::POST, "/test", &format!("Bearer {token}")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let body = parse(&body);
    assert_eq!(body["bound"], json!(true));
    assert_eq!(body["user_id"], json!(1));
    assert_eq!(body["account"], json!("tester"));
    assert_eq!(body["name"], json!("Tester"));
    assert_eq!(body["roles"], json!(["ADMIN", "COMMON", "TEST"]));
}

#[tokio::test]
async fn test_downstream_status_passes_through() {
    let token = mint_token(SECRET, &full_claims());
    let app = probe_app(&config(true, &[]));
    let (status, _, _) = send(
        app,
        request_with_auth(Method::POST, "/nocontent", &format!("Bearer {token}")),
    )
    .await;

    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_extras_carry_path_and_headers() {
    let token = mint_token(SECRET, &full_claims());
    let authorization = format!("Bearer {token}");
    let app = probe_app(&config(true, &[]));

    let req = Request::builder()
        .method(Method::POST)
        .uri("/test")
        .header(header::AUTHORIZATION, &authorization)
        .header(header::ORIGIN, "http://example.com")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(app, req).await;

    assert_eq!(status, StatusCode::OK);
    let extras = &parse(&body)["extras"];
    assert_eq!(extras["path"], json!("/test"));
    assert_eq!(extras["authorization"], json!(authorization));
    assert_eq!(extras["origin"], json!("http://example.com"));
}

#[tokio::test]
async fn test_origin_extra_absent_without_header() {
    let token = mint_token(SECRET, &full_claims());
    let app = probe_app(&config(true, &[]));
    let (_, _, body) = send(
        app,
        request_with_auth(Method::POST, "/test", &format!("Bearer {token}")),
    )
    .await;

    assert!(parse(&body)["extras"].get("origin").is_none());
}

#[tokio::test]
async fn test_sparse_claims_yield_default_identity() {
    let token = mint_token(SECRET, &json!({ "exp": far_future() }));
    let app = probe_app(&config(true, &[]));
    let (status, _, body) = send(
        app,
        request_with_auth(Method::POST, "/test", &format!("Bearer {token}")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let body = parse(&body);
    assert_eq!(body["bound"], json!(true));
    assert_eq!(body["user_id"], json!(0));
    assert_eq!(body["account"], json!("UNKNOWN"));
    assert_eq!(body["name"], json!("UNKNOWN"));
    assert_eq!(body["roles"], json!([]));
}

#[tokio::test]
async fn test_bypassed_request_never_sees_stale_identity() {
    // Two requests through the same filter config: one authenticated,
    // one bypassed. The bypassed one must observe no binding.
    let token = mint_token(SECRET, &full_claims());

    let app = probe_app(&config(true, &["POST:/open"]));
    let (_, _, body) = send(
        app,
        request_with_auth(Method::POST, "/test", &format!("Bearer {token}")),
    )
    .await;
    assert_eq!(parse(&body)["bound"], json!(true));

    let app = probe_app(&config(true, &["POST:/open"]));
    let (_, _, body) = send(app, request(Method::POST, "/open/info")).await;
    assert_eq!(parse(&body)["bound"], json!(false));
}
