//! Shared test harness: an app with in-memory upstreams and token minting.
//!
//! The profile and badge services are replaced with static in-memory
//! implementations so tests exercise the full HTTP stack without a
//! network. Mirrors the router construction in `main.rs` so integration
//! tests run through the same middleware that production uses.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use campus_api::auth::jwt::{Claims, JwtConfig};
use campus_api::config::ServerConfig;
use campus_api::eligibility::{Eligibility, EligibilityChecker};
use campus_api::routes;
use campus_api::scope::{Scope, ScopeResolver};
use campus_api::state::AppState;
use campus_core::error::CoreError;
use campus_notify::NotifyBus;

// ---------------------------------------------------------------------------
// Test principals
// ---------------------------------------------------------------------------

/// Principals seeded into the static scope resolver. All in college `c1`
/// except `admin-c2`.
pub const STUDENT_CS: (&str, &str) = ("student-1", "Sam Student");
pub const STUDENT_EE: (&str, &str) = ("student-2", "Erin Engineer");
pub const STUDENT_UNBADGED: (&str, &str) = ("student-3", "Newbie");
pub const FACULTY: (&str, &str) = ("faculty-1", "Prof. Finch");
pub const DEPT_ADMIN: (&str, &str) = ("admin-1", "Dana Admin");
pub const HEAD_ADMIN: (&str, &str) = ("head-1", "Harriet Head");
pub const ADMIN_OTHER_COLLEGE: (&str, &str) = ("admin-c2", "Otto Outsider");

fn scope(college: &str, dept: &str) -> Scope {
    Scope {
        college_id: college.to_string(),
        department: dept.to_string(),
    }
}

struct StaticScopeResolver {
    scopes: HashMap<String, Scope>,
}

impl StaticScopeResolver {
    fn seeded() -> Self {
        let mut scopes = HashMap::new();
        scopes.insert(STUDENT_CS.0.to_string(), scope("c1", "CS"));
        scopes.insert(STUDENT_EE.0.to_string(), scope("c1", "EE"));
        scopes.insert(STUDENT_UNBADGED.0.to_string(), scope("c1", "CS"));
        scopes.insert(FACULTY.0.to_string(), scope("c1", "CS"));
        scopes.insert(DEPT_ADMIN.0.to_string(), scope("c1", "CS"));
        scopes.insert(HEAD_ADMIN.0.to_string(), scope("c1", "CS"));
        scopes.insert(ADMIN_OTHER_COLLEGE.0.to_string(), scope("c2", "CS"));
        Self { scopes }
    }
}

#[async_trait]
impl ScopeResolver for StaticScopeResolver {
    async fn resolve(&self, principal_id: &str) -> Result<Scope, CoreError> {
        self.scopes.get(principal_id).cloned().ok_or_else(|| {
            CoreError::Validation(format!("No profile for principal {principal_id}"))
        })
    }
}

/// Every student is eligible except [`STUDENT_UNBADGED`].
struct StaticEligibility;

#[async_trait]
impl EligibilityChecker for StaticEligibility {
    async fn check(&self, principal_id: &str) -> Eligibility {
        if principal_id == STUDENT_UNBADGED.0 {
            Eligibility {
                can_create: false,
                missing: vec!["organizer".to_string()],
            }
        } else {
            Eligibility::allowed()
        }
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret".to_string(),
        issuer: "https://id.test".to_string(),
        audience: "campus-api".to_string(),
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: jwt_config(),
        profile_service_url: "http://unused.test".to_string(),
        badge_service_url: "http://unused.test".to_string(),
        required_badges: vec!["organizer".to_string()],
        scope_cache_ttl_secs: 300,
        scope_cache_disabled: false,
        notify_webhook_url: None,
        escalation_sweep_interval_secs: 3600,
    }
}

/// Build the full application router with all middleware layers, using
/// the given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let (app, _) = build_test_app_with_bus(pool);
    app
}

/// Same as [`build_test_app`], also handing back the notification bus so
/// tests can subscribe to lifecycle events.
pub fn build_test_app_with_bus(pool: PgPool) -> (Router, Arc<NotifyBus>) {
    let notify = Arc::new(NotifyBus::default());

    let state = AppState {
        pool,
        config: Arc::new(test_config()),
        scope: Arc::new(StaticScopeResolver::seeded()),
        eligibility: Arc::new(StaticEligibility),
        notify: Arc::clone(&notify),
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    let app = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state);

    (app, notify)
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// Mint a signed access token for a test principal.
pub fn token(principal: (&str, &str), roles: &[&str]) -> String {
    let cfg = jwt_config();
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: principal.0.to_string(),
        name: principal.1.to_string(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        iss: cfg.issuer.clone(),
        aud: cfg.audience.clone(),
        exp: now + 600,
        iat: now,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(cfg.secret.as_bytes()),
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn request(
    app: Router,
    method: Method,
    uri: &str,
    token: &str,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"));
    let body = match body {
        Some(json) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    request(app, Method::GET, uri, token, None).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    request(app, Method::POST, uri, token, Some(body)).await
}

pub async fn put_json(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    request(app, Method::PUT, uri, token, Some(body)).await
}

pub async fn patch_json(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    request(app, Method::PATCH, uri, token, Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    request(app, Method::DELETE, uri, token, None).await
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as text (for CSV exports).
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
