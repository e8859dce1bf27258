mod email;
mod services;
mod session;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use carepoint_core::AppConfig;
use carepoint_mail::SendGridClient;
use carepoint_places::PlacesClient;
use carepoint_session::{FirestoreClient, RetryPolicy};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};

/// Upstream clients, each present only when its credentials are configured.
#[derive(Clone)]
pub struct AppState {
    pub places: Option<PlacesClient>,
    pub mail: Option<SendGridClient>,
    pub profiles: Option<FirestoreClient>,
    pub profile_retry: RetryPolicy,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let timeout = config.http_timeout_secs;
        let ua = config.user_agent.as_str();

        let places = config
            .google_maps_api_key
            .as_deref()
            .map(|key| PlacesClient::new(key, timeout, ua))
            .transpose()?;
        let mail = config
            .sendgrid_api_key
            .as_deref()
            .map(|key| SendGridClient::new(key, &config.sendgrid_sender, timeout, ua))
            .transpose()?;
        let profiles = config
            .firestore_project_id
            .as_deref()
            .map(|project| {
                FirestoreClient::new(project, config.firestore_api_key.as_deref(), timeout, ua)
            })
            .transpose()?;

        for (name, configured) in [
            ("places", places.is_some()),
            ("mail", mail.is_some()),
            ("profiles", profiles.is_some()),
        ] {
            if !configured {
                tracing::warn!(upstream = name, "upstream not configured; its routes will fail");
            }
        }

        Ok(Self {
            places,
            mail,
            profiles,
            profile_retry: RetryPolicy {
                max_retries: config.profile_max_retries,
                backoff_base_ms: config.profile_retry_backoff_ms,
            },
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

/// Handler error. Client errors render as `{ "error": ... }`; server errors
/// add `"success": false`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct ClientErrorBody<'a> {
    error: &'a str,
}

#[derive(Debug, Serialize)]
struct ServerErrorBody<'a> {
    success: bool,
    error: &'a str,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    pub fn only_post() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, "Only POST allowed")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            let body = ServerErrorBody {
                success: false,
                error: &self.message,
            };
            (self.status, Json(body)).into_response()
        } else {
            let body = ClientErrorBody {
                error: &self.message,
            };
            (self.status, Json(body)).into_response()
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    places: &'static str,
    mail: &'static str,
    profiles: &'static str,
}

fn upstream_status(configured: bool) -> &'static str {
    if configured {
        "configured"
    } else {
        "unconfigured"
    }
}

async fn only_post() -> ApiError {
    ApiError::only_post()
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

/// Public but rate limited, with its own window so anonymous traffic cannot
/// exhaust the quota of authenticated callers.
fn search_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/services/search",
            post(services::search_services).fallback(only_post),
        )
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/email/send",
            post(email::send_email).fallback(only_post),
        )
        .route("/api/v1/users/{uid}/session", get(session::get_session))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(search_router(rate_limit.detached()))
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let data = HealthData {
        status: "ok",
        places: upstream_status(state.places.is_some()),
        mail: upstream_status(state.mail.is_some()),
        profiles: upstream_status(state.profiles.is_some()),
    };
    (
        StatusCode::OK,
        Json(ApiResponse {
            data,
            meta: ResponseMeta::new(req_id.0),
        }),
    )
}


#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::test_support::{app, empty_state, send};
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    #[test]
    fn client_errors_map_to_error_only_body() {
        let response = ApiError::bad_request("Keyword is required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn server_errors_carry_success_false() {
        let response = ApiError::internal("boom").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(json, serde_json::json!({ "success": false, "error": "boom" }));
    }

    #[tokio::test]
    async fn health_reports_unconfigured_upstreams() {
        let (status, json) = send(
            app(empty_state()),
            Request::builder()
                .uri("/api/v1/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["status"], "ok");
        assert_eq!(json["data"]["places"], "unconfigured");
        assert_eq!(json["data"]["mail"], "unconfigured");
        assert_eq!(json["data"]["profiles"], "unconfigured");
        assert!(json["meta"]["request_id"].is_string());
    }

    #[tokio::test]
    async fn request_id_is_propagated() {
        let response = app(empty_state())
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .header("x-request-id", "req-abc")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(
            response.headers().get("x-request-id").and_then(|v| v.to_str().ok()),
            Some("req-abc")
        );
    }

    #[tokio::test]
    async fn request_id_is_generated_when_absent() {
        let response = app(empty_state())
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        let id = response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .expect("x-request-id header");
        assert!(uuid::Uuid::parse_str(id).is_ok());
    }

    #[tokio::test]
    async fn protected_routes_require_bearer_token() {
        let keys = vec!["secret-token".to_string()];
        let auth = AuthState::from_keys(&keys, false).expect("auth");
        let router = build_app(
            empty_state(),
            auth,
            RateLimitState::new(100, Duration::from_secs(60)),
        );

        let (status, json) = send(
            router.clone(),
            Request::builder()
                .uri("/api/v1/users/u1/session")
                .body(Body::empty())
                .expect("request"),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], "missing or invalid bearer token");

        // A valid token reaches the handler, which reports the missing store.
        let (status, _) = send(
            router,
            Request::builder()
                .uri("/api/v1/users/u1/session")
                .header("authorization", "Bearer secret-token")
                .body(Body::empty())
                .expect("request"),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn search_is_public_even_with_auth_enabled() {
        let keys = vec!["secret-token".to_string()];
        let auth = AuthState::from_keys(&keys, false).expect("auth");
        let router = build_app(
            empty_state(),
            auth,
            RateLimitState::new(100, Duration::from_secs(60)),
        );

        let (status, json) = send(
            router,
            test_support::post_json(
                "/api/v1/services/search",
                &serde_json::json!({ "keyword": "anxiety" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Valid user coordinates or bounds are required");
    }

    #[tokio::test]
    async fn rate_limit_rejects_requests_over_the_window() {
        let router = build_app(
            empty_state(),
            AuthState::disabled(),
            RateLimitState::new(1, Duration::from_secs(60)),
        );
        let body = serde_json::json!({ "keyword": "anxiety" });

        let (first, _) = send(
            router.clone(),
            test_support::post_json("/api/v1/services/search", &body),
        )
        .await;
        assert_eq!(first, StatusCode::BAD_REQUEST);

        let (second, json) = send(
            router,
            test_support::post_json("/api/v1/services/search", &body),
        )
        .await;
        assert_eq!(second, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(json["error"], "rate limit exceeded");
    }

    #[tokio::test]
    async fn search_traffic_does_not_exhaust_protected_quota() {
        let keys = vec!["secret-token".to_string()];
        let auth = AuthState::from_keys(&keys, false).expect("auth");
        let router = build_app(
            empty_state(),
            auth,
            RateLimitState::new(2, Duration::from_secs(60)),
        );
        let body = serde_json::json!({ "keyword": "anxiety" });

        for _ in 0..2 {
            let (status, _) = send(
                router.clone(),
                test_support::post_json("/api/v1/services/search", &body),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
        let (status, _) = send(
            router.clone(),
            test_support::post_json("/api/v1/services/search", &body),
        )
        .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

        let (status, _) = send(
            router,
            Request::builder()
                .uri("/api/v1/users/u1/session")
                .header("authorization", "Bearer secret-token")
                .body(Body::empty())
                .expect("request"),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
