use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;
use tracing::Instrument;
use uuid::Uuid;

use crate::api::ApiError;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Bearer token settings used by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthState {
    api_keys: Arc<Vec<String>>,
    pub enabled: bool,
}

impl AuthState {
    /// Builds auth config from the configured bearer tokens.
    ///
    /// In development, an empty key list disables auth for local iteration.
    /// In any other environment, an empty key list fails startup.
    pub fn from_keys(keys: &[String], is_development: bool) -> anyhow::Result<Self> {
        if keys.is_empty() {
            if is_development {
                tracing::warn!(
                    "CAREPOINT_API_KEYS not set; bearer auth disabled in development environment"
                );
                return Ok(Self::disabled());
            }

            anyhow::bail!(
                "CAREPOINT_API_KEYS is required outside development; provide comma-separated bearer tokens"
            );
        }

        Ok(Self {
            api_keys: Arc::new(keys.to_vec()),
            enabled: true,
        })
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self {
            api_keys: Arc::new(Vec::new()),
            enabled: false,
        }
    }

    /// Compares against every key so timing does not reveal which one matched.
    fn allows(&self, token: &str) -> bool {
        self.api_keys.iter().fold(false, |matched, key| {
            matched | bool::from(key.as_bytes().ct_eq(token.as_bytes()))
        })
    }
}

#[derive(Debug, Clone)]
struct RateLimitWindow {
    started_at: Instant,
    count: usize,
}

/// Fixed-window limiter. Clones share one window; [`RateLimitState::detached`]
/// starts a separate one.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    state: Arc<Mutex<RateLimitWindow>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            state: Arc::new(Mutex::new(RateLimitWindow {
                started_at: Instant::now(),
                count: 0,
            })),
        }
    }

    /// Same limits, independent window.
    #[must_use]
    pub fn detached(&self) -> Self {
        Self::new(self.max_requests, self.window)
    }
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let span = tracing::info_span!("request", request_id = %id);
    let mut res = next.run(req).instrument(span).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware enforcing Bearer token auth when enabled.
pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    if !auth.enabled {
        return next.run(req).await;
    }

    let token = extract_bearer_token(req.headers().get(AUTHORIZATION));

    match token {
        Some(token) if auth.allows(token) => next.run(req).await,
        _ => ApiError::unauthorized("missing or invalid bearer token").into_response(),
    }
}

/// Middleware enforcing a fixed request-per-window limit.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let mut window = rate_limit.state.lock().await;
    let elapsed = window.started_at.elapsed();

    if elapsed >= rate_limit.window {
        window.started_at = Instant::now();
        window.count = 0;
    }

    if window.count >= rate_limit.max_requests {
        drop(window);
        tracing::warn!(max_requests = rate_limit.max_requests, "rate limit exceeded");
        return ApiError::rate_limited("rate limit exceeded").into_response();
    }

    window.count += 1;
    drop(window);

    next.run(req).await
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|s| !s.trim().is_empty())
}
