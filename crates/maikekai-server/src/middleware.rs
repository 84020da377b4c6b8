use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Windows kept before expired ones are swept on insert.
const SWEEP_THRESHOLD: usize = 1024;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

#[derive(Debug, Clone, Copy)]
struct ClientWindow {
    started_at: Instant,
    count: usize,
}

/// Per-client fixed-window limiter for the provider proxy.
///
/// Clients are keyed by peer IP. Loopback peers are not limited: the
/// server's own aggregator reaches the proxy over loopback and must not be
/// starved by outside traffic. Requests without connection info share one
/// window.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    clients: Arc<Mutex<HashMap<Option<IpAddr>, ClientWindow>>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Count one request from `client`; `false` once its window is spent.
    async fn admit(&self, client: Option<IpAddr>) -> bool {
        let now = Instant::now();
        let mut clients = self.clients.lock().await;

        if clients.len() >= SWEEP_THRESHOLD {
            clients.retain(|_, w| now.duration_since(w.started_at) < self.window);
        }

        let entry = clients.entry(client).or_insert(ClientWindow {
            started_at: now,
            count: 0,
        });
        if now.duration_since(entry.started_at) >= self.window {
            *entry = ClientWindow {
                started_at: now,
                count: 0,
            };
        }
        if entry.count >= self.max_requests {
            return false;
        }
        entry.count += 1;
        true
    }
}

#[derive(Debug, Serialize)]
struct MiddlewareErrorBody {
    error: MiddlewareError,
}

#[derive(Debug, Serialize)]
struct MiddlewareError {
    code: &'static str,
    message: &'static str,
}

/// Axum middleware that extracts or generates a request ID.
///
/// An incoming `x-request-id` header is reused; otherwise a new `UUIDv4` is
/// generated. The ID is inserted into request extensions as [`RequestId`]
/// and echoed on the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware rejecting a client once it exceeds its window budget.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    if peer.is_some_and(|ip| ip.is_loopback()) || rate_limit.admit(peer).await {
        return next.run(req).await;
    }

    tracing::debug!(peer = ?peer, "rate limit exceeded");
    (
        StatusCode::TOO_MANY_REQUESTS,
        Json(MiddlewareErrorBody {
            error: MiddlewareError {
                code: "rate_limited",
                message: "rate limit exceeded",
            },
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request as HttpRequest, routing::get, Router};
    use tower::ServiceExt;

    use super::*;

    fn limited_app(max_requests: usize) -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn_with_state(
                RateLimitState::new(max_requests, Duration::from_secs(60)),
                enforce_rate_limit,
            ))
            .layer(axum::middleware::from_fn(request_id))
    }

    fn get_root() -> HttpRequest<Body> {
        HttpRequest::builder()
            .uri("/")
            .body(Body::empty())
            .expect("request")
    }

    fn get_root_from(peer: &str) -> HttpRequest<Body> {
        let mut req = get_root();
        let addr: SocketAddr = peer.parse().expect("socket addr");
        req.extensions_mut().insert(ConnectInfo(addr));
        req
    }

    #[tokio::test]
    async fn request_id_is_echoed_when_supplied() {
        let response = limited_app(10)
            .oneshot(
                HttpRequest::builder()
                    .uri("/")
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
    async fn request_id_is_generated_when_missing() {
        let response = limited_app(10).oneshot(get_root()).await.expect("response");
        let id = response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .expect("generated id");
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[tokio::test]
    async fn requests_past_the_limit_are_rejected() {
        let app = limited_app(2);

        for _ in 0..2 {
            let response = app.clone().oneshot(get_root()).await.expect("response");
            assert_eq!(response.status(), StatusCode::OK);
        }
        let response = app.oneshot(get_root()).await.expect("response");
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn each_client_has_its_own_window() {
        let app = limited_app(1);

        let first = app.clone().oneshot(get_root_from("203.0.113.5:4000")).await.expect("response");
        assert_eq!(first.status(), StatusCode::OK);
        let again = app.clone().oneshot(get_root_from("203.0.113.5:4001")).await.expect("response");
        assert_eq!(again.status(), StatusCode::TOO_MANY_REQUESTS);

        let other = app.oneshot(get_root_from("198.51.100.7:4000")).await.expect("response");
        assert_eq!(other.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn loopback_callers_are_never_limited() {
        let app = limited_app(1);
        app.clone().oneshot(get_root()).await.expect("response");
        let spent = app.clone().oneshot(get_root()).await.expect("response");
        assert_eq!(spent.status(), StatusCode::TOO_MANY_REQUESTS);

        for peer in ["127.0.0.1:50000", "[::1]:50000"] {
            for _ in 0..5 {
                let response = app.clone().oneshot(get_root_from(peer)).await.expect("response");
                assert_eq!(response.status(), StatusCode::OK, "peer {peer}");
            }
        }
    }
}
