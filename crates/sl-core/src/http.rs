//! Middleware stack for the tracking API: request ids, tracing spans, CORS
//! for the browser-facing site, and request size and time limits.

use anyhow::{anyhow, Result};
use axum::http::header::{HeaderName, CONTENT_TYPE};
use axum::http::{HeaderValue, Method, Request, StatusCode};
use axum::Router;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing::{Level, Span};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Clone)]
pub struct HttpLimits {
    pub request_timeout: Duration,
    pub body_limit: usize,
    /// Browser origins allowed to call the API. Empty allows any origin.
    pub cors_origins: Vec<HeaderValue>,
}

impl Default for HttpLimits {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            body_limit: 1024 * 1024,
            cors_origins: Vec::new(),
        }
    }
}

impl HttpLimits {
    /// Parses a comma separated origin list such as
    /// `https://swiftlogistics.example, http://localhost:8080`.
    pub fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>> {
        raw.split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .map_err(|err| anyhow!("invalid cors origin {origin}: {err}"))
            })
            .collect()
    }

    fn cors(&self) -> CorsLayer {
        if self.cors_origins.is_empty() {
            return CorsLayer::permissive();
        }
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(self.cors_origins.clone()))
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers([CONTENT_TYPE])
    }
}

fn request_span<B>(service_name: &'static str, request: &Request<B>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-");
    tracing::info_span!(
        "http.request",
        service = service_name,
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id
    )
}

pub fn apply_standard_layers(
    router: Router,
    service_name: &'static str,
    limits: &HttpLimits,
) -> Router {
    let trace = TraceLayer::new_for_http()
        .make_span_with(move |request: &Request<_>| request_span(service_name, request))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        );
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    router
        .layer(CompressionLayer::new())
        .layer(limits.cors())
        .layer(trace)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            limits.request_timeout,
        ))
        .layer(RequestBodyLimitLayer::new(limits.body_limit))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN};
    use axum::routing::{get, post};
    use tower::ServiceExt;

    fn layered(limits: &HttpLimits) -> Router {
        let router = Router::new()
            .route("/", get(|| async { StatusCode::OK }))
            .route(
                "/echo",
                post(|body: axum::body::Bytes| async move { body.len().to_string() }),
            )
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    StatusCode::OK
                }),
            );
        apply_standard_layers(router, "sl-test", limits)
    }

    #[tokio::test]
    async fn responses_carry_a_request_id() {
        let response = layered(&HttpLimits::default())
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(response.headers().get(REQUEST_ID_HEADER).is_some());
    }

    #[tokio::test]
    async fn oversized_bodies_are_rejected() {
        let limits = HttpLimits {
            body_limit: 16,
            ..HttpLimits::default()
        };

        let response = layered(&limits)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/echo")
                    .body(Body::from(vec![b'x'; 17]))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn slow_requests_time_out() {
        let limits = HttpLimits {
            request_timeout: Duration::from_millis(50),
            ..HttpLimits::default()
        };

        let response = layered(&limits)
            .oneshot(Request::builder().uri("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }

    #[tokio::test]
    async fn configured_origins_restrict_cors() {
        let limits = HttpLimits {
            cors_origins: HttpLimits::parse_origins("https://site.test, ").unwrap(),
            ..HttpLimits::default()
        };
        let router = layered(&limits);

        let allowed = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(ORIGIN, "https://site.test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            allowed.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://site.test"
        );

        let denied = router
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(ORIGIN, "https://other.test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(denied.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[test]
    fn origin_list_rejects_invalid_values() {
        assert!(HttpLimits::parse_origins("https://ok.test,\u{7f}bad").is_err());
        assert!(HttpLimits::parse_origins("").unwrap().is_empty());
    }
}
