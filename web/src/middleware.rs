//! Request correlation for the booking API.
//!
//! Every request gets a correlation id: the caller's `X-Correlation-ID` if it
//! is a valid UUID, a fresh one otherwise. The id is stored in the request
//! extensions, attached to an `http_request` tracing span that wraps the
//! handler, and echoed back on the response.
//!
//! ```ignore
//! use axum::Router;
//! use broom_fairy_web::middleware::correlation_id_layer;
//!
//! let app = Router::new()
//!     .route("/api/bookings/:id/cancel", post(cancel_booking))
//!     .layer(correlation_id_layer());
//! ```

use axum::{
    extract::Request,
    http::HeaderValue,
    response::Response,
};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;
use tower::{Layer, Service};
use tracing::Instrument;
use uuid::Uuid;

/// Header name for correlation ID.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

/// Create a layer that adds correlation ID tracking to all requests.
#[must_use]
pub const fn correlation_id_layer() -> CorrelationIdLayer {
    CorrelationIdLayer
}

/// Layer for correlation ID tracking.
#[derive(Clone, Copy, Debug)]
pub struct CorrelationIdLayer;

impl<S> Layer<S> for CorrelationIdLayer {
    type Service = CorrelationIdMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorrelationIdMiddleware { inner }
    }
}

/// Middleware service for correlation ID tracking.
#[derive(Clone, Debug)]
pub struct CorrelationIdMiddleware<S> {
    inner: S,
}

impl<S> Service<Request> for CorrelationIdMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let correlation_id = req
            .headers()
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        req.extensions_mut().insert(correlation_id);

        let span = tracing::info_span!(
            "http_request",
            correlation_id = %correlation_id,
            method = %req.method(),
            uri = %req.uri(),
        );

        let started = Instant::now();
        let fut = self.inner.call(req);

        Box::pin(
            async move {
                let mut response = fut.await?;

                tracing::info!(
                    status = response.status().as_u16(),
                    elapsed_ms = started.elapsed().as_millis(),
                    "Request completed"
                );

                if let Ok(header_value) = HeaderValue::from_str(&correlation_id.to_string()) {
                    response
                        .headers_mut()
                        .insert(CORRELATION_ID_HEADER, header_value);
                }

                Ok(response)
            }
            .instrument(span),
        )
    }
}

/// Access to the correlation id stored by [`correlation_id_layer`].
pub trait CorrelationIdExt {
    /// Correlation id of the request, if the middleware is installed
    fn correlation_id(&self) -> Option<Uuid>;
}

impl CorrelationIdExt for Request {
    fn correlation_id(&self) -> Option<Uuid> {
        self.extensions().get::<Uuid>().copied()
    }
}

impl CorrelationIdExt for axum::http::request::Parts {
    fn correlation_id(&self) -> Option<Uuid> {
        self.extensions.get::<Uuid>().copied()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request, routing::get};
    use tower::ServiceExt;

    fn app() -> Router {
        async fn echo(req: Request<Body>) -> String {
            req.correlation_id().map(|id| id.to_string()).unwrap_or_default()
        }

        Router::new()
            .route("/echo", get(echo))
            .layer(correlation_id_layer())
    }

    #[tokio::test]
    async fn generated_when_missing() {
        let response = app()
            .oneshot(Request::builder().uri("/echo").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let header = response
            .headers()
            .get(CORRELATION_ID_HEADER)
            .expect("Correlation ID header should be present")
            .to_str()
            .unwrap()
            .to_string();
        assert!(Uuid::parse_str(&header).is_ok());

        // handler saw the same id
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(String::from_utf8(body.to_vec()).unwrap(), header);
    }

    #[tokio::test]
    async fn preserved_from_request() {
        let request_id = Uuid::new_v4();
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/echo")
                    .header(CORRELATION_ID_HEADER, request_id.to_string())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let response_id = response
            .headers()
            .get(CORRELATION_ID_HEADER)
            .expect("Correlation ID header should be present")
            .to_str()
            .unwrap();
        assert_eq!(response_id, request_id.to_string());
    }

    #[tokio::test]
    async fn invalid_header_is_replaced() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/echo")
                    .header(CORRELATION_ID_HEADER, "booking-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let response_id = response.headers().get(CORRELATION_ID_HEADER).unwrap().to_str().unwrap();
        assert!(Uuid::parse_str(response_id).is_ok());
    }
}
