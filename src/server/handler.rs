// src/server/handler.rs
use hyper::{Body, Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::sync::Arc;
use tower::Service;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::handlers::{self, ProbeContext};

#[derive(Clone)]
pub struct RequestHandler {
    context: Arc<ProbeContext>,
}

impl RequestHandler {
    pub fn new(context: Arc<ProbeContext>) -> Self {
        Self { context }
    }
}

impl Service<Request<Body>> for RequestHandler {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let context = self.context.clone();

        Box::pin(async move {
            let request_id = Uuid::new_v4();
            let span = info_span!(
                "request",
                %request_id,
                method = %req.method(),
                path = %req.uri().path(),
            );

            Ok(route(&context, &req).instrument(span).await)
        })
    }
}

/// Check failures are reported inside the body of a 200 response; only a
/// request for something that is not a route gets a non-200.
async fn route(context: &ProbeContext, req: &Request<Body>) -> Response<Body> {
    match (req.method(), req.uri().path()) {
        (&Method::GET, "/") => handlers::status::page(context).await,
        (&Method::GET, "/health") => handlers::health::health(),
        (&Method::GET, "/api/info") => handlers::info::info(context).await,
        (&Method::GET, _) => plain_response(StatusCode::NOT_FOUND, "Not Found"),
        _ => plain_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed"),
    }
}

fn plain_response(status: StatusCode, message: &'static str) -> Response<Body> {
    Response::builder()
        .status(status)
        .body(Body::from(message))
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::path::PathBuf;

    fn test_context() -> ProbeContext {
        let mut config = Config::default();
        config.database.host = "127.0.0.1".to_string();
        config.database.port = 1;
        config.filesystem.mount_path = PathBuf::from("/definitely/not/mounted");
        ProbeContext::new(&config)
    }

    fn request(method: Method, path: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .expect("build request")
    }

    #[tokio::test]
    async fn known_routes_answer_200() {
        let context = test_context();

        for path in ["/", "/health", "/api/info"] {
            let response = route(&context, &request(Method::GET, path)).await;
            assert_eq!(response.status(), StatusCode::OK, "route {}", path);
        }
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let context = test_context();
        let response = route(&context, &request(Method::GET, "/nope")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn non_get_is_405() {
        let context = test_context();
        let response = route(&context, &request(Method::POST, "/health")).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
