// src/handlers/health.rs
use hyper::{Body, Response};
use serde::Serialize;

/// Body of the liveness probe. Deliberately dependency-free: the load
/// balancer polls this route, so it must answer fast even when the database
/// and the shared filesystem are both down.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

pub fn health() -> Response<Body> {
    super::json_response(&HealthResponse {
        status: "healthy",
        timestamp: super::timestamp(),
    })
}
