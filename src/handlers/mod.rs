// src/handlers/mod.rs
pub mod health;
pub mod info;
pub mod status;

use crate::config::Config;
use crate::probes::{DatabaseProbe, FilesystemProbe};
use chrono::{SecondsFormat, Utc};
use hyper::{header, Body, Response, StatusCode};
use serde::Serialize;

/// Probes shared by the routes, built once from the startup configuration.
/// Each request still performs fresh checks; nothing here caches results.
pub struct ProbeContext {
    pub database: DatabaseProbe,
    pub filesystem: FilesystemProbe,
}

impl ProbeContext {
    pub fn new(config: &Config) -> Self {
        Self {
            database: DatabaseProbe::new(config.database.clone()),
            filesystem: FilesystemProbe::new(config.filesystem.clone()),
        }
    }
}

pub(crate) fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn json_response<T: Serialize>(body: &T) -> Response<Body> {
    let payload = serde_json::to_vec(body).unwrap_or_default();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload))
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn timestamp_is_iso8601() {
        let stamp = timestamp();
        assert!(DateTime::parse_from_rfc3339(&stamp).is_ok());
    }
}
