// src/handlers/info.rs
use super::ProbeContext;
use crate::probes::{DatabaseStatus, FilesystemStatus, HostIdentity};
use hyper::{Body, Response};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub instance: String,
    pub ip: String,
    pub database: DatabaseInfo,
    pub efs: EfsInfo,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DatabaseInfo {
    Connected { host: String },
    Error { message: String },
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EfsInfo {
    Mounted { path: String },
    NotMounted { path: String },
    Error { message: String },
}

impl From<DatabaseStatus> for DatabaseInfo {
    fn from(status: DatabaseStatus) -> Self {
        match status {
            DatabaseStatus::Connected { host, .. } => DatabaseInfo::Connected { host },
            DatabaseStatus::Failed { error } => DatabaseInfo::Error {
                message: error.to_string(),
            },
        }
    }
}

impl From<FilesystemStatus> for EfsInfo {
    fn from(status: FilesystemStatus) -> Self {
        match status {
            FilesystemStatus::Writable { path } | FilesystemStatus::Mounted { path } => {
                EfsInfo::Mounted {
                    path: path.display().to_string(),
                }
            }
            FilesystemStatus::NotMounted { path } => EfsInfo::NotMounted {
                path: path.display().to_string(),
            },
            FilesystemStatus::Failed { error } => EfsInfo::Error {
                message: error.to_string(),
            },
        }
    }
}

/// `GET /api/info`: host identity plus structured check outcomes. Uses the
/// mount-only filesystem variant; the API never writes to the share.
pub async fn info(probes: &ProbeContext) -> Response<Body> {
    let identity = HostIdentity::resolve().await;
    let database = probes.database.check().await.into();
    let efs = probes.filesystem.check_mount().await.into();

    super::json_response(&InfoResponse {
        instance: identity.hostname,
        ip: identity.ip,
        database,
        efs,
        timestamp: super::timestamp(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::{DatabaseProbeError, FilesystemProbeError};
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn connected_database_serializes_with_host() {
        let info: DatabaseInfo = DatabaseStatus::Connected {
            server_version: "8.0.35".to_string(),
            host: "db.internal".to_string(),
            database: "app".to_string(),
        }
        .into();

        let value = serde_json::to_value(info).expect("serialize");
        assert_eq!(value["status"], "connected");
        assert_eq!(value["host"], "db.internal");
    }

    #[test]
    fn failed_database_serializes_with_message() {
        let info: DatabaseInfo = DatabaseStatus::Failed {
            error: DatabaseProbeError::Timeout(Duration::from_secs(5)),
        }
        .into();

        let value = serde_json::to_value(info).expect("serialize");
        assert_eq!(value["status"], "error");
        assert!(value["message"]
            .as_str()
            .expect("message is a string")
            .contains("timed out"));
    }

    #[test]
    fn unmounted_path_serializes_as_not_mounted() {
        let info: EfsInfo = FilesystemStatus::NotMounted {
            path: PathBuf::from("/srv/microblog/env"),
        }
        .into();

        let value = serde_json::to_value(info).expect("serialize");
        assert_eq!(value["status"], "not_mounted");
        assert_eq!(value["path"], "/srv/microblog/env");
    }

    #[test]
    fn writable_and_mounted_collapse_to_mounted() {
        let writable: EfsInfo = FilesystemStatus::Writable {
            path: PathBuf::from("/mnt/efs"),
        }
        .into();
        let mounted: EfsInfo = FilesystemStatus::Mounted {
            path: PathBuf::from("/mnt/efs"),
        }
        .into();

        for info in [writable, mounted] {
            let value = serde_json::to_value(info).expect("serialize");
            assert_eq!(value["status"], "mounted");
        }
    }

    #[test]
    fn filesystem_failure_serializes_with_message() {
        let info: EfsInfo = FilesystemStatus::Failed {
            error: FilesystemProbeError::PermissionDenied("denied".to_string()),
        }
        .into();

        let value = serde_json::to_value(info).expect("serialize");
        assert_eq!(value["status"], "error");
        assert!(value["message"].is_string());
    }
}
