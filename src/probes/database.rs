// src/probes/database.rs
use crate::config::DatabaseConfig;
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, OptsBuilder};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Outcome of a single one-shot connection attempt. The connection is
/// always closed before this is returned; nothing is reused across requests.
#[derive(Debug, Clone)]
pub enum DatabaseStatus {
    Connected {
        server_version: String,
        host: String,
        database: String,
    },
    Failed {
        error: DatabaseProbeError,
    },
}

/// Closed set of failure kinds, determined by inspecting the driver error
/// rather than echoing it wholesale.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DatabaseProbeError {
    #[error("connection attempt timed out after {0:?}")]
    Timeout(Duration),

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("server unreachable: {0}")]
    Unreachable(String),

    #[error("database error: {0}")]
    Other(String),
}

pub struct DatabaseProbe {
    config: DatabaseConfig,
}

impl DatabaseProbe {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    /// Connect, read the server version, disconnect. The timeout bounds the
    /// whole sequence, not just the TCP connect.
    pub async fn check(&self) -> DatabaseStatus {
        debug!(host = %self.config.host, "checking database connectivity");

        let status = match timeout(self.config.connect_timeout, self.probe()).await {
            Ok(status) => status,
            Err(_) => DatabaseStatus::Failed {
                error: DatabaseProbeError::Timeout(self.config.connect_timeout),
            },
        };

        if let DatabaseStatus::Failed { error } = &status {
            warn!(host = %self.config.host, %error, "database check failed");
        }

        status
    }

    async fn probe(&self) -> DatabaseStatus {
        let opts = OptsBuilder::default()
            .ip_or_hostname(self.config.host.clone())
            .tcp_port(self.config.port)
            .user(Some(self.config.user.clone()))
            .pass(Some(self.config.password.clone()))
            .db_name(Some(self.config.database.clone()));

        let mut conn = match Conn::new(opts).await {
            Ok(conn) => conn,
            Err(err) => {
                return DatabaseStatus::Failed {
                    error: classify(err),
                }
            }
        };

        let version = conn.query_first::<String, _>("SELECT VERSION()").await;

        // Close cleanly whether or not the version query worked.
        let disconnect = conn.disconnect().await;

        match version {
            Ok(version) => {
                if let Err(err) = disconnect {
                    debug!(%err, "disconnect after successful probe failed");
                }
                DatabaseStatus::Connected {
                    server_version: version.unwrap_or_else(|| "unknown".to_string()),
                    host: self.config.host.clone(),
                    database: self.config.database.clone(),
                }
            }
            Err(err) => DatabaseStatus::Failed {
                error: classify(err),
            },
        }
    }
}

fn classify(err: mysql_async::Error) -> DatabaseProbeError {
    match err {
        mysql_async::Error::Io(io_err) => DatabaseProbeError::Unreachable(io_err.to_string()),
        mysql_async::Error::Server(server_err) => {
            // 1044/1045: access denied for user, 1698: auth plugin denial.
            if matches!(server_err.code, 1044 | 1045 | 1698) {
                DatabaseProbeError::AccessDenied(server_err.message)
            } else {
                DatabaseProbeError::Other(server_err.message)
            }
        }
        other => DatabaseProbeError::Other(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;

    fn refused_config() -> DatabaseConfig {
        DatabaseConfig {
            host: "127.0.0.1".to_string(),
            // Nothing listens here, so the connect is refused immediately.
            port: 1,
            user: "probe".to_string(),
            password: "probe".to_string(),
            database: "probe".to_string(),
            connect_timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn refused_connection_reports_unreachable() {
        let probe = DatabaseProbe::new(refused_config());

        match probe.check().await {
            DatabaseStatus::Failed {
                error: DatabaseProbeError::Unreachable(message),
            } => assert!(!message.is_empty()),
            other => panic!("expected Unreachable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn check_is_bounded_by_the_timeout() {
        let mut config = refused_config();
        config.connect_timeout = Duration::from_millis(200);
        let probe = DatabaseProbe::new(config);

        let started = std::time::Instant::now();
        let status = probe.check().await;

        assert!(matches!(status, DatabaseStatus::Failed { .. }));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn timeout_error_names_the_duration() {
        let error = DatabaseProbeError::Timeout(Duration::from_secs(5));
        assert!(error.to_string().contains("timed out"));
    }
}
