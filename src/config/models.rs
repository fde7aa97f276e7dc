// src/config/models.rs
use anyhow::{bail, Context, Result};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Placeholder used for unset database settings, so the probe still runs
/// (and fails with a readable message) on a half-configured instance.
pub const UNSET: &str = "unknown";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DB_PORT: u16 = 3306;
const DEFAULT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_MOUNT_PATH: &str = "/srv/microblog/env";

#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds; all interfaces, port from `PORT`.
    pub listen_addr: SocketAddr,
    pub database: DatabaseConfig,
    pub filesystem: FilesystemConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Bounds the whole probe: connect, version query, disconnect.
    pub connect_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct FilesystemConfig {
    /// Path expected to be a mount point of the shared filesystem.
    pub mount_path: PathBuf,
    pub check_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            database: DatabaseConfig::default(),
            filesystem: FilesystemConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: UNSET.to_string(),
            port: DEFAULT_DB_PORT,
            user: UNSET.to_string(),
            password: UNSET.to_string(),
            database: UNSET.to_string(),
            connect_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Default for FilesystemConfig {
    fn default() -> Self {
        Self {
            mount_path: PathBuf::from(DEFAULT_MOUNT_PATH),
            check_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Read every setting once, at startup. Handlers never touch the
    /// environment themselves.
    pub fn from_env() -> Result<Self> {
        let port = parse_env("PORT", DEFAULT_PORT)?;
        let db_port = parse_env("DB_PORT", DEFAULT_DB_PORT)?;
        let connect_timeout_secs = parse_env("DB_CONNECT_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let check_timeout_secs = parse_env("EFS_CHECK_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;

        Ok(Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port),
            database: DatabaseConfig {
                host: env_or("DB_HOST", UNSET),
                port: db_port,
                user: env_or("DB_USER", UNSET),
                password: env_or("DB_PASSWORD", UNSET),
                database: env_or("DB_NAME", UNSET),
                connect_timeout: Duration::from_secs(connect_timeout_secs),
            },
            filesystem: FilesystemConfig {
                mount_path: PathBuf::from(env_or("EFS_MOUNT_PATH", DEFAULT_MOUNT_PATH)),
                check_timeout: Duration::from_secs(check_timeout_secs),
            },
        })
    }

    pub fn validate(&self) -> Result<()> {
        if !self.filesystem.mount_path.is_absolute() {
            bail!(
                "mount path must be absolute: {}",
                self.filesystem.mount_path.display()
            );
        }
        if self.database.connect_timeout.is_zero() || self.filesystem.check_timeout.is_zero() {
            bail!("probe timeouts must be non-zero");
        }
        if self.database.host == UNSET {
            warn!("DB_HOST is not set; the database probe will report an error");
        }
        Ok(())
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_placeholders() {
        let config = Config::default();
        assert_eq!(config.database.host, UNSET);
        assert_eq!(config.database.user, UNSET);
        assert_eq!(config.database.port, 3306);
        assert_eq!(config.database.connect_timeout, Duration::from_secs(5));
        assert_eq!(
            config.filesystem.mount_path,
            PathBuf::from("/srv/microblog/env")
        );
        assert_eq!(config.listen_addr.port(), 8080);
        assert!(config.listen_addr.ip().is_unspecified());
    }

    #[test]
    fn validate_rejects_relative_mount_path() {
        let mut config = Config::default();
        config.filesystem.mount_path = PathBuf::from("relative/path");
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.database.connect_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_accepts_defaults() {
        assert!(Config::default().validate().is_ok());
    }
}
