// src/probes/filesystem.rs
use crate::config::FilesystemConfig;
use chrono::Utc;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Outcome of a mount-point check. `Writable` is only produced by the full
/// check, which proves write access with a marker file; the mount-only
/// variant stops at `Mounted`.
#[derive(Debug, Clone)]
pub enum FilesystemStatus {
    Writable { path: PathBuf },
    Mounted { path: PathBuf },
    NotMounted { path: PathBuf },
    Failed { error: FilesystemProbeError },
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum FilesystemProbeError {
    #[error("filesystem check timed out after {0:?}")]
    Timeout(Duration),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("filesystem error: {0}")]
    Other(String),
}

pub struct FilesystemProbe {
    config: FilesystemConfig,
}

impl FilesystemProbe {
    pub fn new(config: FilesystemConfig) -> Self {
        Self { config }
    }

    /// Full check: mount-point test, then a create-write-delete of a
    /// uniquely named marker file to prove the mount accepts writes.
    pub async fn check(&self) -> FilesystemStatus {
        debug!(path = %self.config.mount_path.display(), "checking filesystem mount");
        self.run_bounded(probe_writable).await
    }

    /// Mount-only variant used by the API route; never writes.
    pub async fn check_mount(&self) -> FilesystemStatus {
        self.run_bounded(probe_mounted).await
    }

    /// Filesystem calls against a network mount can hang arbitrarily long,
    /// so they run on the blocking pool and we stop waiting at the
    /// configured deadline. A timed-out task is left to finish on its own.
    async fn run_bounded<F>(&self, op: F) -> FilesystemStatus
    where
        F: FnOnce(PathBuf) -> FilesystemStatus + Send + 'static,
    {
        let path = self.config.mount_path.clone();
        let task = task::spawn_blocking(move || op(path));

        let status = match timeout(self.config.check_timeout, task).await {
            Ok(Ok(status)) => status,
            Ok(Err(join_err)) => FilesystemStatus::Failed {
                error: FilesystemProbeError::Other(join_err.to_string()),
            },
            Err(_) => FilesystemStatus::Failed {
                error: FilesystemProbeError::Timeout(self.config.check_timeout),
            },
        };

        if let FilesystemStatus::Failed { error } = &status {
            warn!(path = %self.config.mount_path.display(), %error, "filesystem check failed");
        }

        status
    }
}

fn probe_writable(path: PathBuf) -> FilesystemStatus {
    match is_mount_point(&path) {
        Ok(true) => match write_marker(&path) {
            Ok(()) => FilesystemStatus::Writable { path },
            Err(err) => FilesystemStatus::Failed {
                error: classify(err),
            },
        },
        Ok(false) => FilesystemStatus::NotMounted { path },
        Err(err) => FilesystemStatus::Failed {
            error: classify(err),
        },
    }
}

fn probe_mounted(path: PathBuf) -> FilesystemStatus {
    match is_mount_point(&path) {
        Ok(true) => FilesystemStatus::Mounted { path },
        Ok(false) => FilesystemStatus::NotMounted { path },
        Err(err) => FilesystemStatus::Failed {
            error: classify(err),
        },
    }
}

/// Create and immediately delete a marker file named from a high-resolution
/// timestamp; concurrent probes on the shared mount cannot collide.
fn write_marker(dir: &Path) -> io::Result<()> {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let marker = dir.join(format!(".probe_{}", nanos));

    fs::write(&marker, b"probe")?;
    fs::remove_file(&marker)
}

/// Mount-point test with POSIX `ismount` semantics: a path whose device id
/// differs from its parent's, or which shares the parent's inode (`/`, bind
/// mounts), sits on a mount boundary. A missing path is simply not mounted.
#[cfg(unix)]
fn is_mount_point(path: &Path) -> io::Result<bool> {
    use std::os::unix::fs::MetadataExt;

    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };
    if meta.file_type().is_symlink() {
        return Ok(false);
    }

    let parent_meta = match fs::metadata(path.join("..")) {
        Ok(meta) => meta,
        Err(_) => return Ok(false),
    };

    Ok(meta.dev() != parent_meta.dev() || meta.ino() == parent_meta.ino())
}

#[cfg(not(unix))]
fn is_mount_point(_path: &Path) -> io::Result<bool> {
    Ok(false)
}

fn classify(err: io::Error) -> FilesystemProbeError {
    match err.kind() {
        io::ErrorKind::PermissionDenied => FilesystemProbeError::PermissionDenied(err.to_string()),
        _ => FilesystemProbeError::Other(err.to_string()),
    }
}
