//! Working-directory lifecycle.
//!
//! Each run owns exactly one uniquely named scratch directory under the
//! current directory. It is removed on normal completion, on pipeline
//! failure, and on interrupt, whichever comes first.

use std::path::{Path, PathBuf};

use tokio::signal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::Result;

/// The per-run scratch directory holding the extracted book.
#[derive(Debug)]
pub struct WorkDir {
    path: PathBuf,
}

impl WorkDir {
    /// Create a collision-free `.tmp-<uuid>` directory under the current directory.
    pub fn create() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let path = cwd.join(format!(".tmp-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&path)?;
        info!("working directory {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the directory tree. Idempotent; a directory that was never
    /// fully created or is already gone is not an error.
    pub fn cleanup(&self) {
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => info!("removed {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("could not remove {}: {e}", self.path.display()),
        }
    }
}

/// Watch for Ctrl-C (and SIGTERM on unix); on receipt, delete the working
/// directory and exit immediately, preempting whatever the pipeline is doing.
pub fn spawn_signal_watcher(workdir: &WorkDir) -> tokio::task::JoinHandle<()> {
    let path = workdir.path().to_path_buf();
    tokio::spawn(async move {
        let ctrl_c = async {
            if signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                }
                Err(_) => std::future::pending::<()>().await,
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {}
            _ = terminate => {}
        }

        warn!("interrupt received, deleting {}", path.display());
        if let Err(e) = std::fs::remove_dir_all(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("cleanup failed: {e}");
            }
        }
        std::process::exit(130);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_is_unique_and_cleanup_idempotent() {
        let a = WorkDir::create().unwrap();
        let b = WorkDir::create().unwrap();
        assert_ne!(a.path(), b.path());
        assert!(a.path().is_dir());

        a.cleanup();
        assert!(!a.path().exists());
        // second cleanup must be a no-op, not a panic or warning-level error
        a.cleanup();

        b.cleanup();
    }
}
