//! Exclusive per-directory lock for identity bootstrap.
//!
//! The lock is an OS advisory lock on a marker file, so it also serializes
//! separate processes bootstrapping the same directory. The kernel drops the
//! lock when its holder exits, crashed or not; a marker left on disk without
//! a holder does not block anyone.
//!
//! The marker file is never removed. Unlinking it while another process
//! waits on the same inode would let a third process lock a fresh file next
//! to the waiter.

use std::{
    fs::{File, TryLockError},
    path::Path,
    time::Duration,
};

use tokio::time::Instant;

use crate::error::BootstrapError;

/// Lock marker file name inside the certificates directory.
pub const LOCK_FILE_NAME: &str = ".bootstrap.lock";

/// Delay between attempts while another bootstrap holds the lock
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Held lock; released when dropped or when the process exits.
#[derive(Debug)]
pub(crate) struct DirLock {
    /// Closing the file releases the lock
    _file: File,
}

impl DirLock {
    /// Acquire the lock for `dir`, waiting up to `timeout`.
    pub(crate) async fn acquire(dir: &Path, timeout: Duration) -> Result<Self, BootstrapError> {
        let path = dir.join(LOCK_FILE_NAME);
        let file = open_marker(&path).await?;
        let deadline = Instant::now() + timeout;

        loop {
            match file.try_lock() {
                Ok(()) => return Ok(Self { _file: file }),
                Err(TryLockError::WouldBlock) => {
                    if Instant::now() >= deadline {
                        return Err(BootstrapError::Busy { path });
                    }
                    tracing::debug!("Waiting for bootstrap lock {}", path.display());
                    tokio::time::sleep(POLL_INTERVAL).await;
                },
                Err(TryLockError::Error(e)) => {
                    return Err(BootstrapError::io("failed to lock bootstrap directory")(e));
                },
            }
        }
    }
}

/// Open or create the marker without truncating it.
async fn open_marker(path: &Path) -> Result<File, BootstrapError> {
    let file = tokio::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .await
        .map_err(BootstrapError::io("failed to open lock file"))?;
    Ok(file.into_std().await)
}
