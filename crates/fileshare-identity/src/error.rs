//! Identity and first-run error types.

use std::{path::PathBuf, time::Duration};

use fileshare_crypto::CryptoError;
use thiserror::Error;

/// Errors that abort identity bootstrap.
///
/// All of these are fatal to first-run setup. None of them leave a
/// half-installed key pair behind, so the bootstrap can be attempted again.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Display name cannot be used as a certificate common name
    #[error("invalid display name: {reason}")]
    InvalidName {
        /// Why the name was rejected
        reason: &'static str,
    },

    /// External certificate tool is not installed or not executable
    #[error("certificate tool not found: {}", program.display())]
    ToolMissing {
        /// Program that could not be spawned
        program: PathBuf,
    },

    /// External certificate tool exited unsuccessfully
    #[error("certificate tool failed ({status}): {stderr}")]
    ToolFailed {
        /// Exit status as reported by the OS
        status: String,
        /// Captured standard error, trimmed
        stderr: String,
    },

    /// External certificate tool did not finish in time and was killed
    #[error("certificate tool timed out after {timeout:?}")]
    Timeout {
        /// Configured limit
        timeout: Duration,
    },

    /// Another bootstrap holds the directory lock
    #[error("identity directory is locked: {}", path.display())]
    Busy {
        /// Lock file that could not be acquired
        path: PathBuf,
    },

    /// Tool reported success but an output file is missing or malformed
    #[error("certificate tool produced no usable {}", path.display())]
    MissingArtifact {
        /// Expected output file
        path: PathBuf,
    },

    /// Filesystem operation failed
    #[error("{context}: {source}")]
    Io {
        /// What was being done
        context: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Randomness for the staging directory was unavailable
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

impl BootstrapError {
    pub(crate) fn io(context: &'static str) -> impl FnOnce(std::io::Error) -> Self {
        move |source| Self::Io { context, source }
    }
}

/// Errors from the owner record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend could not be reached or its lock was poisoned
    #[error("owner store unavailable: {0}")]
    Unavailable(String),

    /// Stored record could not be decoded
    #[error("owner record corrupt: {0}")]
    Corrupt(String),
}

/// Errors from first-run setup and unlocking.
#[derive(Debug, Error)]
pub enum InitError {
    /// First-run setup on an installation that already has an owner
    #[error("installation already has a registered owner")]
    AlreadyInitialized,

    /// Unlock attempted before first-run setup
    #[error("installation has no registered owner")]
    NotInitialized,

    /// Wrong password or failed key derivation
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Identity bootstrap failed
    #[error("identity bootstrap failed: {0}")]
    Bootstrap(#[from] BootstrapError),

    /// Owner store failed
    #[error(transparent)]
    Store(#[from] StoreError),
}
