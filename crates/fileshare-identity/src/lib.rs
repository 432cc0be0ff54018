//! Fileshare installation identity.
//!
//! Glue between the pure primitives in [`fileshare_crypto`] and the outside
//! world: the external `openssl` tool, the filesystem and the owner record.
//!
//! # Components
//!
//! - [`IdentityBootstrap`]: creates `rsa.key`/`rsa.crt` atomically under a
//!   per-directory lock
//! - [`OpenSslGenerator`]: runs `openssl req -x509` under a timeout
//! - [`OwnerStore`]: owner record (display name, seed, verifier), with
//!   [`MemoryOwnerStore`] and the durable [`RedbOwnerStore`]
//! - [`Installation`]: first-run setup and unlocking
//!
//! # First Run
//!
//! ```text
//! is_first_run() ── no ──► unlock(password) ──► Session
//!      │
//!     yes
//!      ▼
//! first_init(name, password)
//!      ├─ seed = Seed::generate()
//!      ├─ token = derive_token(password, seed)
//!      ├─ store owner { name, seed, verifier(token) }
//!      └─ create_identity(name, certs_dir)
//!      ▼
//! (Session, Identity)
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod install;
mod lock;
pub mod store;

pub use bootstrap::{Identity, IdentityBootstrap, IdentityGenerator, OpenSslGenerator};
pub use config::{CERT_FILE_NAME, IdentityConfig, KEY_FILE_NAME, SubjectFields};
pub use error::{BootstrapError, InitError, StoreError};
pub use install::Installation;
pub use lock::LOCK_FILE_NAME;
pub use store::{MemoryOwnerStore, OwnerRecord, OwnerStore, RedbOwnerStore};

/// Create the identity for `display_name` in `target_dir` with `openssl`.
///
/// Convenience over [`IdentityBootstrap::openssl`] for one-off use.
pub async fn create_identity(
    config: &IdentityConfig,
    display_name: &str,
    target_dir: &std::path::Path,
) -> Result<Identity, BootstrapError> {
    IdentityBootstrap::openssl(config.clone()).create_identity(display_name, target_dir).await
}
