//! Owner record storage.
//!
//! The installation keeps exactly one owner: its display name, the seed the
//! owner's token is stretched from, and the token's verifier. The token itself
//! is never handed to a store.
//!
//! The trait is synchronous; both implementations are cheap enough to call
//! from async code directly.

mod memory;
mod redb;

use fileshare_crypto::{Seed, TokenVerifier};
pub use memory::MemoryOwnerStore;

pub use self::redb::RedbOwnerStore;
use crate::error::StoreError;

/// The registered owner of an installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerRecord {
    /// Name used as the certificate common name
    pub display_name: String,
    /// Installation seed for token derivation
    pub seed: Seed,
    /// Verifier of the owner's token
    pub verifier: TokenVerifier,
}

/// Storage for the owner record.
///
/// Must be Clone (shared between the installation and whoever embeds it),
/// Send + Sync, and synchronous. Clones share the same underlying record.
pub trait OwnerStore: Clone + Send + Sync + 'static {
    /// The registered owner, if any.
    fn owner(&self) -> Result<Option<OwnerRecord>, StoreError>;

    /// Register `record` as the owner.
    ///
    /// Returns `false` without modifying anything if an owner already
    /// exists. Check and insert happen atomically.
    fn register_owner(&self, record: &OwnerRecord) -> Result<bool, StoreError>;
}
