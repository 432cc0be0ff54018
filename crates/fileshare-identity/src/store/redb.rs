//! Redb-backed durable owner store.
//!
//! The record survives restarts, so `unlock` works across runs of the
//! process.

use std::{path::Path, sync::Arc};

use fileshare_crypto::{Seed, TokenVerifier};
use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};

use super::{OwnerRecord, OwnerStore};
use crate::error::StoreError;

/// Table: owner
/// Key: the fixed string [`OWNER_KEY`]
/// Value: CBOR-encoded `StoredOwner`
const OWNER: TableDefinition<&str, &[u8]> = TableDefinition::new("owner");

const OWNER_KEY: &str = "owner";

/// On-disk shape of [`OwnerRecord`].
#[derive(Serialize, Deserialize)]
struct StoredOwner {
    display_name: String,
    seed: Vec<u8>,
    verifier: Vec<u8>,
}

impl From<&OwnerRecord> for StoredOwner {
    fn from(record: &OwnerRecord) -> Self {
        Self {
            display_name: record.display_name.clone(),
            seed: record.seed.as_bytes().to_vec(),
            verifier: record.verifier.as_bytes().to_vec(),
        }
    }
}

impl TryFrom<StoredOwner> for OwnerRecord {
    type Error = StoreError;

    fn try_from(stored: StoredOwner) -> Result<Self, StoreError> {
        let seed = Seed::try_from_slice(&stored.seed)
            .map_err(|e| StoreError::Corrupt(format!("seed: {e}")))?;
        let verifier = TokenVerifier::try_from_slice(&stored.verifier)
            .map_err(|e| StoreError::Corrupt(format!("verifier: {e}")))?;
        Ok(Self { display_name: stored.display_name, seed, verifier })
    }
}

fn unavailable(e: impl std::fmt::Display) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

/// Durable owner store backed by Redb.
///
/// Clone is cheap (Arc); clones share the database handle.
#[derive(Clone)]
pub struct RedbOwnerStore {
    db: Arc<Database>,
}

impl RedbOwnerStore {
    /// Open or create the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = Database::create(path.as_ref()).map_err(unavailable)?;

        let txn = db.begin_write().map_err(unavailable)?;
        {
            let _ = txn.open_table(OWNER).map_err(unavailable)?;
        }
        txn.commit().map_err(unavailable)?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl OwnerStore for RedbOwnerStore {
    fn owner(&self) -> Result<Option<OwnerRecord>, StoreError> {
        let txn = self.db.begin_read().map_err(unavailable)?;
        let table = txn.open_table(OWNER).map_err(unavailable)?;

        match table.get(OWNER_KEY).map_err(unavailable)? {
            Some(value) => {
                let stored: StoredOwner = ciborium::from_reader(value.value())
                    .map_err(|e| StoreError::Corrupt(e.to_string()))?;
                Ok(Some(stored.try_into()?))
            },
            None => Ok(None),
        }
    }

    fn register_owner(&self, record: &OwnerRecord) -> Result<bool, StoreError> {
        let mut bytes = Vec::new();
        ciborium::into_writer(&StoredOwner::from(record), &mut bytes)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let txn = self.db.begin_write().map_err(unavailable)?;
        let registered = {
            let mut table = txn.open_table(OWNER).map_err(unavailable)?;
            let exists = table.get(OWNER_KEY).map_err(unavailable)?.is_some();
            if !exists {
                table.insert(OWNER_KEY, bytes.as_slice()).map_err(unavailable)?;
            }
            !exists
        };

        if registered {
            txn.commit().map_err(unavailable)?;
        } else {
            txn.abort().map_err(unavailable)?;
        }

        Ok(registered)
    }
}
