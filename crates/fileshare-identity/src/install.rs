//! First-run setup and unlocking of an installation.

use std::path::{Path, PathBuf};

use fileshare_crypto::{KdfParams, Seed, Session, derive_token_with, verify_password};

use crate::{
    bootstrap::{Identity, IdentityBootstrap, IdentityGenerator, validate_display_name},
    error::InitError,
    store::{OwnerRecord, OwnerStore},
};

/// One fileshare installation: its owner record and identity directory.
///
/// Token derivation runs inline on the calling task. With the default
/// parameters that is a few tens of milliseconds of hashing.
pub struct Installation<S, G> {
    store: S,
    bootstrap: IdentityBootstrap<G>,
    certs_dir: PathBuf,
    kdf: KdfParams,
}

impl<S: OwnerStore, G: IdentityGenerator> Installation<S, G> {
    /// Installation keeping its identity in `certs_dir`.
    pub fn new(store: S, bootstrap: IdentityBootstrap<G>, certs_dir: impl Into<PathBuf>) -> Self {
        Self { store, bootstrap, certs_dir: certs_dir.into(), kdf: KdfParams::default() }
    }

    /// Override token stretching parameters.
    ///
    /// Must stay the same for the lifetime of the owner record.
    #[must_use]
    pub fn with_kdf_params(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }

    /// Directory holding the certificate and private key.
    pub fn certs_dir(&self) -> &Path {
        &self.certs_dir
    }

    /// Where the identity lives, whether or not it exists yet.
    pub fn identity(&self) -> Identity {
        Identity::in_dir(&self.certs_dir)
    }

    /// The registered owner, if any.
    pub fn owner(&self) -> Result<Option<OwnerRecord>, InitError> {
        Ok(self.store.owner()?)
    }

    /// Whether no owner has been registered yet.
    pub fn is_first_run(&self) -> Result<bool, InitError> {
        Ok(self.store.owner()?.is_none())
    }

    /// Register the owner and create the installation identity.
    ///
    /// Draws a fresh installation seed, stretches `password` into the token,
    /// stores seed and verifier, then bootstraps the certificate with
    /// `display_name` as its common name. Returns the unlocked session.
    ///
    /// If the bootstrap fails after the owner was registered, the owner
    /// stays registered and [`ensure_identity`](Self::ensure_identity) can
    /// retry the certificate.
    ///
    /// # Errors
    ///
    /// - `AlreadyInitialized`: an owner exists, nothing is modified
    /// - `Bootstrap`: certificate generation failed
    pub async fn first_init(
        &self,
        display_name: &str,
        password: &str,
    ) -> Result<(Session, Identity), InitError> {
        if !self.is_first_run()? {
            tracing::warn!("First-run setup refused: owner already registered");
            return Err(InitError::AlreadyInitialized);
        }
        validate_display_name(display_name)?;

        let seed = Seed::generate()?;
        let session = Session::new(derive_token_with(&self.kdf, password, seed.as_bytes()));

        let record = OwnerRecord {
            display_name: display_name.to_string(),
            seed,
            verifier: session.verifier(),
        };
        if !self.store.register_owner(&record)? {
            tracing::warn!("First-run setup lost a race with another registration");
            return Err(InitError::AlreadyInitialized);
        }
        tracing::info!("Registered owner '{}'", display_name);

        let identity = self.bootstrap.create_identity(display_name, &self.certs_dir).await?;

        Ok((session, identity))
    }

    /// Create the identity for the registered owner if it is missing.
    ///
    /// # Errors
    ///
    /// - `NotInitialized`: no owner registered
    pub async fn ensure_identity(&self) -> Result<Identity, InitError> {
        let owner = self.store.owner()?.ok_or(InitError::NotInitialized)?;

        let identity = self.identity();
        if identity.is_complete() {
            return Ok(identity);
        }

        tracing::info!("Identity for '{}' missing, creating it", owner.display_name);
        Ok(self.bootstrap.create_identity(&owner.display_name, &self.certs_dir).await?)
    }

    /// Unlock the installation with the owner's password.
    ///
    /// # Errors
    ///
    /// - `NotInitialized`: no owner registered
    /// - `Crypto(Authentication)`: wrong password
    pub fn unlock(&self, password: &str) -> Result<Session, InitError> {
        let owner = self.store.owner()?.ok_or(InitError::NotInitialized)?;

        let token = verify_password(&self.kdf, password, owner.seed.as_bytes(), &owner.verifier)
            .inspect_err(|_| tracing::warn!("Unlock rejected"))?;

        tracing::debug!("Unlocked installation of '{}'", owner.display_name);
        Ok(Session::new(token))
    }
}
