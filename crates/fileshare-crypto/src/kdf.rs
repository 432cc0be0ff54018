//! Password stretching into the session root token.
//!
//! # Construction
//!
//! ```text
//! H = SHA-256()
//! H.update(seed); H.update(password)
//! data = H.digest()
//! repeat N times:
//!     H.update(data)          // same running accumulator
//!     data = H.digest()
//! token = data
//! ```
//!
//! The accumulator is never reset between rounds, so every round hashes the
//! whole history. Installations created by earlier releases depend on this
//! exact chaining, so it must not be "simplified" to `data = SHA-256(data)`.

use std::fmt;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::{CryptoError, rng::random_bytes};

/// Number of stretching rounds applied to every password.
pub const HASH_ITERATIONS: u32 = 100_000;

/// Size of installation and message seeds in bytes.
pub const SEED_SIZE: usize = 16;

/// Size of a token in bytes (SHA-256 digest length).
pub const TOKEN_SIZE: usize = 32;

/// Tunable parameters for [`derive_token_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Stretching rounds after the initial digest
    pub iterations: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self { iterations: HASH_ITERATIONS }
    }
}

/// Domain-separation value for token and session-key derivation.
///
/// Seeds are not secret. The installation seed lives next to the verifier in
/// the owner record; message seeds travel with the sealed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Seed([u8; SEED_SIZE]);

impl Seed {
    /// Draw a fresh seed from the OS CSPRNG.
    pub fn generate() -> Result<Self, CryptoError> {
        random_bytes().map(Self)
    }

    /// Wrap existing seed bytes.
    pub fn from_bytes(bytes: [u8; SEED_SIZE]) -> Self {
        Self(bytes)
    }

    /// Parse seed bytes of exactly [`SEED_SIZE`].
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let array = <[u8; SEED_SIZE]>::try_from(bytes).map_err(|_| {
            CryptoError::KeyDerivationInput { what: "seed", expected: SEED_SIZE, actual: bytes.len() }
        })?;
        Ok(Self(array))
    }

    /// Parse a hex-encoded seed.
    pub fn from_hex(text: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(text.trim()).map_err(|e| CryptoError::Encoding(e.to_string()))?;
        Self::try_from_slice(&bytes)
    }

    /// Raw seed bytes.
    pub fn as_bytes(&self) -> &[u8; SEED_SIZE] {
        &self.0
    }

    /// Lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl AsRef<[u8]> for Seed {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Root secret of an unlocked session.
///
/// Never persisted. Key material is zeroized on drop and `Debug` output is
/// redacted. Equality is constant-time.
pub struct Token {
    bytes: [u8; TOKEN_SIZE],
}

impl Token {
    /// Wrap raw token bytes.
    pub fn from_bytes(bytes: [u8; TOKEN_SIZE]) -> Self {
        Self { bytes }
    }

    /// Parse token bytes of exactly [`TOKEN_SIZE`].
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let array = <[u8; TOKEN_SIZE]>::try_from(bytes).map_err(|_| {
            CryptoError::KeyDerivationInput {
                what: "token",
                expected: TOKEN_SIZE,
                actual: bytes.len(),
            }
        })?;
        Ok(Self { bytes: array })
    }

    /// Raw token bytes.
    pub fn as_bytes(&self) -> &[u8; TOKEN_SIZE] {
        &self.bytes
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.bytes[..].ct_eq(&other.bytes[..]).into()
    }
}

impl Eq for Token {}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

impl Drop for Token {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

/// Derive the session token with the default [`HASH_ITERATIONS`].
///
/// Deterministic: the same password and seed always yield the same token.
/// Empty passwords are accepted; policy checks belong to the caller.
pub fn derive_token(password: &str, seed: &[u8]) -> Token {
    derive_token_with(&KdfParams::default(), password, seed)
}

/// Derive the session token with explicit parameters.
///
/// The seed length is not checked: it only has to match the seed that was
/// used when the persisted verifier was created.
pub fn derive_token_with(params: &KdfParams, password: &str, seed: &[u8]) -> Token {
    let mut hasher = Sha256::new();
    hasher.update(seed);
    hasher.update(password.as_bytes());

    let mut data: [u8; TOKEN_SIZE] = hasher.clone().finalize().into();
    for _ in 0..params.iterations {
        hasher.update(data);
        data = hasher.clone().finalize().into();
    }

    let token = Token::from_bytes(data);
    data.zeroize();
    token
}
