//! Per-message key derivation.
//!
//! `key = SHA-256(token || seed)`, the full 32-byte digest, unmodified. The
//! sealed payload cipher (XChaCha20-Poly1305) consumes a 32-byte key, so no
//! truncation or expansion happens at this layer.

use std::fmt;

use base64::{Engine, engine::general_purpose::URL_SAFE};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use crate::{CryptoError, kdf::Token};

/// Size of a session key in bytes.
pub const SESSION_KEY_SIZE: usize = 32;

/// Symmetric key for exactly one seal/open pair.
///
/// Derived fresh per message and dropped after use; key material is zeroized
/// on drop.
pub struct SessionKey {
    key: [u8; SESSION_KEY_SIZE],
}

impl SessionKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(key: [u8; SESSION_KEY_SIZE]) -> Self {
        Self { key }
    }

    /// 32-byte key.
    pub fn as_bytes(&self) -> &[u8; SESSION_KEY_SIZE] {
        &self.key
    }

    /// URL-safe base64 handle for APIs that take textual keys.
    pub fn to_base64url(&self) -> String {
        URL_SAFE.encode(self.key)
    }

    /// Parse a handle produced by [`to_base64url`](Self::to_base64url).
    pub fn from_base64url(text: &str) -> Result<Self, CryptoError> {
        let mut bytes =
            URL_SAFE.decode(text.trim()).map_err(|e| CryptoError::Encoding(e.to_string()))?;
        let parsed = <[u8; SESSION_KEY_SIZE]>::try_from(bytes.as_slice()).map_err(|_| {
            CryptoError::KeyDerivationInput {
                what: "session key",
                expected: SESSION_KEY_SIZE,
                actual: bytes.len(),
            }
        });
        bytes.zeroize();
        parsed.map(Self::from_bytes)
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionKey(<redacted>)")
    }
}

impl Drop for SessionKey {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

/// Derive the key for one message from the session token and its seed.
///
/// # Errors
///
/// - `KeyDerivationInput`: the seed is empty
///
/// Seed uniqueness is not enforced here. Sealing two different payloads
/// under the same (token, seed) is a protocol violation by the caller.
pub fn derive_key(token: &Token, seed: &[u8]) -> Result<SessionKey, CryptoError> {
    if seed.is_empty() {
        return Err(CryptoError::KeyDerivationInput { what: "seed", expected: 1, actual: 0 });
    }

    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.update(seed);

    Ok(SessionKey::from_bytes(hasher.finalize().into()))
}
