//! One-way verifier for checking a password without storing its token.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::{
    CryptoError,
    kdf::{KdfParams, Token, derive_token_with},
};

/// Size of a verifier in bytes.
pub const VERIFIER_SIZE: usize = 32;

/// SHA-256 digest of a [`Token`]. Safe to persist.
///
/// Equality is constant-time so that checking a candidate against the stored
/// value leaks nothing about how many leading bytes matched.
#[derive(Debug, Clone, Copy)]
pub struct TokenVerifier([u8; VERIFIER_SIZE]);

impl TokenVerifier {
    /// Wrap stored verifier bytes.
    pub fn from_bytes(bytes: [u8; VERIFIER_SIZE]) -> Self {
        Self(bytes)
    }

    /// Parse verifier bytes of exactly [`VERIFIER_SIZE`].
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let array = <[u8; VERIFIER_SIZE]>::try_from(bytes).map_err(|_| {
            CryptoError::KeyDerivationInput {
                what: "verifier",
                expected: VERIFIER_SIZE,
                actual: bytes.len(),
            }
        })?;
        Ok(Self(array))
    }

    /// Parse a hex-encoded verifier.
    pub fn from_hex(text: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(text.trim()).map_err(|e| CryptoError::Encoding(e.to_string()))?;
        Self::try_from_slice(&bytes)
    }

    /// Raw verifier bytes.
    pub fn as_bytes(&self) -> &[u8; VERIFIER_SIZE] {
        &self.0
    }

    /// Lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Whether `token` hashes to this verifier. Constant-time.
    pub fn matches(&self, token: &Token) -> bool {
        verifier_of(token) == *self
    }
}

impl PartialEq for TokenVerifier {
    fn eq(&self, other: &Self) -> bool {
        self.0[..].ct_eq(&other.0[..]).into()
    }
}

impl Eq for TokenVerifier {}

/// Single SHA-256 pass over the token bytes.
pub fn verifier_of(token: &Token) -> TokenVerifier {
    TokenVerifier(Sha256::digest(token.as_bytes()).into())
}

/// Re-derive the token for `password` and check it against `verifier`.
///
/// Returns the token on success so the caller can open a session with it.
///
/// # Errors
///
/// - `Authentication`: the password does not produce the stored verifier
pub fn verify_password(
    params: &KdfParams,
    password: &str,
    seed: &[u8],
    verifier: &TokenVerifier,
) -> Result<Token, CryptoError> {
    let token = derive_token_with(params, password, seed);
    if verifier.matches(&token) { Ok(token) } else { Err(CryptoError::Authentication) }
}
