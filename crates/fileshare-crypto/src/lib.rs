//! Fileshare Cryptographic Primitives
//!
//! The trust layer two fileshare installations use to exchange files. Pure
//! functions with deterministic outputs wherever possible; the only shared
//! resource is the OS random source used for seeds and nonces.
//!
//! # Key Lifecycle
//!
//! ```text
//! password + installation seed
//!        │
//!        ▼ iterated SHA-256 (HASH_ITERATIONS rounds)
//! Token ─────────────► SHA-256 ─► TokenVerifier (persisted)
//!        │
//!        ▼ SHA-256(token || message seed)
//! SessionKey (one message)
//!        │
//!        ▼ HKDF sub-key + XChaCha20-Poly1305
//! SealedPayload
//! ```
//!
//! The token never leaves memory: the owner record stores only the seed and
//! the verifier, and a [`Session`] owns the token while the installation is
//! unlocked.
//!
//! # Security
//!
//! Authenticity:
//! - Poly1305 tag covers version, timestamp, nonce and ciphertext
//! - Tag is verified before any plaintext is released
//! - Every failure is reported as the same opaque `Authentication` error
//!
//! Secrets in memory:
//! - `Token` and `SessionKey` are zeroized on drop
//! - Their `Debug` output is redacted
//! - Verifier and token comparisons are constant-time
//!
//! The session key is the full SHA-256 digest with no dedicated KDF between
//! token and key. The sealing layer applies its own labelled HKDF step before
//! the key reaches the cipher.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod kdf;
pub mod rng;
pub mod seal;
pub mod session;
pub mod session_key;
pub mod verifier;

pub use error::CryptoError;
pub use kdf::{
    HASH_ITERATIONS, KdfParams, SEED_SIZE, Seed, TOKEN_SIZE, Token, derive_token,
    derive_token_with,
};
pub use seal::{
    MIN_SEALED_SIZE, NONCE_SIZE, SealedPayload, decrypt, encrypt, open, open_with_ttl, seal,
};
pub use session::{SealedTransfer, Session};
pub use session_key::{SESSION_KEY_SIZE, SessionKey, derive_key};
pub use verifier::{TokenVerifier, VERIFIER_SIZE, verifier_of, verify_password};
