//! Sealed payloads: authenticated encryption under a session key.
//!
//! `seal` and `open` are pure - time and random bytes are provided by the
//! caller so that tests are deterministic. `encrypt` is the production entry
//! point and draws both from the system.
//!
//! # Format
//!
//! ```text
//! +---------+---------------+-------------+--------------+-----------+
//! | version | created (u64) | nonce (24B) | ciphertext   | tag (16B) |
//! +---------+---------------+-------------+--------------+-----------+
//!   1 byte    8 bytes BE      XChaCha20     len(payload)   Poly1305
//! ```
//!
//! The first 33 bytes are bound as associated data, so the tag covers
//! version, timestamp, nonce and ciphertext. The cipher key is an HKDF
//! sub-derivation of the session key and never equals it.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::{Engine, engine::general_purpose::URL_SAFE};
use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit, Payload},
};
use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::{CryptoError, rng::random_bytes, session_key::SessionKey};

/// Current format version byte.
pub const SEAL_VERSION: u8 = 0x01;

/// `XChaCha20` nonce size (24 bytes)
pub const NONCE_SIZE: usize = 24;

/// Poly1305 tag size (16 bytes)
pub const TAG_SIZE: usize = 16;

/// Version, timestamp and nonce.
pub const HEADER_SIZE: usize = 1 + 8 + NONCE_SIZE;

/// Smallest well-formed payload (empty plaintext).
pub const MIN_SEALED_SIZE: usize = HEADER_SIZE + TAG_SIZE;

/// How far in the future a creation time may lie before a TTL check rejects it.
pub const MAX_CLOCK_SKEW_SECS: u64 = 60;

/// HKDF info for the cipher sub-key
const CIPHER_KEY_LABEL: &[u8] = b"fileshareSealV1";

/// Opaque, self-describing sealed payload.
///
/// Construct with [`seal`]/[`encrypt`], or parse received bytes with
/// `TryFrom<Vec<u8>>`, which performs structural checks only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedPayload {
    bytes: Vec<u8>,
}

impl SealedPayload {
    /// Full wire encoding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume into the wire encoding.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Format version byte.
    pub fn version(&self) -> u8 {
        self.bytes[0]
    }

    /// Creation time in Unix seconds.
    ///
    /// Unauthenticated until the payload has been opened.
    pub fn timestamp(&self) -> u64 {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&self.bytes[1..9]);
        u64::from_be_bytes(raw)
    }

    /// Nonce used for this payload.
    pub fn nonce(&self) -> &[u8] {
        &self.bytes[9..HEADER_SIZE]
    }

    /// Plaintext length (payload length minus header and tag).
    pub fn plaintext_len(&self) -> usize {
        self.bytes.len().saturating_sub(MIN_SEALED_SIZE)
    }

    /// URL-safe base64 text form.
    pub fn to_text(&self) -> String {
        URL_SAFE.encode(&self.bytes)
    }

    /// Parse the text form produced by [`to_text`](Self::to_text).
    pub fn from_text(text: &str) -> Result<Self, CryptoError> {
        let bytes =
            URL_SAFE.decode(text.trim()).map_err(|e| CryptoError::Encoding(e.to_string()))?;
        Self::try_from(bytes)
    }
}

impl TryFrom<Vec<u8>> for SealedPayload {
    type Error = CryptoError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        if bytes.len() < MIN_SEALED_SIZE || bytes[0] != SEAL_VERSION {
            return Err(CryptoError::Authentication);
        }
        Ok(Self { bytes })
    }
}

impl AsRef<[u8]> for SealedPayload {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Seal `plaintext` under `key`.
///
/// # Security
///
/// - Caller MUST provide a fresh random nonce in production
/// - `timestamp` is authenticated but not checked unless the receiver uses
///   [`open_with_ttl`]
pub fn seal(
    plaintext: &[u8],
    key: &SessionKey,
    timestamp: u64,
    nonce: [u8; NONCE_SIZE],
) -> SealedPayload {
    let header = build_header(timestamp, &nonce);
    let cipher = build_cipher(key);

    let payload = Payload { msg: plaintext, aad: &header };
    let Ok(ciphertext) = cipher.encrypt(XNonce::from_slice(&nonce), payload) else {
        unreachable!("XChaCha20-Poly1305 encryption cannot fail with valid inputs");
    };

    let mut bytes = Vec::with_capacity(HEADER_SIZE + ciphertext.len());
    bytes.extend_from_slice(&header);
    bytes.extend_from_slice(&ciphertext);

    SealedPayload { bytes }
}

/// Seal with a random nonce and the current wall-clock time.
pub fn encrypt(plaintext: &[u8], key: &SessionKey) -> Result<SealedPayload, CryptoError> {
    let nonce = random_bytes::<NONCE_SIZE>()?;
    Ok(seal(plaintext, key, unix_now(), nonce))
}

/// Open a sealed payload.
///
/// The tag is checked before any plaintext is produced.
///
/// # Errors
///
/// - `Authentication`: wrong key, tampered bytes, truncation or unknown
///   version. The cases are indistinguishable.
pub fn open(sealed: &SealedPayload, key: &SessionKey) -> Result<Vec<u8>, CryptoError> {
    decrypt(sealed.as_bytes(), key)
}

/// Open raw sealed bytes as received from a peer.
pub fn decrypt(sealed: &[u8], key: &SessionKey) -> Result<Vec<u8>, CryptoError> {
    if sealed.len() < MIN_SEALED_SIZE || sealed[0] != SEAL_VERSION {
        return Err(CryptoError::Authentication);
    }

    let (header, ciphertext) = sealed.split_at(HEADER_SIZE);
    let nonce = XNonce::from_slice(&header[9..HEADER_SIZE]);
    let cipher = build_cipher(key);

    cipher
        .decrypt(nonce, Payload { msg: ciphertext, aad: header })
        .map_err(|_| CryptoError::Authentication)
}

/// Open a sealed payload and reject it if it is older than `ttl`.
///
/// Payloads dated more than [`MAX_CLOCK_SKEW_SECS`] after `now` are rejected
/// too. Freshness is checked only after authentication succeeds.
///
/// # Errors
///
/// - `Authentication`: as for [`open`]
/// - `Expired`: authentic, but outside the accepted window
pub fn open_with_ttl(
    sealed: &SealedPayload,
    key: &SessionKey,
    ttl: Duration,
    now: u64,
) -> Result<Vec<u8>, CryptoError> {
    let mut plaintext = open(sealed, key)?;

    let created_at = sealed.timestamp();
    let expired = created_at.saturating_add(ttl.as_secs()) < now;
    let from_future = created_at > now.saturating_add(MAX_CLOCK_SKEW_SECS);
    if expired || from_future {
        plaintext.zeroize();
        return Err(CryptoError::Expired { created_at, now });
    }

    Ok(plaintext)
}

/// Current wall-clock time in Unix seconds (0 if the clock predates 1970).
#[allow(clippy::disallowed_methods)]
pub fn unix_now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| elapsed.as_secs())
}

/// Cipher keyed with the HKDF sub-key of `key`.
fn build_cipher(key: &SessionKey) -> XChaCha20Poly1305 {
    let hkdf = Hkdf::<Sha256>::new(None, key.as_bytes());

    let mut sub_key = [0u8; 32];
    let Ok(()) = hkdf.expand(CIPHER_KEY_LABEL, &mut sub_key) else {
        unreachable!("32 bytes is a valid HKDF-SHA256 output length");
    };

    let cipher = XChaCha20Poly1305::new((&sub_key).into());
    sub_key.zeroize();
    cipher
}

/// Build the 33-byte header.
///
/// Structure:
/// - byte 0: version
/// - bytes 1-8: creation time (big-endian)
/// - bytes 9-32: nonce
fn build_header(timestamp: u64, nonce: &[u8; NONCE_SIZE]) -> [u8; HEADER_SIZE] {
    let mut header = [0u8; HEADER_SIZE];
    header[0] = SEAL_VERSION;
    header[1..9].copy_from_slice(&timestamp.to_be_bytes());
    header[9..HEADER_SIZE].copy_from_slice(nonce);
    header
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key(fill: u8) -> SessionKey {
        SessionKey::from_bytes([fill; 32])
    }

    #[test]
    fn seal_open_roundtrip() {
        let key = test_key(0x01);
        let sealed = seal(b"Hello, World!", &key, 1_700_000_000, [0xAB; NONCE_SIZE]);
        assert_eq!(open(&sealed, &key).unwrap(), b"Hello, World!");
    }

    #[test]
    fn seal_open_empty_payload() {
        let key = test_key(0x01);
        let sealed = seal(b"", &key, 0, [0x00; NONCE_SIZE]);
        assert_eq!(sealed.as_bytes().len(), MIN_SEALED_SIZE);
        assert_eq!(open(&sealed, &key).unwrap(), b"");
    }

    #[test]
    fn seal_open_large_payload() {
        let key = test_key(0x02);
        let plaintext = vec![0x42u8; 256 * 1024];
        let sealed = seal(&plaintext, &key, 5, [0xFF; NONCE_SIZE]);
        assert_eq!(open(&sealed, &key).unwrap(), plaintext);
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let key = test_key(0x03);
        let sealed = encrypt(b"file contents", &key).unwrap();
        assert_eq!(decrypt(sealed.as_bytes(), &key).unwrap(), b"file contents");
    }

    #[test]
    fn encrypt_uses_fresh_nonce_each_time() {
        let key = test_key(0x03);
        let a = encrypt(b"same", &key).unwrap();
        let b = encrypt(b"same", &key).unwrap();
        assert_ne!(a.nonce(), b.nonce());
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn header_structure() {
        let key = test_key(0x04);
        let sealed = seal(b"x", &key, 0x0102_0304_0506_0708, [0xAB; NONCE_SIZE]);
        let bytes = sealed.as_bytes();

        assert_eq!(bytes[0], SEAL_VERSION);
        assert_eq!(&bytes[1..9], &[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);
        assert_eq!(&bytes[9..33], &[0xAB; NONCE_SIZE]);
        assert_eq!(sealed.version(), SEAL_VERSION);
        assert_eq!(sealed.timestamp(), 0x0102_0304_0506_0708);
        assert_eq!(sealed.nonce(), &[0xAB; NONCE_SIZE]);
    }

    #[test]
    fn plaintext_len_calculation() {
        let key = test_key(0x05);
        let sealed = seal(b"hello world", &key, 0, [0x00; NONCE_SIZE]);
        assert_eq!(sealed.plaintext_len(), 11);
        assert_eq!(sealed.as_bytes().len(), HEADER_SIZE + 11 + TAG_SIZE);
    }

    #[test]
    fn ciphertext_does_not_contain_plaintext() {
        let key = test_key(0x06);
        let plaintext = b"a very recognisable plaintext";
        let sealed = seal(plaintext, &key, 0, [0x00; NONCE_SIZE]);
        assert!(!sealed.as_bytes().windows(plaintext.len()).any(|w| w == plaintext));
    }

    #[test]
    fn wrong_key_fails() {
        let sealed = seal(b"secret", &test_key(0x01), 0, [0x00; NONCE_SIZE]);
        assert_eq!(open(&sealed, &test_key(0x02)).unwrap_err(), CryptoError::Authentication);
    }

    #[test]
    fn every_single_bit_flip_is_detected() {
        let key = test_key(0x07);
        let sealed = seal(b"tamper me", &key, 1234, [0x11; NONCE_SIZE]);

        for byte in 0..sealed.as_bytes().len() {
            for bit in 0..8 {
                let mut bytes = sealed.as_bytes().to_vec();
                bytes[byte] ^= 1 << bit;
                assert_eq!(
                    decrypt(&bytes, &key).unwrap_err(),
                    CryptoError::Authentication,
                    "flip of bit {bit} in byte {byte} went undetected"
                );
            }
        }
    }

    #[test]
    fn truncated_payload_fails() {
        let key = test_key(0x08);
        let sealed = seal(b"truncate", &key, 0, [0x00; NONCE_SIZE]);
        let bytes = sealed.as_bytes();

        assert!(decrypt(&bytes[..bytes.len() - 1], &key).is_err());
        assert!(decrypt(&bytes[..MIN_SEALED_SIZE - 1], &key).is_err());
        assert!(decrypt(&[], &key).is_err());
    }

    #[test]
    fn unknown_version_is_rejected_structurally() {
        let key = test_key(0x09);
        let mut bytes = seal(b"v", &key, 0, [0x00; NONCE_SIZE]).into_bytes();
        bytes[0] = 0x02;
        assert_eq!(SealedPayload::try_from(bytes).unwrap_err(), CryptoError::Authentication);
    }

    #[test]
    fn text_form_roundtrip() {
        let key = test_key(0x0A);
        let sealed = seal(b"text", &key, 99, [0x5C; NONCE_SIZE]);
        let parsed = SealedPayload::from_text(&sealed.to_text()).unwrap();
        assert_eq!(parsed, sealed);
        assert_eq!(open(&parsed, &key).unwrap(), b"text");
        assert!(matches!(SealedPayload::from_text("not base64!"), Err(CryptoError::Encoding(_))));
    }

    #[test]
    fn ttl_accepts_fresh_payload() {
        let key = test_key(0x0B);
        let sealed = seal(b"fresh", &key, 1000, [0x00; NONCE_SIZE]);
        let opened = open_with_ttl(&sealed, &key, Duration::from_secs(60), 1060).unwrap();
        assert_eq!(opened, b"fresh");
    }

    #[test]
    fn ttl_rejects_stale_payload() {
        let key = test_key(0x0B);
        let sealed = seal(b"stale", &key, 1000, [0x00; NONCE_SIZE]);
        assert_eq!(
            open_with_ttl(&sealed, &key, Duration::from_secs(60), 1061).unwrap_err(),
            CryptoError::Expired { created_at: 1000, now: 1061 }
        );
    }

    #[test]
    fn ttl_rejects_payload_from_the_future() {
        let key = test_key(0x0B);
        let sealed = seal(b"future", &key, 2000, [0x00; NONCE_SIZE]);
        assert!(open_with_ttl(&sealed, &key, Duration::from_secs(60), 1000).is_err());

        let near = seal(b"skew", &key, 1000 + MAX_CLOCK_SKEW_SECS, [0x00; NONCE_SIZE]);
        assert!(open_with_ttl(&near, &key, Duration::from_secs(60), 1000).is_ok());
    }

    #[test]
    fn ttl_checks_authentication_first() {
        let sealed = seal(b"stale", &test_key(0x0C), 0, [0x00; NONCE_SIZE]);
        assert_eq!(
            open_with_ttl(&sealed, &test_key(0x0D), Duration::from_secs(1), 10_000).unwrap_err(),
            CryptoError::Authentication
        );
    }

    #[test]
    fn cipher_key_is_not_the_session_key() {
        // Sealing directly under the raw session key must not open.
        let key = test_key(0x0E);
        let sealed = seal(b"sub-key", &key, 0, [0x00; NONCE_SIZE]);

        let raw = XChaCha20Poly1305::new(key.as_bytes().into());
        let (header, ciphertext) = sealed.as_bytes().split_at(HEADER_SIZE);
        let result = raw.decrypt(
            XNonce::from_slice(&header[9..HEADER_SIZE]),
            Payload { msg: ciphertext, aad: header },
        );
        assert!(result.is_err());
    }
}
