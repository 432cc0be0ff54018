//! Fuzz target for sealed payload parsing and opening
//!
//! Feeds arbitrary bytes and text to every entry point that accepts data
//! from a peer.
//!
//! # Invariants
//!
//! - Never panics
//! - Arbitrary bytes never open under an unrelated key
//! - Every rejection is `Authentication` or, for text, `Encoding`

#![no_main]

use fileshare_crypto::{
    decrypt, CryptoError, SealedPayload, SealedTransfer, SessionKey, MIN_SEALED_SIZE,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let key = SessionKey::from_bytes([0x42; 32]);

    match decrypt(data, &key) {
        Ok(_) => panic!("random bytes opened under a fixed key"),
        Err(e) => assert_eq!(e, CryptoError::Authentication),
    }

    if let Ok(payload) = SealedPayload::try_from(data.to_vec()) {
        assert!(data.len() >= MIN_SEALED_SIZE);
        assert_eq!(payload.plaintext_len(), data.len() - MIN_SEALED_SIZE);
        let _ = payload.timestamp();
        let _ = payload.nonce();
    }

    let _ = SealedTransfer::from_bytes(data);

    if let Ok(text) = std::str::from_utf8(data) {
        match SealedPayload::from_text(text) {
            Ok(payload) => assert!(payload.as_bytes().len() >= MIN_SEALED_SIZE),
            Err(e) => assert!(matches!(
                e,
                CryptoError::Authentication | CryptoError::Encoding(_)
            )),
        }
    }
});
