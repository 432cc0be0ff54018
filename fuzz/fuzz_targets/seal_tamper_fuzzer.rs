//! Fuzz target for seal/open under adversarial edits
//!
//! # Strategy
//!
//! - Arbitrary plaintext, key, timestamp and nonce
//! - One edit applied to the sealed bytes: bit flip, truncation, extension
//!
//! # Invariants
//!
//! - Unedited payloads open to the original plaintext
//! - Any edit is rejected with `Authentication`
//! - A different key never opens the payload

#![no_main]

use arbitrary::Arbitrary;
use fileshare_crypto::{decrypt, open, seal, CryptoError, SessionKey, NONCE_SIZE};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct TamperScenario {
    plaintext: Vec<u8>,
    key: [u8; 32],
    other_key: [u8; 32],
    timestamp: u64,
    nonce: [u8; NONCE_SIZE],
    edit: Edit,
}

#[derive(Debug, Arbitrary)]
enum Edit {
    None,
    FlipBit { index: usize, bit: u8 },
    Truncate { keep: usize },
    Extend { extra: Vec<u8> },
}

fuzz_target!(|scenario: TamperScenario| {
    let key = SessionKey::from_bytes(scenario.key);
    let sealed = seal(&scenario.plaintext, &key, scenario.timestamp, scenario.nonce);

    assert_eq!(open(&sealed, &key).as_deref(), Ok(scenario.plaintext.as_slice()));

    if scenario.other_key != scenario.key {
        let other = SessionKey::from_bytes(scenario.other_key);
        assert_eq!(open(&sealed, &other), Err(CryptoError::Authentication));
    }

    let mut bytes = sealed.into_bytes();
    let edited = match scenario.edit {
        Edit::None => false,
        Edit::FlipBit { index, bit } => {
            let index = index % bytes.len();
            bytes[index] ^= 1 << (bit % 8);
            true
        }
        Edit::Truncate { keep } => {
            let keep = keep % bytes.len();
            bytes.truncate(keep);
            true
        }
        Edit::Extend { extra } => {
            let changed = !extra.is_empty();
            bytes.extend_from_slice(&extra);
            changed
        }
    };

    let result = decrypt(&bytes, &key);
    if edited {
        assert_eq!(result, Err(CryptoError::Authentication));
    } else {
        assert_eq!(result.as_deref(), Ok(scenario.plaintext.as_slice()));
    }
});
