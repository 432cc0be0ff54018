//! Error types for fileshare cryptographic operations

use thiserror::Error;

/// Errors from token derivation, session keys and sealed payloads.
///
/// `Authentication` carries no detail: a wrong key, a flipped
/// bit, a truncated buffer and an unknown version all look the same to the
/// caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Sealed payload or password failed verification
    #[error("authentication failed")]
    Authentication,

    /// Seed, token or key material had the wrong length
    #[error("invalid {what} length: expected {expected}, got {actual}")]
    KeyDerivationInput {
        /// Which input was malformed
        what: &'static str,
        /// Expected length in bytes
        expected: usize,
        /// Actual length in bytes
        actual: usize,
    },

    /// Payload authenticated but is outside its accepted lifetime
    #[error("sealed payload expired: created at {created_at}, checked at {now}")]
    Expired {
        /// Creation time carried in the payload (Unix seconds)
        created_at: u64,
        /// Time of the check (Unix seconds)
        now: u64,
    },

    /// The OS random source failed
    #[error("entropy source failed: {0}")]
    Entropy(String),

    /// Text encoding of a key or payload was malformed
    #[error("malformed encoding: {0}")]
    Encoding(String),
}

impl CryptoError {
    /// Returns true if this error indicates a caller programming error rather
    /// than hostile or corrupted input.
    pub fn is_input_error(&self) -> bool {
        match self {
            Self::KeyDerivationInput { .. } => true,
            Self::Authentication | Self::Expired { .. } | Self::Entropy(_) | Self::Encoding(_) => {
                false
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_display_is_opaque() {
        assert_eq!(CryptoError::Authentication.to_string(), "authentication failed");
    }

    #[test]
    fn key_derivation_input_display() {
        let err = CryptoError::KeyDerivationInput { what: "token", expected: 32, actual: 7 };
        assert_eq!(err.to_string(), "invalid token length: expected 32, got 7");
        assert!(err.is_input_error());
    }

    #[test]
    fn authentication_is_not_input_error() {
        assert!(!CryptoError::Authentication.is_input_error());
        assert!(!CryptoError::Expired { created_at: 1, now: 2 }.is_input_error());
    }
}
