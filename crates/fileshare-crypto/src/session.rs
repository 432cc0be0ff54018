//! Unlocked session holding the root token in memory.

use crate::{
    CryptoError,
    kdf::{SEED_SIZE, Seed, Token},
    seal::{SealedPayload, decrypt, encrypt},
    session_key::derive_key,
    verifier::{TokenVerifier, verifier_of},
};

/// Sealed file payload together with the message seed its key came from.
///
/// Both halves travel to the peer; framing them is the transport's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedTransfer {
    /// Per-message seed for [`derive_key`]
    pub seed: Seed,
    /// The sealed payload
    pub payload: SealedPayload,
}

impl SealedTransfer {
    /// Seed followed by the sealed payload, for storing both in one file.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(SEED_SIZE + self.payload.as_bytes().len());
        bytes.extend_from_slice(self.seed.as_bytes());
        bytes.extend_from_slice(self.payload.as_bytes());
        bytes
    }

    /// Split bytes produced by [`to_bytes`](Self::to_bytes).
    ///
    /// Structural failures are reported as `Authentication`, like every
    /// other way a transfer can fail to open.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() < SEED_SIZE {
            return Err(CryptoError::Authentication);
        }
        let (seed, payload) = bytes.split_at(SEED_SIZE);
        Ok(Self {
            seed: Seed::try_from_slice(seed)?,
            payload: SealedPayload::try_from(payload.to_vec())?,
        })
    }
}

/// An unlocked session.
///
/// Owns the token for its lifetime and is passed by reference to whatever
/// needs to seal or open transfers. Dropping the session zeroizes the token.
#[derive(Debug)]
pub struct Session {
    token: Token,
}

impl Session {
    /// Open a session around an already verified token.
    pub fn new(token: Token) -> Self {
        Self { token }
    }

    /// Verifier of the session token, for registering a new owner.
    pub fn verifier(&self) -> TokenVerifier {
        verifier_of(&self.token)
    }

    /// Seal a payload under a one-time key from a fresh message seed.
    pub fn seal_transfer(&self, payload: &[u8]) -> Result<SealedTransfer, CryptoError> {
        let seed = Seed::generate()?;
        let key = derive_key(&self.token, seed.as_bytes())?;
        let payload = encrypt(payload, &key)?;
        Ok(SealedTransfer { seed, payload })
    }

    /// Open a transfer sealed by a peer sharing this session's token.
    ///
    /// # Errors
    ///
    /// - `Authentication`: tampered transfer or a different token
    pub fn open_transfer(&self, transfer: &SealedTransfer) -> Result<Vec<u8>, CryptoError> {
        self.open_raw(transfer.seed.as_bytes(), transfer.payload.as_bytes())
    }

    /// Open raw sealed bytes with an explicit message seed.
    pub fn open_raw(&self, seed: &[u8], sealed: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let key = derive_key(&self.token, seed)?;
        decrypt(sealed, &key)
    }
}
