//! OS randomness for seeds and nonces.

use crate::CryptoError;

/// Fill a fixed-size array from the OS CSPRNG.
///
/// Safe to call from any thread; the OS source is the only shared resource.
pub fn random_bytes<const N: usize>() -> Result<[u8; N], CryptoError> {
    let mut bytes = [0u8; N];
    getrandom::fill(&mut bytes).map_err(|e| CryptoError::Entropy(e.to_string()))?;
    Ok(bytes)
}
