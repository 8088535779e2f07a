use serde::Serialize;
use sha2::{Digest, Sha256};

use sbank_core::errors::{ErrorInfo, SbankError};

fn hex(digest: &[u8]) -> String {
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}

/// Canonical SHA-256 of an ordered coordinate list.
///
/// Hashes the point count followed by the little-endian bit patterns of every
/// coordinate, so two banks share a hash only if they hold bit-identical
/// templates in the same order.
pub fn canonical_bank_hash(coordinates: &[[f64; 2]]) -> String {
    let mut hasher = Sha256::new();
    hasher.update((coordinates.len() as u64).to_le_bytes());
    for [x1, x2] in coordinates {
        hasher.update(x1.to_bits().to_le_bytes());
        hasher.update(x2.to_bits().to_le_bytes());
    }
    hex(&hasher.finalize())
}

/// SHA-256 of the JSON rendering of `value`, used for configuration hashes.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, SbankError> {
    let json = serde_json::to_vec(value)
        .map_err(|err| SbankError::Serde(ErrorInfo::new("hash-serialize", err.to_string())))?;
    Ok(hex(&Sha256::digest(&json)))
}
