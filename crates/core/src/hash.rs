//! Hash computation for content addressing

use sha2::{Digest, Sha256};

/// Compute SHA256 hash of bytes and return as hex string
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Truncate a full hash for use in output file names
pub fn short_hash(full_hash: &str, len: usize) -> &str {
    &full_hash[..len.min(full_hash.len())]
}
