use sha2::{Sha256, Digest};

/// Calculate the SHA-256 hash of an in-memory payload as lowercase hex
pub fn sha256_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
