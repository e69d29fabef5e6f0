//! Content hashing for change detection

use sha2::{Digest, Sha256};

/// Hash content using SHA-256
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Short form of a content hash for log lines
pub fn short_hash(hash: &str) -> &str {
    let end = hash
        .char_indices()
        .nth(8)
        .map(|(i, _)| i)
        .unwrap_or(hash.len());
    &hash[..end]
}
