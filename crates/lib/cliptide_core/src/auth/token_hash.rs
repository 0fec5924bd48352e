//! Refresh token hashing for storage.
//!
//! Only the SHA-256 digest of a refresh token is ever persisted; the raw
//! token exists solely on the client.

use sha2::{Digest, Sha256};

/// SHA-256 hex digest of a token.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_hex_and_stable() {
        let a = hash_token("some-token");
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(a, hash_token("some-token"));
    }

    #[test]
    fn distinct_tokens_hash_differently() {
        assert_ne!(hash_token("token-one"), hash_token("token-two"));
    }
}
