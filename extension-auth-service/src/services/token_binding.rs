//! Optional token binding for handshakes.
//!
//! An extension may present a pre-shared secret at initiate time; only its
//! SHA-256 hash is stored, and later verify calls must present a token whose
//! hash matches. Comparison is constant-time.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// One-way hash of a caller-supplied shared secret (SHA-256, hex encoded).
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compare a supplied token against a stored hash without leaking timing.
pub fn token_matches(stored_hash: &str, supplied: &str) -> bool {
    let supplied_hash = hash_token(supplied);
    stored_hash
        .as_bytes()
        .ct_eq(supplied_hash.as_bytes())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_hex_sha256() {
        let hash = hash_token("secret");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        // Not the raw secret
        assert_ne!(hash, "secret");
    }

    #[test]
    fn test_matching_token_verifies() {
        let hash = hash_token("my-shared-secret");
        assert!(token_matches(&hash, "my-shared-secret"));
    }

    #[test]
    fn test_mismatched_token_fails() {
        let hash = hash_token("my-shared-secret");
        assert!(!token_matches(&hash, "my-shared-secre"));
        assert!(!token_matches(&hash, ""));
        assert!(!token_matches(&hash, "MY-SHARED-SECRET"));
    }
}
