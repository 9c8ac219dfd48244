//! Recovery tokens let a user resume an interrupted assessment.
//!
//! Only the SHA-256 hash of a token is persisted; the plaintext is returned
//! once, at session creation.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// Plaintext recovery token handed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryToken(String);

impl RecoveryToken {
    /// Generates a new random 64-character token.
    pub fn generate() -> Self {
        Self(format!(
            "{}{}",
            Uuid::new_v4().simple(),
            Uuid::new_v4().simple()
        ))
    }

    /// Wraps a token supplied by a caller.
    pub fn from_plaintext(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the plaintext token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the lowercase hex SHA-256 hash of the token.
    pub fn hash(&self) -> String {
        hash_token(&self.0)
    }
}

/// Hashes a plaintext token.
pub fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.trim().as_bytes()))
}

/// Compares a plaintext token against a stored hash in constant time.
pub fn verify_token(token: &str, stored_hash: &str) -> bool {
    let candidate = hash_token(token);
    candidate.as_bytes().ct_eq(stored_hash.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_unique_and_long() {
        let a = RecoveryToken::generate();
        let b = RecoveryToken::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn hash_is_hex_sha256() {
        let hash = RecoveryToken::from_plaintext("abc").hash();
        assert_eq!(
            hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn verify_accepts_matching_token_only() {
        let token = RecoveryToken::generate();
        let stored = token.hash();
        assert!(verify_token(token.as_str(), &stored));
        assert!(!verify_token("wrong-token", &stored));
    }
}
