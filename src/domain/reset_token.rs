//! Password-reset token value object.
//!
//! The plaintext token travels only inside the reset email; the database
//! stores its SHA-256 fingerprint next to an absolute expiry. A leaked
//! fingerprint cannot be replayed as a token.

use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::config::RESET_TOKEN_BYTES;

/// Single-use reset token, held in plaintext only between generation
/// and the outgoing email.
pub struct ResetToken {
    plaintext: String,
}

impl std::fmt::Debug for ResetToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetToken")
            .field("plaintext", &"[REDACTED]")
            .finish()
    }
}

impl ResetToken {
    /// Generate a fresh token from 32 bytes of OS randomness, hex-encoded.
    pub fn generate() -> Self {
        let mut bytes = [0u8; RESET_TOKEN_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self {
            plaintext: hex_encode(&bytes),
        }
    }

    /// The URL-safe plaintext, to embed in the reset link.
    pub fn plaintext(&self) -> &str {
        &self.plaintext
    }

    /// SHA-256 hex fingerprint of this token, for storage.
    pub fn fingerprint(&self) -> String {
        Self::fingerprint_of(&self.plaintext)
    }

    /// Fingerprint an incoming plaintext token for lookup.
    ///
    /// The input already carries 256 bits of entropy, so a fast hash is
    /// enough; no salt or work factor needed.
    pub fn fingerprint_of(plaintext: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(plaintext.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_unique() {
        let a = ResetToken::generate();
        let b = ResetToken::generate();
        assert_ne!(a.plaintext(), b.plaintext());
    }

    #[test]
    fn test_plaintext_is_hex_of_expected_length() {
        let token = ResetToken::generate();
        assert_eq!(token.plaintext().len(), RESET_TOKEN_BYTES * 2);
        assert!(token.plaintext().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_fingerprint_matches_lookup_fingerprint() {
        let token = ResetToken::generate();
        assert_eq!(
            token.fingerprint(),
            ResetToken::fingerprint_of(token.plaintext())
        );
    }

    #[test]
    fn test_distinct_tokens_have_distinct_fingerprints() {
        let a = ResetToken::generate();
        let b = ResetToken::generate();
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_fingerprint_is_sha256_hex() {
        // Known vector: sha256("abc")
        assert_eq!(
            ResetToken::fingerprint_of("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_debug_redacts_plaintext() {
        let token = ResetToken::generate();
        let debug = format!("{:?}", token);
        assert!(!debug.contains(token.plaintext()));
    }
}
