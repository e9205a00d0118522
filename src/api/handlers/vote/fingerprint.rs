//! Server-side device fingerprint derivation.
//!
//! The client-supplied fingerprint is treated as an opaque high-entropy
//! token and never persisted raw. The ledger stores SHA-256 over the
//! fingerprint, the requester IP, and a fixed contest salt. Salting with
//! the IP means a fingerprint replayed from another network hashes
//! differently; the flip side is that one device on two networks counts
//! twice. That trade-off is intentional and documented, not a bug.

use sha2::{Digest, Sha256};

/// Client fingerprints shorter than this are rejected as malformed.
pub const MIN_FINGERPRINT_LENGTH: usize = 32;

/// The value stored in and compared against the vote ledger.
#[must_use]
pub fn device_fingerprint_hash(fingerprint: &str, ip: &str, contest_salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(fingerprint.as_bytes());
    hasher.update(b"-");
    hasher.update(ip.as_bytes());
    hasher.update(b"-");
    hasher.update(contest_salt.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SALT: &str = "hala-baghdad-vote";

    #[test]
    fn hash_is_deterministic() {
        let first = device_fingerprint_hash("f".repeat(32).as_str(), "1.2.3.4", SALT);
        let second = device_fingerprint_hash("f".repeat(32).as_str(), "1.2.3.4", SALT);
        assert_eq!(first, second);
    }

    #[test]
    fn hash_is_lowercase_hex_of_sha256_length() {
        let hash = device_fingerprint_hash("fingerprint-value-of-enough-length", "1.2.3.4", SALT);
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn different_ips_produce_different_hashes() {
        let fingerprint = "f".repeat(32);
        let home = device_fingerprint_hash(&fingerprint, "1.2.3.4", SALT);
        let cellular = device_fingerprint_hash(&fingerprint, "5.6.7.8", SALT);
        assert_ne!(home, cellular);
    }

    #[test]
    fn different_salts_produce_different_hashes() {
        let fingerprint = "f".repeat(32);
        let this_contest = device_fingerprint_hash(&fingerprint, "1.2.3.4", SALT);
        let other_contest = device_fingerprint_hash(&fingerprint, "1.2.3.4", "another-contest");
        assert_ne!(this_contest, other_contest);
    }

    #[test]
    fn different_fingerprints_produce_different_hashes() {
        let first = device_fingerprint_hash(&"a".repeat(32), "1.2.3.4", SALT);
        let second = device_fingerprint_hash(&"b".repeat(32), "1.2.3.4", SALT);
        assert_ne!(first, second);
    }

    #[test]
    fn separator_prevents_field_bleed() {
        // ("ab", "c") and ("a", "bc") must not collide.
        let first = device_fingerprint_hash("ab", "c", SALT);
        let second = device_fingerprint_hash("a", "bc", SALT);
        assert_ne!(first, second);
    }
}
