//! Keyed-hash blinding and the datagram checksum.
//!
//! Both are truncations of a BLAKE3 digest. A blinded entry is
//! `H(be64(challenge) ‖ pubkey)` at full entry width; the checksum is the
//! first 8 bytes of `H(body)` where body is everything after the checksum
//! field. An observer who does not already hold a public key learns nothing
//! from its blinded form, while a holder can recompute it for any challenge.

use crate::constants::{BEACON_CHECKSUM_SIZE, BEACON_MEMBER_SIZE};
use crate::types::{BlindedEntry, PublicKey};

/// Blind a public key under a challenge.
#[must_use]
pub fn blind(challenge: u64, pubkey: &PublicKey) -> BlindedEntry {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&challenge.to_be_bytes());
    hasher.update(pubkey.as_ref());

    let digest = hasher.finalize();
    let mut out = [0u8; BEACON_MEMBER_SIZE];
    out.copy_from_slice(digest.as_bytes());
    BlindedEntry::new(out)
}

/// Compute the truncated checksum over a datagram body (challenge ‖ entries).
#[must_use]
pub fn packet_checksum(body: &[u8]) -> [u8; BEACON_CHECKSUM_SIZE] {
    let digest = blake3::hash(body);
    let mut out = [0u8; BEACON_CHECKSUM_SIZE];
    out.copy_from_slice(&digest.as_bytes()[..BEACON_CHECKSUM_SIZE]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blind_is_deterministic() {
        let key = PublicKey::new([0x42; 32]);
        assert_eq!(blind(7, &key), blind(7, &key));
    }

    #[test]
    fn consecutive_challenges_diverge() {
        // The second datagram of a pair re-blinds the same keys under c + 1;
        // nothing of the first datagram's entries may be recognizable.
        let key = PublicKey::new([0x42; 32]);
        assert_ne!(blind(7, &key), blind(8, &key));
    }

    #[test]
    fn distinct_keys_diverge() {
        let a = PublicKey::new([0x01; 32]);
        let b = PublicKey::new([0x02; 32]);
        assert_ne!(blind(7, &a), blind(7, &b));
    }

    #[test]
    fn blind_matches_concatenated_digest() {
        let key = PublicKey::new([0xAA; 32]);
        let mut input = Vec::new();
        input.extend_from_slice(&7u64.to_be_bytes());
        input.extend_from_slice(key.as_ref());
        let expected = blake3::hash(&input);
        assert_eq!(blind(7, &key).as_ref(), expected.as_bytes());
    }

    #[test]
    fn checksum_is_digest_prefix() {
        let body = b"challenge-and-entries";
        let chk = packet_checksum(body);
        assert_eq!(&chk, &blake3::hash(body).as_bytes()[..8]);
    }
}
