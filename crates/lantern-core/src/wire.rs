//! Beacon datagram layout: parsing, composition, and checksum verification.
//!
//! Layout:
//!
//! ```text
//! offset 0  : 8 bytes   checksum   (truncated hash of bytes [8..])
//! offset 8  : 8 bytes   challenge  (big-endian u64)
//! offset 16 : N × 32    blinded entries, N ≥ 1
//! ```
//!
//! Parsing performs structural validation only. Checksum verification is a
//! separate step: the listener defers it until a datagram has a paired
//! partner, since an orphan first datagram is never trusted on its own.

use crate::blind::packet_checksum;
use crate::constants::{
    BEACON_CHECKSUM_SIZE, BEACON_HEADER_SIZE, BEACON_MAX_BYTES, BEACON_MEMBER_SIZE,
    BEACON_MIN_BYTES,
};
use crate::error::WireError;
use crate::types::{BlindedEntry, ChallengeBytes};

/// A structurally validated beacon datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct BeaconFrame {
    challenge: u64,
    entries: Vec<BlindedEntry>,
}

impl BeaconFrame {
    /// Check that `len` is an acceptable datagram length.
    pub fn validate_len(len: usize) -> Result<(), WireError> {
        if len < BEACON_MIN_BYTES {
            return Err(WireError::TooShort {
                min: BEACON_MIN_BYTES,
                actual: len,
            });
        }
        if len > BEACON_MAX_BYTES {
            return Err(WireError::TooLong {
                max: BEACON_MAX_BYTES,
                actual: len,
            });
        }
        let keyset_len = len - BEACON_HEADER_SIZE;
        if keyset_len % BEACON_MEMBER_SIZE != 0 {
            return Err(WireError::Misaligned { len: keyset_len });
        }
        Ok(())
    }

    /// Parse a datagram, validating structure but not the checksum.
    #[must_use = "parsing may fail; check the Result"]
    pub fn parse(raw: &[u8]) -> Result<Self, WireError> {
        Self::validate_len(raw.len())?;

        let challenge_bytes: [u8; 8] = raw[BEACON_CHECKSUM_SIZE..BEACON_HEADER_SIZE]
            .try_into()
            .expect("slice is exactly 8 bytes");
        let challenge = u64::from_be_bytes(challenge_bytes);

        let entries = raw[BEACON_HEADER_SIZE..]
            .chunks_exact(BEACON_MEMBER_SIZE)
            .map(|chunk| {
                let arr: [u8; BEACON_MEMBER_SIZE] =
                    chunk.try_into().expect("chunk is exactly member-sized");
                BlindedEntry::new(arr)
            })
            .collect();

        Ok(BeaconFrame { challenge, entries })
    }

    /// Serialize a datagram with its checksum filled in.
    #[must_use = "composition produces a new Vec"]
    pub fn compose(challenge: u64, entries: &[BlindedEntry]) -> Vec<u8> {
        let mut raw = Vec::with_capacity(BEACON_HEADER_SIZE + entries.len() * BEACON_MEMBER_SIZE);
        raw.extend_from_slice(&[0u8; BEACON_CHECKSUM_SIZE]);
        raw.extend_from_slice(ChallengeBytes::from_value(challenge).as_ref());
        for entry in entries {
            raw.extend_from_slice(entry.as_ref());
        }

        let checksum = packet_checksum(&raw[BEACON_CHECKSUM_SIZE..]);
        raw[..BEACON_CHECKSUM_SIZE].copy_from_slice(&checksum);
        raw
    }

    /// Verify the checksum of a raw datagram against its body.
    #[must_use = "returns a bool without side effects"]
    pub fn verify_checksum(raw: &[u8]) -> bool {
        if raw.len() < BEACON_HEADER_SIZE {
            return false;
        }
        packet_checksum(&raw[BEACON_CHECKSUM_SIZE..]) == raw[..BEACON_CHECKSUM_SIZE]
    }

    pub fn challenge(&self) -> u64 {
        self.challenge
    }

    pub fn challenge_bytes(&self) -> ChallengeBytes {
        ChallengeBytes::from_value(self.challenge)
    }

    pub fn entries(&self) -> &[BlindedEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<BlindedEntry> {
        self.entries
    }
}
