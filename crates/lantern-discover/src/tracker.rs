//! Pair correlation state for the listener.
//!
//! Beacons only mean something in pairs: two datagrams from the same source
//! whose challenges are consecutive and whose arrival times prove at least a
//! second elapsed between them. The tracker caches the first datagram per
//! source and judges the second against it. All logic here is pure (no I/O,
//! caller-supplied clock) and fully unit-testable.
//!
//! The first datagram is cached without checksum validation; an orphan that
//! never pairs is never trusted, so the work is deferred until a partner
//! arrives.

use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;
use std::time::Instant;

use lantern_core::constants::{
    BEACON_CHECKSUM_SIZE, BEACON_HEADER_SIZE, BEACON_MIN_PAIR_DELTA,
};
use lantern_core::error::WireError;
use lantern_core::types::{BlindedEntry, ChallengeBytes};
use lantern_core::wire::BeaconFrame;

/// Upper bound on concurrently tracked sources.
///
/// Source addresses are trivially spoofable, so the pending map must not
/// grow without bound; past the cap the stalest entry is dropped.
pub const PENDING_SOURCE_CAP: usize = 256;

/// Why a candidate pair was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairFailure {
    /// The two datagrams differ in length.
    LengthMismatch,
    /// The second challenge is not the strict successor of the first.
    ChallengeMismatch,
    /// The datagrams arrived too close together to prove elapsed time.
    TooClose,
    /// The cached first datagram fails its checksum.
    FirstChecksum,
    /// The second datagram fails its checksum.
    SecondChecksum,
}

impl PairFailure {
    /// Hard failures evict the pending entry; soft failures shift the second
    /// datagram into the first slot, treating it as the start of a new pair.
    #[must_use]
    pub fn is_hard(&self) -> bool {
        matches!(
            self,
            PairFailure::LengthMismatch | PairFailure::FirstChecksum | PairFailure::SecondChecksum
        )
    }
}

impl fmt::Display for PairFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            PairFailure::LengthMismatch => "beacon length mismatch",
            PairFailure::ChallengeMismatch => "beacon pair challenge mismatch",
            PairFailure::TooClose => "beacon pair too close",
            PairFailure::FirstChecksum => "first beacon checksum fail",
            PairFailure::SecondChecksum => "second beacon checksum fail",
        };
        f.write_str(reason)
    }
}

/// A fully validated beacon pair, described by its first datagram.
///
/// The second datagram re-blinds the same keys and exists to prove timing;
/// recognition runs against the first datagram's challenge and entries.
#[derive(Debug, Clone)]
pub struct ValidPair {
    pub challenge: u64,
    pub challenge_bytes: ChallengeBytes,
    pub entries: Vec<BlindedEntry>,
}

/// Outcome of feeding one datagram to the tracker.
#[derive(Debug)]
pub enum Observation {
    /// First datagram from this source; cached, awaiting its partner.
    FirstCached,
    /// Structurally invalid; ignored entirely.
    Dropped(WireError),
    /// Hard pair failure; the pending entry was evicted.
    Rejected(PairFailure),
    /// Soft pair failure; this datagram now occupies the first slot.
    Shifted(PairFailure),
    /// The pair validated.
    Paired(ValidPair),
}

#[derive(Debug)]
struct PendingSlot {
    raw: Vec<u8>,
    received_at: Instant,
}

/// Per-source correlation state, owned by the listener loop.
#[derive(Debug)]
pub struct PairTracker {
    pending: HashMap<IpAddr, PendingSlot>,
    capacity: usize,
}

impl PairTracker {
    pub fn new() -> Self {
        Self::with_capacity(PENDING_SOURCE_CAP)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: HashMap::new(),
            capacity,
        }
    }

    /// Number of sources with a cached first datagram.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Feed one datagram from `source`, observed at `now`.
    pub fn observe(&mut self, source: IpAddr, datagram: &[u8], now: Instant) -> Observation {
        if let Err(e) = BeaconFrame::validate_len(datagram.len()) {
            return Observation::Dropped(e);
        }

        let Some(first) = self.pending.remove(&source) else {
            if self.pending.len() >= self.capacity {
                self.evict_stalest();
            }
            self.pending.insert(
                source,
                PendingSlot {
                    raw: datagram.to_vec(),
                    received_at: now,
                },
            );
            return Observation::FirstCached;
        };

        match Self::validate_pair(&first, datagram, now) {
            Ok(pair) => Observation::Paired(pair),
            Err(failure) if failure.is_hard() => Observation::Rejected(failure),
            Err(failure) => {
                // Assume the real first datagram was lost or spoofed and this
                // one opens the next pair.
                self.pending.insert(
                    source,
                    PendingSlot {
                        raw: datagram.to_vec(),
                        received_at: now,
                    },
                );
                Observation::Shifted(failure)
            }
        }
    }

    fn validate_pair(
        first: &PendingSlot,
        second_raw: &[u8],
        now: Instant,
    ) -> Result<ValidPair, PairFailure> {
        if first.raw.len() != second_raw.len() {
            return Err(PairFailure::LengthMismatch);
        }

        let first_challenge = read_challenge(&first.raw);
        let second_challenge = read_challenge(second_raw);
        match first_challenge.checked_add(1) {
            Some(next) if next == second_challenge => {}
            _ => return Err(PairFailure::ChallengeMismatch),
        }

        if now.duration_since(first.received_at) < BEACON_MIN_PAIR_DELTA {
            return Err(PairFailure::TooClose);
        }

        if !BeaconFrame::verify_checksum(&first.raw) {
            return Err(PairFailure::FirstChecksum);
        }
        if !BeaconFrame::verify_checksum(second_raw) {
            return Err(PairFailure::SecondChecksum);
        }

        let frame = BeaconFrame::parse(&first.raw).expect("cached datagram was length-validated");
        Ok(ValidPair {
            challenge: frame.challenge(),
            challenge_bytes: frame.challenge_bytes(),
            entries: frame.into_entries(),
        })
    }

    fn evict_stalest(&mut self) {
        let stalest = self
            .pending
            .iter()
            .min_by_key(|(_, slot)| slot.received_at)
            .map(|(addr, _)| *addr);
        if let Some(addr) = stalest {
            self.pending.remove(&addr);
        }
    }
}

impl Default for PairTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn read_challenge(raw: &[u8]) -> u64 {
    let bytes: [u8; 8] = raw[BEACON_CHECKSUM_SIZE..BEACON_HEADER_SIZE]
        .try_into()
        .expect("slice is exactly 8 bytes");
    u64::from_be_bytes(bytes)
}
