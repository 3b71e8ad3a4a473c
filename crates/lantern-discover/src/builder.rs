//! Beacon pair construction.
//!
//! A pair advertises one batch of keys from the mask cursor: datagram A
//! blinds them under a fresh random challenge `c`, datagram B under `c + 1`.
//! Randomness is injected through [`build_with_challenge`] so tests stay
//! deterministic; [`build_beacon_pair`] draws from the OS RNG.

use rand::RngCore;
use rand::rngs::OsRng;

use lantern_core::blind::blind;
use lantern_core::constants::BEACON_KEY_CAP;
use lantern_core::types::BlindedEntry;
use lantern_core::wire::BeaconFrame;
use lantern_keystore::{Keystore, KeystoreMask};

/// A composed beacon pair, ready to transmit ~1 s apart.
#[derive(Debug, Clone)]
pub struct BeaconPair {
    /// Datagram blinded under the challenge.
    pub first: Vec<u8>,
    /// Datagram blinded under challenge + 1.
    pub second: Vec<u8>,
    /// The pair's base challenge.
    pub challenge: u64,
}

/// Build the next beacon pair, drawing a fresh challenge from the OS RNG.
///
/// Advances the mask cursor by the batch consumed. Returns `None` once the
/// cursor is exhausted; the caller resets the mask and waits out the rescan
/// interval before starting a new cycle.
pub fn build_beacon_pair(mask: &mut KeystoreMask, keystore: &Keystore) -> Option<BeaconPair> {
    build_with_challenge(mask, keystore, fresh_challenge())
}

/// Build a pair under a caller-supplied challenge.
///
/// `challenge` must be below `u64::MAX` so the follow-up challenge exists;
/// [`fresh_challenge`] guarantees this.
pub fn build_with_challenge(
    mask: &mut KeystoreMask,
    keystore: &Keystore,
    challenge: u64,
) -> Option<BeaconPair> {
    let follow_up = challenge.checked_add(1)?;

    let batch = mask.next_batch(keystore, BEACON_KEY_CAP);
    if batch.is_empty() {
        return None;
    }

    let first_entries: Vec<BlindedEntry> =
        batch.iter().map(|e| blind(challenge, &e.pubkey)).collect();
    let second_entries: Vec<BlindedEntry> =
        batch.iter().map(|e| blind(follow_up, &e.pubkey)).collect();

    Some(BeaconPair {
        first: BeaconFrame::compose(challenge, &first_entries),
        second: BeaconFrame::compose(follow_up, &second_entries),
        challenge,
    })
}

/// Draw a random challenge, re-drawing on the one value with no successor.
fn fresh_challenge() -> u64 {
    loop {
        let challenge = OsRng.next_u64();
        if challenge != u64::MAX {
            return challenge;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lantern_core::constants::{BEACON_HEADER_SIZE, BEACON_MEMBER_SIZE};
    use lantern_core::types::PublicKey;

    fn nth_key(i: usize) -> PublicKey {
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&(i as u64 + 1).to_le_bytes());
        PublicKey::new(bytes)
    }

    fn store_with(n: usize) -> Keystore {
        let store = Keystore::new();
        for i in 0..n {
            store.add(nth_key(i), None);
        }
        store
    }

    #[test]
    fn pair_carries_consecutive_challenges() {
        let store = store_with(1);
        let mut mask = KeystoreMask::new();

        let pair = build_with_challenge(&mut mask, &store, 7).unwrap();
        let first = BeaconFrame::parse(&pair.first).unwrap();
        let second = BeaconFrame::parse(&pair.second).unwrap();

        assert_eq!(first.challenge(), 7);
        assert_eq!(second.challenge(), 8);
        assert!(BeaconFrame::verify_checksum(&pair.first));
        assert!(BeaconFrame::verify_checksum(&pair.second));
    }

    #[test]
    fn entries_are_reblindings_of_the_same_keys() {
        let store = store_with(3);
        let mut mask = KeystoreMask::new();

        let pair = build_with_challenge(&mut mask, &store, 100).unwrap();
        let first = BeaconFrame::parse(&pair.first).unwrap();
        let second = BeaconFrame::parse(&pair.second).unwrap();

        let snap = store.tagged_snapshot();
        for (i, entry) in snap.iter().enumerate() {
            assert_eq!(first.entries()[i], blind(100, &entry.pubkey));
            assert_eq!(second.entries()[i], blind(101, &entry.pubkey));
        }
        // Same key order, entirely different bytes.
        assert_ne!(first.entries(), second.entries());
    }

    #[test]
    fn empty_store_yields_no_pair() {
        // An exhausted or empty batch must never turn into a datagram: the
        // minimum frame carries one entry, so a bare header would be
        // structurally invalid at every listener.
        let store = Keystore::new();
        let mut mask = KeystoreMask::new();
        assert!(build_with_challenge(&mut mask, &store, 1).is_none());
    }

    #[test]
    fn cursor_spreads_large_sets_over_pairs() {
        let store = store_with(BEACON_KEY_CAP + 20);
        let mut mask = KeystoreMask::new();

        let full = build_with_challenge(&mut mask, &store, 10).unwrap();
        let first = BeaconFrame::parse(&full.first).unwrap();
        assert_eq!(first.entries().len(), BEACON_KEY_CAP);
        assert_eq!(
            full.first.len(),
            BEACON_HEADER_SIZE + BEACON_KEY_CAP * BEACON_MEMBER_SIZE
        );

        let rest = build_with_challenge(&mut mask, &store, 11).unwrap();
        let rest_first = BeaconFrame::parse(&rest.first).unwrap();
        assert_eq!(rest_first.entries().len(), 20);

        assert!(build_with_challenge(&mut mask, &store, 12).is_none());
    }

    #[test]
    fn saturated_challenge_is_refused() {
        let store = store_with(1);
        let mut mask = KeystoreMask::new();
        assert!(build_with_challenge(&mut mask, &store, u64::MAX).is_none());
    }

    #[test]
    fn random_challenges_differ_between_pairs() {
        let store = store_with(1);

        let mut mask = KeystoreMask::new();
        let a = build_beacon_pair(&mut mask, &store).unwrap();
        mask.reset();
        let b = build_beacon_pair(&mut mask, &store).unwrap();

        // Two OS RNG draws colliding would mean a broken RNG.
        assert_ne!(a.challenge, b.challenge);
    }
}
