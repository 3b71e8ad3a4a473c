//! Restartable cursor over a keystore snapshot.
//!
//! The emitter advertises its keys in batches spread over successive beacon
//! pairs. Both datagrams of a pair must blind the *same* ordered keys, and
//! successive pairs must continue where the previous one stopped, so the
//! cursor freezes the keystore into a snapshot on first use and walks that
//! snapshot until exhausted. Resetting discards the snapshot; the next use
//! re-freezes, picking up membership changes.

use crate::{KeyEntry, Keystore};

/// Cursor state for one emission cycle over the keystore.
#[derive(Debug, Default)]
pub struct KeystoreMask {
    snapshot: Vec<KeyEntry>,
    cursor: usize,
    primed: bool,
}

impl KeystoreMask {
    /// Create an unprimed mask; the first [`next_batch`](Self::next_batch)
    /// call snapshots the keystore.
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the next batch of at most `cap` keys.
    ///
    /// Returns an empty slice once the snapshot is exhausted; the caller
    /// then resets and waits before starting a new cycle.
    pub fn next_batch(&mut self, keystore: &Keystore, cap: usize) -> &[KeyEntry] {
        if !self.primed {
            self.snapshot = keystore.tagged_snapshot();
            self.cursor = 0;
            self.primed = true;
        }

        let start = self.cursor;
        let end = (start + cap).min(self.snapshot.len());
        self.cursor = end;
        &self.snapshot[start..end]
    }

    /// Discard the snapshot and cursor; the next batch re-freezes the store.
    pub fn reset(&mut self) {
        self.snapshot.clear();
        self.cursor = 0;
        self.primed = false;
    }

    /// Whether the cursor has consumed its entire snapshot.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.primed && self.cursor >= self.snapshot.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lantern_core::types::PublicKey;

    fn store_with(n: u8) -> Keystore {
        let store = Keystore::new();
        for i in 0..n {
            store.add(PublicKey::new([i + 1; 32]), Some(format!("key-{i}")));
        }
        store
    }

    #[test]
    fn batches_progress_through_snapshot() {
        let store = store_with(5);
        let mut mask = KeystoreMask::new();

        let first: Vec<_> = mask.next_batch(&store, 2).to_vec();
        let second: Vec<_> = mask.next_batch(&store, 2).to_vec();
        let third: Vec<_> = mask.next_batch(&store, 2).to_vec();

        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 2);
        assert_eq!(third.len(), 1);
        assert!(mask.next_batch(&store, 2).is_empty());
        assert!(mask.is_exhausted());

        // Batches tile the snapshot in order with no overlap.
        let mut all = first;
        all.extend(second);
        all.extend(third);
        assert_eq!(all, store.tagged_snapshot());
    }

    #[test]
    fn snapshot_frozen_for_the_cycle() {
        let store = store_with(2);
        let mut mask = KeystoreMask::new();

        let _ = mask.next_batch(&store, 1);
        store.add(PublicKey::new([0xEE; 32]), None);

        // Mid-cycle additions stay invisible until a reset.
        let second = mask.next_batch(&store, 10);
        assert_eq!(second.len(), 1);
        assert!(mask.next_batch(&store, 10).is_empty());

        mask.reset();
        let fresh = mask.next_batch(&store, 10);
        assert_eq!(fresh.len(), 3);
    }

    #[test]
    fn reset_clears_cursor() {
        let store = store_with(3);
        let mut mask = KeystoreMask::new();

        while !mask.next_batch(&store, 2).is_empty() {}
        assert!(mask.is_exhausted());

        mask.reset();
        assert!(!mask.is_exhausted());
        assert_eq!(mask.next_batch(&store, 10).len(), 3);
    }

    #[test]
    fn empty_store_yields_empty_batch() {
        let store = Keystore::new();
        let mut mask = KeystoreMask::new();
        assert!(mask.next_batch(&store, 4).is_empty());
        assert!(mask.is_exhausted());
    }
}
