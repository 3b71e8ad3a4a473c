//! The set of long-term public keys a participant trusts.
//!
//! The emitter advertises these keys (blinded) in its beacons; the listener
//! replays the blinding over the same set to recognize peers. The store is
//! shared read-mostly between both loops behind an `Arc`; writers take the
//! interior lock briefly and never across an await point.

pub mod mask;

use std::sync::RwLock;

use lantern_core::blind::blind;
use lantern_core::types::{BlindedEntry, PublicKey};

pub use mask::KeystoreMask;

/// One trusted public key with its optional display tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEntry {
    pub pubkey: PublicKey,
    pub tag: Option<String>,
}

/// In-memory store of trusted public keys.
#[derive(Debug, Default)]
pub struct Keystore {
    entries: RwLock<Vec<KeyEntry>>,
}

impl Keystore {
    /// Create an empty keystore.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a keystore seeded with the given entries.
    pub fn with_entries(entries: impl IntoIterator<Item = KeyEntry>) -> Self {
        let store = Self::new();
        for entry in entries {
            store.add(entry.pubkey, entry.tag);
        }
        store
    }

    /// Add a key. A key already present keeps its original entry.
    pub fn add(&self, pubkey: PublicKey, tag: Option<String>) {
        let mut entries = self.entries.write().expect("keystore lock poisoned");
        if entries.iter().any(|e| e.pubkey == pubkey) {
            return;
        }
        entries.push(KeyEntry { pubkey, tag });
    }

    /// Number of trusted keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().expect("keystore lock poisoned").len()
    }

    /// Whether the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clone the current entries, in insertion order.
    ///
    /// The emitter's mask snapshots through this so that one full beacon
    /// cycle observes a consistent key set even if the store changes
    /// underneath it.
    #[must_use]
    pub fn tagged_snapshot(&self) -> Vec<KeyEntry> {
        self.entries
            .read()
            .expect("keystore lock poisoned")
            .clone()
    }

    /// Find the trusted key whose blinding under `challenge` equals `entry`.
    ///
    /// This is the listener-side replay of the emitter's blinding: only a
    /// peer that already held the key could have produced the matching
    /// entry.
    #[must_use]
    pub fn find_blinded(&self, challenge: u64, entry: &BlindedEntry) -> Option<KeyEntry> {
        self.entries
            .read()
            .expect("keystore lock poisoned")
            .iter()
            .find(|e| blind(challenge, &e.pubkey) == *entry)
            .cloned()
    }
}
