//! Matching a validated pair's blinded entries against the local keystore.

use std::net::IpAddr;

use lantern_core::types::PublicKey;
use lantern_keystore::Keystore;

use crate::handler::{DiscoverHandler, Discovery};
use crate::tracker::ValidPair;

/// Match `pair`'s advertised entries against the keystore, invoking the
/// handler once per recognized key.
///
/// Each entry is replayed through [`Keystore::find_blinded`], which
/// re-blinds the trusted keys under the pair's challenge; only a peer that
/// already held a key could have produced its blinded form. A pair with no
/// entries at all is still a deliberate "I am here" signal and is surfaced
/// once with the all-zero key.
///
/// Returns `false` as soon as the handler asks to stop.
pub fn recognize<H: DiscoverHandler>(
    pair: &ValidPair,
    source: IpAddr,
    keystore: &Keystore,
    handler: &mut H,
) -> bool {
    if pair.entries.is_empty() {
        return handler.on_beacon(Discovery {
            pubkey: PublicKey::null(),
            challenge: pair.challenge_bytes,
            tag: None,
            source,
        });
    }

    for entry in &pair.entries {
        if let Some(matched) = keystore.find_blinded(pair.challenge, entry) {
            let keep_going = handler.on_beacon(Discovery {
                pubkey: matched.pubkey,
                challenge: pair.challenge_bytes,
                tag: matched.tag,
                source,
            });
            if !keep_going {
                return false;
            }
        }
    }

    true
}
