//! Core wire format and blinding primitives for lantern discovery beacons.
//!
//! A beacon is a single UDP datagram advertising, in blinded form, the public
//! keys its sender is willing to be contacted as. Beacons travel in pairs: two
//! datagrams carrying consecutive challenges, spaced at least
//! [`constants::BEACON_MIN_PAIR_DELTA`] apart. This crate defines the datagram
//! layout, the challenge codec, the keyed-hash blinding, and the byte-array
//! newtypes shared by the emitter and listener crates.

pub mod blind;
pub mod constants;
pub mod error;
pub mod types;
pub mod wire;

pub use blind::{blind, packet_checksum};
pub use error::WireError;
pub use types::{BlindedEntry, ChallengeBytes, InvalidLength, PublicKey};
pub use wire::BeaconFrame;
