//! Beacon emitter and listener loops for LAN peer discovery.
//!
//! Participants find each other by broadcasting *beacon pairs*: two UDP
//! datagrams carrying consecutive challenges, sent a second apart, each
//! advertising the sender's trusted public keys in blinded form. A passive
//! observer who does not already hold a key learns nothing from the
//! datagrams; a listener that shares a key recognizes it by replaying the
//! blinding over its own keystore.
//!
//! The [`BeaconEmitter`] and [`BeaconListener`] own their sockets and share
//! nothing but a read-mostly [`Keystore`](lantern_keystore::Keystore); they
//! can run as independent tasks in one process or in separate processes.

pub mod builder;
pub mod config;
pub mod emitter;
pub mod error;
pub mod handler;
pub mod listener;
pub mod logging;
pub mod recognize;
pub mod shutdown;
pub mod tracker;

pub use builder::{BeaconPair, build_beacon_pair, build_with_challenge};
pub use config::DiscoverConfig;
pub use emitter::BeaconEmitter;
pub use error::DiscoverError;
pub use handler::{DiscoverHandler, Discovery, HostEvent};
pub use listener::BeaconListener;
pub use recognize::recognize;
pub use shutdown::ShutdownToken;
pub use tracker::{Observation, PairFailure, PairTracker, ValidPair};
