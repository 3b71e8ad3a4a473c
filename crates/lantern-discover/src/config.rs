//! TOML-based configuration for the discovery loops.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use lantern_core::constants::BEACON_PORT;
use lantern_core::types::PublicKey;
use lantern_keystore::{KeyEntry, Keystore};

use crate::error::DiscoverError;

/// Configuration for a [`BeaconEmitter`](crate::BeaconEmitter) and
/// [`BeaconListener`](crate::BeaconListener).
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverConfig {
    /// Listener bind address.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    /// Emitter bind address (ephemeral port by default).
    #[serde(default = "default_emit_bind_addr")]
    pub emit_bind_addr: SocketAddr,
    /// Destination the emitter broadcasts beacon pairs to.
    #[serde(default = "default_broadcast_addr")]
    pub broadcast_addr: SocketAddr,
    /// Seconds to wait between full emission cycles once the key set is
    /// exhausted. A new cycle rescans the keystore.
    #[serde(default = "default_timesleep")]
    pub timesleep: u64,
    /// Trusted keys loaded at startup.
    #[serde(default)]
    pub keys: Vec<KeyConfigEntry>,
}

/// A `[[keys]]` entry: hex-encoded public key plus optional display tag.
#[derive(Debug, Clone, Deserialize)]
pub struct KeyConfigEntry {
    pub pubkey: String,
    pub tag: Option<String>,
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, BEACON_PORT))
}

fn default_emit_bind_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
}

fn default_broadcast_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::BROADCAST, BEACON_PORT))
}

fn default_timesleep() -> u64 {
    10
}

impl Default for DiscoverConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            emit_bind_addr: default_emit_bind_addr(),
            broadcast_addr: default_broadcast_addr(),
            timesleep: default_timesleep(),
            keys: Vec::new(),
        }
    }
}

impl DiscoverConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, DiscoverError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DiscoverError::Config(format!("failed to read config file: {e}")))?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, DiscoverError> {
        toml::from_str(s).map_err(|e| DiscoverError::Config(format!("failed to parse config: {e}")))
    }

    /// The inter-cycle keystore rescan delay.
    #[must_use]
    pub fn rescan_interval(&self) -> Duration {
        Duration::from_secs(self.timesleep)
    }

    /// Decode the configured `[[keys]]` entries into a keystore.
    pub fn build_keystore(&self) -> Result<Keystore, DiscoverError> {
        let mut entries = Vec::with_capacity(self.keys.len());
        for key in &self.keys {
            let bytes = hex::decode(&key.pubkey)
                .map_err(|e| DiscoverError::Config(format!("bad pubkey hex: {e}")))?;
            let pubkey = PublicKey::try_from(bytes.as_slice())
                .map_err(|e| DiscoverError::Config(format!("bad pubkey: {e}")))?;
            entries.push(KeyEntry {
                pubkey,
                tag: key.tag.clone(),
            });
        }
        Ok(Keystore::with_entries(entries))
    }
}
