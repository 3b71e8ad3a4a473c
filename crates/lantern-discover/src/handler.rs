//! Consumer-facing callback trait and event types.

use std::net::IpAddr;

use lantern_core::types::{ChallengeBytes, PublicKey};

/// A recognized peer advertisement, surfaced once per matched key per pair.
#[derive(Debug, Clone)]
pub struct Discovery {
    /// The trusted key the advertisement matched, or the all-zero key for a
    /// presence-only hint.
    pub pubkey: PublicKey,
    /// The first datagram's challenge bytes, as seen on the wire.
    pub challenge: ChallengeBytes,
    /// Display tag from the keystore entry, if any.
    pub tag: Option<String>,
    /// Numeric source host the pair arrived from.
    pub source: IpAddr,
}

/// Control message delivered to the listener alongside beacon traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// Ask the listener to wind down.
    Shutdown,
    /// Host-defined payload, forwarded to the handler untouched.
    Message(String),
}

/// Capability interface the listener drives.
///
/// Both methods return `true` to keep the listener running; `false` requests
/// a graceful exit. The listener loop owns the handler for its lifetime, so
/// implementations may carry mutable state without further synchronization.
pub trait DiscoverHandler: Send {
    /// A validated beacon pair advertised a key we trust (or bare presence).
    fn on_beacon(&mut self, discovery: Discovery) -> bool;

    /// An event arrived on the host control channel.
    fn on_channel(&mut self, event: HostEvent) -> bool {
        !matches!(event, HostEvent::Shutdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder;

    impl DiscoverHandler for Recorder {
        fn on_beacon(&mut self, _discovery: Discovery) -> bool {
            true
        }
    }

    #[test]
    fn default_channel_handler_stops_on_shutdown() {
        let mut handler = Recorder;
        assert!(handler.on_channel(HostEvent::Message("tick".into())));
        assert!(!handler.on_channel(HostEvent::Shutdown));
    }
}
