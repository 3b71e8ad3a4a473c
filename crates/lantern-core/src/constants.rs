//! Protocol constants for the beacon wire format and pacing.

use std::time::Duration;

/// UDP port beacons are broadcast to and received on.
pub const BEACON_PORT: u16 = 6680;

/// Length in bytes of a public key and of one blinded entry.
pub const BEACON_MEMBER_SIZE: usize = 32;

/// Length of the truncated-hash checksum at the start of every beacon.
pub const BEACON_CHECKSUM_SIZE: usize = 8;

/// Length of the big-endian challenge following the checksum.
pub const BEACON_CHALLENGE_SIZE: usize = 8;

/// Checksum plus challenge; blinded entries start at this offset.
pub const BEACON_HEADER_SIZE: usize = BEACON_CHECKSUM_SIZE + BEACON_CHALLENGE_SIZE;

/// Hard upper bound on a beacon datagram.
pub const BEACON_MAX_BYTES: usize = 9000;

/// Smallest acceptable datagram: header plus one blinded entry.
pub const BEACON_MIN_BYTES: usize = BEACON_HEADER_SIZE + BEACON_MEMBER_SIZE;

/// Minimum observed spacing between the two datagrams of a pair.
///
/// Slightly under the emitter's nominal one-second gap to absorb sleep jitter
/// on the sending side.
pub const BEACON_MIN_PAIR_DELTA: Duration = Duration::from_millis(980);

/// Nominal spacing the emitter sleeps between the two datagrams of a pair.
pub const BEACON_PAIR_INTERVAL: Duration = Duration::from_secs(1);

/// Maximum blinded entries per datagram, derived from the datagram cap.
pub const BEACON_KEY_CAP: usize = (BEACON_MAX_BYTES - BEACON_HEADER_SIZE) / BEACON_MEMBER_SIZE;

/// All-zero key surfaced when a pair advertises presence but no entries.
pub const NULL_KEY: [u8; BEACON_MEMBER_SIZE] = [0u8; BEACON_MEMBER_SIZE];
