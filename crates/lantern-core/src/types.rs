//! Newtype wrappers for protocol byte-array fields.
//!
//! These prevent accidental mixing of public keys, blinded entries, and
//! challenge bytes, which all travel as plain byte arrays on the wire.

use core::fmt;

use crate::constants::{BEACON_CHALLENGE_SIZE, BEACON_MEMBER_SIZE, NULL_KEY};

/// Helper to write lowercase hex without the `hex` crate.
fn fmt_hex(bytes: &[u8], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for byte in bytes {
        write!(f, "{:02x}", byte)?;
    }
    Ok(())
}

/// A 32-byte long-term public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[must_use]
pub struct PublicKey(pub(crate) [u8; BEACON_MEMBER_SIZE]);

impl PublicKey {
    pub const fn new(bytes: [u8; BEACON_MEMBER_SIZE]) -> Self {
        Self(bytes)
    }

    /// The all-zero key used for presence-only discovery hints.
    pub const fn null() -> Self {
        Self(NULL_KEY)
    }

    /// Whether this is the all-zero presence-only key.
    #[must_use = "returns a bool without side effects"]
    pub fn is_null(&self) -> bool {
        self.0 == NULL_KEY
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = InvalidLength;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; BEACON_MEMBER_SIZE] = bytes.try_into().map_err(|_| InvalidLength {
            expected: BEACON_MEMBER_SIZE,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_hex(&self.0, f)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey(")?;
        fmt_hex(&self.0[..4], f)?;
        write!(f, "..)")
    }
}

/// A 32-byte blinded key entry: the keyed hash of a challenge and a public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[must_use]
pub struct BlindedEntry(pub(crate) [u8; BEACON_MEMBER_SIZE]);

impl BlindedEntry {
    pub const fn new(bytes: [u8; BEACON_MEMBER_SIZE]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for BlindedEntry {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for BlindedEntry {
    type Error = InvalidLength;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; BEACON_MEMBER_SIZE] = bytes.try_into().map_err(|_| InvalidLength {
            expected: BEACON_MEMBER_SIZE,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }
}

impl fmt::Display for BlindedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_hex(&self.0, f)
    }
}

impl fmt::Debug for BlindedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlindedEntry(")?;
        fmt_hex(&self.0[..4], f)?;
        write!(f, "..)")
    }
}

/// The 8 challenge bytes of a beacon, in canonical big-endian order.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[must_use]
pub struct ChallengeBytes(pub(crate) [u8; BEACON_CHALLENGE_SIZE]);

impl ChallengeBytes {
    pub const fn new(bytes: [u8; BEACON_CHALLENGE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Encode a challenge value into its canonical wire bytes.
    pub const fn from_value(challenge: u64) -> Self {
        Self(challenge.to_be_bytes())
    }

    /// Decode back into the challenge value.
    #[must_use = "returns the decoded value without side effects"]
    pub const fn value(&self) -> u64 {
        u64::from_be_bytes(self.0)
    }
}

impl AsRef<[u8]> for ChallengeBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for ChallengeBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_hex(&self.0, f)
    }
}

impl fmt::Debug for ChallengeBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChallengeBytes({})", self.value())
    }
}

/// Error returned when a byte slice has the wrong length for a newtype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidLength {
    pub expected: usize,
    pub actual: usize,
}

impl fmt::Display for InvalidLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid length: expected {} bytes, got {}",
            self.expected, self.actual
        )
    }
}

impl std::error::Error for InvalidLength {}
