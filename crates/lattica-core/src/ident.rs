//! The 32-byte identity hash of a router or destination.

use core::fmt;

use crate::base32;
use crate::error::Base32Error;

/// A 32-byte digest uniquely identifying a public identity.
///
/// Displayed as 52 characters of lowercase base32, the network's
/// human-readable address form.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[must_use]
pub struct IdentHash([u8; 32]);

/// Error from converting a slice of the wrong length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidLength {
    pub expected: usize,
    pub actual: usize,
}

impl fmt::Display for InvalidLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid ident hash length: expected {}, got {}",
            self.expected, self.actual
        )
    }
}

impl std::error::Error for InvalidLength {}

impl IdentHash {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse an ident from its base32 rendering.
    pub fn from_base32(s: &str) -> Result<Self, Base32Error> {
        let bytes = base32::decode(s)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| Base32Error::InvalidLength(s.len()))?;
        Ok(Self(arr))
    }

    /// The base32 rendering (52 lowercase characters).
    pub fn to_base32(&self) -> String {
        base32::encode(&self.0)
    }
}

impl AsRef<[u8]> for IdentHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for IdentHash {
    type Error = InvalidLength;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| InvalidLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }
}

impl fmt::Display for IdentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base32())
    }
}

impl fmt::Debug for IdentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentHash({}..)", &self.to_base32()[..8])
    }
}
