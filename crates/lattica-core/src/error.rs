//! Error types for identity and key material handling.

/// Errors from base32 decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Base32Error {
    #[error("invalid base32 character {0:?}")]
    InvalidCharacter(char),
    #[error("invalid base32 length: {0}")]
    InvalidLength(usize),
}

/// Errors from parsing or deriving key material.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("invalid key buffer length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("unknown signing key type code {0}")]
    UnknownSigningKeyType(u16),

    #[error("unknown crypto key type code {0}")]
    UnknownCryptoKeyType(u16),

    #[error("stored public keys do not match the derived ones")]
    PublicKeyMismatch,
}
