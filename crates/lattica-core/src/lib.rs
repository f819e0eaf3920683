//! Identity types and key material for the Lattica overlay router.
//!
//! This crate defines the router/destination identity hash, its base32
//! rendering, and the on-disk private key material format used by the
//! identity provisioner.

pub mod base32;
pub mod error;
pub mod ident;
pub mod keys;

pub use error::{Base32Error, KeyError};
pub use ident::IdentHash;
pub use keys::{CryptoKeyType, KeyMaterial, SigningKeyType, KEY_FILE_LEN};
