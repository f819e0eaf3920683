//! Private key material and its on-disk serialized form.
//!
//! A key file is a single fixed-size record holding the public identity
//! block, the key type codes, and the raw secrets. The identity hash is
//! `SHA-256` over the public identity block, so two files carrying the same
//! keys always derive the same ident.
//!
//! Layout (`KEY_FILE_LEN` = 420 bytes):
//!
//! ```text
//! 0   ..32    X25519 public key
//! 32  ..224   zero (reserved for larger crypto keys)
//! 224 ..256   Ed25519 public key
//! 256 ..352   zero (reserved)
//! 352 ..354   signing key type, u16 big-endian
//! 354 ..356   crypto key type, u16 big-endian
//! 356 ..388   X25519 secret
//! 388 ..420   Ed25519 secret
//! ```

use ed25519_dalek::SigningKey;
use sha2::{Digest, Sha256};
use x25519_dalek::{PublicKey as X25519Public, StaticSecret};

use crate::error::KeyError;
use crate::ident::IdentHash;

/// Total serialized length of a key file.
pub const KEY_FILE_LEN: usize = 420;

/// Length of the public identity block the ident hash is computed over.
const IDENT_BLOCK_LEN: usize = 352;

const CRYPTO_PUBLIC_OFFSET: usize = 0;
const SIGNING_PUBLIC_OFFSET: usize = 224;
const SIGNING_TYPE_OFFSET: usize = 352;
const CRYPTO_TYPE_OFFSET: usize = 354;
const CRYPTO_SECRET_OFFSET: usize = 356;
const SIGNING_SECRET_OFFSET: usize = 388;

/// Supported signature algorithms, with their wire type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningKeyType {
    Ed25519Sha512,
}

impl SigningKeyType {
    pub const fn code(&self) -> u16 {
        match self {
            SigningKeyType::Ed25519Sha512 => 7,
        }
    }
}

impl TryFrom<u16> for SigningKeyType {
    type Error = KeyError;

    fn try_from(code: u16) -> Result<Self, KeyError> {
        match code {
            7 => Ok(SigningKeyType::Ed25519Sha512),
            other => Err(KeyError::UnknownSigningKeyType(other)),
        }
    }
}

/// Supported key-agreement algorithms, with their wire type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoKeyType {
    X25519,
}

impl CryptoKeyType {
    pub const fn code(&self) -> u16 {
        match self {
            CryptoKeyType::X25519 => 4,
        }
    }
}

impl TryFrom<u16> for CryptoKeyType {
    type Error = KeyError;

    fn try_from(code: u16) -> Result<Self, KeyError> {
        match code {
            4 => Ok(CryptoKeyType::X25519),
            other => Err(KeyError::UnknownCryptoKeyType(other)),
        }
    }
}

/// A full private identity: key type codes plus both secrets.
pub struct KeyMaterial {
    signing_type: SigningKeyType,
    crypto_type: CryptoKeyType,
    x25519: StaticSecret,
    ed25519: SigningKey,
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("signing_type", &self.signing_type)
            .field("crypto_type", &self.crypto_type)
            .field("x25519", &"<redacted>")
            .field("ed25519", &"<redacted>")
            .finish()
    }
}

impl KeyMaterial {
    /// Generate fresh random key material of the requested types.
    pub fn generate(signing_type: SigningKeyType, crypto_type: CryptoKeyType) -> Self {
        let mut csprng = rand::rngs::OsRng;
        KeyMaterial {
            signing_type,
            crypto_type,
            x25519: StaticSecret::random_from_rng(rand::rngs::OsRng),
            ed25519: SigningKey::generate(&mut csprng),
        }
    }

    /// Deterministically derive key material from a 64-byte seed.
    ///
    /// Layout: `x25519_secret(32) || ed25519_secret(32)`. The same seed and
    /// types always yield the same ident.
    pub fn from_seed(
        seed: &[u8; 64],
        signing_type: SigningKeyType,
        crypto_type: CryptoKeyType,
    ) -> Self {
        let mut x25519_bytes = [0u8; 32];
        let mut ed25519_bytes = [0u8; 32];
        x25519_bytes.copy_from_slice(&seed[..32]);
        ed25519_bytes.copy_from_slice(&seed[32..]);

        KeyMaterial {
            signing_type,
            crypto_type,
            x25519: StaticSecret::from(x25519_bytes),
            ed25519: SigningKey::from_bytes(&ed25519_bytes),
        }
    }

    pub fn signing_type(&self) -> SigningKeyType {
        self.signing_type
    }

    pub fn crypto_type(&self) -> CryptoKeyType {
        self.crypto_type
    }

    /// Serialize to the fixed 420-byte key file form.
    ///
    /// The reserved regions are zero-filled, including the 96 bytes
    /// immediately following the public identity keys at offset 256.
    pub fn to_buffer(&self) -> Vec<u8> {
        let mut buf = vec![0u8; KEY_FILE_LEN];

        let crypto_public = X25519Public::from(&self.x25519);
        buf[CRYPTO_PUBLIC_OFFSET..CRYPTO_PUBLIC_OFFSET + 32]
            .copy_from_slice(crypto_public.as_bytes());
        buf[SIGNING_PUBLIC_OFFSET..SIGNING_PUBLIC_OFFSET + 32]
            .copy_from_slice(&self.ed25519.verifying_key().to_bytes());

        buf[SIGNING_TYPE_OFFSET..SIGNING_TYPE_OFFSET + 2]
            .copy_from_slice(&self.signing_type.code().to_be_bytes());
        buf[CRYPTO_TYPE_OFFSET..CRYPTO_TYPE_OFFSET + 2]
            .copy_from_slice(&self.crypto_type.code().to_be_bytes());

        buf[CRYPTO_SECRET_OFFSET..CRYPTO_SECRET_OFFSET + 32]
            .copy_from_slice(&self.x25519.to_bytes());
        buf[SIGNING_SECRET_OFFSET..SIGNING_SECRET_OFFSET + 32]
            .copy_from_slice(&self.ed25519.to_bytes());

        buf
    }

    /// Parse a serialized key file.
    ///
    /// Strict: the length must match exactly, the type codes must be known,
    /// and the stored public keys must equal the ones derived from the
    /// secrets. Anything else is a parse failure, never a silent default.
    pub fn from_buffer(buf: &[u8]) -> Result<Self, KeyError> {
        if buf.len() != KEY_FILE_LEN {
            return Err(KeyError::InvalidLength {
                expected: KEY_FILE_LEN,
                actual: buf.len(),
            });
        }

        let signing_code = u16::from_be_bytes([buf[SIGNING_TYPE_OFFSET], buf[SIGNING_TYPE_OFFSET + 1]]);
        let crypto_code = u16::from_be_bytes([buf[CRYPTO_TYPE_OFFSET], buf[CRYPTO_TYPE_OFFSET + 1]]);
        let signing_type = SigningKeyType::try_from(signing_code)?;
        let crypto_type = CryptoKeyType::try_from(crypto_code)?;

        let mut x25519_bytes = [0u8; 32];
        let mut ed25519_bytes = [0u8; 32];
        x25519_bytes.copy_from_slice(&buf[CRYPTO_SECRET_OFFSET..CRYPTO_SECRET_OFFSET + 32]);
        ed25519_bytes.copy_from_slice(&buf[SIGNING_SECRET_OFFSET..SIGNING_SECRET_OFFSET + 32]);

        let x25519 = StaticSecret::from(x25519_bytes);
        let ed25519 = SigningKey::from_bytes(&ed25519_bytes);

        let derived_crypto_public = X25519Public::from(&x25519);
        if buf[CRYPTO_PUBLIC_OFFSET..CRYPTO_PUBLIC_OFFSET + 32] != derived_crypto_public.as_bytes()[..] {
            return Err(KeyError::PublicKeyMismatch);
        }
        if buf[SIGNING_PUBLIC_OFFSET..SIGNING_PUBLIC_OFFSET + 32]
            != ed25519.verifying_key().to_bytes()[..]
        {
            return Err(KeyError::PublicKeyMismatch);
        }

        Ok(KeyMaterial {
            signing_type,
            crypto_type,
            x25519,
            ed25519,
        })
    }

    /// The identity hash: `SHA-256` over the public identity block.
    pub fn ident_hash(&self) -> IdentHash {
        let buf = self.to_buffer();
        let digest = Sha256::digest(&buf[..IDENT_BLOCK_LEN]);
        IdentHash::new(digest.into())
    }

    /// The human-readable ident string (base32 of the identity hash).
    pub fn ident_b32(&self) -> String {
        self.ident_hash().to_base32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(fill: u8) -> [u8; 64] {
        let mut s = [0u8; 64];
        for (i, byte) in s.iter_mut().enumerate() {
            *byte = fill.wrapping_add(i as u8);
        }
        s
    }

    #[test]
    fn serialized_length_is_fixed() {
        let keys = KeyMaterial::generate(SigningKeyType::Ed25519Sha512, CryptoKeyType::X25519);
        assert_eq!(keys.to_buffer().len(), KEY_FILE_LEN);
    }

    #[test]
    fn reserved_region_is_zeroed() {
        let keys = KeyMaterial::from_seed(
            &seed(3),
            SigningKeyType::Ed25519Sha512,
            CryptoKeyType::X25519,
        );
        let buf = keys.to_buffer();
        assert!(buf[256..352].iter().all(|&b| b == 0));
        assert!(buf[32..224].iter().all(|&b| b == 0));
    }

    #[test]
    fn buffer_round_trips() {
        let keys = KeyMaterial::generate(SigningKeyType::Ed25519Sha512, CryptoKeyType::X25519);
        let buf = keys.to_buffer();
        let parsed = KeyMaterial::from_buffer(&buf).unwrap();
        assert_eq!(parsed.to_buffer(), buf);
        assert_eq!(parsed.ident_hash(), keys.ident_hash());
    }

    #[test]
    fn from_seed_is_deterministic() {
        let a = KeyMaterial::from_seed(
            &seed(9),
            SigningKeyType::Ed25519Sha512,
            CryptoKeyType::X25519,
        );
        let b = KeyMaterial::from_seed(
            &seed(9),
            SigningKeyType::Ed25519Sha512,
            CryptoKeyType::X25519,
        );
        assert_eq!(a.ident_b32(), b.ident_b32());
        assert_eq!(a.to_buffer(), b.to_buffer());
    }

    #[test]
    fn different_seeds_differ() {
        let a = KeyMaterial::from_seed(
            &seed(1),
            SigningKeyType::Ed25519Sha512,
            CryptoKeyType::X25519,
        );
        let b = KeyMaterial::from_seed(
            &seed(2),
            SigningKeyType::Ed25519Sha512,
            CryptoKeyType::X25519,
        );
        assert_ne!(a.ident_hash(), b.ident_hash());
    }

    #[test]
    fn truncated_buffer_fails() {
        let keys = KeyMaterial::generate(SigningKeyType::Ed25519Sha512, CryptoKeyType::X25519);
        let buf = keys.to_buffer();
        let err = KeyMaterial::from_buffer(&buf[..KEY_FILE_LEN - 1]).unwrap_err();
        assert!(matches!(err, KeyError::InvalidLength { .. }));
    }

    #[test]
    fn unknown_type_codes_fail() {
        let keys = KeyMaterial::generate(SigningKeyType::Ed25519Sha512, CryptoKeyType::X25519);
        let mut buf = keys.to_buffer();
        buf[352] = 0xff;
        assert!(matches!(
            KeyMaterial::from_buffer(&buf),
            Err(KeyError::UnknownSigningKeyType(_))
        ));

        let mut buf = keys.to_buffer();
        buf[355] = 0x09;
        assert!(matches!(
            KeyMaterial::from_buffer(&buf),
            Err(KeyError::UnknownCryptoKeyType(_))
        ));
    }

    #[test]
    fn corrupted_public_key_fails() {
        let keys = KeyMaterial::generate(SigningKeyType::Ed25519Sha512, CryptoKeyType::X25519);
        let mut buf = keys.to_buffer();
        buf[0] ^= 0x01;
        assert!(matches!(
            KeyMaterial::from_buffer(&buf),
            Err(KeyError::PublicKeyMismatch)
        ));

        let mut buf = keys.to_buffer();
        buf[224] ^= 0x01;
        assert!(matches!(
            KeyMaterial::from_buffer(&buf),
            Err(KeyError::PublicKeyMismatch)
        ));
    }

    #[test]
    fn ident_depends_only_on_public_block() {
        let keys = KeyMaterial::from_seed(
            &seed(7),
            SigningKeyType::Ed25519Sha512,
            CryptoKeyType::X25519,
        );
        let buf = keys.to_buffer();
        let digest = sha2::Sha256::digest(&buf[..352]);
        assert_eq!(keys.ident_hash().as_ref(), digest.as_slice());
    }
}
