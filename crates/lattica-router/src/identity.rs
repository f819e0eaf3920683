//! Identity provisioning: load an existing key file or create a new one.
//!
//! Writes are atomic (write to `.tmp`, then rename) so a crash never
//! leaves a partial key file behind, and seed-derived material is
//! verified by re-parsing the serialized buffer before anything touches
//! the disk.

use std::path::Path;

use lattica_core::{CryptoKeyType, KeyMaterial, SigningKeyType};

use crate::error::RouterError;

/// Load key material from `path`, or generate and persist fresh material
/// if the file does not exist.
///
/// Returns the derived ident string. A file that exists but fails to
/// parse yields an **empty** ident string, not an error: the caller
/// distinguishes success by non-emptiness, and the corrupt file is left
/// in place for the operator to inspect.
pub fn load_or_create(
    path: &Path,
    signing_type: SigningKeyType,
    crypto_type: CryptoKeyType,
) -> Result<String, RouterError> {
    match std::fs::read(path) {
        Ok(bytes) => match KeyMaterial::from_buffer(&bytes) {
            Ok(keys) => {
                let ident = keys.ident_b32();
                tracing::info!("loaded key file {}: {ident}", path.display());
                Ok(ident)
            }
            Err(e) => {
                tracing::error!("failed to parse key file {}: {e}", path.display());
                Ok(String::new())
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let keys = KeyMaterial::generate(signing_type, crypto_type);
            let ident = keys.ident_b32();
            atomic_write(path, &keys.to_buffer())?;
            tracing::info!("created new key file {} for {ident}", path.display());
            Ok(ident)
        }
        Err(e) => Err(RouterError::Io(e)),
    }
}

/// Deterministically derive key material from a 64-byte seed and persist
/// it to `path`.
///
/// The serialized buffer is re-parsed before the write; a mismatch fails
/// the operation without producing any on-disk artifact.
pub fn generate_from_seed(
    path: &Path,
    seed: &[u8; 64],
    signing_type: SigningKeyType,
    crypto_type: CryptoKeyType,
) -> Result<String, RouterError> {
    let keys = KeyMaterial::from_seed(seed, signing_type, crypto_type);
    let buffer = keys.to_buffer();

    // Verify-before-write: the buffer must parse back to the same ident.
    let reparsed = KeyMaterial::from_buffer(&buffer).map_err(RouterError::KeyVerification)?;
    if reparsed.ident_hash() != keys.ident_hash() {
        return Err(RouterError::KeyVerification(
            lattica_core::KeyError::PublicKeyMismatch,
        ));
    }

    atomic_write(path, &buffer)?;
    let ident = keys.ident_b32();
    tracing::info!("wrote seed-derived key file {} for {ident}", path.display());
    Ok(ident)
}

/// Write to a sibling `.tmp` file, fix permissions, then rename over the
/// destination.
fn atomic_write(path: &Path, bytes: &[u8]) -> Result<(), RouterError> {
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, bytes)?;

    // Key material is secret; restrict to the owner on Unix.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600))?;
    }

    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattica_core::KEY_FILE_LEN;

    fn seed(fill: u8) -> [u8; 64] {
        [fill; 64]
    }

    #[test]
    fn create_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("router.keys");

        let created = load_or_create(
            &path,
            SigningKeyType::Ed25519Sha512,
            CryptoKeyType::X25519,
        )
        .unwrap();
        assert!(!created.is_empty());
        assert!(path.is_file());

        let loaded = load_or_create(
            &path,
            SigningKeyType::Ed25519Sha512,
            CryptoKeyType::X25519,
        )
        .unwrap();
        assert_eq!(created, loaded);
    }

    #[test]
    fn corrupt_file_yields_empty_ident() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("router.keys");
        std::fs::write(&path, b"garbage").unwrap();

        let ident = load_or_create(
            &path,
            SigningKeyType::Ed25519Sha512,
            CryptoKeyType::X25519,
        )
        .unwrap();
        assert!(ident.is_empty());
        // The corrupt file is left untouched, not replaced.
        assert_eq!(std::fs::read(&path).unwrap(), b"garbage");
    }

    #[test]
    fn truncated_file_yields_empty_ident() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("router.keys");

        load_or_create(&path, SigningKeyType::Ed25519Sha512, CryptoKeyType::X25519).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..KEY_FILE_LEN / 2]).unwrap();

        let ident = load_or_create(
            &path,
            SigningKeyType::Ed25519Sha512,
            CryptoKeyType::X25519,
        )
        .unwrap();
        assert!(ident.is_empty());
    }

    #[test]
    fn seed_generation_round_trips_through_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seeded.keys");

        let generated = generate_from_seed(
            &path,
            &seed(0x5a),
            SigningKeyType::Ed25519Sha512,
            CryptoKeyType::X25519,
        )
        .unwrap();
        let loaded = load_or_create(
            &path,
            SigningKeyType::Ed25519Sha512,
            CryptoKeyType::X25519,
        )
        .unwrap();
        assert_eq!(generated, loaded);
    }

    #[test]
    fn seed_generation_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let a = generate_from_seed(
            &dir.path().join("a.keys"),
            &seed(1),
            SigningKeyType::Ed25519Sha512,
            CryptoKeyType::X25519,
        )
        .unwrap();
        let b = generate_from_seed(
            &dir.path().join("b.keys"),
            &seed(1),
            SigningKeyType::Ed25519Sha512,
            CryptoKeyType::X25519,
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn written_file_has_reserved_region_zeroed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seeded.keys");
        generate_from_seed(
            &path,
            &seed(0x11),
            SigningKeyType::Ed25519Sha512,
            CryptoKeyType::X25519,
        )
        .unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), KEY_FILE_LEN);
        assert!(bytes[256..352].iter().all(|&b| b == 0));
    }

    #[test]
    fn no_tmp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("router.keys");
        load_or_create(&path, SigningKeyType::Ed25519Sha512, CryptoKeyType::X25519).unwrap();
        assert!(!dir.path().join("router.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn key_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("router.keys");
        load_or_create(&path, SigningKeyType::Ed25519Sha512, CryptoKeyType::X25519).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
