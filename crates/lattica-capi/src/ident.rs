//! Identity provisioning over the FFI boundary.
//!
//! These calls are independent of the runtime cell: key files can be
//! provisioned before the router is initialized.

use std::ffi::CStr;
use std::path::PathBuf;

use libc::{c_char, c_int, size_t};

use lattica_core::{CryptoKeyType, SigningKeyType};
use lattica_router::identity;

use crate::{write_str, LATTICA_ERR};

/// Seed length for deterministic key derivation.
const SEED_LEN: usize = 64;

fn key_types(sig_type: u16, crypto_type: u16) -> Option<(SigningKeyType, CryptoKeyType)> {
    let sig = SigningKeyType::try_from(sig_type).ok()?;
    let crypto = CryptoKeyType::try_from(crypto_type).ok()?;
    Some((sig, crypto))
}

unsafe fn path_from(ptr: *const c_char) -> Option<PathBuf> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(PathBuf::from)
}

/// Derive key material from exactly 64 seed bytes, persist it to
/// `path`, and write the derived ident string to `buf`.
///
/// The serialized material is verified by re-parsing before anything is
/// written; on failure nothing usable is produced and the buffer is
/// untouched.
///
/// # Safety
/// - `path` must be a valid NUL-terminated string.
/// - `seed` must point to at least 64 readable bytes.
/// - `buf` must point to at least `buf_len` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn lattica_generate_ident_to_file(
    path: *const c_char,
    seed: *const u8,
    sig_type: u16,
    crypto_type: u16,
    buf: *mut c_char,
    buf_len: size_t,
) -> c_int {
    let Some(path) = path_from(path) else {
        return LATTICA_ERR;
    };
    if seed.is_null() {
        return LATTICA_ERR;
    }
    let Some((sig, crypto)) = key_types(sig_type, crypto_type) else {
        return LATTICA_ERR;
    };

    let mut seed_bytes = [0u8; SEED_LEN];
    std::ptr::copy_nonoverlapping(seed, seed_bytes.as_mut_ptr(), SEED_LEN);

    match identity::generate_from_seed(&path, &seed_bytes, sig, crypto) {
        Ok(ident) => write_str(&ident, buf, buf_len),
        Err(e) => {
            tracing::error!("key generation failed: {e}");
            LATTICA_ERR
        }
    }
}

/// Load the key file at `path`, or create a fresh one if it is missing,
/// and write the derived ident string to `buf`.
///
/// An existing file that fails to parse succeeds with an **empty**
/// string in `buf`; the caller distinguishes by emptiness.
///
/// # Safety
/// - `path` must be a valid NUL-terminated string.
/// - `buf` must point to at least `buf_len` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn lattica_load_or_create_ident(
    path: *const c_char,
    sig_type: u16,
    crypto_type: u16,
    buf: *mut c_char,
    buf_len: size_t,
) -> c_int {
    let Some(path) = path_from(path) else {
        return LATTICA_ERR;
    };
    let Some((sig, crypto)) = key_types(sig_type, crypto_type) else {
        return LATTICA_ERR;
    };

    match identity::load_or_create(&path, sig, crypto) {
        Ok(ident) => write_str(&ident, buf, buf_len),
        Err(e) => {
            tracing::error!("key load failed: {e}");
            LATTICA_ERR
        }
    }
}
