//! # Lattica C FFI bindings
//!
//! C-compatible surface over the router lifecycle orchestrator and the
//! introspection facade. Every text-producing call follows the same
//! contract: the function returns [`LATTICA_OK`] and writes a
//! NUL-terminated string truncated to the supplied capacity, or returns
//! [`LATTICA_ERR`] and leaves the buffer untouched. No call panics
//! across the boundary; absence and out-of-range indices are ordinary
//! failure codes.
//!
//! # Safety
//!
//! All public functions are `unsafe` and require the caller to uphold
//! the invariants documented in each function's safety comment.
//!
//! # Wiring
//!
//! The embedding Rust application registers the external subsystem
//! implementations once via [`register_subsystems`]; foreign callers
//! then drive the lifecycle with `lattica_init` / `lattica_start` /
//! `lattica_stop`.

mod ident;
mod runtime;
mod status;
mod tunnels;

pub use ident::*;
pub use runtime::register_subsystems;
pub use status::*;
pub use tunnels::*;

use std::ffi::CStr;
use std::path::Path;

use libc::{c_char, c_int, size_t};

use lattica_router::netenv::SystemNetEnv;
use lattica_router::{Router, RouterConfig};

/// Success return code.
pub const LATTICA_OK: c_int = 0;
/// Failure/absence return code.
pub const LATTICA_ERR: c_int = 1;

/// Copy `s` into a caller-supplied buffer, truncated to `buf_len - 1`
/// bytes plus a NUL terminator. The buffer is untouched on failure.
///
/// # Safety
/// `buf` must point to at least `buf_len` writable bytes, or be null.
pub(crate) unsafe fn write_str(s: &str, buf: *mut c_char, buf_len: size_t) -> c_int {
    if buf.is_null() || buf_len == 0 {
        return LATTICA_ERR;
    }
    let len = s.len().min(buf_len - 1);
    std::ptr::copy_nonoverlapping(s.as_ptr(), buf.cast::<u8>(), len);
    *buf.add(len) = 0;
    LATTICA_OK
}

/// Convert a C index to `usize`, rejecting negatives.
pub(crate) fn checked_index(index: c_int) -> Option<usize> {
    usize::try_from(index).ok()
}

/// Clamp a collection size to the C `int` range.
pub(crate) fn count_as_int(count: usize) -> c_int {
    count.min(c_int::MAX as usize) as c_int
}

/// Initialize the router from a TOML configuration file.
///
/// A null `config_path` uses the built-in defaults. Single-shot: a
/// second call fails, as does calling without a registered subsystem
/// factory.
///
/// # Safety
/// `config_path` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn lattica_init(config_path: *const c_char) -> c_int {
    let config = if config_path.is_null() {
        RouterConfig::default()
    } else {
        let Ok(path) = CStr::from_ptr(config_path).to_str() else {
            return LATTICA_ERR;
        };
        match RouterConfig::load(Path::new(path)) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("configuration load failed: {e}");
                return LATTICA_ERR;
            }
        }
    };

    let Some(subsystems) = runtime::build_subsystems() else {
        tracing::error!("no subsystem factory registered");
        return LATTICA_ERR;
    };

    let mut router = Router::new(subsystems);
    if let Err(e) = router.initialize(&config, &SystemNetEnv) {
        tracing::error!("initialization failed: {e}");
        return LATTICA_ERR;
    }

    if runtime::install(router) {
        LATTICA_OK
    } else {
        LATTICA_ERR
    }
}

/// Start the router subsystems in dependency order.
#[no_mangle]
pub unsafe extern "C" fn lattica_start() -> c_int {
    match runtime::with_mut(|router| router.start()) {
        Some(Ok(())) => LATTICA_OK,
        _ => LATTICA_ERR,
    }
}

/// Stop the router subsystems in reverse order.
#[no_mangle]
pub unsafe extern "C" fn lattica_stop() -> c_int {
    match runtime::with_mut(|router| router.stop()) {
        Some(Ok(())) => LATTICA_OK,
        _ => LATTICA_ERR,
    }
}

/// Stop accepting new transit tunnels; the lifecycle state is untouched.
#[no_mangle]
pub unsafe extern "C" fn lattica_close_accepts_tunnels() -> c_int {
    match runtime::with_mut(|router| router.close_accepts_tunnels()) {
        Some(()) => LATTICA_OK,
        None => LATTICA_ERR,
    }
}

/// Ask the transports to run a peer test.
#[no_mangle]
pub unsafe extern "C" fn lattica_run_peer_test() -> c_int {
    match runtime::with(|router| router.run_peer_test()) {
        Some(()) => LATTICA_OK,
        None => LATTICA_ERR,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::ffi::CString;
    use std::sync::{Mutex, MutexGuard};

    use lattica_router::testing::{fakes, FakeHandles};

    use super::*;

    static TEST_LOCK: Mutex<()> = Mutex::new(());
    static HANDLES: Mutex<Option<FakeHandles>> = Mutex::new(None);

    /// Serialize FFI tests (they share the process-wide runtime cell),
    /// reset the cell, and initialize a fresh faked router.
    pub(crate) fn init_faked_router() -> (MutexGuard<'static, ()>, tempfile::TempDir) {
        let guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        runtime::clear();
        let _ = register_subsystems(|| {
            let (subsystems, handles) = fakes();
            *HANDLES.lock().expect("handles lock") = Some(handles);
            subsystems
        });

        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let config_path = dir.path().join("router.toml");
        std::fs::write(
            &config_path,
            format!("[router]\ndata_dir = {:?}\n", data_dir.to_str().unwrap()),
        )
        .unwrap();

        let c_path = CString::new(config_path.to_str().unwrap()).unwrap();
        assert_eq!(unsafe { lattica_init(c_path.as_ptr()) }, LATTICA_OK);

        (guard, dir)
    }

    /// Run a closure against the fake handles installed by the last init.
    pub(crate) fn with_handles<T>(f: impl FnOnce(&FakeHandles) -> T) -> T {
        let guard = HANDLES.lock().expect("handles lock");
        f(guard.as_ref().expect("no fake handles installed"))
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::init_faked_router;
    use super::*;

    #[test]
    fn lifecycle_round_trip() {
        let (_guard, _dir) = init_faked_router();
        unsafe {
            assert_eq!(lattica_start(), LATTICA_OK);
            assert_eq!(lattica_close_accepts_tunnels(), LATTICA_OK);
            assert_eq!(lattica_run_peer_test(), LATTICA_OK);
            assert_eq!(lattica_stop(), LATTICA_OK);
        }
    }

    #[test]
    fn second_init_fails() {
        let (_guard, dir) = init_faked_router();
        let config_path = dir.path().join("router.toml");
        let c_path = std::ffi::CString::new(config_path.to_str().unwrap()).unwrap();
        unsafe {
            assert_eq!(lattica_init(c_path.as_ptr()), LATTICA_ERR);
        }
    }

    #[test]
    fn start_twice_fails() {
        let (_guard, _dir) = init_faked_router();
        unsafe {
            assert_eq!(lattica_start(), LATTICA_OK);
            assert_eq!(lattica_start(), LATTICA_ERR);
        }
    }

    #[test]
    fn init_with_unreadable_config_fails() {
        let (_guard, dir) = init_faked_router();
        // Runtime already installed; but a bad path must fail before that.
        let missing = dir.path().join("missing.toml");
        let c_path = std::ffi::CString::new(missing.to_str().unwrap()).unwrap();
        unsafe {
            assert_eq!(lattica_init(c_path.as_ptr()), LATTICA_ERR);
        }
    }

    #[test]
    fn write_str_truncates_and_terminates() {
        let mut buf = [0x55u8; 8];
        let code = unsafe { write_str("abcdefghij", buf.as_mut_ptr().cast(), 4) };
        assert_eq!(code, LATTICA_OK);
        assert_eq!(&buf[..4], b"abc\0");
        // Bytes past the capacity are untouched.
        assert_eq!(&buf[4..], [0x55u8; 4]);
    }

    #[test]
    fn write_str_rejects_empty_buffer() {
        let mut buf = [0x55u8; 4];
        let code = unsafe { write_str("abc", buf.as_mut_ptr().cast(), 0) };
        assert_eq!(code, LATTICA_ERR);
        assert_eq!(buf, [0x55u8; 4]);

        let code = unsafe { write_str("abc", std::ptr::null_mut(), 16) };
        assert_eq!(code, LATTICA_ERR);
    }

    #[test]
    fn checked_index_rejects_negatives() {
        assert_eq!(checked_index(-1), None);
        assert_eq!(checked_index(0), Some(0));
        assert_eq!(checked_index(41), Some(41));
    }
}
