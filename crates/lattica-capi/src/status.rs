//! Network status and traffic counter getters.

use std::ffi::CString;
use std::sync::Mutex;

use libc::{c_char, c_int, size_t};

use crate::runtime;
use crate::{write_str, LATTICA_ERR};

/// Shared buffer for [`lattica_network_status_str`]; holds the last
/// successful result.
static STATUS_STR: Mutex<Option<CString>> = Mutex::new(None);

/// Write the rendered network status (e.g. `"OK"`, `"Error - Offline"`).
///
/// # Safety
/// `buf` must point to at least `buf_len` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn lattica_network_status(buf: *mut c_char, buf_len: size_t) -> c_int {
    match runtime::with(|router| router.network_status()) {
        Some(status) => write_str(&status, buf, buf_len),
        None => LATTICA_ERR,
    }
}

/// Shared-buffer variant of [`lattica_network_status`].
///
/// Returns a pointer to an internally-owned NUL-terminated string
/// holding the last successful result, or null on failure. The pointer
/// is invalidated by the next call; the caller copies before then.
///
/// # Safety
/// The returned pointer must not be written to or freed.
#[no_mangle]
pub unsafe extern "C" fn lattica_network_status_str() -> *const c_char {
    let Some(status) = runtime::with(|router| router.network_status()) else {
        return std::ptr::null();
    };
    let Ok(cstring) = CString::new(status) else {
        return std::ptr::null();
    };
    let Ok(mut guard) = STATUS_STR.lock() else {
        return std::ptr::null();
    };
    *guard = Some(cstring);
    guard.as_ref().map_or(std::ptr::null(), |s| s.as_ptr())
}

/// Tunnel build success rate in percent, or -1 when the router is not
/// initialized.
#[no_mangle]
pub unsafe extern "C" fn lattica_tunnel_creation_success_rate() -> c_int {
    match runtime::with(|router| router.tunnel_creation_success_rate()) {
        Some(rate) => rate.min(c_int::MAX as u32) as c_int,
        None => -1,
    }
}

/// Total bytes received across all transports; 0 when uninitialized.
#[no_mangle]
pub unsafe extern "C" fn lattica_received_bytes() -> u64 {
    runtime::with(|router| router.received_bytes()).unwrap_or(0)
}

/// Total bytes sent across all transports; 0 when uninitialized.
#[no_mangle]
pub unsafe extern "C" fn lattica_sent_bytes() -> u64 {
    runtime::with(|router| router.sent_bytes()).unwrap_or(0)
}

/// Total transit bytes forwarded for other routers; 0 when uninitialized.
#[no_mangle]
pub unsafe extern "C" fn lattica_transit_bytes() -> u64 {
    runtime::with(|router| router.transit_bytes()).unwrap_or(0)
}

/// Current inbound bandwidth estimate in bytes per second.
#[no_mangle]
pub unsafe extern "C" fn lattica_in_bandwidth() -> u32 {
    runtime::with(|router| router.in_bandwidth()).unwrap_or(0)
}

/// Current outbound bandwidth estimate in bytes per second.
#[no_mangle]
pub unsafe extern "C" fn lattica_out_bandwidth() -> u32 {
    runtime::with(|router| router.out_bandwidth()).unwrap_or(0)
}

/// Current transit bandwidth estimate in bytes per second.
#[no_mangle]
pub unsafe extern "C" fn lattica_transit_bandwidth() -> u32 {
    runtime::with(|router| router.transit_bandwidth()).unwrap_or(0)
}
