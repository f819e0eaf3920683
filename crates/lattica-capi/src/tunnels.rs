//! Tunnel, client tunnel, and proxy introspection getters.
//!
//! Index-taking functions bounds-check against a snapshot taken at call
//! time; a stale index is an ordinary failure code.

use libc::{c_char, c_int, size_t};

use crate::runtime;
use crate::{checked_index, count_as_int, write_str, LATTICA_ERR};

/// Number of live inbound tunnels.
#[no_mangle]
pub unsafe extern "C" fn lattica_inbound_tunnels_count() -> c_int {
    runtime::with(|router| count_as_int(router.inbound_tunnel_count())).unwrap_or(0)
}

/// Number of live outbound tunnels.
#[no_mangle]
pub unsafe extern "C" fn lattica_outbound_tunnels_count() -> c_int {
    runtime::with(|router| count_as_int(router.outbound_tunnel_count())).unwrap_or(0)
}

/// Formatted summary of the inbound tunnel at `index`.
///
/// # Safety
/// `buf` must point to at least `buf_len` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn lattica_inbound_tunnel_info(
    index: c_int,
    buf: *mut c_char,
    buf_len: size_t,
) -> c_int {
    let Some(index) = checked_index(index) else {
        return LATTICA_ERR;
    };
    match runtime::with(|router| router.inbound_tunnel_info(index)) {
        Some(Ok(info)) => write_str(&info, buf, buf_len),
        _ => LATTICA_ERR,
    }
}

/// Formatted summary of the outbound tunnel at `index`.
///
/// # Safety
/// `buf` must point to at least `buf_len` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn lattica_outbound_tunnel_info(
    index: c_int,
    buf: *mut c_char,
    buf_len: size_t,
) -> c_int {
    let Some(index) = checked_index(index) else {
        return LATTICA_ERR;
    };
    match runtime::with(|router| router.outbound_tunnel_info(index)) {
        Some(Ok(info)) => write_str(&info, buf, buf_len),
        _ => LATTICA_ERR,
    }
}

/// Whether an HTTP proxy destination is bound.
#[no_mangle]
pub unsafe extern "C" fn lattica_http_proxy_enabled() -> c_int {
    runtime::with(|router| c_int::from(router.http_proxy_enabled())).unwrap_or(0)
}

/// Whether a SOCKS proxy destination is bound.
#[no_mangle]
pub unsafe extern "C" fn lattica_socks_proxy_enabled() -> c_int {
    runtime::with(|router| c_int::from(router.socks_proxy_enabled())).unwrap_or(0)
}

/// Ident of the HTTP proxy destination.
///
/// # Safety
/// `buf` must point to at least `buf_len` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn lattica_http_proxy_ident(buf: *mut c_char, buf_len: size_t) -> c_int {
    match runtime::with(|router| router.http_proxy_ident()) {
        Some(Ok(ident)) => write_str(&ident, buf, buf_len),
        _ => LATTICA_ERR,
    }
}

/// Ident of the SOCKS proxy destination.
///
/// # Safety
/// `buf` must point to at least `buf_len` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn lattica_socks_proxy_ident(buf: *mut c_char, buf_len: size_t) -> c_int {
    match runtime::with(|router| router.socks_proxy_ident()) {
        Some(Ok(ident)) => write_str(&ident, buf, buf_len),
        _ => LATTICA_ERR,
    }
}

/// Number of configured client tunnels.
#[no_mangle]
pub unsafe extern "C" fn lattica_client_tunnels_count() -> c_int {
    runtime::with(|router| count_as_int(router.client_tunnel_count())).unwrap_or(0)
}

/// Number of configured server tunnels.
#[no_mangle]
pub unsafe extern "C" fn lattica_server_tunnels_count() -> c_int {
    runtime::with(|router| count_as_int(router.server_tunnel_count())).unwrap_or(0)
}

/// Name of the client tunnel at `index`.
///
/// # Safety
/// `buf` must point to at least `buf_len` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn lattica_client_tunnel_name(
    index: c_int,
    buf: *mut c_char,
    buf_len: size_t,
) -> c_int {
    let Some(index) = checked_index(index) else {
        return LATTICA_ERR;
    };
    match runtime::with(|router| router.client_tunnel_name(index)) {
        Some(Ok(name)) => write_str(&name, buf, buf_len),
        _ => LATTICA_ERR,
    }
}

/// Ident of the client tunnel at `index`.
///
/// # Safety
/// `buf` must point to at least `buf_len` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn lattica_client_tunnel_ident(
    index: c_int,
    buf: *mut c_char,
    buf_len: size_t,
) -> c_int {
    let Some(index) = checked_index(index) else {
        return LATTICA_ERR;
    };
    match runtime::with(|router| router.client_tunnel_ident(index)) {
        Some(Ok(ident)) => write_str(&ident, buf, buf_len),
        _ => LATTICA_ERR,
    }
}

/// Name of the server tunnel at `index`.
///
/// # Safety
/// `buf` must point to at least `buf_len` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn lattica_server_tunnel_name(
    index: c_int,
    buf: *mut c_char,
    buf_len: size_t,
) -> c_int {
    let Some(index) = checked_index(index) else {
        return LATTICA_ERR;
    };
    match runtime::with(|router| router.server_tunnel_name(index)) {
        Some(Ok(name)) => write_str(&name, buf, buf_len),
        _ => LATTICA_ERR,
    }
}

/// Ident of the server tunnel at `index`.
///
/// # Safety
/// `buf` must point to at least `buf_len` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn lattica_server_tunnel_ident(
    index: c_int,
    buf: *mut c_char,
    buf_len: size_t,
) -> c_int {
    let Some(index) = checked_index(index) else {
        return LATTICA_ERR;
    };
    match runtime::with(|router| router.server_tunnel_ident(index)) {
        Some(Ok(ident)) => write_str(&ident, buf, buf_len),
        _ => LATTICA_ERR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{init_faked_router, with_handles};
    use crate::LATTICA_OK;
    use lattica_core::IdentHash;
    use lattica_router::subsystems::{ClientTunnelRecord, ProxyRecord};
    use lattica_router::tunnels::{PoolId, TunnelDirection, TunnelRecord, TunnelState};
    use std::ffi::CStr;

    fn tunnel(name: &str) -> TunnelRecord {
        TunnelRecord {
            name: name.to_string(),
            direction: TunnelDirection::Inbound,
            pool: PoolId(7),
            state: TunnelState::Established,
            latency_ms: None,
            received_bytes: 2048,
            sent_bytes: 0,
        }
    }

    fn read_cstr(buf: &[u8]) -> &str {
        unsafe { CStr::from_ptr(buf.as_ptr().cast()) }.to_str().unwrap()
    }

    #[test]
    fn tunnel_counts_and_info() {
        let (_guard, _dir) = init_faked_router();
        with_handles(|handles| {
            handles
                .tunnels
                .inbound
                .lock()
                .unwrap()
                .extend([tunnel("one"), tunnel("two")]);
        });

        unsafe {
            assert_eq!(lattica_inbound_tunnels_count(), 2);
            assert_eq!(lattica_outbound_tunnels_count(), 0);

            let mut buf = [0u8; 64];
            assert_eq!(
                lattica_inbound_tunnel_info(1, buf.as_mut_ptr().cast(), buf.len()),
                LATTICA_OK
            );
            assert_eq!(read_cstr(&buf), "two established 2 KiB");
        }
    }

    #[test]
    fn out_of_range_and_negative_indices_fail_untouched() {
        let (_guard, _dir) = init_faked_router();
        let mut buf = [0xAAu8; 16];
        unsafe {
            assert_eq!(
                lattica_inbound_tunnel_info(0, buf.as_mut_ptr().cast(), buf.len()),
                LATTICA_ERR
            );
            assert_eq!(
                lattica_inbound_tunnel_info(-1, buf.as_mut_ptr().cast(), buf.len()),
                LATTICA_ERR
            );
            assert_eq!(
                lattica_client_tunnel_name(5, buf.as_mut_ptr().cast(), buf.len()),
                LATTICA_ERR
            );
        }
        assert_eq!(buf, [0xAAu8; 16]);
    }

    #[test]
    fn proxy_queries() {
        let (_guard, _dir) = init_faked_router();
        let ident = IdentHash::new([0x21; 32]);
        with_handles(|handles| {
            *handles.clients.http.lock().unwrap() = Some(ProxyRecord { ident });
        });

        unsafe {
            assert_eq!(lattica_http_proxy_enabled(), 1);
            assert_eq!(lattica_socks_proxy_enabled(), 0);

            let mut buf = [0u8; 64];
            assert_eq!(
                lattica_http_proxy_ident(buf.as_mut_ptr().cast(), buf.len()),
                LATTICA_OK
            );
            assert_eq!(read_cstr(&buf), ident.to_base32());

            assert_eq!(
                lattica_socks_proxy_ident(buf.as_mut_ptr().cast(), buf.len()),
                LATTICA_ERR
            );
        }
    }

    #[test]
    fn client_tunnel_queries() {
        let (_guard, _dir) = init_faked_router();
        let ident = IdentHash::new([0x09; 32]);
        with_handles(|handles| {
            handles.clients.client.lock().unwrap().push(ClientTunnelRecord {
                name: "irc".to_string(),
                ident,
            });
        });

        unsafe {
            assert_eq!(lattica_client_tunnels_count(), 1);
            assert_eq!(lattica_server_tunnels_count(), 0);

            let mut buf = [0u8; 64];
            assert_eq!(
                lattica_client_tunnel_name(0, buf.as_mut_ptr().cast(), buf.len()),
                LATTICA_OK
            );
            assert_eq!(read_cstr(&buf), "irc");

            assert_eq!(
                lattica_client_tunnel_ident(0, buf.as_mut_ptr().cast(), buf.len()),
                LATTICA_OK
            );
            assert_eq!(read_cstr(&buf), ident.to_base32());

            assert_eq!(
                lattica_server_tunnel_name(0, buf.as_mut_ptr().cast(), buf.len()),
                LATTICA_ERR
            );
        }
    }
}
