//! Queries against the host's network environment.
//!
//! Address resolution needs to ask the operating system which addresses
//! are assigned where. Those queries sit behind [`NetEnv`] so the
//! resolution logic itself stays pure and testable; [`SystemNetEnv`]
//! is the real implementation on top of `getifaddrs`.

use std::net::{IpAddr, Ipv6Addr};

/// Address family selector for interface lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpFamily {
    V4,
    V6,
}

/// Read-only view of the host's interfaces and addresses.
pub trait NetEnv {
    /// First global-scope address of `family` assigned to the named
    /// interface, if any.
    fn interface_address(&self, name: &str, family: IpFamily) -> Option<IpAddr>;

    /// Whether `addr` is assigned to any local interface.
    fn has_local_address(&self, addr: &IpAddr) -> bool;

    /// First local address inside the mesh overlay prefix, if any.
    fn discover_mesh_address(&self) -> Option<Ipv6Addr>;
}

/// Check whether an IPv6 address is a mesh overlay address (0200::/7).
pub fn is_mesh_address(addr: Ipv6Addr) -> bool {
    (addr.octets()[0] & 0xFE) == 0x02
}

/// Check whether an IPv6 address is link-local (fe80::/10); those are
/// never announced.
fn is_link_local(addr: Ipv6Addr) -> bool {
    let octets = addr.octets();
    octets[0] == 0xFE && (octets[1] & 0xC0) == 0x80
}

/// [`NetEnv`] backed by the operating system's interface table.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemNetEnv;

#[cfg(unix)]
impl SystemNetEnv {
    fn addresses() -> Vec<(String, IpAddr)> {
        let Ok(addrs) = nix::ifaddrs::getifaddrs() else {
            return Vec::new();
        };

        let mut out = Vec::new();
        for ifaddr in addrs {
            let Some(sock_addr) = ifaddr.address else {
                continue;
            };
            if let Some(sin) = sock_addr.as_sockaddr_in() {
                out.push((ifaddr.interface_name.clone(), IpAddr::V4(sin.ip())));
            } else if let Some(sin6) = sock_addr.as_sockaddr_in6() {
                out.push((ifaddr.interface_name.clone(), IpAddr::V6(sin6.ip())));
            }
        }
        out
    }
}

#[cfg(unix)]
impl NetEnv for SystemNetEnv {
    fn interface_address(&self, name: &str, family: IpFamily) -> Option<IpAddr> {
        Self::addresses()
            .into_iter()
            .filter(|(ifname, _)| ifname == name)
            .map(|(_, addr)| addr)
            .find(|addr| match (family, addr) {
                (IpFamily::V4, IpAddr::V4(_)) => true,
                (IpFamily::V6, IpAddr::V6(v6)) => !is_link_local(*v6),
                _ => false,
            })
    }

    fn has_local_address(&self, addr: &IpAddr) -> bool {
        Self::addresses().iter().any(|(_, local)| local == addr)
    }

    fn discover_mesh_address(&self) -> Option<Ipv6Addr> {
        Self::addresses().into_iter().find_map(|(_, addr)| match addr {
            IpAddr::V6(v6) if is_mesh_address(v6) => Some(v6),
            _ => None,
        })
    }
}

#[cfg(not(unix))]
impl NetEnv for SystemNetEnv {
    fn interface_address(&self, _name: &str, _family: IpFamily) -> Option<IpAddr> {
        None
    }

    fn has_local_address(&self, _addr: &IpAddr) -> bool {
        false
    }

    fn discover_mesh_address(&self) -> Option<Ipv6Addr> {
        None
    }
}
