//! Pure address resolution decisions.
//!
//! For each enabled address family the external address comes from the
//! first tier that produces one: an explicit option, the family-specific
//! interface name, then the shared interface name. Mesh addressing has
//! its own validation chain whose every failure downgrades to a session
//! disable rather than a startup error.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::config::{MeshSection, NetworkSection};
use crate::netenv::{is_mesh_address, IpFamily, NetEnv};

/// Resolved external addresses for the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressConfig {
    pub v4: Option<Ipv4Addr>,
    pub v6: Option<Ipv6Addr>,
    pub mesh: MeshResolution,
}

/// Outcome of the mesh address chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshResolution {
    /// Mesh networking was not requested.
    Disabled,
    /// The configured address validated.
    Configured(Ipv6Addr),
    /// No address was configured; discovery found one.
    Discovered(Ipv6Addr),
    /// Requested but unusable; mesh networking is off for this session.
    FallbackDisabled(MeshFailure),
}

impl MeshResolution {
    /// The usable mesh address, if the session has one.
    pub fn address(&self) -> Option<Ipv6Addr> {
        match self {
            MeshResolution::Configured(addr) | MeshResolution::Discovered(addr) => Some(*addr),
            MeshResolution::Disabled | MeshResolution::FallbackDisabled(_) => None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.address().is_some()
    }
}

/// Why mesh networking fell back to disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFailure {
    /// The configured address does not parse as IPv6.
    Unparseable,
    /// The configured address is outside the mesh overlay prefix.
    NotMeshFormat,
    /// The configured address is not assigned to a local interface.
    NotLocal,
    /// Discovery found no local mesh address.
    NothingDiscovered,
}

/// Resolve one address family through the fallback tiers.
///
/// Tier order: explicit option, family-specific interface, shared
/// interface. An explicit option that fails to parse resolves to none
/// (the caller warns); interface lookups that miss fall through.
fn resolve_family(
    explicit: Option<&str>,
    family_interface: Option<&str>,
    shared_interface: Option<&str>,
    family: IpFamily,
    env: &dyn NetEnv,
) -> Option<IpAddr> {
    if let Some(text) = explicit {
        return match (family, text.parse::<IpAddr>()) {
            (IpFamily::V4, Ok(addr @ IpAddr::V4(_))) | (IpFamily::V6, Ok(addr @ IpAddr::V6(_))) => {
                Some(addr)
            }
            _ => {
                tracing::warn!("ignoring unparseable explicit address {text:?}");
                None
            }
        };
    }

    family_interface
        .or(shared_interface)
        .and_then(|name| env.interface_address(name, family))
}

/// Resolve the mesh address chain.
pub fn resolve_mesh(mesh: &MeshSection, env: &dyn NetEnv) -> MeshResolution {
    if !mesh.enabled {
        return MeshResolution::Disabled;
    }

    match &mesh.address {
        Some(text) => {
            let Ok(addr) = text.parse::<Ipv6Addr>() else {
                return MeshResolution::FallbackDisabled(MeshFailure::Unparseable);
            };
            if !is_mesh_address(addr) {
                return MeshResolution::FallbackDisabled(MeshFailure::NotMeshFormat);
            }
            if !env.has_local_address(&IpAddr::V6(addr)) {
                return MeshResolution::FallbackDisabled(MeshFailure::NotLocal);
            }
            MeshResolution::Configured(addr)
        }
        None => match env.discover_mesh_address() {
            Some(addr) => MeshResolution::Discovered(addr),
            None => MeshResolution::FallbackDisabled(MeshFailure::NothingDiscovered),
        },
    }
}

/// Resolve all enabled address families.
pub fn resolve_addresses(
    network: &NetworkSection,
    mesh: &MeshSection,
    env: &dyn NetEnv,
) -> AddressConfig {
    let v4 = if network.ipv4 {
        resolve_family(
            network.address4.as_deref(),
            network.interface4.as_deref(),
            network.interface.as_deref(),
            IpFamily::V4,
            env,
        )
        .and_then(|addr| match addr {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        })
    } else {
        None
    };

    let v6 = if network.ipv6 {
        resolve_family(
            network.address6.as_deref(),
            network.interface6.as_deref(),
            network.interface.as_deref(),
            IpFamily::V6,
            env,
        )
        .and_then(|addr| match addr {
            IpAddr::V6(v6) => Some(v6),
            IpAddr::V4(_) => None,
        })
    } else {
        None
    };

    AddressConfig {
        v4,
        v6,
        mesh: resolve_mesh(mesh, env),
    }
}
