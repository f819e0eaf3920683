//! NTCP2 address publication decision.
//!
//! Evaluated once per bring-up as a pure function over resolved
//! configuration: the same inputs always produce the same plan, and the
//! context applies plans keyed by family, so re-running the decision is
//! harmless.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Address family of an announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
    Mesh,
}

/// One announced transport address.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Announcement {
    pub family: AddressFamily,
    pub port: u16,
    /// Explicit address override; `None` announces the resolved default.
    pub address: Option<IpAddr>,
}

/// Inputs to the publication decision, all resolved beforehand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicationInputs {
    pub ntcp2_enabled: bool,
    pub publish_requested: bool,
    pub proxy_configured: bool,
    pub ipv4: bool,
    pub ipv6: bool,
    pub mesh_enabled: bool,
    /// Shared transport port.
    pub port: u16,
    /// Protocol-specific port; 0 means unset.
    pub ntcp2_port: u16,
    /// Resolved external v4 address, if any.
    pub v4_address: Option<Ipv4Addr>,
    /// Resolved external v6 address, if any.
    pub v6_address: Option<Ipv6Addr>,
    /// Valid, non-wildcard explicitly configured v6 address; overrides
    /// the resolved one in the announcement.
    pub v6_override: Option<Ipv6Addr>,
    /// Usable mesh address for this session, if any.
    pub mesh_address: Option<Ipv6Addr>,
}

/// The decided announced-address changes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PublicationPlan {
    pub announce: Vec<Announcement>,
    /// Retract any previously announced address on this port.
    pub retract_port: Option<u16>,
    /// Neither v4 nor v6 ended up enabled; the router is mesh-only.
    pub mesh_only: bool,
}

/// Decide which NTCP2 addresses to announce or retract.
pub fn plan_publication(inputs: &PublicationInputs) -> PublicationPlan {
    if !inputs.ntcp2_enabled {
        return PublicationPlan::default();
    }

    // A proxied address must never be announced.
    let published = inputs.publish_requested && !inputs.proxy_configured;

    let effective_port = if inputs.ntcp2_port != 0 {
        inputs.ntcp2_port
    } else {
        inputs.port
    };

    let mut plan = PublicationPlan::default();

    if published {
        if inputs.ipv4 {
            plan.announce.push(Announcement {
                family: AddressFamily::Ipv4,
                port: effective_port,
                address: inputs.v4_address.map(IpAddr::V4),
            });
        }
        if inputs.ipv6 {
            plan.announce.push(Announcement {
                family: AddressFamily::Ipv6,
                port: effective_port,
                address: inputs.v6_override.or(inputs.v6_address).map(IpAddr::V6),
            });
        }
    } else {
        plan.retract_port = Some(inputs.port);
    }

    if inputs.mesh_enabled {
        plan.announce.push(Announcement {
            family: AddressFamily::Mesh,
            port: effective_port,
            address: inputs.mesh_address.map(IpAddr::V6),
        });
        plan.mesh_only = !inputs.ipv4 && !inputs.ipv6;
    }

    plan
}
