//! Narrow contracts for the externally-owned subsystems.
//!
//! Each subsystem runs its own internal concurrency once started; the
//! orchestrator only issues start/stop signals and polls read-only
//! state. Collection getters return owned snapshots, so a count taken
//! now and an index used later may disagree while the subsystem mutates
//! its collections. Callers handle that as a soft miss, never as
//! undefined behavior.

use std::collections::BTreeSet;

use lattica_core::IdentHash;

use crate::config::CryptoSection;
use crate::logging::LogDestination;
use crate::tunnels::{PoolId, TunnelRecord};

/// Acceleration flags handed to the crypto subsystem.
pub type CryptoFlags = CryptoSection;

/// Transport protocols the router can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportProtocol {
    Ntcp2,
    Ssu2,
}

/// Which protocols to start, with their per-protocol enablement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProtocolSet {
    pub ntcp2: bool,
    pub ssu2: bool,
}

impl ProtocolSet {
    pub fn contains(&self, protocol: TransportProtocol) -> bool {
        match protocol {
            TransportProtocol::Ntcp2 => self.ntcp2,
            TransportProtocol::Ssu2 => self.ssu2,
        }
    }

    /// The enabled protocols, in a fixed order.
    pub fn enabled(&self) -> Vec<TransportProtocol> {
        let mut protocols = Vec::new();
        if self.ntcp2 {
            protocols.push(TransportProtocol::Ntcp2);
        }
        if self.ssu2 {
            protocols.push(TransportProtocol::Ssu2);
        }
        protocols
    }

    pub fn is_empty(&self) -> bool {
        !self.ntcp2 && !self.ssu2
    }
}

/// The logging backend.
pub trait Logger: Send + Sync {
    fn send_to(&self, destination: &LogDestination);
    fn start(&self);
    fn stop(&self);
}

/// The peer/record store.
pub trait NetworkDatabase: Send + Sync {
    fn start(&self);
    fn stop(&self);
}

/// The transport layer: connection establishment over the enabled
/// protocols, plus traffic counters.
pub trait Transports: Send + Sync {
    fn start(&self, protocols: ProtocolSet);
    fn stop(&self);
    fn is_bound(&self, protocol: TransportProtocol) -> bool;
    fn set_check_reserved(&self, check: bool);
    fn restrict_routes_to_families(&self, families: &BTreeSet<String>);
    fn restrict_routes_to_routers(&self, routers: &BTreeSet<IdentHash>);
    fn peer_test(&self);
    fn total_received_bytes(&self) -> u64;
    fn total_sent_bytes(&self) -> u64;
    fn total_transit_transmitted_bytes(&self) -> u64;
    fn in_bandwidth(&self) -> u32;
    fn out_bandwidth(&self) -> u32;
    fn transit_bandwidth(&self) -> u32;
}

/// The tunnel-building subsystem.
pub trait TunnelManager: Send + Sync {
    fn start(&self);
    fn stop(&self);
    /// Snapshot of the live inbound tunnels at call time.
    fn inbound_tunnels(&self) -> Vec<TunnelRecord>;
    /// Snapshot of the live outbound tunnels at call time.
    fn outbound_tunnels(&self) -> Vec<TunnelRecord>;
    fn exploratory_pool(&self) -> PoolId;
    /// Tunnel build success rate in percent.
    fn tunnel_creation_success_rate(&self) -> u32;
}

/// A destination bound to a local proxy role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRecord {
    pub ident: IdentHash,
}

/// A named client or server tunnel owned by the client context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientTunnelRecord {
    pub name: String,
    pub ident: IdentHash,
}

/// The client-side proxy/tunnel context.
pub trait ClientContext: Send + Sync {
    fn start(&self);
    fn stop(&self);
    fn http_proxy(&self) -> Option<ProxyRecord>;
    fn socks_proxy(&self) -> Option<ProxyRecord>;
    fn client_tunnels(&self) -> Vec<ClientTunnelRecord>;
    fn server_tunnels(&self) -> Vec<ClientTunnelRecord>;
}

/// The cryptographic subsystem.
pub trait CryptoSubsystem: Send + Sync {
    fn init(&self, flags: &CryptoFlags);
    fn terminate(&self);
}

/// The full set of collaborators the orchestrator sequences.
pub struct Subsystems {
    pub logger: Box<dyn Logger>,
    pub netdb: Box<dyn NetworkDatabase>,
    pub transports: Box<dyn Transports>,
    pub tunnels: Box<dyn TunnelManager>,
    pub clients: Box<dyn ClientContext>,
    pub crypto: Box<dyn CryptoSubsystem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_set_enumeration() {
        let set = ProtocolSet {
            ntcp2: true,
            ssu2: false,
        };
        assert!(set.contains(TransportProtocol::Ntcp2));
        assert!(!set.contains(TransportProtocol::Ssu2));
        assert_eq!(set.enabled(), vec![TransportProtocol::Ntcp2]);
        assert!(!set.is_empty());
    }

    #[test]
    fn empty_protocol_set() {
        let set = ProtocolSet::default();
        assert!(set.is_empty());
        assert!(set.enabled().is_empty());
    }
}
