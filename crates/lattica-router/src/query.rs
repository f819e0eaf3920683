//! Index-addressed introspection over live subsystem collections.
//!
//! Queries operate on snapshots taken at call time. There is no
//! isolation between a count query and a later index query: the
//! underlying collection may have changed in between, and an index that
//! was valid a moment ago simply misses.

use crate::subsystems::{ClientTunnelRecord, ProxyRecord};
use crate::tunnels::{format_tunnel, PoolId, TunnelRecord};

/// Failure of an index-addressed or optional-value query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("not found")]
    NotFound,
}

/// Formatted summary of the tunnel at `index`.
pub fn tunnel_info(
    records: &[TunnelRecord],
    exploratory_pool: PoolId,
    index: usize,
) -> Result<String, QueryError> {
    records
        .get(index)
        .map(|record| format_tunnel(record, exploratory_pool))
        .ok_or(QueryError::NotFound)
}

/// Name of the client/server tunnel at `index`.
pub fn client_tunnel_name(
    records: &[ClientTunnelRecord],
    index: usize,
) -> Result<String, QueryError> {
    records
        .get(index)
        .map(|record| record.name.clone())
        .ok_or(QueryError::NotFound)
}

/// Ident of the client/server tunnel at `index`, base32-rendered.
pub fn client_tunnel_ident(
    records: &[ClientTunnelRecord],
    index: usize,
) -> Result<String, QueryError> {
    records
        .get(index)
        .map(|record| record.ident.to_base32())
        .ok_or(QueryError::NotFound)
}

/// Ident of a bound proxy destination, base32-rendered.
pub fn proxy_ident(proxy: Option<ProxyRecord>) -> Result<String, QueryError> {
    proxy
        .map(|record| record.ident.to_base32())
        .ok_or(QueryError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tunnels::{TunnelDirection, TunnelState};
    use lattica_core::IdentHash;

    fn tunnel(name: &str) -> TunnelRecord {
        TunnelRecord {
            name: name.to_string(),
            direction: TunnelDirection::Inbound,
            pool: PoolId(1),
            state: TunnelState::Established,
            latency_ms: None,
            received_bytes: 0,
            sent_bytes: 0,
        }
    }

    fn client_tunnel(name: &str) -> ClientTunnelRecord {
        ClientTunnelRecord {
            name: name.to_string(),
            ident: IdentHash::new([7; 32]),
        }
    }

    #[test]
    fn every_in_range_index_succeeds() {
        let records = vec![tunnel("a"), tunnel("b"), tunnel("c")];
        for i in 0..records.len() {
            assert!(tunnel_info(&records, PoolId(1), i).is_ok(), "index {i}");
        }
    }

    #[test]
    fn out_of_range_index_misses() {
        let records = vec![tunnel("a")];
        assert_eq!(
            tunnel_info(&records, PoolId(1), 1),
            Err(QueryError::NotFound)
        );
        assert_eq!(
            tunnel_info(&records, PoolId(1), usize::MAX),
            Err(QueryError::NotFound)
        );
    }

    #[test]
    fn empty_collection_always_misses() {
        assert_eq!(tunnel_info(&[], PoolId(1), 0), Err(QueryError::NotFound));
        assert_eq!(client_tunnel_name(&[], 0), Err(QueryError::NotFound));
        assert_eq!(client_tunnel_ident(&[], 0), Err(QueryError::NotFound));
    }

    #[test]
    fn client_tunnel_accessors() {
        let records = vec![client_tunnel("web"), client_tunnel("irc")];
        assert_eq!(client_tunnel_name(&records, 1).unwrap(), "irc");
        assert_eq!(
            client_tunnel_ident(&records, 0).unwrap(),
            IdentHash::new([7; 32]).to_base32()
        );
        assert_eq!(client_tunnel_name(&records, 2), Err(QueryError::NotFound));
    }

    #[test]
    fn proxy_ident_requires_a_bound_proxy() {
        let ident = IdentHash::new([9; 32]);
        assert_eq!(
            proxy_ident(Some(ProxyRecord { ident })).unwrap(),
            ident.to_base32()
        );
        assert_eq!(proxy_ident(None), Err(QueryError::NotFound));
    }
}
