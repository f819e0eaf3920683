//! The lifecycle orchestrator.
//!
//! Drives `Uninitialized → Initialized → Running → Stopped` across the
//! subsystem set, in dependency order with rollback on a fatal transport
//! bind failure. Not reentrant and not thread-safe: each transition must
//! be invoked by a single controlling thread, one at a time. Once
//! running, the subsystems do their own background work; this type only
//! issues signals and polls read-only state.

use std::net::Ipv6Addr;

use crate::address::{resolve_addresses, MeshResolution};
use crate::bandwidth::{resolve_bandwidth, BandwidthResolution};
use crate::config::RouterConfig;
use crate::context::RouterContext;
use crate::error::RouterError;
use crate::netenv::NetEnv;
use crate::ntcp2::{plan_publication, PublicationInputs};
use crate::paths;
use crate::query::{self, QueryError};
use crate::subsystems::{ProtocolSet, Subsystems};
use crate::trust::resolve_trust_policy;

/// Lifecycle of the whole router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Initialized,
    Running,
    Stopped,
}

/// Sequences subsystem bring-up and shutdown, and serves introspection.
pub struct Router {
    state: LifecycleState,
    context: RouterContext,
    subsystems: Subsystems,
    protocols: ProtocolSet,
}

impl Router {
    pub fn new(subsystems: Subsystems) -> Self {
        Self {
            state: LifecycleState::Uninitialized,
            context: RouterContext::new(),
            subsystems,
            protocols: ProtocolSet::default(),
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn context(&self) -> &RouterContext {
        &self.context
    }

    /// Update the operational status.
    ///
    /// Status is the one context field that keeps changing after
    /// bring-up; the transport wiring reports peer-test outcomes here.
    pub fn set_status(&mut self, status: crate::context::RouterStatus) {
        self.context.set_status(status);
    }

    /// Resolve the configuration snapshot and apply every derived
    /// decision to the context and the subsystems.
    ///
    /// Single-shot: a second call fails with `AlreadyInitialized`.
    /// Directory resolution runs first because the default log
    /// destination lives under the data directory.
    pub fn initialize(
        &mut self,
        config: &RouterConfig,
        env: &dyn NetEnv,
    ) -> Result<(), RouterError> {
        if self.state != LifecycleState::Uninitialized {
            return Err(RouterError::AlreadyInitialized);
        }

        let router_paths = paths::resolve(config.router.data_dir.as_deref())?;
        let destination = paths::log_destination(&router_paths, &config.log);
        self.subsystems.logger.send_to(&destination);

        self.subsystems.crypto.init(&config.crypto);

        self.context.set_net_id(config.router.net_id);
        self.context.set_floodfill(config.router.floodfill);
        self.context.set_family(config.router.family.clone());
        self.context.set_share_ratio(config.router.share_ratio);
        self.context
            .set_accepts_tunnels(config.router.accept_tunnels);

        let resolution = resolve_bandwidth(&config.router.bandwidth, config.router.floodfill);
        if let BandwidthResolution::Fallback(bandwidth) = resolution {
            tracing::warn!(
                "unrecognized bandwidth option {:?}, falling back to class {:?}",
                config.router.bandwidth,
                bandwidth.class
            );
        }
        self.context.set_bandwidth(resolution.bandwidth());

        let addresses = resolve_addresses(&config.network, &config.mesh, env);
        if let MeshResolution::FallbackDisabled(reason) = addresses.mesh {
            tracing::warn!("mesh networking disabled for this session: {reason:?}");
        }

        let plan = plan_publication(&PublicationInputs {
            ntcp2_enabled: config.ntcp2.enabled,
            publish_requested: config.ntcp2.published,
            proxy_configured: config.ntcp2.proxy.is_some(),
            ipv4: config.network.ipv4,
            ipv6: config.network.ipv6,
            mesh_enabled: addresses.mesh.is_enabled(),
            port: config.network.port,
            ntcp2_port: config.ntcp2.port,
            v4_address: addresses.v4,
            v6_address: addresses.v6,
            v6_override: explicit_v6(config),
            mesh_address: addresses.mesh.address(),
        });
        self.context.apply_publication_plan(&plan);

        let outcome = resolve_trust_policy(
            config.trust.enabled,
            &config.trust.families,
            &config.trust.routers,
        );
        for entry in &outcome.invalid_routers {
            tracing::warn!("ignoring undecodable trusted router entry {entry:?}");
        }
        if let Some(policy) = outcome.policy {
            if policy.is_empty() {
                tracing::error!("trusted routes enabled but both restriction lists are empty");
            }
            self.subsystems
                .transports
                .restrict_routes_to_families(&policy.families);
            self.subsystems
                .transports
                .restrict_routes_to_routers(&policy.routers);
        }

        self.subsystems
            .transports
            .set_check_reserved(config.network.check_reserved);

        self.protocols = ProtocolSet {
            ntcp2: config.ntcp2.enabled,
            ssu2: config.ssu2.enabled,
        };

        self.state = LifecycleState::Initialized;
        Ok(())
    }

    /// Start the subsystems in dependency order.
    ///
    /// A bind failure across **every** enabled transport protocol is
    /// fatal: transports and the network database are unwound and the
    /// tunnel subsystem and client context are never started. The logger
    /// and crypto subsystem deliberately stay up so the failure
    /// diagnostics remain readable.
    pub fn start(&mut self) -> Result<(), RouterError> {
        match self.state {
            LifecycleState::Initialized => {}
            LifecycleState::Uninitialized => return Err(RouterError::NotInitialized),
            _ => return Err(RouterError::NotStartable),
        }

        self.subsystems.logger.start();

        tracing::info!("starting network database");
        self.subsystems.netdb.start();

        tracing::info!("starting transports");
        self.subsystems.transports.start(self.protocols);

        let enabled = self.protocols.enabled();
        let all_unbound = !enabled.is_empty()
            && enabled
                .iter()
                .all(|&protocol| !self.subsystems.transports.is_bound(protocol));
        if all_unbound {
            tracing::error!("no enabled transport protocol could bind, shutting down");
            self.subsystems.transports.stop();
            self.subsystems.netdb.stop();
            self.state = LifecycleState::Stopped;
            return Err(RouterError::TransportBind);
        }

        tracing::info!("starting tunnels");
        self.subsystems.tunnels.start();

        tracing::info!("starting client context");
        self.subsystems.clients.start();

        self.state = LifecycleState::Running;
        Ok(())
    }

    /// Stop everything in strictly reverse order, then terminate the
    /// crypto subsystem.
    ///
    /// Safe to call after a partial `start` failure: stopping an
    /// already-stopped subsystem is that subsystem's no-op, not this
    /// orchestrator's concern.
    pub fn stop(&mut self) -> Result<(), RouterError> {
        if self.state == LifecycleState::Uninitialized {
            return Err(RouterError::NotInitialized);
        }

        tracing::info!("shutting down");
        self.subsystems.clients.stop();
        self.subsystems.tunnels.stop();
        self.subsystems.transports.stop();
        self.subsystems.netdb.stop();
        self.subsystems.logger.stop();
        self.subsystems.crypto.terminate();

        self.state = LifecycleState::Stopped;
        Ok(())
    }

    /// Stop accepting new transit tunnels without touching the lifecycle
    /// state; used for graceful pre-shutdown draining.
    pub fn close_accepts_tunnels(&mut self) {
        self.context.set_accepts_tunnels(false);
    }

    /// Ask the transports to run a peer test.
    pub fn run_peer_test(&self) {
        self.subsystems.transports.peer_test();
    }

    // -- introspection ------------------------------------------------------

    /// Rendered operational status, e.g. `"OK"` or `"Error - Offline"`.
    pub fn network_status(&self) -> String {
        self.context.status_text()
    }

    pub fn tunnel_creation_success_rate(&self) -> u32 {
        self.subsystems.tunnels.tunnel_creation_success_rate()
    }

    pub fn received_bytes(&self) -> u64 {
        self.subsystems.transports.total_received_bytes()
    }

    pub fn sent_bytes(&self) -> u64 {
        self.subsystems.transports.total_sent_bytes()
    }

    pub fn transit_bytes(&self) -> u64 {
        self.subsystems.transports.total_transit_transmitted_bytes()
    }

    pub fn in_bandwidth(&self) -> u32 {
        self.subsystems.transports.in_bandwidth()
    }

    pub fn out_bandwidth(&self) -> u32 {
        self.subsystems.transports.out_bandwidth()
    }

    pub fn transit_bandwidth(&self) -> u32 {
        self.subsystems.transports.transit_bandwidth()
    }

    pub fn inbound_tunnel_count(&self) -> usize {
        self.subsystems.tunnels.inbound_tunnels().len()
    }

    pub fn outbound_tunnel_count(&self) -> usize {
        self.subsystems.tunnels.outbound_tunnels().len()
    }

    pub fn inbound_tunnel_info(&self, index: usize) -> Result<String, QueryError> {
        query::tunnel_info(
            &self.subsystems.tunnels.inbound_tunnels(),
            self.subsystems.tunnels.exploratory_pool(),
            index,
        )
    }

    pub fn outbound_tunnel_info(&self, index: usize) -> Result<String, QueryError> {
        query::tunnel_info(
            &self.subsystems.tunnels.outbound_tunnels(),
            self.subsystems.tunnels.exploratory_pool(),
            index,
        )
    }

    pub fn http_proxy_enabled(&self) -> bool {
        self.subsystems.clients.http_proxy().is_some()
    }

    pub fn socks_proxy_enabled(&self) -> bool {
        self.subsystems.clients.socks_proxy().is_some()
    }

    pub fn http_proxy_ident(&self) -> Result<String, QueryError> {
        query::proxy_ident(self.subsystems.clients.http_proxy())
    }

    pub fn socks_proxy_ident(&self) -> Result<String, QueryError> {
        query::proxy_ident(self.subsystems.clients.socks_proxy())
    }

    pub fn client_tunnel_count(&self) -> usize {
        self.subsystems.clients.client_tunnels().len()
    }

    pub fn server_tunnel_count(&self) -> usize {
        self.subsystems.clients.server_tunnels().len()
    }

    pub fn client_tunnel_name(&self, index: usize) -> Result<String, QueryError> {
        query::client_tunnel_name(&self.subsystems.clients.client_tunnels(), index)
    }

    pub fn client_tunnel_ident(&self, index: usize) -> Result<String, QueryError> {
        query::client_tunnel_ident(&self.subsystems.clients.client_tunnels(), index)
    }

    pub fn server_tunnel_name(&self, index: usize) -> Result<String, QueryError> {
        query::client_tunnel_name(&self.subsystems.clients.server_tunnels(), index)
    }

    pub fn server_tunnel_ident(&self, index: usize) -> Result<String, QueryError> {
        query::client_tunnel_ident(&self.subsystems.clients.server_tunnels(), index)
    }
}

/// The explicitly configured, valid, non-wildcard IPv6 address, if any.
fn explicit_v6(config: &RouterConfig) -> Option<Ipv6Addr> {
    config
        .network
        .address6
        .as_deref()
        .and_then(|text| text.parse::<Ipv6Addr>().ok())
        .filter(|addr| !addr.is_unspecified())
}
