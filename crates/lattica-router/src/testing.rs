//! In-memory fakes for the subsystem contracts.
//!
//! Every fake shares its state through an `Arc`, so a test can hand a
//! clone to the router and keep another to inspect afterwards. The
//! [`CallLog`] records start/stop ordering across all subsystems, which
//! is what the sequencing and rollback tests assert on.

use std::collections::BTreeSet;
use std::net::{IpAddr, Ipv6Addr};
use std::sync::{Arc, Mutex};

use lattica_core::IdentHash;

use crate::logging::LogDestination;
use crate::netenv::{IpFamily, NetEnv};
use crate::subsystems::{
    ClientContext, ClientTunnelRecord, CryptoFlags, CryptoSubsystem, Logger, NetworkDatabase,
    ProtocolSet, ProxyRecord, Subsystems, TransportProtocol, Transports, TunnelManager,
};
use crate::tunnels::{PoolId, TunnelRecord};

/// Shared chronological record of subsystem calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: &str) {
        self.entries.lock().expect("call log lock").push(entry.to_string());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().expect("call log lock").clone()
    }

    /// Position of the first occurrence of `entry`, if recorded.
    pub fn position(&self, entry: &str) -> Option<usize> {
        self.entries().iter().position(|e| e == entry)
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.position(entry).is_some()
    }
}

/// Fake network environment with a scripted interface table.
#[derive(Debug, Clone, Default)]
pub struct FakeNetEnv {
    interfaces: Vec<(String, IpAddr)>,
    locals: Vec<IpAddr>,
    mesh: Option<Ipv6Addr>,
}

impl FakeNetEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interface(mut self, name: &str, addr: IpAddr) -> Self {
        self.interfaces.push((name.to_string(), addr));
        self
    }

    pub fn with_local_address(mut self, addr: IpAddr) -> Self {
        self.locals.push(addr);
        self
    }

    pub fn with_mesh_address(mut self, addr: Ipv6Addr) -> Self {
        self.mesh = Some(addr);
        self
    }
}

impl NetEnv for FakeNetEnv {
    fn interface_address(&self, name: &str, family: IpFamily) -> Option<IpAddr> {
        self.interfaces
            .iter()
            .filter(|(ifname, _)| ifname == name)
            .map(|(_, addr)| *addr)
            .find(|addr| {
                matches!(
                    (family, addr),
                    (IpFamily::V4, IpAddr::V4(_)) | (IpFamily::V6, IpAddr::V6(_))
                )
            })
    }

    fn has_local_address(&self, addr: &IpAddr) -> bool {
        self.locals.contains(addr) || self.interfaces.iter().any(|(_, a)| a == addr)
    }

    fn discover_mesh_address(&self) -> Option<Ipv6Addr> {
        self.mesh
    }
}

/// Fake logger recording destination changes and start/stop.
#[derive(Clone)]
pub struct FakeLogger {
    log: CallLog,
    pub destination: Arc<Mutex<Option<LogDestination>>>,
}

impl FakeLogger {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            destination: Arc::new(Mutex::new(None)),
        }
    }
}

impl Logger for FakeLogger {
    fn send_to(&self, destination: &LogDestination) {
        *self.destination.lock().expect("fake lock") = Some(destination.clone());
        self.log.record("logger.send_to");
    }

    fn start(&self) {
        self.log.record("logger.start");
    }

    fn stop(&self) {
        self.log.record("logger.stop");
    }
}

/// Fake network database.
#[derive(Clone)]
pub struct FakeNetDb {
    log: CallLog,
}

impl FakeNetDb {
    pub fn new(log: CallLog) -> Self {
        Self { log }
    }
}

impl NetworkDatabase for FakeNetDb {
    fn start(&self) {
        self.log.record("netdb.start");
    }

    fn stop(&self) {
        self.log.record("netdb.stop");
    }
}

/// Fake transports with scripted per-protocol bind results.
#[derive(Clone)]
pub struct FakeTransports {
    log: CallLog,
    pub ntcp2_binds: bool,
    pub ssu2_binds: bool,
    pub started_with: Arc<Mutex<Option<ProtocolSet>>>,
    pub check_reserved: Arc<Mutex<Option<bool>>>,
    pub restricted_families: Arc<Mutex<Option<BTreeSet<String>>>>,
    pub restricted_routers: Arc<Mutex<Option<BTreeSet<IdentHash>>>>,
    pub received: u64,
    pub sent: u64,
    pub transit: u64,
}

impl FakeTransports {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ntcp2_binds: true,
            ssu2_binds: true,
            started_with: Arc::new(Mutex::new(None)),
            check_reserved: Arc::new(Mutex::new(None)),
            restricted_families: Arc::new(Mutex::new(None)),
            restricted_routers: Arc::new(Mutex::new(None)),
            received: 0,
            sent: 0,
            transit: 0,
        }
    }

    /// Script every enabled protocol to fail its bind.
    pub fn failing_binds(mut self) -> Self {
        self.ntcp2_binds = false;
        self.ssu2_binds = false;
        self
    }
}

impl Transports for FakeTransports {
    fn start(&self, protocols: ProtocolSet) {
        *self.started_with.lock().expect("fake lock") = Some(protocols);
        self.log.record("transports.start");
    }

    fn stop(&self) {
        self.log.record("transports.stop");
    }

    fn is_bound(&self, protocol: TransportProtocol) -> bool {
        match protocol {
            TransportProtocol::Ntcp2 => self.ntcp2_binds,
            TransportProtocol::Ssu2 => self.ssu2_binds,
        }
    }

    fn set_check_reserved(&self, check: bool) {
        *self.check_reserved.lock().expect("fake lock") = Some(check);
    }

    fn restrict_routes_to_families(&self, families: &BTreeSet<String>) {
        *self.restricted_families.lock().expect("fake lock") = Some(families.clone());
    }

    fn restrict_routes_to_routers(&self, routers: &BTreeSet<IdentHash>) {
        *self.restricted_routers.lock().expect("fake lock") = Some(routers.clone());
    }

    fn peer_test(&self) {
        self.log.record("transports.peer_test");
    }

    fn total_received_bytes(&self) -> u64 {
        self.received
    }

    fn total_sent_bytes(&self) -> u64 {
        self.sent
    }

    fn total_transit_transmitted_bytes(&self) -> u64 {
        self.transit
    }

    fn in_bandwidth(&self) -> u32 {
        0
    }

    fn out_bandwidth(&self) -> u32 {
        0
    }

    fn transit_bandwidth(&self) -> u32 {
        0
    }
}

/// Fake tunnel manager serving scripted records.
#[derive(Clone)]
pub struct FakeTunnelManager {
    log: CallLog,
    pub inbound: Arc<Mutex<Vec<TunnelRecord>>>,
    pub outbound: Arc<Mutex<Vec<TunnelRecord>>>,
    pub exploratory: PoolId,
    pub success_rate: u32,
}

impl FakeTunnelManager {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            inbound: Arc::new(Mutex::new(Vec::new())),
            outbound: Arc::new(Mutex::new(Vec::new())),
            exploratory: PoolId(0),
            success_rate: 0,
        }
    }
}

impl TunnelManager for FakeTunnelManager {
    fn start(&self) {
        self.log.record("tunnels.start");
    }

    fn stop(&self) {
        self.log.record("tunnels.stop");
    }

    fn inbound_tunnels(&self) -> Vec<TunnelRecord> {
        self.inbound.lock().expect("fake lock").clone()
    }

    fn outbound_tunnels(&self) -> Vec<TunnelRecord> {
        self.outbound.lock().expect("fake lock").clone()
    }

    fn exploratory_pool(&self) -> PoolId {
        self.exploratory
    }

    fn tunnel_creation_success_rate(&self) -> u32 {
        self.success_rate
    }
}

/// Fake client context serving scripted proxies and tunnels.
#[derive(Clone)]
pub struct FakeClientContext {
    log: CallLog,
    pub http: Arc<Mutex<Option<ProxyRecord>>>,
    pub socks: Arc<Mutex<Option<ProxyRecord>>>,
    pub client: Arc<Mutex<Vec<ClientTunnelRecord>>>,
    pub server: Arc<Mutex<Vec<ClientTunnelRecord>>>,
}

impl FakeClientContext {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            http: Arc::new(Mutex::new(None)),
            socks: Arc::new(Mutex::new(None)),
            client: Arc::new(Mutex::new(Vec::new())),
            server: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl ClientContext for FakeClientContext {
    fn start(&self) {
        self.log.record("clients.start");
    }

    fn stop(&self) {
        self.log.record("clients.stop");
    }

    fn http_proxy(&self) -> Option<ProxyRecord> {
        self.http.lock().expect("fake lock").clone()
    }

    fn socks_proxy(&self) -> Option<ProxyRecord> {
        self.socks.lock().expect("fake lock").clone()
    }

    fn client_tunnels(&self) -> Vec<ClientTunnelRecord> {
        self.client.lock().expect("fake lock").clone()
    }

    fn server_tunnels(&self) -> Vec<ClientTunnelRecord> {
        self.server.lock().expect("fake lock").clone()
    }
}

/// Fake crypto subsystem recording its flags.
#[derive(Clone)]
pub struct FakeCrypto {
    log: CallLog,
    pub init_flags: Arc<Mutex<Option<CryptoFlags>>>,
}

impl FakeCrypto {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            init_flags: Arc::new(Mutex::new(None)),
        }
    }
}

impl CryptoSubsystem for FakeCrypto {
    fn init(&self, flags: &CryptoFlags) {
        *self.init_flags.lock().expect("fake lock") = Some(*flags);
        self.log.record("crypto.init");
    }

    fn terminate(&self) {
        self.log.record("crypto.terminate");
    }
}

/// Handles to every fake, kept by the test while the router owns clones.
pub struct FakeHandles {
    pub log: CallLog,
    pub logger: FakeLogger,
    pub netdb: FakeNetDb,
    pub transports: FakeTransports,
    pub tunnels: FakeTunnelManager,
    pub clients: FakeClientContext,
    pub crypto: FakeCrypto,
}

/// Build a fully-faked subsystem set plus the inspection handles.
pub fn fakes() -> (Subsystems, FakeHandles) {
    fakes_with_transports(|t| t)
}

/// Like [`fakes`], but lets the caller reconfigure the transports fake
/// (e.g. scripting bind failures) before it is boxed.
pub fn fakes_with_transports(
    configure: impl FnOnce(FakeTransports) -> FakeTransports,
) -> (Subsystems, FakeHandles) {
    let log = CallLog::new();
    let logger = FakeLogger::new(log.clone());
    let netdb = FakeNetDb::new(log.clone());
    let transports = configure(FakeTransports::new(log.clone()));
    let tunnels = FakeTunnelManager::new(log.clone());
    let clients = FakeClientContext::new(log.clone());
    let crypto = FakeCrypto::new(log.clone());

    let subsystems = Subsystems {
        logger: Box::new(logger.clone()),
        netdb: Box::new(netdb.clone()),
        transports: Box::new(transports.clone()),
        tunnels: Box::new(tunnels.clone()),
        clients: Box::new(clients.clone()),
        crypto: Box::new(crypto.clone()),
    };

    let handles = FakeHandles {
        log,
        logger,
        netdb,
        transports,
        tunnels,
        clients,
        crypto,
    };

    (subsystems, handles)
}
