//! Router lifecycle orchestration for the Lattica overlay network.
//!
//! This crate resolves raw configuration into validated operational
//! parameters, drives the ordered startup/shutdown sequence across the
//! externally-owned subsystems (network database, transports, tunnels,
//! client context), provisions the router identity, and exposes
//! index-addressed introspection over live subsystem state.
//!
//! The subsystems themselves live behind the narrow trait contracts in
//! [`subsystems`]; this crate only sequences and reports on them.

pub mod address;
pub mod bandwidth;
pub mod config;
pub mod context;
pub mod error;
pub mod identity;
pub mod logging;
pub mod netenv;
pub mod ntcp2;
pub mod paths;
pub mod query;
pub mod router;
pub mod subsystems;
pub mod testing;
pub mod trust;
pub mod tunnels;

pub use config::RouterConfig;
pub use context::{ErrorReason, RouterContext, RouterStatus};
pub use error::RouterError;
pub use router::{LifecycleState, Router};
pub use subsystems::Subsystems;
