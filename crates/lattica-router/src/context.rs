//! Process-wide router state, threaded explicitly through the orchestrator.
//!
//! The context is mutated by the resolvers and the orchestrator during
//! bring-up; during operation only the status changes (reported by the
//! transports). It is never destroyed while the process lives.

use std::collections::BTreeMap;

use crate::bandwidth::Bandwidth;
use crate::ntcp2::{AddressFamily, Announcement, PublicationPlan};

/// Reason attached to the `Error` status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorReason {
    ClockSkew,
    Offline,
    SymmetricNat,
    Unknown,
}

impl ErrorReason {
    pub const fn text(&self) -> &'static str {
        match self {
            ErrorReason::ClockSkew => "Clock skew",
            ErrorReason::Offline => "Offline",
            ErrorReason::SymmetricNat => "Symmetric NAT",
            ErrorReason::Unknown => "Unknown",
        }
    }
}

/// Operational status of the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterStatus {
    Ok,
    Testing,
    Firewalled,
    Unknown,
    Proxy,
    Mesh,
    Error(ErrorReason),
}

impl RouterStatus {
    /// The fixed English label for this status.
    pub fn text(&self) -> String {
        match self {
            RouterStatus::Ok => "OK".to_string(),
            RouterStatus::Testing => "Testing".to_string(),
            RouterStatus::Firewalled => "Firewalled".to_string(),
            RouterStatus::Unknown => "Unknown".to_string(),
            RouterStatus::Proxy => "Proxy".to_string(),
            RouterStatus::Mesh => "Mesh".to_string(),
            RouterStatus::Error(reason) => format!("Error - {}", reason.text()),
        }
    }
}

/// Long-lived operational state of this router instance.
#[derive(Debug)]
pub struct RouterContext {
    net_id: u32,
    status: RouterStatus,
    bandwidth: Bandwidth,
    floodfill: bool,
    family: Option<String>,
    share_ratio: u8,
    accepts_tunnels: bool,
    published: BTreeMap<AddressFamily, Announcement>,
}

impl Default for RouterContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterContext {
    pub fn new() -> Self {
        Self {
            net_id: 2,
            status: RouterStatus::Unknown,
            bandwidth: Bandwidth::lowest(),
            floodfill: false,
            family: None,
            share_ratio: 100,
            accepts_tunnels: true,
            published: BTreeMap::new(),
        }
    }

    pub fn net_id(&self) -> u32 {
        self.net_id
    }

    pub fn set_net_id(&mut self, net_id: u32) {
        self.net_id = net_id;
    }

    pub fn status(&self) -> RouterStatus {
        self.status
    }

    pub fn set_status(&mut self, status: RouterStatus) {
        self.status = status;
    }

    /// Rendered status, e.g. `"OK"` or `"Error - Clock skew"`.
    pub fn status_text(&self) -> String {
        self.status.text()
    }

    pub fn bandwidth(&self) -> &Bandwidth {
        &self.bandwidth
    }

    pub fn set_bandwidth(&mut self, bandwidth: Bandwidth) {
        self.bandwidth = bandwidth;
    }

    pub fn is_floodfill(&self) -> bool {
        self.floodfill
    }

    pub fn set_floodfill(&mut self, floodfill: bool) {
        self.floodfill = floodfill;
    }

    pub fn family(&self) -> Option<&str> {
        self.family.as_deref()
    }

    pub fn set_family(&mut self, family: Option<String>) {
        self.family = family;
    }

    pub fn share_ratio(&self) -> u8 {
        self.share_ratio
    }

    pub fn set_share_ratio(&mut self, share_ratio: u8) {
        self.share_ratio = share_ratio.min(100);
    }

    pub fn accepts_tunnels(&self) -> bool {
        self.accepts_tunnels
    }

    pub fn set_accepts_tunnels(&mut self, accepts: bool) {
        self.accepts_tunnels = accepts;
    }

    /// Whether an address is currently announced for `family`.
    pub fn is_published(&self, family: AddressFamily) -> bool {
        self.published.contains_key(&family)
    }

    /// The currently announced address set, keyed by family.
    pub fn published_addresses(&self) -> &BTreeMap<AddressFamily, Announcement> {
        &self.published
    }

    /// Apply a publication plan to the announced-address set.
    ///
    /// Keyed by family, so applying the same plan twice leaves the set
    /// unchanged. A retraction only removes what a previous announcement
    /// for that port put there.
    pub fn apply_publication_plan(&mut self, plan: &PublicationPlan) {
        if let Some(port) = plan.retract_port {
            self.published
                .retain(|_, announcement| announcement.port != port);
        }
        for announcement in &plan.announce {
            self.published
                .insert(announcement.family, announcement.clone());
        }
        if plan.mesh_only {
            self.status = RouterStatus::Mesh;
        }
    }
}
