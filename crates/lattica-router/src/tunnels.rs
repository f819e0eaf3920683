//! Tunnel state reporting types.
//!
//! The tunnel subsystem owns the records; this module defines the
//! read-only shape handed across the introspection boundary and the
//! collapsed state rendering.

/// Raw tunnel lifecycle state as reported by the tunnel subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TunnelState {
    Pending,
    BuildReplyReceived,
    Established,
    BuildFailed,
    TestFailed,
    Failed,
    Expiring,
}

/// Collapsed state category used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TunnelStateSummary {
    Building,
    Failed,
    Expiring,
    Established,
    Unknown,
}

impl TunnelStateSummary {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TunnelStateSummary::Building => "building",
            TunnelStateSummary::Failed => "failed",
            TunnelStateSummary::Expiring => "expiring",
            TunnelStateSummary::Established => "established",
            TunnelStateSummary::Unknown => "unknown",
        }
    }
}

impl From<TunnelState> for TunnelStateSummary {
    fn from(state: TunnelState) -> Self {
        match state {
            TunnelState::Pending | TunnelState::BuildReplyReceived => TunnelStateSummary::Building,
            TunnelState::BuildFailed | TunnelState::TestFailed | TunnelState::Failed => {
                TunnelStateSummary::Failed
            }
            TunnelState::Established => TunnelStateSummary::Established,
            TunnelState::Expiring => TunnelStateSummary::Expiring,
        }
    }
}

/// Tunnel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TunnelDirection {
    Inbound,
    Outbound,
}

/// Identifies a tunnel pool; compared against the exploratory pool id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolId(pub u64);

/// Read-only snapshot of one tunnel, as reported by the tunnel subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelRecord {
    /// Rendered identity/description of the tunnel.
    pub name: String,
    pub direction: TunnelDirection,
    pub pool: PoolId,
    pub state: TunnelState,
    /// Round-trip latency sample; `None` while unmeasured.
    pub latency_ms: Option<u32>,
    pub received_bytes: u64,
    pub sent_bytes: u64,
}

/// Render the one-line summary of a tunnel.
///
/// Latency appears only when a sample is known. The byte figure is the
/// received count for inbound tunnels and the sent count for outbound
/// ones, in KiB truncated toward zero.
pub fn format_tunnel(record: &TunnelRecord, exploratory_pool: PoolId) -> String {
    let mut out = record.name.clone();

    if let Some(latency) = record.latency_ms {
        out.push_str(&format!(" {latency}ms"));
    }

    let summary = TunnelStateSummary::from(record.state);
    out.push(' ');
    out.push_str(summary.as_str());

    if record.pool == exploratory_pool {
        out.push_str(" (exploratory)");
    }

    let bytes = match record.direction {
        TunnelDirection::Inbound => record.received_bytes,
        TunnelDirection::Outbound => record.sent_bytes,
    };
    out.push_str(&format!(" {} KiB", bytes / 1024));

    out
}
