//! TOML-based router configuration.
//!
//! The parsed [`RouterConfig`] is the finalized snapshot the resolvers
//! consume: it is read-only once bring-up begins, and every derived
//! operational parameter is computed from it exactly once.

use std::path::Path;

use serde::Deserialize;

use crate::error::RouterError;

/// Top-level router configuration loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct RouterConfig {
    #[serde(default)]
    pub router: RouterSection,
    #[serde(default)]
    pub network: NetworkSection,
    #[serde(default)]
    pub mesh: MeshSection,
    #[serde(default)]
    pub ntcp2: Ntcp2Section,
    #[serde(default)]
    pub ssu2: Ssu2Section,
    #[serde(default)]
    pub trust: TrustSection,
    #[serde(default)]
    pub crypto: CryptoSection,
    #[serde(default)]
    pub log: LogSection,
}

impl RouterConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, RouterError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RouterError::Config(format!("failed to read config file: {e}")))?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, RouterError> {
        toml::from_str(s).map_err(|e| RouterError::Config(format!("failed to parse config: {e}")))
    }
}

/// The `[router]` section.
#[derive(Debug, Deserialize)]
pub struct RouterSection {
    /// Custom data directory. Defaults to `~/.lattica`.
    pub data_dir: Option<String>,
    /// Network identifier; routers on different net ids never peer.
    #[serde(default = "default_net_id")]
    pub net_id: u32,
    #[serde(default)]
    pub floodfill: bool,
    /// Bandwidth option: a class letter or a KB/s figure. Empty means default.
    #[serde(default)]
    pub bandwidth: String,
    /// Router family name announced to peers.
    pub family: Option<String>,
    /// Percentage of bandwidth shared with transit traffic.
    #[serde(default = "default_share_ratio")]
    pub share_ratio: u8,
    #[serde(default = "default_true")]
    pub accept_tunnels: bool,
}

fn default_net_id() -> u32 {
    2
}

fn default_share_ratio() -> u8 {
    100
}

fn default_true() -> bool {
    true
}

impl Default for RouterSection {
    fn default() -> Self {
        Self {
            data_dir: None,
            net_id: default_net_id(),
            floodfill: false,
            bandwidth: String::new(),
            family: None,
            share_ratio: default_share_ratio(),
            accept_tunnels: true,
        }
    }
}

/// The `[network]` section.
#[derive(Debug, Deserialize)]
pub struct NetworkSection {
    #[serde(default = "default_true")]
    pub ipv4: bool,
    #[serde(default)]
    pub ipv6: bool,
    /// Shared port for all transports. 0 lets the transports choose.
    #[serde(default)]
    pub port: u16,
    /// Explicit external addresses, overriding interface lookup.
    pub address4: Option<String>,
    pub address6: Option<String>,
    /// Interface to resolve addresses from; the family-specific names
    /// take precedence over the shared one.
    pub interface: Option<String>,
    pub interface4: Option<String>,
    pub interface6: Option<String>,
    /// Refuse peers in reserved address ranges.
    #[serde(default = "default_true")]
    pub check_reserved: bool,
}

impl Default for NetworkSection {
    fn default() -> Self {
        Self {
            ipv4: true,
            ipv6: false,
            port: 0,
            address4: None,
            address6: None,
            interface: None,
            interface4: None,
            interface6: None,
            check_reserved: true,
        }
    }
}

/// The `[mesh]` section: the overlay-network fallback transport path.
#[derive(Debug, Default, Deserialize)]
pub struct MeshSection {
    #[serde(default)]
    pub enabled: bool,
    /// Mesh address to announce. When absent, discovery is attempted.
    pub address: Option<String>,
}

/// The `[ntcp2]` section.
#[derive(Debug, Deserialize)]
pub struct Ntcp2Section {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub published: bool,
    /// Protocol-specific port; 0 falls back to the shared `network.port`.
    #[serde(default)]
    pub port: u16,
    /// Outbound proxy URL. A proxied address is never announced.
    pub proxy: Option<String>,
}

impl Default for Ntcp2Section {
    fn default() -> Self {
        Self {
            enabled: true,
            published: false,
            port: 0,
            proxy: None,
        }
    }
}

/// The `[ssu2]` section.
#[derive(Debug, Deserialize)]
pub struct Ssu2Section {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub port: u16,
}

impl Default for Ssu2Section {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 0,
        }
    }
}

/// The `[trust]` section. Lists are comma-separated; a literal comma
/// inside an entry cannot be represented.
#[derive(Debug, Default, Deserialize)]
pub struct TrustSection {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub families: String,
    #[serde(default)]
    pub routers: String,
}

/// The `[crypto]` section: acceleration flags handed to the crypto
/// subsystem at initialization.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct CryptoSection {
    #[serde(default)]
    pub precomputation: bool,
    #[serde(default = "default_true")]
    pub aesni: bool,
    #[serde(default = "default_true")]
    pub avx: bool,
    #[serde(default)]
    pub force: bool,
}

impl Default for CryptoSection {
    fn default() -> Self {
        Self {
            precomputation: false,
            aesni: true,
            avx: true,
            force: false,
        }
    }
}

/// The `[log]` section.
#[derive(Debug, Deserialize)]
pub struct LogSection {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `"file"` (default) or `"stdout"`.
    #[serde(default = "default_log_destination")]
    pub destination: String,
    /// Log file path; defaults to `lattica.log` under the data directory.
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_destination() -> String {
    "file".to_string()
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            destination: default_log_destination(),
            file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_document() {
        let config = RouterConfig::parse("").unwrap();
        assert_eq!(config.router.net_id, 2);
        assert!(!config.router.floodfill);
        assert!(config.router.bandwidth.is_empty());
        assert_eq!(config.router.share_ratio, 100);
        assert!(config.router.accept_tunnels);
        assert!(config.network.ipv4);
        assert!(!config.network.ipv6);
        assert!(config.network.check_reserved);
        assert!(!config.mesh.enabled);
        assert!(config.ntcp2.enabled);
        assert!(!config.ntcp2.published);
        assert!(config.ssu2.enabled);
        assert!(!config.trust.enabled);
        assert!(config.crypto.aesni);
        assert_eq!(config.log.level, "info");
        assert_eq!(config.log.destination, "file");
    }

    #[test]
    fn parse_full_document() {
        let toml = r#"
[router]
data_dir = "/var/lib/lattica"
net_id = 7
floodfill = true
bandwidth = "X"
family = "example"
share_ratio = 50
accept_tunnels = false

[network]
ipv4 = true
ipv6 = true
port = 12345
address6 = "2001:db8::1"
interface = "eth0"
interface6 = "eth1"

[mesh]
enabled = true
address = "203:a3bc::1"

[ntcp2]
enabled = true
published = true
port = 12346
proxy = "socks://127.0.0.1:9050"

[ssu2]
enabled = false

[trust]
enabled = true
families = "alpha,beta"
routers = ""

[crypto]
aesni = false

[log]
level = "debug"
destination = "stdout"
"#;
        let config = RouterConfig::parse(toml).unwrap();
        assert_eq!(config.router.data_dir.as_deref(), Some("/var/lib/lattica"));
        assert_eq!(config.router.net_id, 7);
        assert!(config.router.floodfill);
        assert_eq!(config.router.bandwidth, "X");
        assert_eq!(config.router.family.as_deref(), Some("example"));
        assert_eq!(config.router.share_ratio, 50);
        assert!(!config.router.accept_tunnels);
        assert_eq!(config.network.port, 12345);
        assert_eq!(config.network.address6.as_deref(), Some("2001:db8::1"));
        assert_eq!(config.network.interface.as_deref(), Some("eth0"));
        assert_eq!(config.network.interface6.as_deref(), Some("eth1"));
        assert!(config.mesh.enabled);
        assert_eq!(config.mesh.address.as_deref(), Some("203:a3bc::1"));
        assert!(config.ntcp2.published);
        assert_eq!(config.ntcp2.port, 12346);
        assert!(config.ntcp2.proxy.is_some());
        assert!(!config.ssu2.enabled);
        assert!(config.trust.enabled);
        assert_eq!(config.trust.families, "alpha,beta");
        assert!(!config.crypto.aesni);
        assert_eq!(config.log.destination, "stdout");
    }

    #[test]
    fn parse_malformed_toml_fails() {
        assert!(RouterConfig::parse("[router").is_err());
        assert!(RouterConfig::parse("[router]\nnet_id = ").is_err());
        assert!(RouterConfig::parse("= value").is_err());
    }

    #[test]
    fn parse_wrong_field_type_fails() {
        let toml = r#"
[network]
ipv4 = "yes"
"#;
        assert!(RouterConfig::parse(toml).is_err());
    }
}
