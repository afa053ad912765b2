//! Node configuration.

use netsteer_steering::SteeringConfig;
use netsteer_types::{MacAddr, SteeringMode};
use serde::Deserialize;

/// Configuration for one steering node, loadable from the host process's
/// config file.
///
/// A node with `mode = off` or an empty peer list constructs successfully
/// but stays inert. The peer list is a read-only snapshot; changing it
/// requires re-initialization.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    /// Bridge interface the control socket binds to (consumed by the
    /// transport backend).
    pub bridge_ifname: String,
    /// BSSID of the local BSS.
    pub local_bssid: MacAddr,
    /// L2 address of this AP's transport endpoint.
    pub own_addr: MacAddr,
    /// Current operating channel.
    pub channel: u8,
    /// Steering aggressiveness. Defaults to `off`.
    #[serde(default)]
    pub mode: SteeringMode,
    /// Peer transport endpoints in the mobility domain. May include our
    /// own address; the node never sends to itself.
    #[serde(default)]
    pub peers: Vec<MacAddr>,
}

impl NodeConfig {
    /// Derive the state machine configuration.
    pub fn steering(&self) -> SteeringConfig {
        SteeringConfig::new(self.local_bssid, self.channel, self.mode)
    }

    /// Whether this configuration produces a live node.
    pub fn is_enabled(&self) -> bool {
        self.mode != SteeringMode::Off && !self.peers.is_empty()
    }
}
