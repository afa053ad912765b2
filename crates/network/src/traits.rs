//! L2 transport interface.
//!
//! Defines the seam between the steering node and the actual distribution
//! medium. Production backends wrap a raw packet socket bound to the
//! bridge interface and ethertype; `netsteer-network-memory` provides a
//! deterministic in-memory implementation for simulation and tests.

use netsteer_types::MacAddr;
use thiserror::Error;

/// Error returned when a unicast send fails.
///
/// Sends are best-effort; callers log the failure and continue. The
/// protocol tolerates loss by design.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("peer unreachable: {0}")]
    Unreachable(MacAddr),

    #[error("transport closed")]
    Closed,

    #[error("send failed: {0}")]
    Io(String),
}

/// Unicast L2 frame transport.
///
/// One transport per steering context, opened at init and closed at
/// deinit. Inbound frames reach the node out-of-band (the runner calls
/// `SteeringNode::handle_frame` with whatever the medium delivered), so
/// this trait only covers egress.
pub trait L2Transport {
    /// Send a frame to a single peer. Best-effort.
    fn send(&self, dst: MacAddr, frame: &[u8]) -> Result<(), TransportError>;
}
