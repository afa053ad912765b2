//! Actuator interface to the Wi-Fi MAC layer.

use netsteer_types::MacAddr;
use thiserror::Error;

/// Error from an actuator call.
///
/// Actuator failures are logged and swallowed: the automaton keeps its new
/// state and the remote peer retries CLOSE until it sees a CLOSED.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("actuator failure: {0}")]
pub struct ActuatorError(pub String);

/// Egress interface to the driver: blacklist control and client ejection.
///
/// Implementations wrap the host AP daemon's control surface. The
/// simulation harness records calls instead.
pub trait SteeringActuator {
    /// Deny the client association locally.
    fn blacklist_add(&mut self, sta: MacAddr) -> Result<(), ActuatorError>;

    /// Allow the client to associate again.
    fn blacklist_remove(&mut self, sta: MacAddr) -> Result<(), ActuatorError>;

    /// Forcibly deauthenticate the client.
    fn disassociate(&mut self, sta: MacAddr) -> Result<(), ActuatorError>;

    /// Send an 802.11v BSS Transition Request pointing the client at
    /// `target` on `channel`.
    fn bss_transition_request(
        &mut self,
        sta: MacAddr,
        target: MacAddr,
        channel: u8,
        timeout: u16,
    ) -> Result<(), ActuatorError>;
}
