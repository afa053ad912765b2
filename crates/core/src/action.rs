//! Action types emitted by the steering state machine.

use crate::{PeerMessage, TimerId};
use netsteer_types::MacAddr;
use std::time::Duration;

/// All possible outputs from the steering state machine.
///
/// Actions are requests for I/O; the embedding node executes them in
/// order. Failures are logged and swallowed — the protocol self-heals via
/// periodic re-flooding and state-driven retries, so no action failure is
/// allowed to wedge the automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Encode the message in a fresh frame and unicast it to every
    /// configured peer except ourselves.
    Broadcast(PeerMessage),

    /// Arm a timer. Re-arming an already armed timer replaces it.
    SetTimer { id: TimerId, duration: Duration },

    /// Cancel a timer. Cancelling an unarmed timer is a no-op.
    CancelTimer { id: TimerId },

    /// Deny the client association locally. Only emitted in Force mode.
    BlacklistAdd { sta: MacAddr },

    /// Allow the client to associate again. Only emitted in Force mode.
    BlacklistRemove { sta: MacAddr },

    /// Forcibly deauthenticate the client.
    Disassociate { sta: MacAddr },

    /// Politely ask the client to roam via an 802.11v BSS Transition
    /// Request naming the target BSSID and its operating channel.
    BssTransitionRequest {
        sta: MacAddr,
        target: MacAddr,
        channel: u8,
    },
}

impl Action {
    /// Get a human-readable name for this action type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Action::Broadcast(_) => "Broadcast",
            Action::SetTimer { .. } => "SetTimer",
            Action::CancelTimer { .. } => "CancelTimer",
            Action::BlacklistAdd { .. } => "BlacklistAdd",
            Action::BlacklistRemove { .. } => "BlacklistRemove",
            Action::Disassociate { .. } => "Disassociate",
            Action::BssTransitionRequest { .. } => "BssTransitionRequest",
        }
    }
}
