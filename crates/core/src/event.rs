//! Event types for the deterministic steering state machine.

use netsteer_types::{MacAddr, Score};

/// Priority levels for event ordering within the same timestamp.
///
/// Events at the same logical time are processed in priority order.
/// Lower values = higher priority (processed first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum EventPriority {
    /// Internal events: consequences of prior event processing.
    Internal = 0,

    /// Timer events: scheduled by the context itself.
    Timer = 1,

    /// Network events: decoded TLVs from peer APs.
    Network = 2,

    /// Driver events: external inputs from the Wi-Fi MAC layer.
    Driver = 3,
}

/// All possible inputs to a steering context.
///
/// Events are **passive data** - they describe something that happened.
/// The state machine processes events and returns actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // ═══════════════════════════════════════════════════════════════════════
    // Driver callbacks (priority: Driver)
    // ═══════════════════════════════════════════════════════════════════════
    /// A client completed association with the local BSS.
    Associated {
        sta: MacAddr,
        /// Signal at association time, in dBm (negative).
        rssi: i32,
        /// Whether the client advertises 802.11v BSS Transition Management.
        bss_transition: bool,
    },

    /// A locally associated client disassociated or deauthenticated.
    Disassociated { sta: MacAddr },

    /// A probe request was heard from a client.
    ProbeRequest {
        sta: MacAddr,
        /// BSSID the probe was directed at (may not be ours).
        bssid: MacAddr,
        /// Signal of the probe, in dBm (negative).
        rssi: i32,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Peer messages (priority: Network)
    // ═══════════════════════════════════════════════════════════════════════
    /// A peer AP flooded its score for a client.
    ScoreReceived {
        client: MacAddr,
        /// BSSID of the sending AP.
        bssid: MacAddr,
        score: Score,
        /// Milliseconds since the sender last saw the client associate.
        assoc_msecs: u32,
    },

    /// A peer AP asked the target AP to close (blacklist/transition) a client.
    CloseClientReceived {
        client: MacAddr,
        /// BSSID of the sending AP (where the client should end up).
        bssid: MacAddr,
        /// BSSID the request is addressed to.
        target: MacAddr,
        /// Operating channel of the sending AP, for BSS Transition hints.
        channel: u8,
    },

    /// A peer AP confirmed it has closed a client.
    ClosedClientReceived {
        client: MacAddr,
        /// BSSID of the acknowledging AP.
        bssid: MacAddr,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Timers (priority: Timer)
    // ═══════════════════════════════════════════════════════════════════════
    /// Periodic score flood tick for an associated client.
    FloodTick { client: MacAddr },

    /// The Rejecting/Rejected wait expired for a client.
    StateTimeout { client: MacAddr },

    /// No probe was heard from a non-associated client for too long.
    ProbeTimeout { client: MacAddr },

    /// Periodic sweep of stale idle entries.
    SweepTick,
}

impl Event {
    /// Get the priority for this event type.
    ///
    /// Events at the same timestamp are processed in priority order.
    pub fn priority(&self) -> EventPriority {
        match self {
            Event::FloodTick { .. }
            | Event::StateTimeout { .. }
            | Event::ProbeTimeout { .. }
            | Event::SweepTick => EventPriority::Timer,

            Event::ScoreReceived { .. }
            | Event::CloseClientReceived { .. }
            | Event::ClosedClientReceived { .. } => EventPriority::Network,

            Event::Associated { .. } | Event::Disassociated { .. } | Event::ProbeRequest { .. } => {
                EventPriority::Driver
            }
        }
    }

    /// Get the event type name for logging and telemetry.
    pub fn type_name(&self) -> &'static str {
        match self {
            Event::Associated { .. } => "Associated",
            Event::Disassociated { .. } => "Disassociated",
            Event::ProbeRequest { .. } => "ProbeRequest",
            Event::ScoreReceived { .. } => "ScoreReceived",
            Event::CloseClientReceived { .. } => "CloseClientReceived",
            Event::ClosedClientReceived { .. } => "ClosedClientReceived",
            Event::FloodTick { .. } => "FloodTick",
            Event::StateTimeout { .. } => "StateTimeout",
            Event::ProbeTimeout { .. } => "ProbeTimeout",
            Event::SweepTick => "SweepTick",
        }
    }
}
