//! Timer identification for the steering timer fabric.

use crate::Event;
use netsteer_types::MacAddr;

/// Identification for scheduled timers.
///
/// The three per-client timers are keyed by the client MAC rather than by
/// any reference into registry storage; timer callbacks look the client up
/// again and tolerate absence. Runners map set/cancel requests onto their
/// own scheduling mechanism (a deterministic event queue in simulation, the
/// host event loop in production).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerId {
    /// Periodic score flood for an associated client (1 s).
    Flood(MacAddr),
    /// Bounded wait in Rejecting/Rejected (10 s).
    StateTimeout(MacAddr),
    /// Probe-loss detection for a non-associated client (34 s).
    ProbeLoss(MacAddr),
    /// Context-level sweep of stale idle entries.
    Sweep,
}

impl TimerId {
    /// The event delivered when this timer fires.
    pub fn fire_event(&self) -> Event {
        match *self {
            TimerId::Flood(client) => Event::FloodTick { client },
            TimerId::StateTimeout(client) => Event::StateTimeout { client },
            TimerId::ProbeLoss(client) => Event::ProbeTimeout { client },
            TimerId::Sweep => Event::SweepTick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fire_event_targets_same_client() {
        let mac = MacAddr::new([0xde, 0xad, 0xbe, 0xef, 0, 1]);
        assert_eq!(
            TimerId::Flood(mac).fire_event(),
            Event::FloodTick { client: mac }
        );
        assert_eq!(
            TimerId::StateTimeout(mac).fire_event(),
            Event::StateTimeout { client: mac }
        );
        assert_eq!(
            TimerId::ProbeLoss(mac).fire_event(),
            Event::ProbeTimeout { client: mac }
        );
        assert_eq!(TimerId::Sweep.fire_event(), Event::SweepTick);
    }
}
