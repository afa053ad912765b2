//! Steering context configuration.

use netsteer_types::{MacAddr, SteeringMode};
use std::time::Duration;

/// Configuration for one steering context.
///
/// The timer durations default to the protocol's standard cadence; tests
/// shrink them to keep simulated runs short.
#[derive(Debug, Clone)]
pub struct SteeringConfig {
    /// BSSID of the local BSS.
    pub local_bssid: MacAddr,
    /// Current operating channel, advertised in CLOSE_CLIENT TLVs.
    pub channel: u8,
    /// How aggressively to steer.
    pub mode: SteeringMode,

    /// Period of the per-client score flood while associated.
    pub flood_interval: Duration,
    /// How long to hold Rejecting/Rejected before giving up on the peer.
    pub reject_timeout: Duration,
    /// How long without a probe before a non-associated client's score is
    /// considered lost.
    pub probe_timeout: Duration,

    /// Period of the stale-entry sweep.
    pub sweep_interval: Duration,
    /// How long an idle, scoreless entry may linger before the sweep
    /// removes it.
    pub idle_entry_ttl: Duration,
}

impl SteeringConfig {
    /// Create a config with the standard protocol cadence.
    pub fn new(local_bssid: MacAddr, channel: u8, mode: SteeringMode) -> Self {
        Self {
            local_bssid,
            channel,
            mode,
            flood_interval: Duration::from_secs(1),
            reject_timeout: Duration::from_secs(10),
            probe_timeout: Duration::from_secs(34),
            sweep_interval: Duration::from_secs(60),
            idle_entry_ttl: Duration::from_secs(120),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_cadence() {
        let cfg = SteeringConfig::new(MacAddr::ZERO, 1, SteeringMode::Force);
        assert_eq!(cfg.flood_interval, Duration::from_secs(1));
        assert_eq!(cfg.reject_timeout, Duration::from_secs(10));
        assert_eq!(cfg.probe_timeout, Duration::from_secs(34));
    }
}
