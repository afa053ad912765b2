//! Deterministic in-memory L2 medium.
//!
//! [`SimulatedLan`] stands in for the wired distribution medium between
//! APs: per-endpoint outboxes collect frames as nodes send them, and the
//! harness routes each frame with configurable latency, jitter, loss, and
//! directional partitions. All randomness comes from the caller's seeded
//! RNG, so identical seeds replay identical runs.

mod lan;

pub use lan::{DeliveryVerdict, LanConfig, LanEndpoint, OutboundFrame, SimulatedLan};
