//! Deterministic multi-AP simulation.
//!
//! [`SteeringHarness`] runs a mobility domain of steering nodes over the
//! in-memory LAN with a single deterministically ordered event queue.
//! Driver events (probes, associations) are injected by tests; frames,
//! timers, and actuator feedback flow through the same queue, so a given
//! seed replays the exact same run — the property that makes protocol
//! regressions reproducible.

mod actuator;
mod event_queue;
mod harness;

pub use actuator::{ActuatorCall, RecordingActuator};
pub use event_queue::EventKey;
pub use harness::{HarnessConfig, HarnessStats, SteeringHarness};

/// Index of an AP within the simulated mobility domain.
pub type ApIndex = u32;
