//! The steering node: one AP's runnable steering context.
//!
//! [`SteeringNode`] wraps the deterministic [`SteeringState`] and executes
//! its actions: peer messages are encoded and unicast to every configured
//! peer (never to ourselves), blacklist/disassociation requests go through
//! the [`SteeringActuator`] trait, and timer operations are buffered as
//! [`TimerOp`]s for whatever scheduler is driving the node — the
//! deterministic simulation harness or the host AP's event loop.
//!
//! [`SteeringState`]: netsteer_steering::SteeringState

mod actuator;
mod config;
mod node;

pub use actuator::{ActuatorError, SteeringActuator};
pub use config::NodeConfig;
pub use node::{SteeringNode, StepOutput, TimerOp};
