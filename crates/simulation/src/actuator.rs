//! Recording actuator for simulated APs.

use netsteer_node::{ActuatorError, SteeringActuator};
use netsteer_types::MacAddr;
use std::sync::{Arc, Mutex};

/// One recorded actuator invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCall {
    BlacklistAdd(MacAddr),
    BlacklistRemove(MacAddr),
    Disassociate(MacAddr),
    BssTransitionRequest {
        sta: MacAddr,
        target: MacAddr,
        channel: u8,
        timeout: u16,
    },
}

/// Actuator that records every call instead of touching a driver.
///
/// The harness holds a clone of the log: it asserts on it in scenario
/// tests and converts `Disassociate` calls back into driver events when
/// auto-disassociation is enabled.
#[derive(Debug, Clone, Default)]
pub struct RecordingActuator {
    log: Arc<Mutex<Vec<ActuatorCall>>>,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the call log.
    pub fn log(&self) -> Arc<Mutex<Vec<ActuatorCall>>> {
        self.log.clone()
    }

    /// Snapshot of all calls so far.
    pub fn calls(&self) -> Vec<ActuatorCall> {
        self.log.lock().expect("actuator log poisoned").clone()
    }

    fn record(&mut self, call: ActuatorCall) -> Result<(), ActuatorError> {
        self.log.lock().expect("actuator log poisoned").push(call);
        Ok(())
    }
}

impl SteeringActuator for RecordingActuator {
    fn blacklist_add(&mut self, sta: MacAddr) -> Result<(), ActuatorError> {
        self.record(ActuatorCall::BlacklistAdd(sta))
    }

    fn blacklist_remove(&mut self, sta: MacAddr) -> Result<(), ActuatorError> {
        self.record(ActuatorCall::BlacklistRemove(sta))
    }

    fn disassociate(&mut self, sta: MacAddr) -> Result<(), ActuatorError> {
        self.record(ActuatorCall::Disassociate(sta))
    }

    fn bss_transition_request(
        &mut self,
        sta: MacAddr,
        target: MacAddr,
        channel: u8,
        timeout: u16,
    ) -> Result<(), ActuatorError> {
        self.record(ActuatorCall::BssTransitionRequest {
            sta,
            target,
            channel,
            timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let mut actuator = RecordingActuator::new();
        let sta = MacAddr::new([0x0a, 0, 0, 0, 0, 1]);

        actuator.blacklist_add(sta).unwrap();
        actuator.disassociate(sta).unwrap();
        actuator.blacklist_remove(sta).unwrap();

        assert_eq!(
            actuator.calls(),
            vec![
                ActuatorCall::BlacklistAdd(sta),
                ActuatorCall::Disassociate(sta),
                ActuatorCall::BlacklistRemove(sta),
            ]
        );
    }
}
