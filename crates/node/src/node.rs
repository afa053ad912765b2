//! Action execution around the steering state machine.

use crate::actuator::SteeringActuator;
use crate::config::NodeConfig;
use netsteer_core::{Action, Event, PeerMessage, StateMachine, TimerId};
use netsteer_network::{decode_frame, FrameWriter, L2Transport};
use netsteer_steering::SteeringState;
use netsteer_types::MacAddr;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// A timer operation buffered for the scheduler driving this node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOp {
    /// Arm a timer to fire after `duration`. Replaces an armed timer with
    /// the same id.
    Set { id: TimerId, duration: Duration },
    /// Cancel a timer. Idempotent.
    Cancel { id: TimerId },
}

/// Output from processing one input via the node.
///
/// Frames and actuator calls have already been executed through their
/// traits; only timer scheduling is left to the caller, because the node
/// does not own a clock.
#[derive(Debug, Default)]
pub struct StepOutput {
    /// Timer operations to apply, in order.
    pub timer_ops: Vec<TimerOp>,
    /// Number of actions the state machine generated.
    pub actions_generated: usize,
}

impl StepOutput {
    fn merge(&mut self, mut other: StepOutput) {
        self.timer_ops.append(&mut other.timer_ops);
        self.actions_generated += other.actions_generated;
    }
}

/// One AP's runnable steering context.
///
/// Owns the deterministic state machine plus the I/O it needs: a frame
/// writer with the wrapping serial counter, the L2 transport, and the
/// driver actuator. A node configured off (or with no peers) constructs
/// successfully and stays inert.
pub struct SteeringNode<T: L2Transport, A: SteeringActuator> {
    state: SteeringState,
    writer: FrameWriter,
    transport: T,
    actuator: A,
    peers: Vec<MacAddr>,
    own_addr: MacAddr,
    enabled: bool,
}

impl<T: L2Transport, A: SteeringActuator> SteeringNode<T, A> {
    pub fn new(config: &NodeConfig, transport: T, actuator: A) -> Self {
        let enabled = config.is_enabled();
        if enabled {
            info!(
                bridge = %config.bridge_ifname,
                own_addr = %config.own_addr,
                bssid = %config.local_bssid,
                mode = %config.mode,
                peers = config.peers.len(),
                "steering ready"
            );
        } else {
            info!(bssid = %config.local_bssid, "steering disabled");
        }

        Self {
            state: SteeringState::new(config.steering()),
            writer: FrameWriter::new(),
            transport,
            actuator,
            peers: config.peers.clone(),
            own_addr: config.own_addr,
            enabled,
        }
    }

    /// Whether this node processes events at all.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The deterministic state machine, for inspection.
    pub fn state(&self) -> &SteeringState {
        &self.state
    }

    /// Inject the current time before delivering events.
    pub fn set_time(&mut self, now: Duration) {
        self.state.set_time(now);
    }

    /// Bring the context up (arms the stale-entry sweep).
    pub fn start(&mut self) -> StepOutput {
        if !self.enabled {
            return StepOutput::default();
        }
        let actions = self.state.startup_actions();
        self.execute(actions)
    }

    /// Tear the context down: cancel all timers, release all entries.
    pub fn shutdown(&mut self) -> StepOutput {
        let actions = self.state.teardown();
        self.execute(actions)
    }

    /// Deliver one event to the state machine and execute its actions.
    pub fn handle_event(&mut self, event: Event) -> StepOutput {
        if !self.enabled {
            return StepOutput::default();
        }
        trace!(event = event.type_name(), "dispatch");
        let actions = self.state.handle(event);
        self.execute(actions)
    }

    /// Deliver a raw frame from the L2 medium.
    ///
    /// Parse failures drop the frame with a debug log and no side effects.
    pub fn handle_frame(&mut self, src: MacAddr, buf: &[u8]) -> StepOutput {
        if !self.enabled {
            return StepOutput::default();
        }
        let frame = match decode_frame(buf) {
            Ok(frame) => frame,
            Err(error) => {
                debug!(%src, %error, len = buf.len(), "dropping frame");
                return StepOutput::default();
            }
        };

        trace!(%src, serial = frame.serial, tlvs = frame.messages.len(), "frame received");
        let mut output = StepOutput::default();
        for message in &frame.messages {
            output.merge(self.handle_event(message.to_received_event()));
        }
        output
    }

    fn execute(&mut self, actions: Vec<Action>) -> StepOutput {
        let mut output = StepOutput {
            actions_generated: actions.len(),
            ..StepOutput::default()
        };

        for action in actions {
            match action {
                Action::Broadcast(message) => self.flood(&message),
                Action::SetTimer { id, duration } => {
                    output.timer_ops.push(TimerOp::Set { id, duration });
                }
                Action::CancelTimer { id } => {
                    output.timer_ops.push(TimerOp::Cancel { id });
                }
                Action::BlacklistAdd { sta } => {
                    info!(client = %sta, "blacklist add");
                    if let Err(error) = self.actuator.blacklist_add(sta) {
                        warn!(client = %sta, %error, "blacklist add failed");
                    }
                }
                Action::BlacklistRemove { sta } => {
                    info!(client = %sta, "blacklist remove");
                    if let Err(error) = self.actuator.blacklist_remove(sta) {
                        warn!(client = %sta, %error, "blacklist remove failed");
                    }
                }
                Action::Disassociate { sta } => {
                    info!(client = %sta, "disassociate");
                    if let Err(error) = self.actuator.disassociate(sta) {
                        warn!(client = %sta, %error, "disassociate failed");
                    }
                }
                Action::BssTransitionRequest {
                    sta,
                    target,
                    channel,
                } => {
                    info!(client = %sta, %target, channel, "bss transition request");
                    if let Err(error) =
                        self.actuator.bss_transition_request(sta, target, channel, 0)
                    {
                        warn!(client = %sta, %error, "bss transition request failed");
                    }
                }
            }
        }
        output
    }

    /// Encode a message into a fresh frame and unicast it to every peer
    /// except ourselves.
    fn flood(&mut self, message: &PeerMessage) {
        let frame = match self.writer.encode(std::slice::from_ref(message)) {
            Ok(frame) => frame,
            Err(error) => {
                warn!(%error, kind = message.type_name(), "failed to encode frame");
                return;
            }
        };

        debug!(
            kind = message.type_name(),
            client = %message.client(),
            "flooding to peers"
        );
        for dst in &self.peers {
            if *dst == self.own_addr {
                continue;
            }
            if let Err(error) = self.transport.send(*dst, &frame) {
                warn!(%dst, %error, "send failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::ActuatorError;
    use netsteer_network::{encode_frame, TransportError};
    use netsteer_steering::ClientState;
    use netsteer_types::{Score, SteeringMode};
    use std::cell::RefCell;
    use std::rc::Rc;

    const AP_A: MacAddr = MacAddr::new([0x02, 0, 0, 0, 0, 1]);
    const AP_B: MacAddr = MacAddr::new([0x02, 0, 0, 0, 0, 2]);
    const AP_C: MacAddr = MacAddr::new([0x02, 0, 0, 0, 0, 3]);
    const K: MacAddr = MacAddr::new([0x0a, 0, 0, 0, 0, 1]);

    #[derive(Clone, Default)]
    struct FakeTransport {
        sent: Rc<RefCell<Vec<(MacAddr, Vec<u8>)>>>,
    }

    impl L2Transport for FakeTransport {
        fn send(&self, dst: MacAddr, frame: &[u8]) -> Result<(), TransportError> {
            self.sent.borrow_mut().push((dst, frame.to_vec()));
            Ok(())
        }
    }

    #[derive(Default)]
    struct NullActuator;

    impl SteeringActuator for NullActuator {
        fn blacklist_add(&mut self, _: MacAddr) -> Result<(), ActuatorError> {
            Ok(())
        }
        fn blacklist_remove(&mut self, _: MacAddr) -> Result<(), ActuatorError> {
            Ok(())
        }
        fn disassociate(&mut self, _: MacAddr) -> Result<(), ActuatorError> {
            Ok(())
        }
        fn bss_transition_request(
            &mut self,
            _: MacAddr,
            _: MacAddr,
            _: u8,
            _: u16,
        ) -> Result<(), ActuatorError> {
            Ok(())
        }
    }

    /// Fails every call, to exercise the warn-and-continue path.
    struct FailingActuator;

    impl SteeringActuator for FailingActuator {
        fn blacklist_add(&mut self, _: MacAddr) -> Result<(), ActuatorError> {
            Err(ActuatorError("nope".into()))
        }
        fn blacklist_remove(&mut self, _: MacAddr) -> Result<(), ActuatorError> {
            Err(ActuatorError("nope".into()))
        }
        fn disassociate(&mut self, _: MacAddr) -> Result<(), ActuatorError> {
            Err(ActuatorError("nope".into()))
        }
        fn bss_transition_request(
            &mut self,
            _: MacAddr,
            _: MacAddr,
            _: u8,
            _: u16,
        ) -> Result<(), ActuatorError> {
            Err(ActuatorError("nope".into()))
        }
    }

    fn node_config(mode: SteeringMode, peers: Vec<MacAddr>) -> NodeConfig {
        NodeConfig {
            bridge_ifname: "br0".into(),
            local_bssid: AP_A,
            own_addr: AP_A,
            channel: 6,
            mode,
            peers,
        }
    }

    #[test]
    fn test_flood_skips_own_address() {
        let transport = FakeTransport::default();
        let config = node_config(SteeringMode::Force, vec![AP_A, AP_B, AP_C]);
        let mut node = SteeringNode::new(&config, transport.clone(), NullActuator);

        node.set_time(Duration::from_secs(1));
        node.handle_event(Event::Associated {
            sta: K,
            rssi: -40,
            bss_transition: false,
        });

        let sent = transport.sent.borrow();
        let destinations: Vec<MacAddr> = sent.iter().map(|(dst, _)| *dst).collect();
        assert_eq!(destinations, vec![AP_B, AP_C]);
    }

    #[test]
    fn test_frames_carry_incrementing_serials() {
        let transport = FakeTransport::default();
        let config = node_config(SteeringMode::Force, vec![AP_B]);
        let mut node = SteeringNode::new(&config, transport.clone(), NullActuator);

        node.set_time(Duration::from_secs(1));
        node.handle_event(Event::Associated {
            sta: K,
            rssi: -40,
            bss_transition: false,
        });
        node.set_time(Duration::from_secs(2));
        node.handle_event(Event::FloodTick { client: K });

        let sent = transport.sent.borrow();
        assert_eq!(sent.len(), 2);
        let serials: Vec<u16> = sent
            .iter()
            .map(|(_, frame)| decode_frame(frame).unwrap().serial)
            .collect();
        assert_eq!(serials, vec![0, 1]);
    }

    #[test]
    fn test_off_mode_is_inert() {
        let transport = FakeTransport::default();
        let config = node_config(SteeringMode::Off, vec![AP_B]);
        let mut node = SteeringNode::new(&config, transport.clone(), NullActuator);

        assert!(!node.is_enabled());
        let output = node.start();
        assert!(output.timer_ops.is_empty());

        node.handle_event(Event::Associated {
            sta: K,
            rssi: -40,
            bss_transition: false,
        });
        assert!(transport.sent.borrow().is_empty());
        assert!(node.state().client(&K).is_none());
    }

    #[test]
    fn test_empty_peer_list_is_inert() {
        let config = node_config(SteeringMode::Force, vec![]);
        let node = SteeringNode::new(&config, FakeTransport::default(), NullActuator);
        assert!(!node.is_enabled());
    }

    #[test]
    fn test_received_frame_dispatches_tlvs() {
        let config = node_config(SteeringMode::Force, vec![AP_B]);
        let mut node = SteeringNode::new(&config, FakeTransport::default(), NullActuator);
        node.set_time(Duration::from_secs(30));

        let frame = encode_frame(
            5,
            &[PeerMessage::Score {
                client: K,
                bssid: AP_B,
                score: Score::from_raw(30),
                assoc_msecs: 1_000,
            }],
        )
        .unwrap();
        node.handle_frame(AP_B, &frame);

        let entry = node.state().client(&K).expect("score created entry");
        assert_eq!(entry.remote_bssid, Some(AP_B));
    }

    #[test]
    fn test_garbage_frame_has_no_side_effects() {
        let config = node_config(SteeringMode::Force, vec![AP_B]);
        let mut node = SteeringNode::new(&config, FakeTransport::default(), NullActuator);

        let output = node.handle_frame(AP_B, &[0xff, 0x01, 0x00, 0x00]);
        assert_eq!(output.actions_generated, 0);
        assert!(node.state().clients().is_empty());
    }

    #[test]
    fn test_actuator_failure_does_not_wedge_the_automaton() {
        let config = node_config(SteeringMode::Force, vec![AP_B]);
        let mut node = SteeringNode::new(&config, FakeTransport::default(), FailingActuator);
        node.set_time(Duration::from_secs(1));

        // Probe then a better peer score: Idle → Rejected with a
        // blacklist add that fails.
        node.handle_event(Event::ProbeRequest {
            sta: K,
            bssid: AP_A,
            rssi: -40,
        });
        node.set_time(Duration::from_secs(31));
        node.handle_event(Event::ScoreReceived {
            client: K,
            bssid: AP_B,
            score: Score::from_raw(30),
            assoc_msecs: 1_000,
        });

        assert_eq!(node.state().client_state(&K), Some(ClientState::Rejected));
    }

    #[test]
    fn test_start_and_shutdown_manage_timers() {
        let config = node_config(SteeringMode::Force, vec![AP_B]);
        let mut node = SteeringNode::new(&config, FakeTransport::default(), NullActuator);

        let output = node.start();
        assert!(matches!(
            output.timer_ops.as_slice(),
            [TimerOp::Set {
                id: TimerId::Sweep,
                ..
            }]
        ));

        node.set_time(Duration::from_secs(1));
        node.handle_event(Event::Associated {
            sta: K,
            rssi: -40,
            bss_transition: false,
        });

        let output = node.shutdown();
        assert!(output
            .timer_ops
            .iter()
            .all(|op| matches!(op, TimerOp::Cancel { .. })));
        assert!(output
            .timer_ops
            .contains(&TimerOp::Cancel { id: TimerId::Sweep }));
        assert!(output
            .timer_ops
            .contains(&TimerOp::Cancel {
                id: TimerId::Flood(K)
            }));
        assert!(node.state().clients().is_empty());
    }
}
