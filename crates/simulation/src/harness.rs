//! The deterministic multi-AP harness.

use crate::actuator::{ActuatorCall, RecordingActuator};
use crate::event_queue::EventKey;
use crate::ApIndex;
use netsteer_core::{Event, EventPriority, TimerId};
use netsteer_network_memory::{DeliveryVerdict, LanConfig, LanEndpoint, SimulatedLan};
use netsteer_node::{NodeConfig, SteeringNode, StepOutput, TimerOp};
use netsteer_steering::ClientState;
use netsteer_types::{MacAddr, SteeringMode};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, trace};

type SimNode = SteeringNode<LanEndpoint, RecordingActuator>;

/// Configuration for a simulated mobility domain.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Number of APs. Every AP peers with every other.
    pub num_aps: u32,
    /// Steering mode for all APs.
    pub mode: SteeringMode,
    /// Wired medium characteristics.
    pub lan: LanConfig,
    /// Convert a node's raw `Disassociate` actuator call into the
    /// matching driver event after `disassociate_delay`, as a compliant
    /// client would experience it.
    pub auto_disassociate: bool,
    pub disassociate_delay: Duration,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            num_aps: 2,
            mode: SteeringMode::Force,
            lan: LanConfig::default(),
            auto_disassociate: true,
            disassociate_delay: Duration::from_millis(20),
        }
    }
}

/// Statistics collected during a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HarnessStats {
    /// Inputs processed, total and per priority class.
    pub events_processed: u64,
    pub events_by_priority: [u64; 4],
    /// Frames scheduled for delivery.
    pub frames_sent: u64,
    /// Frames dropped by partitions.
    pub frames_dropped_partition: u64,
    /// Frames dropped by random loss.
    pub frames_dropped_loss: u64,
    /// Timers armed / cancelled (effective operations only).
    pub timers_set: u64,
    pub timers_cancelled: u64,
}

impl HarnessStats {
    pub fn frames_dropped(&self) -> u64 {
        self.frames_dropped_partition + self.frames_dropped_loss
    }
}

/// A queued input for one AP.
#[derive(Debug, Clone)]
enum QueuedInput {
    Event(Event),
    Frame { src: MacAddr, bytes: Vec<u8> },
    Timer(TimerId),
}

impl QueuedInput {
    fn priority(&self) -> EventPriority {
        match self {
            QueuedInput::Event(event) => event.priority(),
            QueuedInput::Frame { .. } => EventPriority::Network,
            QueuedInput::Timer(_) => EventPriority::Timer,
        }
    }
}

/// Deterministic simulation of a mobility domain.
///
/// Every AP peers with every other over the in-memory LAN. Given the same
/// configuration, seed, and injected driver events, a run is bit-for-bit
/// reproducible.
pub struct SteeringHarness {
    config: HarnessConfig,
    nodes: Vec<SimNode>,
    actuator_logs: Vec<Arc<Mutex<Vec<ActuatorCall>>>>,
    log_cursors: Vec<usize>,
    lan: SimulatedLan,
    queue: BTreeMap<EventKey, QueuedInput>,
    timers: HashMap<(ApIndex, TimerId), EventKey>,
    sequence: u64,
    now: Duration,
    rng: ChaCha8Rng,
    stats: HarnessStats,
    index_of: HashMap<MacAddr, ApIndex>,
}

impl SteeringHarness {
    /// Transport/BSSID address of the AP at `index`.
    pub fn ap_mac(index: ApIndex) -> MacAddr {
        assert!(index < 250, "mobility domains this large are not simulated");
        MacAddr::new([0x02, 0, 0, 0, 0, index as u8 + 1])
    }

    /// Operating channel of the AP at `index`.
    pub fn ap_channel(index: ApIndex) -> u8 {
        index as u8 + 1
    }

    pub fn new(config: HarnessConfig, seed: u64) -> Self {
        let mut lan = SimulatedLan::new(config.lan.clone());
        let peers: Vec<MacAddr> = (0..config.num_aps).map(Self::ap_mac).collect();

        let mut nodes = Vec::with_capacity(config.num_aps as usize);
        let mut actuator_logs = Vec::with_capacity(config.num_aps as usize);
        let mut index_of = HashMap::new();

        for index in 0..config.num_aps {
            let addr = Self::ap_mac(index);
            index_of.insert(addr, index);

            let actuator = RecordingActuator::new();
            actuator_logs.push(actuator.log());

            let node_config = NodeConfig {
                bridge_ifname: "sim0".into(),
                local_bssid: addr,
                own_addr: addr,
                channel: Self::ap_channel(index),
                mode: config.mode,
                peers: peers.clone(),
            };
            nodes.push(SteeringNode::new(&node_config, lan.endpoint(addr), actuator));
        }

        let mut harness = Self {
            log_cursors: vec![0; config.num_aps as usize],
            rng: ChaCha8Rng::seed_from_u64(seed),
            config,
            nodes,
            actuator_logs,
            lan,
            queue: BTreeMap::new(),
            timers: HashMap::new(),
            sequence: 0,
            now: Duration::ZERO,
            stats: HarnessStats::default(),
            index_of,
        };

        for index in 0..harness.nodes.len() as ApIndex {
            let output = harness.nodes[index as usize].start();
            harness.process_output(index, output);
        }

        info!(
            num_aps = harness.nodes.len(),
            mode = %harness.config.mode,
            seed,
            "created steering harness"
        );
        harness
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Accessors
    // ═══════════════════════════════════════════════════════════════════════

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn stats(&self) -> &HarnessStats {
        &self.stats
    }

    pub fn node(&self, ap: ApIndex) -> &SimNode {
        &self.nodes[ap as usize]
    }

    /// Automaton state of a client on one AP, if tracked there.
    pub fn client_state(&self, ap: ApIndex, sta: MacAddr) -> Option<ClientState> {
        self.nodes[ap as usize].state().client_state(&sta)
    }

    /// Snapshot of all actuator calls one AP has made.
    pub fn actuator_calls(&self, ap: ApIndex) -> Vec<ActuatorCall> {
        self.actuator_logs[ap as usize]
            .lock()
            .expect("actuator log poisoned")
            .clone()
    }

    /// The medium, for partition control.
    pub fn lan_mut(&mut self) -> &mut SimulatedLan {
        &mut self.lan
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Driver event injection
    // ═══════════════════════════════════════════════════════════════════════

    /// Schedule an event for one AP after `delay`.
    pub fn schedule(&mut self, ap: ApIndex, delay: Duration, event: Event) {
        self.push(ap, self.now + delay, QueuedInput::Event(event));
    }

    /// The client associates with `ap` now.
    pub fn associate(&mut self, ap: ApIndex, sta: MacAddr, rssi: i32, bss_transition: bool) {
        self.schedule(
            ap,
            Duration::ZERO,
            Event::Associated {
                sta,
                rssi,
                bss_transition,
            },
        );
    }

    /// The client disassociates from `ap` now.
    pub fn disassociate(&mut self, ap: ApIndex, sta: MacAddr) {
        self.schedule(ap, Duration::ZERO, Event::Disassociated { sta });
    }

    /// `ap` hears a probe from the client directed at `target`.
    pub fn probe(&mut self, ap: ApIndex, sta: MacAddr, target: MacAddr, rssi: i32) {
        self.schedule(
            ap,
            Duration::ZERO,
            Event::ProbeRequest {
                sta,
                bssid: target,
                rssi,
            },
        );
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Run loop
    // ═══════════════════════════════════════════════════════════════════════

    /// Process all queued inputs due at or before `deadline`.
    pub fn run_until(&mut self, deadline: Duration) {
        while let Some((&key, _)) = self.queue.first_key_value() {
            if key.time > deadline {
                break;
            }
            let input = self.queue.remove(&key).expect("key just observed");
            self.now = key.time;

            // A firing timer is no longer armed.
            if let QueuedInput::Timer(id) = &input {
                if self.timers.get(&(key.ap, *id)) == Some(&key) {
                    self.timers.remove(&(key.ap, *id));
                }
            }

            self.stats.events_processed += 1;
            self.stats.events_by_priority[input.priority() as usize] += 1;

            let node = &mut self.nodes[key.ap as usize];
            node.set_time(key.time);
            let output = match input {
                QueuedInput::Event(event) => node.handle_event(event),
                QueuedInput::Frame { src, bytes } => node.handle_frame(src, &bytes),
                QueuedInput::Timer(id) => node.handle_event(id.fire_event()),
            };

            self.process_output(key.ap, output);
            self.route_outbound(key.ap);
            self.drain_actuator_log(key.ap);
        }
        self.now = deadline;
    }

    fn push(&mut self, ap: ApIndex, time: Duration, input: QueuedInput) -> EventKey {
        let key = EventKey {
            time,
            priority: input.priority(),
            ap,
            sequence: self.sequence,
        };
        self.sequence += 1;
        self.queue.insert(key, input);
        key
    }

    fn process_output(&mut self, ap: ApIndex, output: StepOutput) {
        for op in output.timer_ops {
            match op {
                TimerOp::Set { id, duration } => {
                    // Re-arming replaces the outstanding timer.
                    if let Some(old) = self.timers.remove(&(ap, id)) {
                        self.queue.remove(&old);
                    }
                    let key = self.push(ap, self.now + duration, QueuedInput::Timer(id));
                    self.timers.insert((ap, id), key);
                    self.stats.timers_set += 1;
                }
                TimerOp::Cancel { id } => {
                    if let Some(old) = self.timers.remove(&(ap, id)) {
                        self.queue.remove(&old);
                        self.stats.timers_cancelled += 1;
                    }
                }
            }
        }
    }

    /// Route everything the AP just sent onto the medium.
    fn route_outbound(&mut self, ap: ApIndex) {
        let addr = Self::ap_mac(ap);
        for frame in self.lan.drain(&addr) {
            let Some(&dst_ap) = self.index_of.get(&frame.dst) else {
                trace!(dst = %frame.dst, "frame to unknown endpoint dropped");
                continue;
            };
            match self.lan.route(&frame.src, &frame.dst, &mut self.rng) {
                DeliveryVerdict::Deliver(latency) => {
                    self.stats.frames_sent += 1;
                    self.push(
                        dst_ap,
                        self.now + latency,
                        QueuedInput::Frame {
                            src: frame.src,
                            bytes: frame.bytes,
                        },
                    );
                }
                DeliveryVerdict::DropPartition => {
                    self.stats.frames_dropped_partition += 1;
                }
                DeliveryVerdict::DropLoss => {
                    self.stats.frames_dropped_loss += 1;
                }
            }
        }
    }

    /// Feed new actuator calls back into the simulation.
    fn drain_actuator_log(&mut self, ap: ApIndex) {
        let new_calls: Vec<ActuatorCall> = {
            let log = self.actuator_logs[ap as usize]
                .lock()
                .expect("actuator log poisoned");
            let cursor = &mut self.log_cursors[ap as usize];
            let calls = log[*cursor..].to_vec();
            *cursor = log.len();
            calls
        };

        for call in new_calls {
            if let ActuatorCall::Disassociate(sta) = call {
                if self.config.auto_disassociate {
                    // A deauthenticated client leaves; the driver reports
                    // it shortly after.
                    let delay = self.config.disassociate_delay;
                    self.schedule(ap, delay, Event::Disassociated { sta });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const K: MacAddr = MacAddr::new([0x0a, 0, 0, 0, 0, 1]);

    #[test]
    fn test_harness_arms_sweep_timers_at_startup() {
        let harness = SteeringHarness::new(HarnessConfig::default(), 1);
        assert_eq!(harness.stats().timers_set, 2);
    }

    #[test]
    fn test_association_flood_reaches_peer() {
        let mut harness = SteeringHarness::new(HarnessConfig::default(), 1);
        harness.associate(0, K, -40, false);
        harness.run_until(Duration::from_millis(100));

        // The immediate score flood created an entry on the peer.
        assert!(harness.node(1).state().client(&K).is_some());
        assert!(harness.stats().frames_sent >= 1);
    }

    #[test]
    fn test_disabled_mode_produces_no_traffic() {
        let mut harness = SteeringHarness::new(
            HarnessConfig {
                mode: SteeringMode::Off,
                ..HarnessConfig::default()
            },
            1,
        );
        harness.associate(0, K, -40, false);
        harness.run_until(Duration::from_secs(5));
        assert_eq!(harness.stats().frames_sent, 0);
        assert_eq!(harness.stats().timers_set, 0);
    }

    #[test]
    fn test_flood_cadence_is_periodic() {
        let mut harness = SteeringHarness::new(HarnessConfig::default(), 1);
        harness.associate(0, K, -40, false);
        harness.run_until(Duration::from_millis(4_500));

        // Initial flood plus one per second.
        assert_eq!(harness.stats().frames_sent, 5);
    }

    #[test]
    fn test_partition_drops_are_counted() {
        let mut harness = SteeringHarness::new(HarnessConfig::default(), 1);
        harness
            .lan_mut()
            .partition(SteeringHarness::ap_mac(0), SteeringHarness::ap_mac(1));
        harness.associate(0, K, -40, false);
        harness.run_until(Duration::from_millis(2_500));

        assert_eq!(harness.stats().frames_sent, 0);
        assert!(harness.stats().frames_dropped_partition >= 1);
        assert!(harness.node(1).state().client(&K).is_none());
    }
}
