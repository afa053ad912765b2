//! Simulated wired medium with deterministic latency, loss, and partitions.

use netsteer_network::{L2Transport, TransportError};
use netsteer_types::MacAddr;
use rand::Rng;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::trace;

/// Configuration for the simulated medium.
#[derive(Debug, Clone)]
pub struct LanConfig {
    /// Base one-way latency between any two endpoints.
    pub latency: Duration,
    /// Jitter as a fraction of base latency (0.0 - 1.0).
    pub jitter_fraction: f64,
    /// Probability a frame is dropped (0.0 - 1.0).
    pub loss_rate: f64,
}

impl Default for LanConfig {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(2),
            jitter_fraction: 0.1,
            loss_rate: 0.0,
        }
    }
}

/// A frame captured from an endpoint's send path.
#[derive(Debug, Clone)]
pub struct OutboundFrame {
    pub src: MacAddr,
    pub dst: MacAddr,
    pub bytes: Vec<u8>,
}

/// Routing decision for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryVerdict {
    /// Deliver after the sampled one-way latency.
    Deliver(Duration),
    /// Dropped by a partition between the endpoints.
    DropPartition,
    /// Dropped by random loss.
    DropLoss,
}

type SharedOutbox = Arc<Mutex<Vec<OutboundFrame>>>;

/// One endpoint's handle onto the medium.
///
/// Implements [`L2Transport`] by pushing frames into the outbox shared
/// with the owning [`SimulatedLan`]; the harness drains the outbox after
/// each step and routes the frames.
#[derive(Clone)]
pub struct LanEndpoint {
    addr: MacAddr,
    outbox: SharedOutbox,
}

impl L2Transport for LanEndpoint {
    fn send(&self, dst: MacAddr, frame: &[u8]) -> Result<(), TransportError> {
        trace!(src = %self.addr, %dst, len = frame.len(), "lan send");
        self.outbox
            .lock()
            .map_err(|_| TransportError::Closed)?
            .push(OutboundFrame {
                src: self.addr,
                dst,
                bytes: frame.to_vec(),
            });
        Ok(())
    }
}

/// The simulated wired medium.
///
/// Partitions are directional: blocking `(a, b)` drops frames from `a` to
/// `b` only; add both directions for a full cut.
#[derive(Debug, Default)]
pub struct SimulatedLan {
    config: LanConfig,
    outboxes: BTreeMap<MacAddr, SharedOutbox>,
    partitions: HashSet<(MacAddr, MacAddr)>,
}

impl std::fmt::Debug for LanEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanEndpoint").field("addr", &self.addr).finish()
    }
}

impl SimulatedLan {
    pub fn new(config: LanConfig) -> Self {
        Self {
            config,
            outboxes: BTreeMap::new(),
            partitions: HashSet::new(),
        }
    }

    pub fn config(&self) -> &LanConfig {
        &self.config
    }

    /// Register an endpoint and hand out its transport handle.
    pub fn endpoint(&mut self, addr: MacAddr) -> LanEndpoint {
        let outbox = self
            .outboxes
            .entry(addr)
            .or_insert_with(|| Arc::new(Mutex::new(Vec::new())))
            .clone();
        LanEndpoint { addr, outbox }
    }

    /// Take all frames the endpoint queued since the last drain.
    pub fn drain(&self, addr: &MacAddr) -> Vec<OutboundFrame> {
        match self.outboxes.get(addr) {
            Some(outbox) => std::mem::take(&mut *outbox.lock().expect("lan outbox poisoned")),
            None => Vec::new(),
        }
    }

    /// Block frames from `from` to `to`.
    pub fn partition(&mut self, from: MacAddr, to: MacAddr) {
        self.partitions.insert((from, to));
    }

    /// Unblock frames from `from` to `to`.
    pub fn heal(&mut self, from: MacAddr, to: MacAddr) {
        self.partitions.remove(&(from, to));
    }

    /// Remove all partitions.
    pub fn heal_all(&mut self) {
        self.partitions.clear();
    }

    pub fn is_partitioned(&self, from: &MacAddr, to: &MacAddr) -> bool {
        self.partitions.contains(&(*from, *to))
    }

    /// Decide what happens to one frame. Draws from `rng` for loss and
    /// jitter, so the caller controls determinism.
    pub fn route<R: Rng>(&self, src: &MacAddr, dst: &MacAddr, rng: &mut R) -> DeliveryVerdict {
        if self.is_partitioned(src, dst) {
            return DeliveryVerdict::DropPartition;
        }
        if self.config.loss_rate > 0.0 && rng.gen_bool(self.config.loss_rate.clamp(0.0, 1.0)) {
            return DeliveryVerdict::DropLoss;
        }
        DeliveryVerdict::Deliver(self.sample_latency(rng))
    }

    fn sample_latency<R: Rng>(&self, rng: &mut R) -> Duration {
        if self.config.jitter_fraction <= 0.0 {
            return self.config.latency;
        }
        let spread = rng.gen::<f64>() * 2.0 - 1.0;
        let factor = (1.0 + self.config.jitter_fraction * spread).max(0.0);
        self.config.latency.mul_f64(factor)
    }
}
