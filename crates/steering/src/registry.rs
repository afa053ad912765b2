//! Client registry.
//!
//! One [`ClientEntry`] per observed client MAC. Entries are created lazily
//! on a probe directed at the local BSS, a received SCORE, or a local
//! association; CLOSE/CLOSED messages never create entries. Entries are
//! removed by the stale-entry sweep or on teardown, always after their
//! timers have been cancelled.

use crate::machine::ClientState;
use netsteer_types::{MacAddr, Score};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::time::Duration;

/// Link to the driver's STA record, present iff the client is locally
/// associated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaLink {
    /// Whether the client advertises 802.11v BSS Transition Management.
    pub bss_transition: bool,
}

/// Everything this AP knows about one client MAC.
#[derive(Debug, Clone)]
pub struct ClientEntry {
    mac: MacAddr,

    /// Automaton state. Initial = Idle.
    pub state: ClientState,

    /// Our score for the client; `Score::LOST` means stale/unknown and
    /// suppresses outbound SCORE emission.
    pub local_score: Score,

    /// BSSID currently believed to own the client, if any.
    pub remote_bssid: Option<MacAddr>,

    /// Local-clock estimate of when `remote_bssid` last saw the client
    /// associate. Arbitrates which peer has fresher information.
    pub remote_time: Duration,

    /// BSSID that last asked us to close this client.
    pub close_bssid: Option<MacAddr>,

    /// Operating channel of `close_bssid`, for BSS Transition hints.
    pub remote_channel: u8,

    /// When the client associated locally. Only meaningful while `sta` is
    /// present.
    pub association_time: Duration,

    /// Driver STA link, present iff locally associated.
    pub sta: Option<StaLink>,

    /// Last probe or peer-score activity, consulted by the sweep.
    pub last_seen: Duration,
}

impl ClientEntry {
    fn new(mac: MacAddr, now: Duration) -> Self {
        Self {
            mac,
            state: ClientState::Idle,
            local_score: Score::LOST,
            remote_bssid: None,
            remote_time: Duration::ZERO,
            close_bssid: None,
            remote_channel: 0,
            association_time: Duration::ZERO,
            sta: None,
            last_seen: now,
        }
    }

    /// The client MAC (the registry key).
    pub fn mac(&self) -> MacAddr {
        self.mac
    }

    /// Whether the client is using this AP right now.
    pub fn is_associated(&self) -> bool {
        self.sta.is_some() && self.state == ClientState::Associated
    }

    /// Whether the linked STA advertises BSS Transition Management.
    pub fn supports_bss_transition(&self) -> bool {
        self.sta.map(|s| s.bss_transition).unwrap_or(false)
    }
}

/// Mapping `client MAC → ClientEntry` for one context.
///
/// Ordered so that iteration (sweep, teardown) is deterministic.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: BTreeMap<MacAddr, ClientEntry>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, mac: &MacAddr) -> bool {
        self.clients.contains_key(mac)
    }

    pub fn find(&self, mac: &MacAddr) -> Option<&ClientEntry> {
        self.clients.get(mac)
    }

    pub fn find_mut(&mut self, mac: &MacAddr) -> Option<&mut ClientEntry> {
        self.clients.get_mut(mac)
    }

    /// Look up an entry, creating a zero-initialized one if absent.
    pub fn ensure(&mut self, mac: MacAddr, now: Duration) -> &mut ClientEntry {
        self.clients
            .entry(mac)
            .or_insert_with(|| ClientEntry::new(mac, now))
    }

    /// Unlink an entry. The caller cancels its timers first.
    pub fn remove(&mut self, mac: &MacAddr) -> Option<ClientEntry> {
        self.clients.remove(mac)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, MacAddr, ClientEntry> {
        self.clients.iter()
    }

    /// All tracked MACs, in address order.
    pub fn macs(&self) -> Vec<MacAddr> {
        self.clients.keys().copied().collect()
    }

    pub fn clear(&mut self) {
        self.clients.clear();
    }
}
