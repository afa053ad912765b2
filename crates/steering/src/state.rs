//! The steering context: registry + automaton + arbitration.
//!
//! `SteeringState` is the deterministic heart of one AP's steering. It
//! owns the client registry, converts raw inputs (driver callbacks, peer
//! TLVs, timer fires) into client-automaton events, and arbitrates which
//! AP owns each client.

use crate::config::SteeringConfig;
use crate::machine::{self, ClientEvent, ClientState};
use crate::registry::{ClientEntry, ClientRegistry, StaLink};
use netsteer_core::{Action, Event, PeerMessage, StateMachine, TimerId};
use netsteer_types::{MacAddr, Score};
use std::time::Duration;
use tracing::{debug, info, trace};

/// Counters exposed for observability and determinism assertions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SteeringStats {
    /// Client-automaton transitions actually taken.
    pub transitions: u64,
    /// Peer SCORE TLVs processed.
    pub scores_received: u64,
    /// Flood ticks whose SCORE emission was suppressed by a lost score.
    pub floods_suppressed: u64,
    /// Entries removed by the stale-entry sweep.
    pub entries_swept: u64,
}

/// Per-AP steering state machine.
///
/// Synchronous and deterministic; all I/O is returned as [`Action`]s.
#[derive(Debug)]
pub struct SteeringState {
    config: SteeringConfig,
    clients: ClientRegistry,
    now: Duration,
    stats: SteeringStats,
}

impl SteeringState {
    pub fn new(config: SteeringConfig) -> Self {
        Self {
            config,
            clients: ClientRegistry::new(),
            now: Duration::ZERO,
            stats: SteeringStats::default(),
        }
    }

    /// Actions to run when the context comes up: arms the stale-entry
    /// sweep.
    pub fn startup_actions(&self) -> Vec<Action> {
        vec![Action::SetTimer {
            id: TimerId::Sweep,
            duration: self.config.sweep_interval,
        }]
    }

    /// Cancel every timer and release every entry.
    ///
    /// Timers are cancelled before entries are released so no callback can
    /// fire against a removed client.
    pub fn teardown(&mut self) -> Vec<Action> {
        let mut actions = Vec::with_capacity(self.clients.len() * 3 + 1);
        for mac in self.clients.macs() {
            actions.push(Action::CancelTimer {
                id: TimerId::Flood(mac),
            });
            actions.push(Action::CancelTimer {
                id: TimerId::StateTimeout(mac),
            });
            actions.push(Action::CancelTimer {
                id: TimerId::ProbeLoss(mac),
            });
        }
        actions.push(Action::CancelTimer { id: TimerId::Sweep });
        self.clients.clear();
        actions
    }

    pub fn config(&self) -> &SteeringConfig {
        &self.config
    }

    pub fn stats(&self) -> SteeringStats {
        self.stats
    }

    pub fn clients(&self) -> &ClientRegistry {
        &self.clients
    }

    pub fn client(&self, mac: &MacAddr) -> Option<&ClientEntry> {
        self.clients.find(mac)
    }

    /// Automaton state for a client, if tracked.
    pub fn client_state(&self, mac: &MacAddr) -> Option<ClientState> {
        self.clients.find(mac).map(|entry| entry.state)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Driver callbacks
    // ═══════════════════════════════════════════════════════════════════════

    fn on_associated(&mut self, sta: MacAddr, rssi: i32, bss_transition: bool) -> Vec<Action> {
        let mut actions = Vec::new();
        let now = self.now;
        let config = &self.config;
        let stats = &mut self.stats;

        info!(client = %sta, rssi, bss_transition, "client associated");

        let entry = self.clients.ensure(sta, now);
        entry.remote_bssid = None;
        entry.remote_time = Duration::ZERO;
        entry.association_time = now;
        entry.local_score = Score::from_rssi(rssi);
        entry.sta = Some(StaLink { bss_transition });
        entry.last_seen = now;

        // The client is attached; probe-loss tracking stops until it
        // leaves again.
        actions.push(Action::CancelTimer {
            id: TimerId::ProbeLoss(sta),
        });

        // Announce the fresh score ahead of the regular cadence.
        emit_score(config, entry, now, stats, &mut actions);

        if machine::step(config, entry, ClientEvent::Associated, &mut actions) {
            stats.transitions += 1;
        }
        actions
    }

    fn on_disassociated(&mut self, sta: MacAddr) -> Vec<Action> {
        let mut actions = Vec::new();
        let config = &self.config;
        let stats = &mut self.stats;

        let Some(entry) = self.clients.find_mut(&sta) else {
            trace!(client = %sta, "disassociation for unknown client");
            return actions;
        };

        info!(
            client = %sta,
            remote = %entry.remote_bssid.unwrap_or(MacAddr::ZERO),
            "client disassociated"
        );

        // Dispatch the event first, then clear the link state it may have
        // consulted.
        if machine::step(config, entry, ClientEvent::Disassociated, &mut actions) {
            stats.transitions += 1;
        }
        entry.sta = None;
        entry.remote_bssid = None;
        entry.remote_time = Duration::ZERO;
        entry.association_time = Duration::ZERO;

        actions.push(Action::SetTimer {
            id: TimerId::ProbeLoss(sta),
            duration: config.probe_timeout,
        });
        actions
    }

    fn on_probe(&mut self, sta: MacAddr, bssid: MacAddr, rssi: i32) -> Vec<Action> {
        let mut actions = Vec::new();
        let now = self.now;
        let config = &self.config;
        let stats = &mut self.stats;

        // Track the client if we already know it or the probe was for us.
        if bssid != config.local_bssid && !self.clients.contains(&sta) {
            return actions;
        }
        let entry = self.clients.ensure(sta, now);
        entry.last_seen = now;

        let score = Score::from_rssi(rssi);
        if score != entry.local_score {
            debug!(client = %sta, rssi, %score, "probe updated score");
            entry.local_score = score;
            // An associated client's score changes are published
            // immediately, piggybacked on the regular cadence.
            if entry.is_associated() {
                emit_score(config, entry, now, stats, &mut actions);
            }
        }

        if !entry.is_associated() {
            actions.push(Action::SetTimer {
                id: TimerId::ProbeLoss(sta),
                duration: config.probe_timeout,
            });
        }
        actions
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Peer messages
    // ═══════════════════════════════════════════════════════════════════════

    fn on_score(
        &mut self,
        client: MacAddr,
        bssid: MacAddr,
        score: Score,
        assoc_msecs: u32,
    ) -> Vec<Action> {
        let mut actions = Vec::new();
        let now = self.now;
        let config = &self.config;
        let stats = &mut self.stats;
        stats.scores_received += 1;

        let entry = self.clients.ensure(client, now);
        entry.last_seen = now;

        debug!(
            from = %bssid,
            client = %client,
            %score,
            assoc_msecs,
            local = %entry.local_score,
            "peer score"
        );

        if entry.remote_bssid != Some(bssid) {
            // A score from an AP other than the one we believe owns the
            // client. Normalize the sender's association age onto our
            // clock; strictly newer information wins ownership.
            let adjusted = now.saturating_sub(Duration::from_millis(u64::from(assoc_msecs)));
            if adjusted > entry.remote_time {
                info!(owner = %bssid, client = %client, "peer owns client");

                if entry.is_associated() {
                    // The client roamed away without telling us.
                    if machine::step(config, entry, ClientEvent::Disassociated, &mut actions) {
                        stats.transitions += 1;
                    }
                    entry.sta = None;
                    entry.association_time = Duration::ZERO;
                    actions.push(Action::SetTimer {
                        id: TimerId::ProbeLoss(client),
                        duration: config.probe_timeout,
                    });
                    entry.remote_bssid = Some(bssid);
                    entry.remote_time = adjusted;
                } else {
                    entry.remote_bssid = Some(bssid);
                    entry.remote_time = adjusted;
                    let event = compare_scores(entry.local_score, score);
                    if machine::step(config, entry, event, &mut actions) {
                        stats.transitions += 1;
                    }
                }
            }
        } else {
            // Same owner as before; it already holds the freshest
            // information, so only the score matters.
            let event = compare_scores(entry.local_score, score);
            if machine::step(config, entry, event, &mut actions) {
                stats.transitions += 1;
            }
        }
        actions
    }

    fn on_close_client(
        &mut self,
        client: MacAddr,
        bssid: MacAddr,
        target: MacAddr,
        channel: u8,
    ) -> Vec<Action> {
        let mut actions = Vec::new();
        let config = &self.config;
        let stats = &mut self.stats;

        if target != config.local_bssid {
            trace!(client = %client, %target, "close not addressed to us");
            return actions;
        }
        let Some(entry) = self.clients.find_mut(&client) else {
            debug!(client = %client, from = %bssid, "close for unknown client");
            return actions;
        };

        debug!(client = %client, from = %bssid, channel, "close request");
        entry.remote_channel = channel;
        entry.close_bssid = Some(bssid);
        if machine::step(config, entry, ClientEvent::CloseClient, &mut actions) {
            stats.transitions += 1;
        }
        actions
    }

    fn on_closed_client(&mut self, client: MacAddr, bssid: MacAddr) -> Vec<Action> {
        let mut actions = Vec::new();
        let config = &self.config;
        let stats = &mut self.stats;

        let Some(entry) = self.clients.find_mut(&client) else {
            trace!(client = %client, from = %bssid, "closed-ack for unknown client");
            return actions;
        };

        debug!(client = %client, from = %bssid, "peer closed client");
        if machine::step(config, entry, ClientEvent::ClosedClient, &mut actions) {
            stats.transitions += 1;
        }
        actions
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Timers
    // ═══════════════════════════════════════════════════════════════════════

    fn on_flood_tick(&mut self, client: MacAddr) -> Vec<Action> {
        let mut actions = Vec::new();
        let now = self.now;
        let config = &self.config;
        let stats = &mut self.stats;

        let Some(entry) = self.clients.find_mut(&client) else {
            trace!(client = %client, "flood tick for unknown client");
            return actions;
        };
        if entry.state != ClientState::Associated {
            trace!(client = %client, state = %entry.state, "stale flood tick");
            return actions;
        }

        emit_score(config, entry, now, stats, &mut actions);
        actions.push(Action::SetTimer {
            id: TimerId::Flood(client),
            duration: config.flood_interval,
        });
        actions
    }

    fn on_state_timeout(&mut self, client: MacAddr) -> Vec<Action> {
        let mut actions = Vec::new();
        let config = &self.config;
        let stats = &mut self.stats;

        let Some(entry) = self.clients.find_mut(&client) else {
            trace!(client = %client, "timeout for unknown client");
            return actions;
        };
        if machine::step(config, entry, ClientEvent::Timeout, &mut actions) {
            stats.transitions += 1;
        }
        actions
    }

    fn on_probe_timeout(&mut self, client: MacAddr) -> Vec<Action> {
        if let Some(entry) = self.clients.find_mut(&client) {
            info!(client = %client, score = %entry.local_score, "probe timeout, score lost");
            entry.local_score = Score::LOST;
        }
        Vec::new()
    }

    fn on_sweep(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        let now = self.now;
        let ttl = self.config.idle_entry_ttl;

        let stale: Vec<MacAddr> = self
            .clients
            .iter()
            .filter(|(_, entry)| {
                entry.state == ClientState::Idle
                    && entry.local_score.is_lost()
                    && entry.sta.is_none()
                    && now.saturating_sub(entry.last_seen) > ttl
            })
            .map(|(mac, _)| *mac)
            .collect();

        for mac in stale {
            debug!(client = %mac, "sweeping stale entry");
            // Cancel-before-free; cancellation of unarmed timers is a
            // no-op.
            actions.push(Action::CancelTimer {
                id: TimerId::Flood(mac),
            });
            actions.push(Action::CancelTimer {
                id: TimerId::StateTimeout(mac),
            });
            actions.push(Action::CancelTimer {
                id: TimerId::ProbeLoss(mac),
            });
            self.clients.remove(&mac);
            self.stats.entries_swept += 1;
        }

        actions.push(Action::SetTimer {
            id: TimerId::Sweep,
            duration: self.config.sweep_interval,
        });
        actions
    }
}

impl StateMachine for SteeringState {
    fn handle(&mut self, event: Event) -> Vec<Action> {
        match event {
            Event::Associated {
                sta,
                rssi,
                bss_transition,
            } => self.on_associated(sta, rssi, bss_transition),
            Event::Disassociated { sta } => self.on_disassociated(sta),
            Event::ProbeRequest { sta, bssid, rssi } => self.on_probe(sta, bssid, rssi),
            Event::ScoreReceived {
                client,
                bssid,
                score,
                assoc_msecs,
            } => self.on_score(client, bssid, score, assoc_msecs),
            Event::CloseClientReceived {
                client,
                bssid,
                target,
                channel,
            } => self.on_close_client(client, bssid, target, channel),
            Event::ClosedClientReceived { client, bssid } => self.on_closed_client(client, bssid),
            Event::FloodTick { client } => self.on_flood_tick(client),
            Event::StateTimeout { client } => self.on_state_timeout(client),
            Event::ProbeTimeout { client } => self.on_probe_timeout(client),
            Event::SweepTick => self.on_sweep(),
        }
    }

    fn set_time(&mut self, now: Duration) {
        self.now = now;
    }

    fn now(&self) -> Duration {
        self.now
    }
}

/// Which automaton event a received score maps to.
fn compare_scores(local: Score, received: Score) -> ClientEvent {
    if received.is_lost() {
        ClientEvent::PeerLostClient
    } else if local < received {
        ClientEvent::PeerIsWorse
    } else {
        ClientEvent::PeerNotWorse
    }
}

/// Queue a SCORE broadcast unless our score is lost, in which case the
/// emission is suppressed for this tick.
fn emit_score(
    config: &SteeringConfig,
    entry: &ClientEntry,
    now: Duration,
    stats: &mut SteeringStats,
    actions: &mut Vec<Action>,
) {
    if entry.local_score.is_lost() {
        debug!(client = %entry.mac(), "suppressing score flood, score lost");
        stats.floods_suppressed += 1;
        return;
    }
    let assoc = now.saturating_sub(entry.association_time);
    let assoc_msecs = assoc.as_millis().min(u128::from(u32::MAX)) as u32;
    actions.push(Action::Broadcast(PeerMessage::Score {
        client: entry.mac(),
        bssid: config.local_bssid,
        score: entry.local_score,
        assoc_msecs,
    }));
}
