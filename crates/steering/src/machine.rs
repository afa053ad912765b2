//! The six-state client automaton.
//!
//! The transition table below is the single source of truth; everything
//! else in the crate just feeds it events. Actions run while the entry is
//! still in its old state, so externally observable effects are attributed
//! to the state the event arrived in.
//!
//! Events that match no row are ignored: no state change, no actions. That
//! is load-bearing — e.g. an AP in `Confirming` that sent two CLOSEs will
//! get two CLOSED acks, and the second must be a no-op.

use crate::config::SteeringConfig;
use crate::registry::ClientEntry;
use netsteer_core::{Action, PeerMessage, TimerId};
use netsteer_types::{MacAddr, Score, SteeringMode};
use std::fmt;
use tracing::{debug, trace};

/// Automaton state for one (AP, client) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// The AP will allow the client to associate.
    Idle,
    /// The AP asked another AP to close the client and is waiting for the
    /// confirmation.
    Confirming,
    /// A remote AP confirmed it closed the client; now waiting for the
    /// client to associate here.
    Associating,
    /// The client is using this AP.
    Associated,
    /// The AP has blacklisted the client and is waiting for the
    /// disassociation before confirming to the peer.
    Rejecting,
    /// The client is blacklisted and disassociated.
    Rejected,
}

impl fmt::Display for ClientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ClientState::Idle => "Idle",
            ClientState::Confirming => "Confirming",
            ClientState::Associating => "Associating",
            ClientState::Associated => "Associated",
            ClientState::Rejecting => "Rejecting",
            ClientState::Rejected => "Rejected",
        };
        f.write_str(s)
    }
}

/// Events dispatched to the client automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientEvent {
    /// The client associated with this AP.
    Associated,
    /// The client went away or associated with a different AP.
    Disassociated,
    /// A peer reported a score worse than ours.
    PeerIsWorse,
    /// A peer reported a score as good as or better than ours.
    PeerNotWorse,
    /// A peer reported the lost-score sentinel.
    PeerLostClient,
    /// A peer asked us to close the client.
    CloseClient,
    /// A peer confirmed it closed the client.
    ClosedClient,
    /// The Rejecting/Rejected wait expired.
    Timeout,
}

impl fmt::Display for ClientEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ClientEvent::Associated => "Associated",
            ClientEvent::Disassociated => "Disassociated",
            ClientEvent::PeerIsWorse => "PeerIsWorse",
            ClientEvent::PeerNotWorse => "PeerNotWorse",
            ClientEvent::PeerLostClient => "PeerLostClient",
            ClientEvent::CloseClient => "CloseClient",
            ClientEvent::ClosedClient => "ClosedClient",
            ClientEvent::Timeout => "Timeout",
        };
        f.write_str(s)
    }
}

/// Dispatch one event to an entry's automaton.
///
/// Appends the transition's actions to `actions` and moves the entry to
/// its new state. Returns `false` when the event is ignored in the current
/// state.
pub(crate) fn step(
    cfg: &SteeringConfig,
    entry: &mut ClientEntry,
    event: ClientEvent,
    actions: &mut Vec<Action>,
) -> bool {
    use ClientEvent as E;
    use ClientState as S;

    let from = entry.state;
    let to = match (from, event) {
        (S::Idle, E::Associated) => {
            start_flood_timer(cfg, entry, actions);
            S::Associated
        }
        (S::Idle, E::PeerIsWorse) => {
            flood_close(cfg, entry, actions);
            S::Confirming
        }
        (S::Idle, E::PeerNotWorse) => {
            blacklist_add(cfg, entry, actions);
            arm_state_timer(cfg, entry, actions);
            S::Rejected
        }
        (S::Idle, E::PeerLostClient) => S::Associating,
        (S::Idle, E::CloseClient) => {
            flood_close(cfg, entry, actions);
            blacklist_add(cfg, entry, actions);
            arm_state_timer(cfg, entry, actions);
            S::Rejected
        }

        (S::Confirming, E::ClosedClient) => S::Associating,
        (S::Confirming, E::Associated) => {
            start_flood_timer(cfg, entry, actions);
            S::Associated
        }
        (S::Confirming, E::Timeout) => S::Idle,
        (S::Confirming, E::PeerIsWorse) => {
            flood_close(cfg, entry, actions);
            S::Confirming
        }
        // Once we committed to closing the client elsewhere we must not
        // blacklist ourselves on a late PeerNotWorse, so Confirming
        // deliberately has no PeerNotWorse row.

        (S::Associating, E::Associated) => {
            start_flood_timer(cfg, entry, actions);
            S::Associated
        }
        (S::Associating, E::Disassociated) => S::Idle,
        (S::Associating, E::PeerIsWorse) => {
            flood_close(cfg, entry, actions);
            S::Associating
        }
        (S::Associating, E::CloseClient) => {
            flood_closed(cfg, entry, actions);
            blacklist_add(cfg, entry, actions);
            arm_state_timer(cfg, entry, actions);
            S::Rejected
        }

        (S::Associated, E::CloseClient) => {
            blacklist_add(cfg, entry, actions);
            issue_disassociation(cfg, entry, actions);
            arm_state_timer(cfg, entry, actions);
            stop_flood_timer(entry, actions);
            S::Rejecting
        }
        (S::Associated, E::Disassociated) => {
            stop_flood_timer(entry, actions);
            S::Idle
        }
        (S::Associated, E::PeerIsWorse) => {
            flood_close(cfg, entry, actions);
            S::Associated
        }

        (S::Rejecting, E::Disassociated) => {
            flood_closed(cfg, entry, actions);
            cancel_state_timer(entry, actions);
            arm_state_timer(cfg, entry, actions);
            S::Rejected
        }
        (S::Rejecting, E::PeerIsWorse) => {
            blacklist_remove(cfg, entry, actions);
            flood_close(cfg, entry, actions);
            cancel_state_timer(entry, actions);
            S::Confirming
        }
        (S::Rejecting, E::PeerLostClient) => {
            blacklist_remove(cfg, entry, actions);
            cancel_state_timer(entry, actions);
            S::Confirming
        }
        (S::Rejecting, E::CloseClient) => S::Rejecting,
        (S::Rejecting, E::Timeout) => {
            blacklist_remove(cfg, entry, actions);
            cancel_state_timer(entry, actions);
            S::Associating
        }

        (S::Rejected, E::PeerIsWorse) => {
            blacklist_remove(cfg, entry, actions);
            flood_close(cfg, entry, actions);
            cancel_state_timer(entry, actions);
            S::Confirming
        }
        (S::Rejected, E::PeerLostClient) => {
            blacklist_remove(cfg, entry, actions);
            flood_close(cfg, entry, actions);
            cancel_state_timer(entry, actions);
            S::Confirming
        }
        (S::Rejected, E::CloseClient) => {
            flood_close(cfg, entry, actions);
            S::Rejected
        }
        (S::Rejected, E::Timeout) => {
            blacklist_remove(cfg, entry, actions);
            cancel_state_timer(entry, actions);
            S::Associating
        }

        _ => {
            trace!(client = %entry.mac(), state = %from, event = %event, "event ignored");
            return false;
        }
    };

    debug!(client = %entry.mac(), event = %event, %from, %to, "transition");
    entry.state = to;
    true
}

fn start_flood_timer(cfg: &SteeringConfig, entry: &ClientEntry, actions: &mut Vec<Action>) {
    actions.push(Action::SetTimer {
        id: TimerId::Flood(entry.mac()),
        duration: cfg.flood_interval,
    });
}

/// Stopping the flood also marks our score lost; the next SCORE a peer
/// would have seen from us is the lost sentinel, delivered by whoever
/// still floods.
fn stop_flood_timer(entry: &mut ClientEntry, actions: &mut Vec<Action>) {
    entry.local_score = Score::LOST;
    actions.push(Action::CancelTimer {
        id: TimerId::Flood(entry.mac()),
    });
}

fn arm_state_timer(cfg: &SteeringConfig, entry: &ClientEntry, actions: &mut Vec<Action>) {
    actions.push(Action::SetTimer {
        id: TimerId::StateTimeout(entry.mac()),
        duration: cfg.reject_timeout,
    });
}

fn cancel_state_timer(entry: &ClientEntry, actions: &mut Vec<Action>) {
    actions.push(Action::CancelTimer {
        id: TimerId::StateTimeout(entry.mac()),
    });
}

/// Ask every peer to close the client on the AP we believe owns it.
fn flood_close(cfg: &SteeringConfig, entry: &ClientEntry, actions: &mut Vec<Action>) {
    actions.push(Action::Broadcast(PeerMessage::CloseClient {
        client: entry.mac(),
        bssid: cfg.local_bssid,
        target: entry.remote_bssid.unwrap_or(MacAddr::ZERO),
        channel: cfg.channel,
    }));
}

/// Confirm that we have closed the client.
fn flood_closed(cfg: &SteeringConfig, entry: &mut ClientEntry, actions: &mut Vec<Action>) {
    debug!(
        client = %entry.mac(),
        to = %entry.close_bssid.unwrap_or(MacAddr::ZERO),
        "sending closed-client confirmation"
    );
    actions.push(Action::Broadcast(PeerMessage::ClosedClient {
        client: entry.mac(),
        bssid: cfg.local_bssid,
    }));
    entry.close_bssid = None;
}

fn blacklist_add(cfg: &SteeringConfig, entry: &ClientEntry, actions: &mut Vec<Action>) {
    if cfg.mode == SteeringMode::Force {
        actions.push(Action::BlacklistAdd { sta: entry.mac() });
    }
}

fn blacklist_remove(cfg: &SteeringConfig, entry: &ClientEntry, actions: &mut Vec<Action>) {
    if cfg.mode == SteeringMode::Force {
        actions.push(Action::BlacklistRemove { sta: entry.mac() });
    }
}

/// Push the client off this AP: politely via BSS Transition when the mode
/// or the client allows it, otherwise with a raw disassociation.
fn issue_disassociation(cfg: &SteeringConfig, entry: &ClientEntry, actions: &mut Vec<Action>) {
    if cfg.mode == SteeringMode::Suggest || entry.supports_bss_transition() {
        actions.push(Action::BssTransitionRequest {
            sta: entry.mac(),
            target: entry.close_bssid.unwrap_or(MacAddr::ZERO),
            channel: entry.remote_channel,
        });
    } else {
        actions.push(Action::Disassociate { sta: entry.mac() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ClientRegistry, StaLink};
    use std::time::Duration;

    fn test_config(mode: SteeringMode) -> SteeringConfig {
        SteeringConfig::new(MacAddr::new([0x02, 0, 0, 0, 0, 1]), 6, mode)
    }

    fn entry_in(state: ClientState) -> (ClientRegistry, MacAddr) {
        let mut registry = ClientRegistry::new();
        let mac = MacAddr::new([0x0a, 0, 0, 0, 0, 1]);
        registry.ensure(mac, Duration::ZERO).state = state;
        (registry, mac)
    }

    fn run(
        cfg: &SteeringConfig,
        registry: &mut ClientRegistry,
        mac: MacAddr,
        event: ClientEvent,
    ) -> (bool, Vec<Action>) {
        let mut actions = Vec::new();
        let entry = registry.find_mut(&mac).unwrap();
        let stepped = step(cfg, entry, event, &mut actions);
        (stepped, actions)
    }

    #[test]
    fn test_idle_association_starts_flooding() {
        let cfg = test_config(SteeringMode::Force);
        let (mut reg, mac) = entry_in(ClientState::Idle);
        let (stepped, actions) = run(&cfg, &mut reg, mac, ClientEvent::Associated);

        assert!(stepped);
        assert_eq!(reg.find(&mac).unwrap().state, ClientState::Associated);
        assert_eq!(
            actions,
            vec![Action::SetTimer {
                id: TimerId::Flood(mac),
                duration: cfg.flood_interval,
            }]
        );
    }

    #[test]
    fn test_idle_peer_not_worse_blacklists_with_timeout() {
        let cfg = test_config(SteeringMode::Force);
        let (mut reg, mac) = entry_in(ClientState::Idle);
        let (_, actions) = run(&cfg, &mut reg, mac, ClientEvent::PeerNotWorse);

        assert_eq!(reg.find(&mac).unwrap().state, ClientState::Rejected);
        assert_eq!(
            actions,
            vec![
                Action::BlacklistAdd { sta: mac },
                Action::SetTimer {
                    id: TimerId::StateTimeout(mac),
                    duration: cfg.reject_timeout,
                },
            ]
        );
    }

    #[test]
    fn test_blacklist_suppressed_outside_force_mode() {
        for mode in [SteeringMode::Off, SteeringMode::Suggest] {
            let cfg = test_config(mode);
            let (mut reg, mac) = entry_in(ClientState::Idle);
            let (_, actions) = run(&cfg, &mut reg, mac, ClientEvent::PeerNotWorse);

            assert!(
                !actions
                    .iter()
                    .any(|a| matches!(a, Action::BlacklistAdd { .. })),
                "no blacklist in {mode} mode"
            );
        }
    }

    #[test]
    fn test_idle_peer_is_worse_confirms_with_close() {
        let cfg = test_config(SteeringMode::Force);
        let (mut reg, mac) = entry_in(ClientState::Idle);
        reg.find_mut(&mac).unwrap().remote_bssid = Some(MacAddr::new([2, 2, 2, 2, 2, 2]));
        let (_, actions) = run(&cfg, &mut reg, mac, ClientEvent::PeerIsWorse);

        assert_eq!(reg.find(&mac).unwrap().state, ClientState::Confirming);
        assert_eq!(
            actions,
            vec![Action::Broadcast(PeerMessage::CloseClient {
                client: mac,
                bssid: cfg.local_bssid,
                target: MacAddr::new([2, 2, 2, 2, 2, 2]),
                channel: cfg.channel,
            })]
        );
    }

    #[test]
    fn test_idle_peer_lost_client_is_pure_state_change() {
        let cfg = test_config(SteeringMode::Force);
        let (mut reg, mac) = entry_in(ClientState::Idle);
        let (stepped, actions) = run(&cfg, &mut reg, mac, ClientEvent::PeerLostClient);

        assert!(stepped);
        assert!(actions.is_empty());
        assert_eq!(reg.find(&mac).unwrap().state, ClientState::Associating);
    }

    #[test]
    fn test_confirming_ignores_peer_not_worse() {
        let cfg = test_config(SteeringMode::Force);
        let (mut reg, mac) = entry_in(ClientState::Confirming);
        let (stepped, actions) = run(&cfg, &mut reg, mac, ClientEvent::PeerNotWorse);

        assert!(!stepped);
        assert!(actions.is_empty());
        assert_eq!(reg.find(&mac).unwrap().state, ClientState::Confirming);
    }

    #[test]
    fn test_confirming_closed_client_advances_to_associating() {
        let cfg = test_config(SteeringMode::Force);
        let (mut reg, mac) = entry_in(ClientState::Confirming);
        let (stepped, actions) = run(&cfg, &mut reg, mac, ClientEvent::ClosedClient);

        assert!(stepped);
        assert!(actions.is_empty());
        assert_eq!(reg.find(&mac).unwrap().state, ClientState::Associating);

        // A duplicate CLOSED (two outstanding CLOSEs both got acked) is a
        // no-op from Associating.
        let (stepped, actions) = run(&cfg, &mut reg, mac, ClientEvent::ClosedClient);
        assert!(!stepped);
        assert!(actions.is_empty());
        assert_eq!(reg.find(&mac).unwrap().state, ClientState::Associating);
    }

    #[test]
    fn test_associating_close_client_acks_and_blacklists() {
        let cfg = test_config(SteeringMode::Force);
        let (mut reg, mac) = entry_in(ClientState::Associating);
        reg.find_mut(&mac).unwrap().close_bssid = Some(MacAddr::new([3, 3, 3, 3, 3, 3]));
        let (_, actions) = run(&cfg, &mut reg, mac, ClientEvent::CloseClient);

        let entry = reg.find(&mac).unwrap();
        assert_eq!(entry.state, ClientState::Rejected);
        assert_eq!(entry.close_bssid, None, "ack clears the close target");
        assert_eq!(
            actions,
            vec![
                Action::Broadcast(PeerMessage::ClosedClient {
                    client: mac,
                    bssid: cfg.local_bssid,
                }),
                Action::BlacklistAdd { sta: mac },
                Action::SetTimer {
                    id: TimerId::StateTimeout(mac),
                    duration: cfg.reject_timeout,
                },
            ]
        );
    }

    #[test]
    fn test_associated_close_client_force_mode_deauths() {
        let cfg = test_config(SteeringMode::Force);
        let (mut reg, mac) = entry_in(ClientState::Associated);
        {
            let entry = reg.find_mut(&mac).unwrap();
            entry.sta = Some(StaLink {
                bss_transition: false,
            });
            entry.local_score = Score::from_raw(40);
            entry.close_bssid = Some(MacAddr::new([2, 2, 2, 2, 2, 2]));
            entry.remote_channel = 11;
        }
        let (_, actions) = run(&cfg, &mut reg, mac, ClientEvent::CloseClient);

        let entry = reg.find(&mac).unwrap();
        assert_eq!(entry.state, ClientState::Rejecting);
        assert!(
            entry.local_score.is_lost(),
            "stopping the flood marks the score lost"
        );
        assert_eq!(
            actions,
            vec![
                Action::BlacklistAdd { sta: mac },
                Action::Disassociate { sta: mac },
                Action::SetTimer {
                    id: TimerId::StateTimeout(mac),
                    duration: cfg.reject_timeout,
                },
                Action::CancelTimer {
                    id: TimerId::Flood(mac),
                },
            ]
        );
    }

    #[test]
    fn test_associated_close_client_prefers_bss_transition() {
        // Suggest mode, or a capable client in force mode, gets the polite
        // 802.11v path and never a raw deauth.
        let cases = [
            (SteeringMode::Suggest, false),
            (SteeringMode::Force, true),
            (SteeringMode::Suggest, true),
        ];
        for (mode, capable) in cases {
            let cfg = test_config(mode);
            let (mut reg, mac) = entry_in(ClientState::Associated);
            {
                let entry = reg.find_mut(&mac).unwrap();
                entry.sta = Some(StaLink {
                    bss_transition: capable,
                });
                entry.close_bssid = Some(MacAddr::new([2, 2, 2, 2, 2, 2]));
                entry.remote_channel = 36;
            }
            let (_, actions) = run(&cfg, &mut reg, mac, ClientEvent::CloseClient);

            assert!(
                actions.contains(&Action::BssTransitionRequest {
                    sta: mac,
                    target: MacAddr::new([2, 2, 2, 2, 2, 2]),
                    channel: 36,
                }),
                "mode={mode} capable={capable}"
            );
            assert!(!actions.iter().any(|a| matches!(a, Action::Disassociate { .. })));
        }
    }

    #[test]
    fn test_associated_disassociation_stops_flooding() {
        let cfg = test_config(SteeringMode::Force);
        let (mut reg, mac) = entry_in(ClientState::Associated);
        reg.find_mut(&mac).unwrap().local_score = Score::from_raw(40);
        let (_, actions) = run(&cfg, &mut reg, mac, ClientEvent::Disassociated);

        let entry = reg.find(&mac).unwrap();
        assert_eq!(entry.state, ClientState::Idle);
        assert!(entry.local_score.is_lost());
        assert_eq!(
            actions,
            vec![Action::CancelTimer {
                id: TimerId::Flood(mac),
            }]
        );
    }

    #[test]
    fn test_rejecting_disassociation_confirms_and_rearms() {
        let cfg = test_config(SteeringMode::Force);
        let (mut reg, mac) = entry_in(ClientState::Rejecting);
        reg.find_mut(&mac).unwrap().close_bssid = Some(MacAddr::new([2, 2, 2, 2, 2, 2]));
        let (_, actions) = run(&cfg, &mut reg, mac, ClientEvent::Disassociated);

        assert_eq!(reg.find(&mac).unwrap().state, ClientState::Rejected);
        assert_eq!(
            actions,
            vec![
                Action::Broadcast(PeerMessage::ClosedClient {
                    client: mac,
                    bssid: cfg.local_bssid,
                }),
                Action::CancelTimer {
                    id: TimerId::StateTimeout(mac),
                },
                Action::SetTimer {
                    id: TimerId::StateTimeout(mac),
                    duration: cfg.reject_timeout,
                },
            ]
        );
    }

    #[test]
    fn test_rejecting_close_client_is_quiet_self_transition() {
        let cfg = test_config(SteeringMode::Force);
        let (mut reg, mac) = entry_in(ClientState::Rejecting);
        let (stepped, actions) = run(&cfg, &mut reg, mac, ClientEvent::CloseClient);

        assert!(stepped);
        assert!(actions.is_empty());
        assert_eq!(reg.find(&mac).unwrap().state, ClientState::Rejecting);
    }

    #[test]
    fn test_rejected_timeout_releases_blacklist() {
        let cfg = test_config(SteeringMode::Force);
        let (mut reg, mac) = entry_in(ClientState::Rejected);
        let (_, actions) = run(&cfg, &mut reg, mac, ClientEvent::Timeout);

        assert_eq!(reg.find(&mac).unwrap().state, ClientState::Associating);
        assert_eq!(
            actions,
            vec![
                Action::BlacklistRemove { sta: mac },
                Action::CancelTimer {
                    id: TimerId::StateTimeout(mac),
                },
            ]
        );
    }

    #[test]
    fn test_rejected_close_client_retries_close() {
        let cfg = test_config(SteeringMode::Force);
        let (mut reg, mac) = entry_in(ClientState::Rejected);
        let (_, actions) = run(&cfg, &mut reg, mac, ClientEvent::CloseClient);

        assert_eq!(reg.find(&mac).unwrap().state, ClientState::Rejected);
        assert_eq!(actions.len(), 1);
        assert!(matches!(
            &actions[0],
            Action::Broadcast(PeerMessage::CloseClient { .. })
        ));
    }

    #[test]
    fn test_rejected_peer_lost_client_reopens_with_close() {
        let cfg = test_config(SteeringMode::Force);
        let (mut reg, mac) = entry_in(ClientState::Rejected);
        let (_, actions) = run(&cfg, &mut reg, mac, ClientEvent::PeerLostClient);

        assert_eq!(reg.find(&mac).unwrap().state, ClientState::Confirming);
        assert!(actions.contains(&Action::BlacklistRemove { sta: mac }));
        assert!(actions
            .iter()
            .any(|a| matches!(a, Action::Broadcast(PeerMessage::CloseClient { .. }))));
    }

    #[test]
    fn test_rejecting_peer_lost_client_reopens_without_close() {
        let cfg = test_config(SteeringMode::Force);
        let (mut reg, mac) = entry_in(ClientState::Rejecting);
        let (_, actions) = run(&cfg, &mut reg, mac, ClientEvent::PeerLostClient);

        assert_eq!(reg.find(&mac).unwrap().state, ClientState::Confirming);
        assert!(actions.contains(&Action::BlacklistRemove { sta: mac }));
        assert!(!actions
            .iter()
            .any(|a| matches!(a, Action::Broadcast(PeerMessage::CloseClient { .. }))));
    }

    #[test]
    fn test_unmatched_events_are_ignored_everywhere() {
        let cfg = test_config(SteeringMode::Force);
        let ignored = [
            (ClientState::Idle, ClientEvent::Disassociated),
            (ClientState::Idle, ClientEvent::ClosedClient),
            (ClientState::Idle, ClientEvent::Timeout),
            (ClientState::Confirming, ClientEvent::Disassociated),
            (ClientState::Confirming, ClientEvent::PeerLostClient),
            (ClientState::Associating, ClientEvent::PeerNotWorse),
            (ClientState::Associating, ClientEvent::Timeout),
            (ClientState::Associated, ClientEvent::Associated),
            (ClientState::Associated, ClientEvent::PeerNotWorse),
            (ClientState::Associated, ClientEvent::Timeout),
            (ClientState::Rejecting, ClientEvent::Associated),
            (ClientState::Rejecting, ClientEvent::PeerNotWorse),
            (ClientState::Rejected, ClientEvent::Associated),
            (ClientState::Rejected, ClientEvent::Disassociated),
            (ClientState::Rejected, ClientEvent::PeerNotWorse),
            (ClientState::Rejected, ClientEvent::ClosedClient),
        ];

        for (state, event) in ignored {
            let (mut reg, mac) = entry_in(state);
            let (stepped, actions) = run(&cfg, &mut reg, mac, event);
            assert!(!stepped, "{state} + {event} must be ignored");
            assert!(actions.is_empty(), "{state} + {event} must emit nothing");
            assert_eq!(reg.find(&mac).unwrap().state, state);
        }
    }
}
