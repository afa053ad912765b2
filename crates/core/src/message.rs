//! Control-plane messages exchanged between peer APs.

use crate::Event;
use netsteer_types::{MacAddr, Score};

/// Messages an AP floods to its mobility-domain peers.
///
/// Each variant corresponds to one TLV on the wire. Messages are advisory:
/// delivery is best-effort, SCOREs repeat every second while a client is
/// associated, and CLOSE/CLOSED are re-emitted by state until acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerMessage {
    /// "I hear this client at this strength, associated this long ago."
    Score {
        client: MacAddr,
        /// BSSID of the sending AP.
        bssid: MacAddr,
        score: Score,
        /// Milliseconds since the client associated with the sender.
        assoc_msecs: u32,
    },

    /// "Target AP: please blacklist/transition this client; it belongs here."
    CloseClient {
        client: MacAddr,
        /// BSSID of the sending AP.
        bssid: MacAddr,
        /// BSSID being asked to close the client.
        target: MacAddr,
        /// Operating channel of the sender, for BSS Transition hints.
        channel: u8,
    },

    /// "I have closed this client."
    ClosedClient {
        client: MacAddr,
        /// BSSID of the acknowledging AP.
        bssid: MacAddr,
    },
}

impl PeerMessage {
    /// Get a human-readable name for this message type.
    pub fn type_name(&self) -> &'static str {
        match self {
            PeerMessage::Score { .. } => "Score",
            PeerMessage::CloseClient { .. } => "CloseClient",
            PeerMessage::ClosedClient { .. } => "ClosedClient",
        }
    }

    /// The client MAC this message is about.
    pub fn client(&self) -> MacAddr {
        match self {
            PeerMessage::Score { client, .. }
            | PeerMessage::CloseClient { client, .. }
            | PeerMessage::ClosedClient { client, .. } => *client,
        }
    }

    /// Convert a received message into the corresponding input event.
    ///
    /// Used by the receive path after decoding, so the wire layer and any
    /// in-memory shortcut deliver identical events.
    pub fn to_received_event(&self) -> Event {
        match *self {
            PeerMessage::Score {
                client,
                bssid,
                score,
                assoc_msecs,
            } => Event::ScoreReceived {
                client,
                bssid,
                score,
                assoc_msecs,
            },
            PeerMessage::CloseClient {
                client,
                bssid,
                target,
                channel,
            } => Event::CloseClientReceived {
                client,
                bssid,
                target,
                channel,
            },
            PeerMessage::ClosedClient { client, bssid } => Event::ClosedClientReceived {
                client,
                bssid,
            },
        }
    }
}
