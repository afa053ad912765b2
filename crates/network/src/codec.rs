//! Frame and TLV encoding/decoding.
//!
//! # Parser contract
//!
//! The entire frame is dropped (no side effects) on: truncated header, bad
//! magic, a version newer than ours, or a declared `total_length` that
//! exceeds the received buffer. Within the TLV area, unknown TLV types are
//! skipped using their length field; a known TLV whose length underflows
//! its minimum drops the *rest* of the frame while keeping what already
//! parsed.
//!
//! # Writer contract
//!
//! Every frame gets a fresh serial, `total_length` is patched in after the
//! TLVs are appended, and frames never exceed [`MAX_FRAME_SIZE`].

use crate::{FRAME_MAGIC, HEADER_LEN, MAX_FRAME_SIZE, PROTOCOL_VERSION};
use netsteer_core::PeerMessage;
use netsteer_types::{MacAddr, Score};
use thiserror::Error;
use tracing::debug;

/// TLV type codes. Changing these requires a version bump.
const TLV_SCORE: u8 = 0;
const TLV_CLOSE_CLIENT: u8 = 1;
const TLV_CLOSED_CLIENT: u8 = 2;

/// Fixed payload sizes per TLV type.
const SCORE_LEN: usize = 6 + 6 + 2 + 4;
const CLOSE_CLIENT_LEN: usize = 6 + 6 + 6 + 1;
const CLOSED_CLIENT_LEN: usize = 6 + 6;

/// Errors from frame encoding/decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("frame shorter than header")]
    TruncatedHeader,

    #[error("bad magic byte {0:#04x}")]
    BadMagic(u8),

    #[error("unsupported protocol version {0}")]
    UnsupportedVersion(u8),

    #[error("declared length {declared} exceeds buffer of {actual} bytes")]
    LengthExceedsBuffer { declared: usize, actual: usize },

    #[error("encoded frame would exceed {MAX_FRAME_SIZE} bytes")]
    FrameOverflow,
}

/// A successfully decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    /// Sender's frame serial. Opaque; used only for logging.
    pub serial: u16,
    /// Decoded messages, in wire order.
    pub messages: Vec<PeerMessage>,
}

/// Issues wrapping frame serials.
///
/// The 16-bit serial increments freely and wraps; receivers treat it as
/// opaque.
#[derive(Debug, Default)]
pub struct FrameWriter {
    next: u16,
}

impl FrameWriter {
    /// Create a writer starting at serial zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next serial.
    pub fn next_serial(&mut self) -> u16 {
        let sn = self.next;
        self.next = self.next.wrapping_add(1);
        sn
    }

    /// Encode `messages` into a single frame with a fresh serial.
    pub fn encode(&mut self, messages: &[PeerMessage]) -> Result<Vec<u8>, WireError> {
        let serial = self.next_serial();
        encode_frame(serial, messages)
    }
}

/// Encode messages into one frame with the given serial.
pub fn encode_frame(serial: u16, messages: &[PeerMessage]) -> Result<Vec<u8>, WireError> {
    let mut buf = Vec::with_capacity(HEADER_LEN + messages.len() * (2 + CLOSE_CLIENT_LEN));
    buf.push(FRAME_MAGIC);
    buf.push(PROTOCOL_VERSION);
    buf.extend_from_slice(&0u16.to_be_bytes()); // patched below
    buf.extend_from_slice(&serial.to_be_bytes());

    for message in messages {
        put_message(&mut buf, message);
    }

    if buf.len() > MAX_FRAME_SIZE {
        return Err(WireError::FrameOverflow);
    }

    let total_len = buf.len() as u16;
    buf[2..4].copy_from_slice(&total_len.to_be_bytes());
    Ok(buf)
}

fn put_message(buf: &mut Vec<u8>, message: &PeerMessage) {
    match *message {
        PeerMessage::Score {
            client,
            bssid,
            score,
            assoc_msecs,
        } => {
            buf.push(TLV_SCORE);
            buf.push(SCORE_LEN as u8);
            buf.extend_from_slice(client.as_bytes());
            buf.extend_from_slice(bssid.as_bytes());
            buf.extend_from_slice(&score.raw().to_be_bytes());
            buf.extend_from_slice(&assoc_msecs.to_be_bytes());
        }
        PeerMessage::CloseClient {
            client,
            bssid,
            target,
            channel,
        } => {
            buf.push(TLV_CLOSE_CLIENT);
            buf.push(CLOSE_CLIENT_LEN as u8);
            buf.extend_from_slice(client.as_bytes());
            buf.extend_from_slice(bssid.as_bytes());
            buf.extend_from_slice(target.as_bytes());
            buf.push(channel);
        }
        PeerMessage::ClosedClient { client, bssid } => {
            buf.push(TLV_CLOSED_CLIENT);
            buf.push(CLOSED_CLIENT_LEN as u8);
            buf.extend_from_slice(client.as_bytes());
            buf.extend_from_slice(bssid.as_bytes());
        }
    }
}

/// Decode a received frame.
///
/// Returns the messages that parsed; see the module docs for the drop and
/// skip rules.
pub fn decode_frame(buf: &[u8]) -> Result<DecodedFrame, WireError> {
    if buf.len() < HEADER_LEN {
        return Err(WireError::TruncatedHeader);
    }
    if buf[0] != FRAME_MAGIC {
        return Err(WireError::BadMagic(buf[0]));
    }
    if buf[1] > PROTOCOL_VERSION {
        return Err(WireError::UnsupportedVersion(buf[1]));
    }

    let total_len = u16::from_be_bytes([buf[2], buf[3]]) as usize;
    if total_len > buf.len() {
        return Err(WireError::LengthExceedsBuffer {
            declared: total_len,
            actual: buf.len(),
        });
    }
    let serial = u16::from_be_bytes([buf[4], buf[5]]);

    let mut messages = Vec::new();
    // Trailing bytes past total_len are ignored.
    let body = &buf[HEADER_LEN.min(total_len)..total_len];
    let mut pos = 0;

    while pos < body.len() {
        if body.len() - pos < 2 {
            debug!(serial, "truncated tlv header, dropping rest of frame");
            break;
        }
        let tlv_type = body[pos];
        let tlv_len = body[pos + 1] as usize;
        pos += 2;

        if body.len() - pos < tlv_len {
            debug!(
                serial,
                tlv_type, tlv_len, "tlv payload overruns frame, dropping rest"
            );
            break;
        }
        let payload = &body[pos..pos + tlv_len];
        pos += tlv_len;

        match tlv_type {
            TLV_SCORE => {
                if tlv_len < SCORE_LEN {
                    debug!(serial, tlv_len, "short score tlv, dropping rest of frame");
                    break;
                }
                messages.push(PeerMessage::Score {
                    client: MacAddr::from_slice(&payload[0..6]),
                    bssid: MacAddr::from_slice(&payload[6..12]),
                    score: Score::from_raw(u16::from_be_bytes([payload[12], payload[13]])),
                    assoc_msecs: u32::from_be_bytes([
                        payload[14],
                        payload[15],
                        payload[16],
                        payload[17],
                    ]),
                });
            }
            TLV_CLOSE_CLIENT => {
                if tlv_len < CLOSE_CLIENT_LEN {
                    debug!(serial, tlv_len, "short close tlv, dropping rest of frame");
                    break;
                }
                messages.push(PeerMessage::CloseClient {
                    client: MacAddr::from_slice(&payload[0..6]),
                    bssid: MacAddr::from_slice(&payload[6..12]),
                    target: MacAddr::from_slice(&payload[12..18]),
                    channel: payload[18],
                });
            }
            TLV_CLOSED_CLIENT => {
                if tlv_len < CLOSED_CLIENT_LEN {
                    debug!(serial, tlv_len, "short closed tlv, dropping rest of frame");
                    break;
                }
                messages.push(PeerMessage::ClosedClient {
                    client: MacAddr::from_slice(&payload[0..6]),
                    bssid: MacAddr::from_slice(&payload[6..12]),
                });
            }
            other => {
                debug!(serial, tlv_type = other, tlv_len, "skipping unknown tlv");
            }
        }
    }

    Ok(DecodedFrame { serial, messages })
}
