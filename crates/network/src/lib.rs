//! Wire codec and transport interface for the netsteer control protocol.
//!
//! Peer APs exchange unicast L2 frames on ethertype [`ETHERTYPE`]. Each
//! frame is a fixed 6-byte header followed by TLVs:
//!
//! ```text
//! ┌───────┬─────────┬──────────────┬────────┬──────────────┐
//! │ magic │ version │ total_length │ serial │ TLVs ...     │
//! │  u8   │   u8    │   u16 (BE)   │u16 (BE)│              │
//! └───────┴─────────┴──────────────┴────────┴──────────────┘
//! ```
//!
//! `total_length` covers the entire frame including the header; receivers
//! ignore any trailing bytes beyond it. Each TLV is `type u8 | length u8 |
//! payload`, all multi-byte payload fields big-endian.
//!
//! The [`L2Transport`] trait is the seam to the actual medium: production
//! backends wrap a raw packet socket on the bridge interface, the
//! `netsteer-network-memory` crate provides a deterministic in-memory LAN
//! for simulation.

mod codec;
mod traits;

pub use codec::{decode_frame, encode_frame, DecodedFrame, FrameWriter, WireError};
pub use traits::{L2Transport, TransportError};

/// L2 ethertype for steering control frames (experimentally chosen,
/// unassigned).
pub const ETHERTYPE: u16 = 0x8267;

/// First byte of every frame.
pub const FRAME_MAGIC: u8 = 0x30;

/// Protocol version spoken by this implementation. Frames with a newer
/// version are dropped.
pub const PROTOCOL_VERSION: u8 = 0x01;

/// Frame header length in bytes.
pub const HEADER_LEN: usize = 6;

/// Maximum size of a single frame in bytes.
pub const MAX_FRAME_SIZE: usize = 1024;
