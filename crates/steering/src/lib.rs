//! The replicated per-client steering state machine.
//!
//! Each AP runs one [`SteeringState`] bound to its BSSID. For every client
//! MAC it has heard of — by local association, by probe, or by a peer's
//! SCORE flood — it keeps a [`ClientEntry`] whose six-state automaton
//! decides whether to admit, transition, or blacklist that client.
//!
//! The automaton (see [`ClientState`]) is replicated: every AP in the
//! mobility domain runs its own copy per client, and the copies converge
//! through the SCORE / CLOSE_CLIENT / CLOSED_CLIENT exchange. The AP that
//! currently hears a client best ends up in `Associated`; the others
//! settle in `Idle` or in the blacklist-holding `Rejected`.
//!
//! All logic here is synchronous and deterministic; effects are emitted as
//! [`netsteer_core::Action`] values for the embedding node to execute.

mod config;
mod machine;
mod registry;
mod state;

pub use config::SteeringConfig;
pub use machine::{ClientEvent, ClientState};
pub use registry::{ClientEntry, ClientRegistry, StaLink};
pub use state::{SteeringState, SteeringStats};
