//! Core trait for the steering state machine.

use crate::{Action, Event};
use std::time::Duration;

/// A state machine that processes steering events.
///
/// All steering logic sits behind this trait:
///
/// - **Synchronous**: No async, no `.await`
/// - **Deterministic**: Same state + event = same actions
/// - **Pure-ish**: Mutates self, but performs no I/O
///
/// The embedding node delivers events, executes the returned actions, and
/// injects the current time before each dispatch. Determinism of the whole
/// system then reduces to determinism of event ordering, which the
/// simulation harness controls exactly.
pub trait StateMachine {
    /// Process one event, returning actions for the runner to execute.
    ///
    /// Runs to completion; performs at most one client-automaton
    /// transition per dispatched event.
    fn handle(&mut self, event: Event) -> Vec<Action>;

    /// Set the current time.
    ///
    /// Called by the runner before each `handle()` call with monotonic
    /// time as a duration since an arbitrary epoch.
    fn set_time(&mut self, now: Duration);

    /// Get the time last set via `set_time()`.
    fn now(&self) -> Duration;
}
