//! Recurring-poll listener.
//!
//! This module provides:
//! - The poll cycle and its dedup state (`engine`, [`CycleOutcome`])
//! - The lifecycle facade and background worker ([`Listener`], [`ListenerBuilder`])
//! - The jittered delay between cycles ([`PollSchedule`])
//! - The shared buffer new postings are delivered to ([`PostingSink`])
//! - Error handling ([`CycleError`])

mod engine;
mod error;
mod listener;
mod schedule;
mod sink;

#[cfg(test)]
mod test_fixtures;

pub use engine::CycleOutcome;
pub use error::CycleError;
pub use listener::{Listener, ListenerBuilder};
pub use schedule::PollSchedule;
pub use sink::PostingSink;
