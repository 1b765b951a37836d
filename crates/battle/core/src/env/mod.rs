//! Read-only access to the world outside the scheduler.
//!
//! The host roster is consulted through [`RosterOracle`] and randomness through
//! [`RngOracle`]; neither is reached through global state.
mod rng;
mod roster;

pub use rng::{PcgRng, RngOracle, compute_seed, context};
pub use roster::{RosterOracle, RosterSnapshot};
