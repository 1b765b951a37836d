//! Scheduling records and the value types shared across the scheduler.
//!
//! The host application owns the battlers themselves (stats, HP, states). The
//! scheduler only keeps what it needs to order turns: a [`Combatant`] record per
//! roster member and per-tick [`CombatantView`] snapshots read from the roster.
mod action;
mod combatant;
mod common;

pub use action::{Action, ActionKind};
pub use combatant::{ActingState, Combatant, CombatantFlags, CombatantView, Readiness};
pub use common::{CombatantId, Side};
