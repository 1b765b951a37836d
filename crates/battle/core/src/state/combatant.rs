use std::collections::VecDeque;

use bitflags::bitflags;

use super::{Action, CombatantId, Side};

/// Accumulated waiting points of a combatant.
///
/// The gauge never exceeds the threshold; anything gained beyond it is kept in
/// `overflow` and counted toward the next turn. Turn triggering and resets work
/// on the [`total`](Self::total).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Readiness {
    pub gauge: u32,
    pub overflow: u32,
}

impl Readiness {
    pub const ZERO: Self = Self {
        gauge: 0,
        overflow: 0,
    };

    /// Splits a total into gauge and overflow for the given threshold.
    pub fn from_total(total: u32, threshold: u32) -> Self {
        let gauge = total.min(threshold);
        Self {
            gauge,
            overflow: total - gauge,
        }
    }

    pub fn total(&self) -> u32 {
        self.gauge.saturating_add(self.overflow)
    }

    pub fn is_ready(&self, threshold: u32) -> bool {
        self.total() >= threshold
    }

    /// Gauge fill in `[0.0, 1.0]`, for display.
    pub fn rate(&self, threshold: u32) -> f64 {
        if threshold == 0 {
            return 0.0;
        }
        f64::from(self.gauge) / f64::from(threshold)
    }

    #[must_use]
    pub fn gained(self, delta: u32, threshold: u32) -> Self {
        Self::from_total(self.total().saturating_add(delta), threshold)
    }

    /// Removes one turn's worth of readiness, keeping the overshoot.
    ///
    /// Returns `None` when the total is below the threshold.
    #[must_use]
    pub fn spent(self, threshold: u32) -> Option<Self> {
        self.total()
            .checked_sub(threshold)
            .map(|rest| Self::from_total(rest, threshold))
    }
}

/// What a combatant is doing with respect to the current turn.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ActingState {
    #[default]
    Idle,
    /// Waiting for the player to choose commands.
    Inputting,
    /// Actions were decided without input and are about to run.
    ActingAutomatically,
    /// Actions are being executed.
    Acting,
}

/// Scheduling record of one roster member.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Combatant {
    pub id: CombatantId,
    pub side: Side,
    pub readiness: Readiness,
    /// Mirrored from the roster at every tick.
    pub alive: bool,
    pub acting_state: ActingState,
    pub pending_actions: VecDeque<Action>,
    /// Own turns completed this battle.
    pub turns_taken: u32,
}

impl Combatant {
    pub fn new(id: CombatantId, side: Side) -> Self {
        Self {
            id,
            side,
            readiness: Readiness::ZERO,
            alive: true,
            acting_state: ActingState::Idle,
            pending_actions: VecDeque::new(),
            turns_taken: 0,
        }
    }

    #[must_use]
    pub fn with_readiness(mut self, total: u32, threshold: u32) -> Self {
        self.readiness = Readiness::from_total(total, threshold);
        self
    }

    pub fn is_ready(&self, threshold: u32) -> bool {
        self.alive && self.readiness.is_ready(threshold)
    }
}

bitflags! {
    /// Roster facts captured for one combatant at the start of a tick.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct CombatantFlags: u8 {
        const ALIVE           = 1 << 0;
        const CAN_ACT         = 1 << 1;
        const CAN_INPUT       = 1 << 2;
        const PENDING_REVIVAL = 1 << 3;
    }
}

/// Snapshot of a roster member, valid for the duration of one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CombatantView {
    pub id: CombatantId,
    pub side: Side,
    pub speed: f64,
    pub flags: CombatantFlags,
}

impl CombatantView {
    pub fn new(id: CombatantId, side: Side, speed: f64) -> Self {
        Self {
            id,
            side,
            speed,
            flags: CombatantFlags::ALIVE | CombatantFlags::CAN_ACT,
        }
    }

    #[must_use]
    pub fn with_flags(mut self, flags: CombatantFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn is_alive(&self) -> bool {
        self.flags.contains(CombatantFlags::ALIVE)
    }

    /// Alive and not prevented from moving.
    pub fn is_eligible(&self) -> bool {
        self.flags
            .contains(CombatantFlags::ALIVE | CombatantFlags::CAN_ACT)
    }

    pub fn can_input(&self) -> bool {
        self.is_eligible() && self.flags.contains(CombatantFlags::CAN_INPUT)
    }
}
