//! Notifications emitted by the session for presentation and logging.

use std::fmt;

use crate::escape::EscapeOutcome;
use crate::session::{BattlePhase, Initiative};
use crate::state::{Action, CombatantId};

/// Holder of the current turn, or an entry of the turn preview.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Subject {
    /// A roster member.
    Combatant(CombatantId),
    /// An anonymous subject with no scheduling record (e.g. auto-life).
    Synthetic(String),
}

impl Subject {
    pub fn combatant(&self) -> Option<CombatantId> {
        match self {
            Subject::Combatant(id) => Some(*id),
            Subject::Synthetic(_) => None,
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Combatant(id) => write!(f, "{id}"),
            Subject::Synthetic(label) => write!(f, "<{label}>"),
        }
    }
}

/// How a battle ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum BattleResult {
    Victory,
    Defeat,
    Escaped,
    Aborted,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleEvent {
    BattleStarted {
        initiative: Initiative,
    },
    PhaseChanged {
        from: BattlePhase,
        to: BattlePhase,
    },
    /// The global round counter rolled over.
    RoundElapsed {
        round: u32,
    },
    SubjectSelected {
        subject: Subject,
        interrupt: bool,
    },
    InputRequested {
        subject: CombatantId,
        slots: usize,
    },
    CommandSelected {
        subject: CombatantId,
        slot: usize,
        action: Action,
    },
    CommandCancelled {
        subject: CombatantId,
        slot: usize,
    },
    ActionStarted {
        subject: Subject,
        action: Action,
    },
    EscapeAttempted {
        subject: CombatantId,
        outcome: EscapeOutcome,
    },
    /// The subject died before its turn ended; its readiness was cleared.
    SubjectFell {
        subject: CombatantId,
    },
    TurnEnded {
        subject: Subject,
        /// Readiness total left after the turn (0 for synthetic subjects).
        readiness: u32,
    },
    BattleEnded {
        result: BattleResult,
    },
}
