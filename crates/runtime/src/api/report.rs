//! End-of-battle summary handed back to clients.

use battle_core::{BattleEvent, BattleResult, Subject};
use serde::Serialize;

use super::errors::{Result, RuntimeError};
use crate::sheet::SheetRoster;

/// One turn taken during the battle, in order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TurnEntry {
    pub subject: String,
    pub interrupt: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BattleReport {
    pub scenario: String,
    pub seed: u64,
    /// `None` when the battle was still running.
    pub result: Option<BattleResult>,
    pub ticks: u64,
    pub rounds: u32,
    pub turns: Vec<TurnEntry>,
    pub escape_attempts: usize,
    pub survivors: Vec<String>,
}

impl BattleReport {
    pub(crate) fn from_journal(
        scenario: &str,
        seed: u64,
        ticks: u64,
        rounds: u32,
        result: Option<BattleResult>,
        events: &[BattleEvent],
        roster: &SheetRoster,
    ) -> Self {
        let name = |subject: &Subject| match subject {
            Subject::Combatant(id) => roster
                .name(*id)
                .map_or_else(|| id.to_string(), str::to_string),
            Subject::Synthetic(_) => subject.to_string(),
        };

        let turns = events
            .iter()
            .filter_map(|event| match event {
                BattleEvent::SubjectSelected { subject, interrupt } => Some(TurnEntry {
                    subject: name(subject),
                    interrupt: *interrupt,
                }),
                _ => None,
            })
            .collect();
        let escape_attempts = events
            .iter()
            .filter(|event| matches!(event, BattleEvent::EscapeAttempted { .. }))
            .count();

        Self {
            scenario: scenario.to_string(),
            seed,
            result,
            ticks,
            rounds,
            turns,
            escape_attempts,
            survivors: roster.survivors(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(RuntimeError::Report)
    }
}
