//! Ledger snapshots for save/restore and replays.

use crate::env::{RosterOracle, RosterSnapshot};
use crate::ledger::RoundCounter;
use crate::state::{CombatantId, Readiness};

use super::{BattlePhase, BattleSession, SessionError};

/// Scheduling state that is not derivable from the roster.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LedgerSnapshot {
    /// Readiness totals in roster order.
    pub readiness: Vec<(CombatantId, u32)>,
    pub rounds: RoundCounter,
    pub escape_ratio: Option<f64>,
}

#[cfg(feature = "serde")]
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to encode ledger snapshot: {0}")]
    Encode(String),

    #[error("failed to decode ledger snapshot: {0}")]
    Decode(String),
}

#[cfg(feature = "serde")]
impl LedgerSnapshot {
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        bincode::deserialize(bytes).map_err(|e| SnapshotError::Decode(e.to_string()))
    }
}

impl<R> BattleSession<R>
where
    R: RosterOracle,
{
    pub fn ledger_snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            readiness: self
                .records
                .iter()
                .map(|record| (record.id, record.readiness.total()))
                .collect(),
            rounds: self.rounds,
            escape_ratio: self.escape.ratio(),
        }
    }

    /// Overwrites readiness, the round counter and the escape ratio.
    ///
    /// Only valid once the battle has started, otherwise start-of-battle
    /// seeding would overwrite the restored totals.
    pub fn restore_ledger(&mut self, snapshot: &LedgerSnapshot) -> Result<(), SessionError> {
        let nonce = self.nonce;
        match self.phase {
            BattlePhase::Start => return Err(SessionError::not_started(nonce)),
            BattlePhase::BattleEnd => return Err(SessionError::battle_over(nonce)),
            _ => {}
        }

        let roster = RosterSnapshot::capture(&self.roster);
        self.sync_records(&roster);
        if let Some(&(id, _)) = snapshot
            .readiness
            .iter()
            .find(|(id, _)| self.combatant(*id).is_none())
        {
            return Err(SessionError::unknown_combatant(id, nonce));
        }

        let threshold = self.config.threshold;
        for &(id, total) in &snapshot.readiness {
            if let Some(record) = self.record_mut(id) {
                record.readiness = Readiness::from_total(total, threshold);
            }
        }
        self.rounds = snapshot.rounds;
        self.escape = self.escape.with_ratio(snapshot.escape_ratio);
        self.refresh_preview();
        Ok(())
    }
}
