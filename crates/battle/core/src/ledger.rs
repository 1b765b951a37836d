//! Waiting-point ledger: the authoritative readiness bookkeeping.
//!
//! Invariants:
//! - A single advance adds at most one threshold to any combatant.
//! - The gauge never exceeds the threshold; the excess is banked as overflow.
//! - A completed turn removes exactly one threshold from the total.
//! - Dead combatants are never mutated by `advance`.

use crate::config::{BattleConfig, RoundDelta};
use crate::env::RosterSnapshot;
use crate::speed::{SpeedModel, guarded_rate, tick_delta};
use crate::state::{Combatant, CombatantId};

/// Readiness each living combatant gains per advance, in roster order.
///
/// Shared by the live ledger and the predictor so that both use the same math.
pub fn tick_gains<M>(
    snapshot: &RosterSnapshot,
    model: &M,
    config: &BattleConfig,
) -> Vec<(CombatantId, u32)>
where
    M: SpeedModel + ?Sized,
{
    let basis = snapshot.rate_basis();
    snapshot
        .views()
        .iter()
        .filter(|view| view.is_alive())
        .map(|view| {
            let rate = guarded_rate(model, view, &basis);
            (view.id, tick_delta(config.base_delta, rate, config.threshold))
        })
        .collect()
}

/// Global round counter, independent of any single combatant.
///
/// Accumulates a share of the base delta on every advance and rolls over into
/// a new round at each threshold. Turn-count conditions read [`rounds`](Self::rounds).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundCounter {
    carry: u32,
    rounds: u32,
}

impl RoundCounter {
    pub fn new(carry: u32, rounds: u32) -> Self {
        Self { carry, rounds }
    }

    pub fn carry(&self) -> u32 {
        self.carry
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Adds `delta` and returns how many rounds elapsed.
    pub fn accumulate(&mut self, delta: u32, threshold: u32) -> u32 {
        self.carry = self.carry.saturating_add(delta);
        let mut elapsed = 0;
        while self.carry >= threshold {
            self.carry -= threshold;
            self.rounds += 1;
            elapsed += 1;
        }
        elapsed
    }
}

/// Result of advancing the ledger.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdvanceReport {
    /// Number of advances performed.
    pub steps: u32,
    /// Sum of readiness handed out.
    pub gained: u64,
    /// Round numbers that elapsed, in order.
    pub elapsed_rounds: Vec<u32>,
}

/// Readiness operations over the session's combatant records.
pub struct Ledger<'a, M: ?Sized> {
    config: &'a BattleConfig,
    model: &'a M,
}

impl<'a, M> Ledger<'a, M>
where
    M: SpeedModel + ?Sized,
{
    pub fn new(config: &'a BattleConfig, model: &'a M) -> Self {
        Self { config, model }
    }

    /// Round counter share for one advance.
    pub fn round_delta(&self, snapshot: &RosterSnapshot) -> u32 {
        match self.config.round_delta {
            RoundDelta::Fixed => tick_delta(self.config.base_delta, 1.0, self.config.threshold),
            RoundDelta::PerRoster => {
                let eligible = snapshot.rate_basis().len();
                if eligible == 0 {
                    return 0;
                }
                tick_delta(
                    self.config.base_delta / eligible as f64,
                    1.0,
                    self.config.threshold,
                )
            }
        }
    }

    /// Performs one advance of every living combatant and of the round counter.
    pub fn advance(
        &self,
        records: &mut [Combatant],
        snapshot: &RosterSnapshot,
        rounds: &mut RoundCounter,
    ) -> AdvanceReport {
        let gains = tick_gains(snapshot, self.model, self.config);
        let mut report = AdvanceReport::default();
        self.apply(records, &gains, snapshot, rounds, &mut report);
        report
    }

    /// Advances until some living combatant is ready, a stall is detected, or
    /// `max_simulated_ticks` advances were made.
    pub fn advance_until_ready(
        &self,
        records: &mut [Combatant],
        snapshot: &RosterSnapshot,
        rounds: &mut RoundCounter,
    ) -> AdvanceReport {
        let gains = tick_gains(snapshot, self.model, self.config);
        let mut report = AdvanceReport::default();
        loop {
            self.apply(records, &gains, snapshot, rounds, &mut report);
            let someone_ready = records
                .iter()
                .any(|record| record.is_ready(self.config.threshold));
            let stalled = gains.iter().all(|&(_, gain)| gain == 0);
            if someone_ready || stalled || report.steps >= self.config.max_simulated_ticks {
                return report;
            }
        }
    }

    fn apply(
        &self,
        records: &mut [Combatant],
        gains: &[(CombatantId, u32)],
        snapshot: &RosterSnapshot,
        rounds: &mut RoundCounter,
        report: &mut AdvanceReport,
    ) {
        let threshold = self.config.threshold;
        for &(id, gain) in gains {
            if let Some(record) = records.iter_mut().find(|record| record.id == id) {
                if !record.alive {
                    continue;
                }
                record.readiness = record.readiness.gained(gain, threshold);
                report.gained += u64::from(gain);
            }
        }

        for _ in 0..rounds.accumulate(self.round_delta(snapshot), threshold) {
            report.elapsed_rounds.push(rounds.rounds());
        }
        report.steps += 1;
    }

    /// Removes one threshold from the subject after its turn.
    ///
    /// Returns `false` (and leaves the record untouched) when the total is
    /// below the threshold, which happens for interrupt turns.
    pub fn reset_after_turn(&self, record: &mut Combatant) -> bool {
        if !record.alive {
            return false;
        }
        match record.readiness.spent(self.config.threshold) {
            Some(rest) => {
                record.readiness = rest;
                true
            }
            None => false,
        }
    }

    /// First ready combatant in roster order.
    pub fn first_ready(
        &self,
        records: &[Combatant],
        snapshot: &RosterSnapshot,
    ) -> Option<CombatantId> {
        snapshot
            .views()
            .iter()
            .filter(|view| view.is_alive())
            .find_map(|view| {
                records
                    .iter()
                    .find(|record| record.id == view.id)
                    .filter(|record| record.is_ready(self.config.threshold))
                    .map(|record| record.id)
            })
    }
}
