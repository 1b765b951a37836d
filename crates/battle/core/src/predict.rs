//! Turn-order prediction.
//!
//! Runs the ledger math forward on private copies of the readiness totals.
//! The live records are never touched, so the prediction can be recomputed on
//! every tick and simply goes stale when the roster changes.

use arrayvec::ArrayVec;

use crate::config::BattleConfig;
use crate::env::RosterSnapshot;
use crate::ledger::tick_gains;
use crate::speed::SpeedModel;
use crate::state::{Combatant, CombatantId};

/// Upcoming subjects in schedule order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Prediction {
    pub order: ArrayVec<CombatantId, { BattleConfig::MAX_PREVIEW }>,
    /// False when the simulation stopped before reaching the requested depth
    /// (nobody gains readiness, or the simulation bound was hit).
    pub complete: bool,
}

/// Predicts the next `depth` subjects (capped at [`BattleConfig::MAX_PREVIEW`]).
///
/// Combatants that are ready in the same simulated tick are emitted in roster
/// order, and one that is still ready after its turn goes again before the
/// next entry. Dead combatants never appear.
pub fn predict<M>(
    records: &[Combatant],
    snapshot: &RosterSnapshot,
    model: &M,
    config: &BattleConfig,
    depth: usize,
) -> Prediction
where
    M: SpeedModel + ?Sized,
{
    let depth = depth.min(BattleConfig::MAX_PREVIEW);
    let threshold = config.threshold;
    let mut prediction = Prediction::default();
    if depth == 0 {
        prediction.complete = true;
        return prediction;
    }

    let mut clones: Vec<(CombatantId, u32, u32)> = tick_gains(snapshot, model, config)
        .into_iter()
        .map(|(id, gain)| {
            let total = records
                .iter()
                .find(|record| record.id == id)
                .map_or(0, |record| record.readiness.total());
            (id, total, gain)
        })
        .collect();
    let stalled = clones.iter().all(|&(_, _, gain)| gain == 0);

    for _ in 0..=config.max_simulated_ticks {
        // The first ready combatant is taken again after each turn, so a
        // total holding several thresholds of overflow acts back to back.
        while let Some((id, total, _)) = clones.iter_mut().find(|clone| clone.1 >= threshold) {
            *total -= threshold;
            prediction.order.push(*id);
            if prediction.order.len() == depth {
                prediction.complete = true;
                return prediction;
            }
        }
        if stalled {
            return prediction;
        }
        for (_, total, gain) in clones.iter_mut() {
            *total = total.saturating_add(*gain);
        }
    }

    prediction
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Ledger, RoundCounter};
    use crate::speed::{FormulaSpeed, RelativeSpeed};
    use crate::state::{CombatantFlags, CombatantView, Readiness, Side};

    const T: u32 = 65_536;

    fn setup(speeds: &[f64]) -> (Vec<Combatant>, RosterSnapshot) {
        let records = (0..speeds.len() as u32)
            .map(|i| Combatant::new(CombatantId(i), Side::Party))
            .collect();
        let views = speeds
            .iter()
            .enumerate()
            .map(|(i, &speed)| CombatantView::new(CombatantId(i as u32), Side::Party, speed))
            .collect();
        (records, RosterSnapshot::from_views(views))
    }

    #[test]
    fn prediction_matches_live_schedule() {
        let config = BattleConfig::default();
        let (mut records, snapshot) = setup(&[10.0, 20.0, 15.0]);
        records[2].readiness = Readiness::from_total(30_000, T);

        let predicted = predict(&records, &snapshot, &RelativeSpeed, &config, 6);
        assert!(predicted.complete);

        let ledger = Ledger::new(&config, &RelativeSpeed);
        let mut rounds = RoundCounter::default();
        let mut live = Vec::new();
        while live.len() < 6 {
            match ledger.first_ready(&records, &snapshot) {
                Some(id) => {
                    live.push(id);
                    let record = records.iter_mut().find(|r| r.id == id).unwrap();
                    ledger.reset_after_turn(record);
                }
                None => {
                    ledger.advance(&mut records, &snapshot, &mut rounds);
                }
            }
        }

        assert_eq!(predicted.order.as_slice(), live.as_slice());
    }

    #[test]
    fn banked_overflow_repeats_the_same_subject_first() {
        let config = BattleConfig::default();
        let (mut records, snapshot) = setup(&[10.0, 10.0]);
        records[0].readiness = Readiness::from_total(2 * T + 10, T);
        records[1].readiness = Readiness::from_total(T, T);

        let predicted = predict(&records, &snapshot, &RelativeSpeed, &config, 3);
        assert_eq!(
            predicted.order.as_slice(),
            &[CombatantId(0), CombatantId(0), CombatantId(1)]
        );

        let ledger = Ledger::new(&config, &RelativeSpeed);
        let mut live = Vec::new();
        while live.len() < 3 {
            let id = ledger.first_ready(&records, &snapshot).unwrap();
            live.push(id);
            let record = records.iter_mut().find(|r| r.id == id).unwrap();
            ledger.reset_after_turn(record);
        }
        assert_eq!(predicted.order.as_slice(), live.as_slice());
    }

    #[test]
    fn prediction_is_deterministic_and_non_mutating() {
        let config = BattleConfig::default();
        let (records, snapshot) = setup(&[7.0, 11.0, 13.0, 17.0]);
        let before = records.clone();

        let first = predict(&records, &snapshot, &RelativeSpeed, &config, 5);
        let second = predict(&records, &snapshot, &RelativeSpeed, &config, 5);

        assert_eq!(first, second);
        assert_eq!(records, before);
    }

    #[test]
    fn simultaneous_readiness_breaks_ties_by_roster_order() {
        let config = BattleConfig::default();
        let (mut records, snapshot) = setup(&[10.0, 10.0, 10.0]);
        for record in &mut records {
            record.readiness = Readiness::from_total(T, T);
        }

        let predicted = predict(&records, &snapshot, &RelativeSpeed, &config, 3);

        assert_eq!(
            predicted.order.as_slice(),
            &[CombatantId(0), CombatantId(1), CombatantId(2)]
        );
    }

    #[test]
    fn zero_rates_return_partial_result() {
        let config = BattleConfig::default();
        let (mut records, snapshot) = setup(&[10.0, 10.0]);
        records[1].readiness = Readiness::from_total(T, T);
        let frozen = FormulaSpeed(|_: &CombatantView, _: &[CombatantView]| 0.0);

        let predicted = predict(&records, &snapshot, &frozen, &config, 5);

        assert!(!predicted.complete);
        assert_eq!(predicted.order.as_slice(), &[CombatantId(1)]);
    }

    #[test]
    fn dead_combatants_are_excluded() {
        let config = BattleConfig::default();
        let (mut records, _) = setup(&[10.0, 30.0]);
        records[1].alive = false;
        let snapshot = RosterSnapshot::from_views(vec![
            CombatantView::new(CombatantId(0), Side::Party, 10.0),
            CombatantView::new(CombatantId(1), Side::Party, 30.0)
                .with_flags(CombatantFlags::empty()),
        ]);

        let predicted = predict(&records, &snapshot, &RelativeSpeed, &config, 5);

        assert!(predicted.complete);
        assert!(predicted.order.iter().all(|&id| id == CombatantId(0)));
    }
}
