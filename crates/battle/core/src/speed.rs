//! Speed model: how fast each combatant's readiness fills.
//!
//! Formula (default):
//! - rate = speed / mean(speed over the rate basis)
//! - delta per tick = clamp(trunc(base_delta × rate), 0, threshold)
//!
//! Rates are relative, so a death or a summon changes everybody's rate on the
//! next tick.

use crate::state::CombatantView;

/// Converts a combatant's speed stat into a multiplier of the base tick delta.
///
/// Implementations may return anything; callers go through [`guarded_rate`],
/// which floors negative and NaN results to zero.
pub trait SpeedModel: Send + Sync {
    fn rate(&self, combatant: &CombatantView, basis: &[CombatantView]) -> f64;
}

/// Speed relative to the mean speed of the basis.
#[derive(Clone, Copy, Debug, Default)]
pub struct RelativeSpeed;

impl SpeedModel for RelativeSpeed {
    fn rate(&self, combatant: &CombatantView, basis: &[CombatantView]) -> f64 {
        if basis.is_empty() {
            return 0.0;
        }
        let mean = basis.iter().map(|view| view.speed).sum::<f64>() / basis.len() as f64;
        if mean <= 0.0 {
            return 0.0;
        }
        combatant.speed / mean
    }
}

/// Speed relative to a fixed reference value, independent of the roster.
#[derive(Clone, Copy, Debug)]
pub struct AbsoluteSpeed {
    pub reference: f64,
}

impl SpeedModel for AbsoluteSpeed {
    fn rate(&self, combatant: &CombatantView, _basis: &[CombatantView]) -> f64 {
        if self.reference <= 0.0 {
            return 0.0;
        }
        combatant.speed / self.reference
    }
}

/// User-supplied formula.
pub struct FormulaSpeed<F>(pub F);

impl<F> SpeedModel for FormulaSpeed<F>
where
    F: Fn(&CombatantView, &[CombatantView]) -> f64 + Send + Sync,
{
    fn rate(&self, combatant: &CombatantView, basis: &[CombatantView]) -> f64 {
        (self.0)(combatant, basis)
    }
}

/// Evaluates the model and floors invalid results to zero.
pub fn guarded_rate<M>(model: &M, combatant: &CombatantView, basis: &[CombatantView]) -> f64
where
    M: SpeedModel + ?Sized,
{
    let rate = model.rate(combatant, basis);
    if rate.is_nan() || rate < 0.0 {
        0.0
    } else {
        rate
    }
}

/// Readiness gained in one tick at the given rate.
///
/// A single tick never yields more than one full gauge.
pub fn tick_delta(base_delta: f64, rate: f64, threshold: u32) -> u32 {
    let raw = base_delta * rate;
    if raw.is_nan() || raw <= 0.0 {
        return 0;
    }
    raw.min(f64::from(threshold)) as u32
}
