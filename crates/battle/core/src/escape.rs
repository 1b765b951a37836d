//! Party escape: the ratio, its growth on failure, and attempt resolution.
//!
//! The escape ratio never decreases during a battle; every failed attempt
//! raises it by `escape_step × escape_rate`.

use crate::config::BattleConfig;

/// Outcome of one escape attempt.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EscapeOutcome {
    Escaped,
    /// The attempt failed; `ratio` is the raised ratio for the next attempt.
    Failed { ratio: f64 },
}

impl EscapeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Escaped)
    }
}

/// Escape state of a battle session.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EscapeState {
    /// `None` when the battle cannot be escaped.
    ratio: Option<f64>,
    step: f64,
    escaped: bool,
}

impl EscapeState {
    /// Computes the starting ratio from the mean speeds of both sides.
    ///
    /// A troop with no measurable speed makes escape certain; a party with no
    /// measurable speed makes it impossible until failures raise the ratio.
    pub fn new(config: &BattleConfig, party_speed: Option<f64>, troop_speed: Option<f64>) -> Self {
        let step = config.escape_step * config.escape_rate;
        if !config.can_escape {
            return Self {
                ratio: None,
                step,
                escaped: false,
            };
        }
        let relative = match (party_speed, troop_speed) {
            (_, None) => f64::INFINITY,
            (Some(party), Some(troop)) if troop > 0.0 => (party / troop).max(0.0),
            (Some(_), Some(_)) => f64::INFINITY,
            (None, Some(_)) => 0.0,
        };
        Self {
            ratio: Some(config.escape_base * relative * config.escape_rate),
            step,
            escaped: false,
        }
    }

    /// Restores a ratio captured in a snapshot.
    pub fn with_ratio(mut self, ratio: Option<f64>) -> Self {
        self.ratio = ratio;
        self
    }

    pub fn ratio(&self) -> Option<f64> {
        self.ratio
    }

    pub fn is_available(&self) -> bool {
        self.ratio.is_some() && !self.escaped
    }

    pub fn is_escaped(&self) -> bool {
        self.escaped
    }

    /// Resolves one attempt against a uniform `roll` in `[0, 1)`.
    ///
    /// Returns `None` when the battle has no escape ratio.
    pub fn attempt(&mut self, preemptive: bool, roll: f64) -> Option<EscapeOutcome> {
        let ratio = self.ratio?;
        if preemptive || roll < ratio {
            self.escaped = true;
            return Some(EscapeOutcome::Escaped);
        }
        let raised = ratio + self.step;
        self.ratio = Some(raised);
        Some(EscapeOutcome::Failed { ratio: raised })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_scales_with_relative_speed() {
        let config = BattleConfig::default();
        let state = EscapeState::new(&config, Some(20.0), Some(10.0));
        assert_eq!(state.ratio(), Some(0.5));
    }

    #[test]
    fn failures_strictly_increase_ratio() {
        let config = BattleConfig::default();
        let mut state = EscapeState::new(&config, Some(10.0), Some(40.0));
        let mut previous = state.ratio().unwrap();
        for _ in 0..5 {
            match state.attempt(false, 0.999) {
                Some(EscapeOutcome::Failed { ratio }) => {
                    assert!(ratio > previous);
                    previous = ratio;
                }
                other => panic!("unexpected outcome {other:?}"),
            }
        }
        assert!(!state.is_escaped());
    }

    #[test]
    fn preemptive_always_escapes() {
        let config = BattleConfig::default();
        let mut state = EscapeState::new(&config, Some(1.0), Some(100.0));
        assert_eq!(state.attempt(true, 0.999), Some(EscapeOutcome::Escaped));
        assert!(state.is_escaped());
        assert!(!state.is_available());
    }

    #[test]
    fn rate_multiplies_base_and_step() {
        let config = BattleConfig {
            escape_rate: 2.0,
            ..BattleConfig::default()
        };
        let mut state = EscapeState::new(&config, Some(10.0), Some(10.0));
        assert_eq!(state.ratio(), Some(0.5));
        assert_eq!(
            state.attempt(false, 0.9),
            Some(EscapeOutcome::Failed { ratio: 0.7 })
        );
    }

    #[test]
    fn unescapable_battle_has_no_ratio() {
        let config = BattleConfig::default().without_escape();
        let mut state = EscapeState::new(&config, Some(10.0), Some(10.0));
        assert_eq!(state.ratio(), None);
        assert_eq!(state.attempt(false, 0.0), None);
    }
}
