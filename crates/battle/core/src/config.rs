/// Scheduler constants and tunable parameters.
///
/// The defaults reproduce a 60 frames-per-second count-time battle where a
/// combatant of average speed fills its gauge in one second of ticks.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    /// Readiness value that grants a turn.
    pub threshold: u32,

    /// Readiness gained per tick by a combatant whose rate is exactly 1.0.
    pub base_delta: f64,

    /// Number of upcoming subjects shown in the turn preview.
    pub preview_depth: usize,

    /// How far the ledger advances on a single `tick` call.
    pub advance_mode: AdvanceMode,

    /// How the global round counter accumulates.
    pub round_delta: RoundDelta,

    /// Escape is only offered when this is set.
    pub can_escape: bool,

    /// Escape ratio before speed scaling (`base * party_speed / troop_speed`).
    pub escape_base: f64,

    /// Added to the escape ratio after each failed attempt (before `escape_rate`).
    pub escape_step: f64,

    /// Multiplier applied to both the initial escape ratio and every step.
    pub escape_rate: f64,

    /// Skill cast by the synthetic auto-life subject. `None` disables auto-life.
    pub auto_life_skill: Option<u32>,

    /// Upper bound on ledger advances performed by [`AdvanceMode::UntilReady`]
    /// and on simulated ticks performed by the predictor.
    pub max_simulated_ticks: u32,
}

impl BattleConfig {
    // ===== compile-time constants used as type parameters =====
    /// Capacity of the preview buffer.
    pub const MAX_PREVIEW: usize = 8;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_THRESHOLD: u32 = 65_536;
    pub const DEFAULT_FRAMES_PER_GAUGE: f64 = 60.0;
    pub const DEFAULT_PREVIEW_DEPTH: usize = 5;
    pub const DEFAULT_ESCAPE_BASE: f64 = 0.25;
    pub const DEFAULT_ESCAPE_STEP: f64 = 0.1;
    pub const DEFAULT_MAX_SIMULATED_TICKS: u32 = 100_000;

    pub fn new() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
            base_delta: f64::from(Self::DEFAULT_THRESHOLD) / Self::DEFAULT_FRAMES_PER_GAUGE,
            preview_depth: Self::DEFAULT_PREVIEW_DEPTH,
            advance_mode: AdvanceMode::PerTick,
            round_delta: RoundDelta::PerRoster,
            can_escape: true,
            escape_base: Self::DEFAULT_ESCAPE_BASE,
            escape_step: Self::DEFAULT_ESCAPE_STEP,
            escape_rate: 1.0,
            auto_life_skill: None,
            max_simulated_ticks: Self::DEFAULT_MAX_SIMULATED_TICKS,
        }
    }

    pub fn with_advance_mode(mut self, advance_mode: AdvanceMode) -> Self {
        self.advance_mode = advance_mode;
        self
    }

    pub fn with_round_delta(mut self, round_delta: RoundDelta) -> Self {
        self.round_delta = round_delta;
        self
    }

    pub fn with_preview_depth(mut self, preview_depth: usize) -> Self {
        self.preview_depth = preview_depth;
        self
    }

    pub fn with_auto_life_skill(mut self, skill: u32) -> Self {
        self.auto_life_skill = Some(skill);
        self
    }

    pub fn without_escape(mut self) -> Self {
        self.can_escape = false;
        self
    }

    /// Readiness a combatant is seeded below at a normal battle start.
    pub fn initial_readiness_bound(&self) -> u32 {
        self.threshold / 2
    }

    /// Rejects values the scheduler cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threshold == 0 {
            return Err(ConfigError::ZeroThreshold);
        }
        if !self.base_delta.is_finite() || self.base_delta <= 0.0 {
            return Err(ConfigError::InvalidBaseDelta(self.base_delta));
        }
        if self.preview_depth == 0 || self.preview_depth > Self::MAX_PREVIEW {
            return Err(ConfigError::PreviewDepth {
                depth: self.preview_depth,
                max: Self::MAX_PREVIEW,
            });
        }
        for (name, value) in [
            ("escape_base", self.escape_base),
            ("escape_step", self.escape_step),
            ("escape_rate", self.escape_rate),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidEscapeParameter { name, value });
            }
        }
        if self.can_escape && self.escape_step * self.escape_rate <= 0.0 {
            return Err(ConfigError::NonIncreasingEscape);
        }
        if self.max_simulated_ticks == 0 {
            return Err(ConfigError::ZeroSimulationBound);
        }
        Ok(())
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Ledger advancement per `tick` call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AdvanceMode {
    /// Advance once per tick; a frame may pass with nobody ready.
    #[default]
    PerTick,
    /// Advance repeatedly inside one tick until somebody is ready.
    UntilReady,
}

/// Accumulation policy for the global round counter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RoundDelta {
    /// `base_delta / eligible combatants` per advance: one round per
    /// threshold's worth of turns across the roster.
    #[default]
    PerRoster,
    /// `base_delta` per advance regardless of roster size.
    Fixed,
}

/// Configuration rejected by [`BattleConfig::validate`].
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("ready threshold must be positive")]
    ZeroThreshold,

    #[error("base tick delta must be a positive finite number, got {0}")]
    InvalidBaseDelta(f64),

    #[error("preview depth {depth} outside 1..={max}")]
    PreviewDepth { depth: usize, max: usize },

    #[error("escape parameter `{name}` must be a non-negative finite number, got {value}")]
    InvalidEscapeParameter { name: &'static str, value: f64 },

    #[error("failed escapes must strictly increase the escape ratio")]
    NonIncreasingEscape,

    #[error("simulation bound must be positive")]
    ZeroSimulationBound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = BattleConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.threshold, 65_536);
        assert!((config.base_delta - 65_536.0 / 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_preview_deeper_than_buffer() {
        let config = BattleConfig::default().with_preview_depth(BattleConfig::MAX_PREVIEW + 1);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PreviewDepth { .. })
        ));
    }

    #[test]
    fn rejects_zero_escape_step_only_when_escape_allowed() {
        let mut config = BattleConfig {
            escape_step: 0.0,
            ..BattleConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NonIncreasingEscape));

        config.can_escape = false;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn policies_parse_from_snake_case() {
        assert_eq!(
            "until_ready".parse::<AdvanceMode>().ok(),
            Some(AdvanceMode::UntilReady)
        );
        assert_eq!("Fixed".parse::<RoundDelta>().ok(), Some(RoundDelta::Fixed));
        assert_eq!(AdvanceMode::PerTick.to_string(), "per_tick");
    }
}
