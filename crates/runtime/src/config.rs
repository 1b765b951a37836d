//! Runtime configuration structures and loaders.

use std::env;
use std::path::Path;
use std::str::FromStr;

use battle_core::{AdvanceMode, BattleConfig};
use serde::{Deserialize, Serialize};

use crate::api::{Result, RuntimeError};

/// Settings of the battle driver on top of the scheduler's [`BattleConfig`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub battle: BattleConfig,
    /// Ticks per second; `0` runs the battle as fast as possible.
    pub frame_rate: u32,
    pub event_buffer_size: usize,
    /// The battle is aborted after this many ticks.
    pub max_ticks: u64,
    /// Fallback seed when the scenario has none. Random when unset.
    pub seed: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            battle: BattleConfig::default(),
            frame_rate: 0,
            event_buffer_size: 100,
            max_ticks: 1_000_000,
            seed: None,
        }
    }
}

impl RuntimeConfig {
    /// Loads a RON configuration file. Missing fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| RuntimeError::io(path, e))?;
        let config: Self =
            ron::from_str(&text).map_err(|e| RuntimeError::ron(path.display().to_string(), e))?;
        config.battle.validate()?;
        tracing::debug!("Loaded runtime config from {}", path.display());
        Ok(config)
    }

    /// Construct configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Applies process environment variables on top of `self`.
    ///
    /// Environment variables:
    /// - `CTB_FRAME_RATE` - Ticks per second, 0 for unpaced (default: 0)
    /// - `CTB_EVENT_BUFFER` - Event bus capacity per topic (default: 100)
    /// - `CTB_MAX_TICKS` - Tick limit before the battle is aborted
    /// - `CTB_SEED` - Fallback battle seed
    /// - `CTB_ADVANCE_MODE` - `per_tick` or `until_ready`
    /// - `CTB_PREVIEW_DEPTH` - Number of predicted subjects
    /// - `CTB_CAN_ESCAPE` - Whether escape is offered
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| env::var(key).ok())
    }

    /// Applies overrides read through `lookup`, ignoring unparsable values.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(rate) = read_var::<u32>(&lookup, "CTB_FRAME_RATE") {
            self.frame_rate = rate;
        }
        if let Some(capacity) = read_var::<usize>(&lookup, "CTB_EVENT_BUFFER") {
            self.event_buffer_size = capacity.max(1);
        }
        if let Some(limit) = read_var::<u64>(&lookup, "CTB_MAX_TICKS") {
            self.max_ticks = limit;
        }
        if let Some(seed) = read_var::<u64>(&lookup, "CTB_SEED") {
            self.seed = Some(seed);
        }
        if let Some(mode) = read_var::<AdvanceMode>(&lookup, "CTB_ADVANCE_MODE") {
            self.battle.advance_mode = mode;
        }
        if let Some(depth) = read_var::<usize>(&lookup, "CTB_PREVIEW_DEPTH") {
            self.battle.preview_depth = depth;
        }
        if let Some(can_escape) = read_bool(&lookup, "CTB_CAN_ESCAPE") {
            self.battle.can_escape = can_escape;
        }
        self
    }
}

fn read_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: FromStr,
{
    lookup(key)?.trim().parse().ok()
}

fn read_bool(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<bool> {
    match lookup(key)?.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn overrides_replace_only_parsable_values() {
        let config = RuntimeConfig::default().with_overrides(lookup(&[
            ("CTB_FRAME_RATE", "60"),
            ("CTB_ADVANCE_MODE", "until_ready"),
            ("CTB_CAN_ESCAPE", "off"),
            ("CTB_PREVIEW_DEPTH", "many"),
        ]));

        assert_eq!(config.frame_rate, 60);
        assert_eq!(config.battle.advance_mode, AdvanceMode::UntilReady);
        assert!(!config.battle.can_escape);
        assert_eq!(config.battle.preview_depth, BattleConfig::DEFAULT_PREVIEW_DEPTH);
    }

    #[test]
    fn event_buffer_never_drops_to_zero() {
        let config =
            RuntimeConfig::default().with_overrides(lookup(&[("CTB_EVENT_BUFFER", "0")]));
        assert_eq!(config.event_buffer_size, 1);
    }
}
