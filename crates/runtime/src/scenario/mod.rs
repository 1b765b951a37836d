//! Scenario system for battle setup.
//!
//! A scenario lists the party and troop sheets plus the skills they may use.
//! Scenarios are plain RON documents so the same encounter can be replayed
//! with different seeds or scheduler settings.

use std::path::Path;

use battle_core::{BattleConfig, Initiative, Side, TurnCondition};
use serde::{Deserialize, Serialize};

use crate::api::{Result, RuntimeError};
use crate::sheet::{Battler, SheetRoster};

/// Who a skill affects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillScope {
    #[default]
    Enemy,
    AllEnemies,
    Ally,
    AllAllies,
    User,
}

impl SkillScope {
    pub fn targets_opponents(self) -> bool {
        matches!(self, SkillScope::Enemy | SkillScope::AllEnemies)
    }
}

/// Flat skill definition.
///
/// `power` damages opponents and heals allies. A reviving skill raises dead
/// targets with `power` HP (at least 1).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkillSheet {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub scope: SkillScope,
    #[serde(default)]
    pub power: i32,
    #[serde(default)]
    pub revive: bool,
    /// Turns the target loses.
    #[serde(default)]
    pub stun: u32,
}

/// Counter that action pattern conditions are checked against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternClock {
    /// Elapsed battle rounds, shared by every enemy.
    #[default]
    Rounds,
    /// The enemy's own scheduled turns.
    OwnTurns,
}

/// One entry of an enemy's action list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPattern {
    /// `None` is a plain attack.
    #[serde(default)]
    pub skill: Option<u32>,
    /// Checked against the scenario's [`PatternClock`].
    #[serde(default)]
    pub condition: Option<TurnCondition>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombatantSheet {
    pub name: String,
    pub hp: i32,
    pub attack: i32,
    #[serde(default)]
    pub defense: i32,
    pub speed: f64,
    /// Commands come from the command provider instead of the AI.
    #[serde(default)]
    pub manual: bool,
    #[serde(default = "default_action_slots")]
    pub action_slots: usize,
    /// Revived once by the auto-life skill after falling.
    #[serde(default)]
    pub auto_life: bool,
    #[serde(default)]
    pub patterns: Vec<ActionPattern>,
}

fn default_action_slots() -> usize {
    1
}

/// Battle setup loaded from RON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub initiative: Initiative,
    /// Overrides the runtime seed when set.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Overrides `BattleConfig::can_escape` when set (boss battles).
    #[serde(default)]
    pub can_escape: Option<bool>,
    /// Enables auto-life with this reviving skill.
    #[serde(default)]
    pub auto_life_skill: Option<u32>,
    #[serde(default)]
    pub pattern_clock: PatternClock,
    pub party: Vec<CombatantSheet>,
    pub troop: Vec<CombatantSheet>,
    #[serde(default)]
    pub skills: Vec<SkillSheet>,
}

impl Scenario {
    pub fn from_ron_str(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| RuntimeError::ron("scenario", e))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| RuntimeError::io(path, e))?;
        let scenario = Self::from_ron_str(&text)?;
        tracing::info!(
            "Loaded scenario '{}' from {} ({} vs {})",
            scenario.name,
            path.display(),
            scenario.party.len(),
            scenario.troop.len()
        );
        Ok(scenario)
    }

    /// Battle configuration with the scenario's overrides applied.
    pub fn battle_config(&self, base: &BattleConfig) -> BattleConfig {
        let mut config = base.clone();
        if let Some(can_escape) = self.can_escape {
            config.can_escape = can_escape;
        }
        if self.auto_life_skill.is_some() {
            config.auto_life_skill = self.auto_life_skill;
        }
        config
    }

    pub fn validate(&self, config: &BattleConfig) -> Result<()> {
        if self.party.is_empty() || self.troop.is_empty() {
            return Err(RuntimeError::InvalidScenario(
                "both party and troop need at least one member".to_string(),
            ));
        }

        if let Some(sheet) = self.troop.iter().find(|sheet| sheet.manual) {
            return Err(RuntimeError::InvalidScenario(format!(
                "troop member '{}' cannot take manual input",
                sheet.name
            )));
        }

        for sheet in self.party.iter().chain(&self.troop) {
            if sheet.hp <= 0 {
                return Err(RuntimeError::InvalidScenario(format!(
                    "'{}' must start with positive HP",
                    sheet.name
                )));
            }
            if !sheet.speed.is_finite() || sheet.speed < 0.0 {
                return Err(RuntimeError::InvalidScenario(format!(
                    "'{}' has invalid speed {}",
                    sheet.name, sheet.speed
                )));
            }
            if sheet.action_slots == 0 {
                return Err(RuntimeError::InvalidScenario(format!(
                    "'{}' needs at least one action slot",
                    sheet.name
                )));
            }
            for pattern in &sheet.patterns {
                if let Some(skill) = pattern.skill
                    && self.skill(skill).is_none()
                {
                    return Err(RuntimeError::InvalidScenario(format!(
                        "'{}' uses unknown skill {}",
                        sheet.name, skill
                    )));
                }
            }
        }

        if let Some(skill) = config.auto_life_skill {
            match self.skill(skill) {
                Some(sheet) if sheet.revive => {}
                Some(sheet) => {
                    return Err(RuntimeError::InvalidScenario(format!(
                        "auto-life skill '{}' does not revive",
                        sheet.name
                    )));
                }
                None => {
                    return Err(RuntimeError::InvalidScenario(format!(
                        "auto-life skill {skill} is not defined"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn skill(&self, id: u32) -> Option<&SkillSheet> {
        self.skills.iter().find(|skill| skill.id == id)
    }

    /// Builds the roster: party first, then troop, in sheet order.
    pub fn build_roster(&self) -> SheetRoster {
        let party = self.party.iter().map(|sheet| (Side::Party, sheet));
        let troop = self.troop.iter().map(|sheet| (Side::Troop, sheet));
        let battlers = party
            .chain(troop)
            .enumerate()
            .map(|(index, (side, sheet))| Battler::from_sheet(index as u32, side, sheet))
            .collect();
        SheetRoster::new(battlers, self.skills.clone())
    }
}
