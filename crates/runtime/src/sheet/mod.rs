//! In-memory battlers backing the scheduler's roster oracle.
//!
//! The scheduler only reads these through [`RosterOracle`]; HP, damage and
//! states are mutated by [`SheetResolver`] while a turn executes.
mod decider;
mod resolver;

pub use decider::SheetDecider;
pub use resolver::SheetResolver;

use battle_core::{CombatantId, RosterOracle, Side};
use serde::Serialize;

use crate::scenario::{ActionPattern, CombatantSheet, SkillSheet};

/// Live combat state of one battler.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Battler {
    pub id: CombatantId,
    pub name: String,
    pub side: Side,
    pub hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: f64,
    pub manual: bool,
    pub action_slots: usize,
    pub auto_life: bool,
    /// Remaining turns without acting.
    pub stun: u32,
    pub guarding: bool,
    #[serde(skip)]
    pub patterns: Vec<ActionPattern>,
}

impl Battler {
    pub fn from_sheet(id: u32, side: Side, sheet: &CombatantSheet) -> Self {
        Self {
            id: CombatantId(id),
            name: sheet.name.clone(),
            side,
            hp: sheet.hp,
            max_hp: sheet.hp,
            attack: sheet.attack,
            defense: sheet.defense,
            speed: sheet.speed,
            manual: sheet.manual,
            action_slots: sheet.action_slots,
            auto_life: sheet.auto_life,
            stun: 0,
            guarding: false,
            patterns: sheet.patterns.clone(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Applies damage after defense and guarding; returns the HP lost.
    pub fn take_damage(&mut self, raw: i32) -> i32 {
        let mut damage = (raw - self.defense).max(1);
        if self.guarding {
            damage = (damage / 2).max(1);
        }
        let lost = damage.min(self.hp);
        self.hp -= lost;
        lost
    }

    pub fn heal(&mut self, amount: i32) {
        if self.is_alive() {
            self.hp = (self.hp + amount.max(0)).min(self.max_hp);
        }
    }

    pub fn revive(&mut self, hp: i32) {
        if !self.is_alive() {
            self.hp = hp.clamp(1, self.max_hp);
            self.stun = 0;
            self.guarding = false;
        }
    }
}

/// Roster of battlers in stable order (party first, then troop).
#[derive(Clone, Debug, Default)]
pub struct SheetRoster {
    battlers: Vec<Battler>,
    skills: Vec<SkillSheet>,
}

impl SheetRoster {
    pub fn new(battlers: Vec<Battler>, skills: Vec<SkillSheet>) -> Self {
        Self { battlers, skills }
    }

    pub fn battlers(&self) -> &[Battler] {
        &self.battlers
    }

    pub fn battlers_mut(&mut self) -> &mut [Battler] {
        &mut self.battlers
    }

    pub fn battler(&self, id: CombatantId) -> Option<&Battler> {
        self.battlers.iter().find(|battler| battler.id == id)
    }

    pub fn battler_mut(&mut self, id: CombatantId) -> Option<&mut Battler> {
        self.battlers.iter_mut().find(|battler| battler.id == id)
    }

    pub fn skill(&self, id: u32) -> Option<&SkillSheet> {
        self.skills.iter().find(|skill| skill.id == id)
    }

    pub fn name(&self, id: CombatantId) -> Option<&str> {
        self.battler(id).map(|battler| battler.name.as_str())
    }

    pub fn living(&self, side: Side) -> impl Iterator<Item = &Battler> {
        self.battlers
            .iter()
            .filter(move |battler| battler.side == side && battler.is_alive())
    }

    pub fn survivors(&self) -> Vec<String> {
        self.battlers
            .iter()
            .filter(|battler| battler.is_alive())
            .map(|battler| battler.name.clone())
            .collect()
    }
}

impl RosterOracle for SheetRoster {
    fn active_combatants(&self) -> Vec<CombatantId> {
        self.battlers.iter().map(|battler| battler.id).collect()
    }

    fn side(&self, id: CombatantId) -> Option<Side> {
        self.battler(id).map(|battler| battler.side)
    }

    fn is_alive(&self, id: CombatantId) -> bool {
        self.battler(id).is_some_and(Battler::is_alive)
    }

    fn can_act(&self, id: CombatantId) -> bool {
        self.battler(id)
            .is_some_and(|battler| battler.is_alive() && battler.stun == 0)
    }

    fn can_input(&self, id: CombatantId) -> bool {
        self.battler(id)
            .is_some_and(|battler| battler.is_alive() && battler.manual)
    }

    fn speed_stat(&self, id: CombatantId) -> f64 {
        self.battler(id).map_or(0.0, |battler| battler.speed)
    }

    fn has_pending_revival(&self, id: CombatantId) -> bool {
        self.battler(id)
            .is_some_and(|battler| !battler.is_alive() && battler.auto_life)
    }
}
