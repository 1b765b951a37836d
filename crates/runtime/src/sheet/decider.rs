use battle_core::{Action, ActionDecider, CombatantId, Decision, DecisionContext, Side};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;

use super::{Battler, SheetRoster};
use crate::scenario::{ActionPattern, PatternClock, SkillScope};

/// Decides actions for battlers that are not under player control.
///
/// Manual party members ask for input. Troop members pick the first action
/// pattern whose condition holds on the [`PatternClock`], aiming at a random
/// living opponent. Automatic party members hit the weakest enemy.
pub struct SheetDecider {
    rng: StdRng,
    clock: PatternClock,
}

impl SheetDecider {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            clock: PatternClock::default(),
        }
    }

    pub fn with_clock(mut self, clock: PatternClock) -> Self {
        self.clock = clock;
        self
    }

    fn clock_value(&self, context: &DecisionContext) -> u32 {
        match self.clock {
            PatternClock::Rounds => context.round,
            PatternClock::OwnTurns => context.turns_taken,
        }
    }

    fn weakest(roster: &SheetRoster, side: Side) -> Option<CombatantId> {
        roster
            .living(side)
            .min_by_key(|battler| battler.hp)
            .map(|battler| battler.id)
    }

    fn random(&mut self, roster: &SheetRoster, side: Side) -> Option<CombatantId> {
        roster
            .living(side)
            .choose(&mut self.rng)
            .map(|battler| battler.id)
    }

    fn pattern_action(
        &mut self,
        roster: &SheetRoster,
        battler: &Battler,
        pattern: &ActionPattern,
    ) -> Option<Action> {
        let opponents = battler.side.opponent();
        let Some(skill_id) = pattern.skill else {
            return self.random(roster, opponents).map(Action::attack);
        };
        let skill = roster.skill(skill_id)?;
        let targets = match skill.scope {
            SkillScope::Enemy => vec![self.random(roster, opponents)?],
            SkillScope::AllEnemies => roster.living(opponents).map(|b| b.id).collect(),
            SkillScope::Ally => vec![Self::weakest(roster, battler.side)?],
            SkillScope::AllAllies => roster.living(battler.side).map(|b| b.id).collect(),
            SkillScope::User => vec![battler.id],
        };
        Some(Action::skill(skill_id, targets))
    }
}

impl ActionDecider<SheetRoster> for SheetDecider {
    fn decide(&mut self, roster: &SheetRoster, context: &DecisionContext) -> Decision {
        let Some(battler) = roster.battler(context.subject).cloned() else {
            return Decision::Auto(Vec::new());
        };
        if battler.manual && battler.side == Side::Party {
            return Decision::ManualInput {
                slots: battler.action_slots,
            };
        }

        let now = self.clock_value(context);
        let action = match battler.side {
            Side::Troop => battler
                .patterns
                .iter()
                .filter(|pattern| {
                    pattern
                        .condition
                        .is_none_or(|condition| condition.is_met(now))
                })
                .find_map(|pattern| self.pattern_action(roster, &battler, pattern))
                .or_else(|| self.random(roster, Side::Party).map(Action::attack)),
            Side::Party => Self::weakest(roster, Side::Troop).map(Action::attack),
        };
        tracing::debug!("{} decided {:?}", battler.name, action);

        Decision::Auto(action.into_iter().collect())
    }
}
