use battle_core::{Action, ActionKind, ActionResolver, CombatantId, Resolution, Side, Subject};

use super::SheetRoster;

/// Flat-damage action resolution over [`SheetRoster`].
///
/// Every action completes in one tick. Attacks on a fallen target move to the
/// first living opponent.
#[derive(Clone, Copy, Debug, Default)]
pub struct SheetResolver;

impl SheetResolver {
    fn retarget(roster: &SheetRoster, side: Side, target: CombatantId) -> Option<CombatantId> {
        if roster.battler(target).is_some_and(|b| b.is_alive()) {
            return Some(target);
        }
        roster
            .living(side)
            .next()
            .map(|battler| battler.id)
    }

    fn attack(roster: &mut SheetRoster, user: Option<CombatantId>, targets: &[CombatantId]) {
        let Some(attacker) = user.and_then(|id| roster.battler(id)).cloned() else {
            return;
        };
        let Some(target) = targets
            .first()
            .and_then(|&target| Self::retarget(roster, attacker.side.opponent(), target))
        else {
            return;
        };
        if let Some(defender) = roster.battler_mut(target) {
            let lost = defender.take_damage(attacker.attack);
            tracing::debug!(
                "{} attacks {} for {} (hp {})",
                attacker.name,
                defender.name,
                lost,
                defender.hp
            );
        }
    }

    fn skill(
        roster: &mut SheetRoster,
        user: Option<CombatantId>,
        skill_id: u32,
        targets: &[CombatantId],
    ) {
        let Some(skill) = roster.skill(skill_id).cloned() else {
            tracing::warn!("Unknown skill {} ignored", skill_id);
            return;
        };
        let user_battler = user.and_then(|id| roster.battler(id)).cloned();
        let bonus = user_battler.as_ref().map_or(0, |battler| battler.attack / 2);

        for &target in targets {
            let Some(battler) = roster.battler_mut(target) else {
                continue;
            };
            if skill.revive {
                if !battler.is_alive() {
                    battler.revive(skill.power);
                    battler.auto_life = false;
                    tracing::debug!("{} revived by {}", battler.name, skill.name);
                }
                continue;
            }
            if !battler.is_alive() {
                continue;
            }
            if skill.scope.targets_opponents() {
                let lost = battler.take_damage(skill.power + bonus);
                tracing::debug!("{} hits {} for {}", skill.name, battler.name, lost);
            } else {
                battler.heal(skill.power);
            }
            if skill.stun > 0 && battler.is_alive() {
                battler.stun = battler.stun.max(skill.stun);
            }
        }
    }
}

impl ActionResolver<SheetRoster> for SheetResolver {
    fn on_turn_start(&mut self, roster: &mut SheetRoster, subject: &Subject) {
        if let Some(battler) = subject.combatant().and_then(|id| roster.battler_mut(id)) {
            battler.guarding = false;
        }
    }

    fn execute(
        &mut self,
        roster: &mut SheetRoster,
        subject: &Subject,
        action: &Action,
    ) -> Resolution {
        let user = subject.combatant();
        match action.kind {
            ActionKind::Attack => Self::attack(roster, user, &action.targets),
            ActionKind::Guard => {
                if let Some(battler) = user.and_then(|id| roster.battler_mut(id)) {
                    battler.guarding = true;
                }
            }
            ActionKind::Skill(id) => Self::skill(roster, user, id, &action.targets),
            ActionKind::Item(id) => {
                tracing::warn!("{} used item {}, items have no effect here", subject, id);
            }
            // Resolved by the session before reaching the resolver.
            ActionKind::Escape => {}
        }
        Resolution::Done
    }

    fn on_turn_end(&mut self, roster: &mut SheetRoster, subject: &Subject) {
        if let Some(battler) = subject.combatant().and_then(|id| roster.battler_mut(id)) {
            battler.stun = battler.stun.saturating_sub(1);
        }
    }
}
