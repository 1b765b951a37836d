use crate::state::{CombatantFlags, CombatantId, CombatantView, Side};

/// Host-side view of the battlers taking part in a battle.
///
/// The scheduler never creates or destroys battlers; it reads this oracle once
/// per tick and treats the result as a snapshot.
pub trait RosterOracle {
    /// Battlers on the field in stable roster order (party first, then troop),
    /// dead ones included. Hidden troop members are omitted.
    fn active_combatants(&self) -> Vec<CombatantId>;

    fn side(&self, id: CombatantId) -> Option<Side>;

    fn is_alive(&self, id: CombatantId) -> bool;

    /// Alive and not prevented from moving (paralysis, sleep, ...).
    fn can_act(&self, id: CombatantId) -> bool;

    /// Whether the player chooses this battler's commands.
    fn can_input(&self, id: CombatantId) -> bool;

    /// Agility-like stat, already adjusted by equipment and states.
    fn speed_stat(&self, id: CombatantId) -> f64;

    /// Dead, but carrying an effect that will revive it automatically.
    fn has_pending_revival(&self, _id: CombatantId) -> bool {
        false
    }
}

/// Per-tick snapshot of the roster.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RosterSnapshot {
    views: Vec<CombatantView>,
}

impl RosterSnapshot {
    pub fn capture<R>(roster: &R) -> Self
    where
        R: RosterOracle + ?Sized,
    {
        let views = roster
            .active_combatants()
            .into_iter()
            .filter_map(|id| {
                let side = roster.side(id)?;
                let mut flags = CombatantFlags::empty();
                if roster.is_alive(id) {
                    flags |= CombatantFlags::ALIVE;
                    if roster.can_act(id) {
                        flags |= CombatantFlags::CAN_ACT;
                    }
                    if roster.can_input(id) {
                        flags |= CombatantFlags::CAN_INPUT;
                    }
                } else if roster.has_pending_revival(id) {
                    flags |= CombatantFlags::PENDING_REVIVAL;
                }
                Some(CombatantView {
                    id,
                    side,
                    speed: roster.speed_stat(id),
                    flags,
                })
            })
            .collect();
        Self { views }
    }

    pub fn from_views(views: Vec<CombatantView>) -> Self {
        Self { views }
    }

    pub fn views(&self) -> &[CombatantView] {
        &self.views
    }

    pub fn get(&self, id: CombatantId) -> Option<&CombatantView> {
        self.views.iter().find(|view| view.id == id)
    }

    pub fn is_alive(&self, id: CombatantId) -> bool {
        self.get(id).is_some_and(CombatantView::is_alive)
    }

    pub fn side_members(&self, side: Side) -> impl Iterator<Item = &CombatantView> {
        self.views.iter().filter(move |view| view.side == side)
    }

    /// True when the side has no living member and nobody about to be revived.
    pub fn is_side_defeated(&self, side: Side) -> bool {
        self.side_members(side).all(|view| {
            !view.is_alive() && !view.flags.contains(CombatantFlags::PENDING_REVIVAL)
        })
    }

    /// Mean speed of the living members of a side; `None` if nobody is alive.
    pub fn mean_speed(&self, side: Side) -> Option<f64> {
        mean(self.side_members(side).filter(|view| view.is_alive()))
    }

    /// Combatants whose speed defines the relative rate: the eligible ones, or
    /// every living one when nobody is eligible (so states can still wear off).
    pub fn rate_basis(&self) -> Vec<CombatantView> {
        let eligible: Vec<_> = self
            .views
            .iter()
            .copied()
            .filter(CombatantView::is_eligible)
            .collect();
        if !eligible.is_empty() {
            return eligible;
        }
        self.views
            .iter()
            .copied()
            .filter(CombatantView::is_alive)
            .collect()
    }
}

fn mean<'a>(views: impl Iterator<Item = &'a CombatantView>) -> Option<f64> {
    let (sum, count) = views.fold((0.0, 0u32), |(sum, count), view| {
        (sum + view.speed, count + 1)
    });
    (count > 0).then(|| sum / f64::from(count))
}
