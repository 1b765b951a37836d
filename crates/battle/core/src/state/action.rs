use super::CombatantId;

/// Command category of an action.
///
/// The scheduler does not interpret anything but [`ActionKind::Escape`]; the
/// other variants are carried through to the action resolver untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ActionKind {
    Attack,
    Guard,
    Skill(u32),
    Item(u32),
    /// Party escape attempt, resolved by the session itself.
    Escape,
}

/// A decided action with its chosen targets.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Action {
    pub kind: ActionKind,
    pub targets: Vec<CombatantId>,
}

impl Action {
    pub fn new(kind: ActionKind, targets: Vec<CombatantId>) -> Self {
        Self { kind, targets }
    }

    pub fn attack(target: CombatantId) -> Self {
        Self::new(ActionKind::Attack, vec![target])
    }

    pub fn skill(skill: u32, targets: Vec<CombatantId>) -> Self {
        Self::new(ActionKind::Skill(skill), targets)
    }

    pub fn guard() -> Self {
        Self::new(ActionKind::Guard, Vec::new())
    }

    pub fn escape() -> Self {
        Self::new(ActionKind::Escape, Vec::new())
    }

    pub fn is_escape(&self) -> bool {
        self.kind == ActionKind::Escape
    }
}
