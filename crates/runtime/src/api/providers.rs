//! Asynchronous abstraction for sourcing player commands.
//!
//! The session suspends in the input phase until every slot of the subject
//! is filled. The runtime asks a [`CommandProvider`] for each slot, so a
//! battle can be driven by a UI, scripted fixtures, or an auto-battle policy.
use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use battle_core::{Action, CombatantId, Side};

use super::errors::{Result, RuntimeError};
use crate::sheet::SheetRoster;

/// What the provider needs to know to fill one command slot.
#[derive(Clone, Copy, Debug)]
pub struct CommandRequest<'a> {
    pub subject: CombatantId,
    /// Zero-based slot being filled.
    pub slot: usize,
    pub slots: usize,
    /// Whether escape is offered in this battle.
    pub can_escape: bool,
    pub roster: &'a SheetRoster,
}

/// Trait for providing commands for manually controlled battlers.
#[async_trait]
pub trait CommandProvider: Send + Sync {
    async fn provide_command(&self, request: &CommandRequest<'_>) -> Result<Action>;
}

/// Auto-battle: attack the living enemy with the lowest HP.
///
/// With `flee` set, the first slot of every party turn is an escape attempt
/// whenever escape is offered.
#[derive(Clone, Copy, Debug, Default)]
pub struct AutoCommandProvider {
    pub flee: bool,
}

impl AutoCommandProvider {
    pub fn fleeing() -> Self {
        Self { flee: true }
    }
}

#[async_trait]
impl CommandProvider for AutoCommandProvider {
    async fn provide_command(&self, request: &CommandRequest<'_>) -> Result<Action> {
        if self.flee && request.can_escape && request.slot == 0 {
            return Ok(Action::escape());
        }
        let side = request
            .roster
            .battler(request.subject)
            .map_or(Side::Party, |battler| battler.side);
        request
            .roster
            .living(side.opponent())
            .min_by_key(|battler| battler.hp)
            .map(|battler| Action::attack(battler.id))
            .ok_or_else(|| {
                RuntimeError::Provider(format!("no living target for {}", request.subject))
            })
    }
}

/// Replays a fixed list of commands, then guards.
#[derive(Debug, Default)]
pub struct ScriptedCommandProvider {
    script: Mutex<VecDeque<Action>>,
}

impl ScriptedCommandProvider {
    pub fn new(script: impl IntoIterator<Item = Action>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().map_or(0, |script| script.len())
    }
}

#[async_trait]
impl CommandProvider for ScriptedCommandProvider {
    async fn provide_command(&self, _request: &CommandRequest<'_>) -> Result<Action> {
        let mut script = self
            .script
            .lock()
            .map_err(|_| RuntimeError::Provider("command script lock poisoned".to_string()))?;
        Ok(script.pop_front().unwrap_or_else(Action::guard))
    }
}
