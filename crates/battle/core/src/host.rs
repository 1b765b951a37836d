//! Collaborator interfaces implemented by the host application.
//!
//! The session owns one of each and calls them at fixed points of the phase
//! machine. `R` is the host's roster type, which action resolution mutates.

use crate::event::{BattleEvent, Subject};
use crate::state::{Action, CombatantId};

/// Answer of the [`ActionDecider`] for a ready combatant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// The player picks `slots` commands through
    /// [`crate::BattleSession::submit_command`].
    ManualInput { slots: usize },
    /// Actions decided without input (AI, auto-battle, confusion, ...).
    Auto(Vec<Action>),
}

/// Progress reported by the [`ActionResolver`] for one action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Done,
    /// Still animating; the same action is executed again on the next tick.
    InProgress,
}

/// Battle clock handed to the [`ActionDecider`] with every decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecisionContext {
    pub subject: CombatantId,
    /// Rounds elapsed since the battle started. Enemy action patterns are
    /// keyed on this count.
    pub round: u32,
    /// Scheduled turns the subject has finished. Interrupt turns are not
    /// counted.
    pub turns_taken: u32,
}

/// Decides what a ready combatant does.
pub trait ActionDecider<R: ?Sized> {
    fn decide(&mut self, roster: &R, context: &DecisionContext) -> Decision;
}

/// Applies actions to the roster. Damage, hit checks and reflection live here.
pub trait ActionResolver<R: ?Sized> {
    /// Start-of-turn bookkeeping for the subject (regeneration, slip damage).
    fn on_turn_start(&mut self, _roster: &mut R, _subject: &Subject) {}

    fn execute(&mut self, roster: &mut R, subject: &Subject, action: &Action) -> Resolution;

    /// End-of-turn bookkeeping for the subject (state and buff countdown).
    fn on_turn_end(&mut self, _roster: &mut R, _subject: &Subject) {}
}

/// Observer of the battle; never feeds back into scheduling.
pub trait Presenter {
    fn show_preview(&mut self, _preview: &[Subject]) {}

    fn notify(&mut self, _event: &BattleEvent) {}
}

/// Presenter that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {}
