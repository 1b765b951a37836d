//! Deterministic Count-Time Battle (CTB) turn scheduling.
//!
//! `battle-core` decides, tick by tick, which combatant acts next: every
//! living combatant accumulates readiness at a rate relative to the roster's
//! speed, and whoever reaches the threshold first takes the turn. The crate
//! holds no battlers of its own. Stats, damage and input belong to the host and
//! are reached through the [`RosterOracle`] and the collaborator traits in
//! [`host`]; all scheduling flows through [`session::BattleSession`].
pub mod condition;
pub mod config;
pub mod env;
pub mod error;
pub mod escape;
pub mod event;
pub mod host;
pub mod ledger;
pub mod predict;
pub mod session;
pub mod speed;
pub mod state;

pub use condition::TurnCondition;
pub use config::{AdvanceMode, BattleConfig, ConfigError, RoundDelta};
pub use env::{PcgRng, RngOracle, RosterOracle, RosterSnapshot, compute_seed};
pub use error::{BattleError, ErrorContext, ErrorSeverity};
pub use escape::{EscapeOutcome, EscapeState};
pub use event::{BattleEvent, BattleResult, Subject};
pub use host::{
    ActionDecider, ActionResolver, Decision, DecisionContext, NullPresenter, Presenter,
    Resolution,
};
pub use ledger::{AdvanceReport, Ledger, RoundCounter};
pub use predict::{Prediction, predict};
#[cfg(feature = "serde")]
pub use session::SnapshotError;
pub use session::{
    BattlePhase, BattleSession, BattleSessionBuilder, Initiative, Interrupt, LedgerSnapshot,
    Preview, SessionError,
};
pub use speed::{AbsoluteSpeed, FormulaSpeed, RelativeSpeed, SpeedModel, guarded_rate, tick_delta};
pub use state::{
    ActingState, Action, ActionKind, Combatant, CombatantFlags, CombatantId, CombatantView,
    Readiness, Side,
};
