//! Battle session: the phase machine that drives the CTB loop.
//!
//! The host calls [`BattleSession::tick`] once per frame. Each call advances
//! the machine by at most one phase step:
//!
//! ```text
//! Start ─▶ Waiting ─▶ Input ─▶ Turn ─▶ TurnEnd ─▶ Waiting ...
//!             │         ▲                │
//!             └─────────┴── (auto) ──────┴─▶ BattleEnd
//! ```
//!
//! Readiness only accumulates in `Waiting`. While a subject inputs commands or
//! acts, time is frozen for everybody.

mod errors;
mod phases;
mod snapshot;

pub use errors::SessionError;
pub use snapshot::LedgerSnapshot;
#[cfg(feature = "serde")]
pub use snapshot::SnapshotError;

use std::collections::VecDeque;

use arrayvec::ArrayVec;

use crate::config::BattleConfig;
use crate::env::{PcgRng, RngOracle, RosterOracle, RosterSnapshot};
use crate::error::BattleError;
use crate::escape::EscapeState;
use crate::event::{BattleEvent, BattleResult, Subject};
use crate::host::{ActionDecider, ActionResolver, NullPresenter, Presenter};
use crate::ledger::RoundCounter;
use crate::speed::{RelativeSpeed, SpeedModel};
use crate::state::{Action, ActingState, Combatant, CombatantId};

/// Preview buffer type.
pub type Preview = ArrayVec<Subject, { BattleConfig::MAX_PREVIEW }>;

/// Phase of the battle state machine.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum BattlePhase {
    #[default]
    Start,
    /// Readiness accumulates until someone reaches the threshold.
    Waiting,
    /// The subject's commands are being chosen by the player.
    Input,
    /// The subject's actions are being executed.
    Turn,
    TurnEnd,
    BattleEnd,
}

/// How the battle was engaged.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Initiative {
    #[default]
    Normal,
    /// The party starts at full readiness and escape succeeds unconditionally
    /// until the first turn ends.
    Preemptive,
    /// The troop starts at full readiness.
    Surprise,
}

/// Subject queued to act ahead of the readiness order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Interrupt {
    /// A roster member acts immediately. Its readiness is only spent if it
    /// had reached the threshold anyway.
    Combatant(CombatantId),
    /// An anonymous subject performing fixed actions.
    Synthetic { label: String, actions: Vec<Action> },
}

impl Interrupt {
    /// Label of the synthetic subject that revives fallen party members.
    pub const AUTO_LIFE: &'static str = "auto_life";

    pub fn subject(&self) -> Subject {
        match self {
            Interrupt::Combatant(id) => Subject::Combatant(*id),
            Interrupt::Synthetic { label, .. } => Subject::Synthetic(label.clone()),
        }
    }

    fn is_auto_life(&self) -> bool {
        matches!(self, Interrupt::Synthetic { label, .. } if label == Self::AUTO_LIFE)
    }
}

/// Commands chosen so far for a manually controlled subject.
#[derive(Clone, Debug, Default)]
struct InputSlots {
    slots: usize,
    chosen: Vec<Action>,
}

/// Turn currently held by a subject.
#[derive(Clone, Debug)]
struct ActiveTurn {
    subject: Subject,
    interrupt: bool,
    input: Option<InputSlots>,
    /// Actions of a synthetic subject; combatants keep theirs in the record.
    synthetic_actions: VecDeque<Action>,
    /// The front action already reported `InProgress` at least once.
    action_started: bool,
    /// `SubjectFell` was already emitted for this turn.
    fell: bool,
}

impl ActiveTurn {
    fn new(subject: Subject, interrupt: bool) -> Self {
        Self {
            subject,
            interrupt,
            input: None,
            synthetic_actions: VecDeque::new(),
            action_started: false,
            fell: false,
        }
    }
}

type Decider<R> = Box<dyn ActionDecider<R> + Send>;
type Resolver<R> = Box<dyn ActionResolver<R> + Send>;

/// Owner of the readiness ledger and the phase machine for one battle.
pub struct BattleSession<R> {
    config: BattleConfig,
    roster: R,
    decider: Decider<R>,
    resolver: Resolver<R>,
    presenter: Box<dyn Presenter + Send>,
    speed: Box<dyn SpeedModel>,
    rng: Box<dyn RngOracle>,
    seed: u64,
    nonce: u64,
    initiative: Initiative,
    /// Initiative effects stay in force until the first turn has ended.
    opening: bool,
    phase: BattlePhase,
    records: Vec<Combatant>,
    turn: Option<ActiveTurn>,
    rounds: RoundCounter,
    escape: EscapeState,
    interrupts: VecDeque<Interrupt>,
    preview: Preview,
    result: Option<BattleResult>,
}

impl<R> BattleSession<R>
where
    R: RosterOracle,
{
    pub fn builder(roster: R) -> BattleSessionBuilder<R> {
        BattleSessionBuilder::new(roster)
    }

    /// Advances the phase machine by one step and returns the phase it is in
    /// afterwards.
    ///
    /// A fatal error ends the battle with [`BattleResult::Aborted`] before it
    /// is returned.
    pub fn tick(&mut self) -> Result<BattlePhase, SessionError> {
        if self.phase == BattlePhase::BattleEnd {
            return Ok(self.phase);
        }
        self.nonce += 1;

        let snapshot = RosterSnapshot::capture(&self.roster);
        self.sync_records(&snapshot);

        let step = match self.phase {
            BattlePhase::Start => self.start_battle(&snapshot),
            BattlePhase::Waiting => self.update_waiting(&snapshot),
            BattlePhase::Input => Ok(()),
            BattlePhase::Turn => self.update_turn(),
            BattlePhase::TurnEnd => self.end_turn(),
            BattlePhase::BattleEnd => Ok(()),
        };
        if let Err(err) = step {
            if err.severity().aborts_battle() {
                self.finish(BattleResult::Aborted);
            }
            return Err(err);
        }

        if self.phase != BattlePhase::BattleEnd {
            self.refresh_preview();
        }
        Ok(self.phase)
    }

    /// Fills the next free command slot of the inputting subject.
    ///
    /// Once every slot is filled the turn starts on the next tick.
    pub fn submit_command(&mut self, action: Action) -> Result<(), SessionError> {
        let nonce = self.nonce;
        if self.phase != BattlePhase::Input {
            return Err(SessionError::not_awaiting_input(self.phase, nonce));
        }
        if action.is_escape() && !self.escape.is_available() {
            return Err(SessionError::escape_unavailable(nonce));
        }
        let Some(subject) = self.input_subject() else {
            return Err(SessionError::no_subject(self.phase, nonce));
        };
        let Some(input) = self.turn.as_mut().and_then(|turn| turn.input.as_mut()) else {
            return Err(SessionError::no_subject(self.phase, nonce));
        };

        let slot = input.chosen.len();
        input.chosen.push(action.clone());
        let complete = input.chosen.len() >= input.slots;
        self.emit(BattleEvent::CommandSelected {
            subject,
            slot,
            action,
        });

        if complete {
            let chosen = self
                .turn
                .as_mut()
                .and_then(|turn| turn.input.take())
                .map(|input| input.chosen)
                .unwrap_or_default();
            if let Some(record) = self.record_mut(subject) {
                record.pending_actions = chosen.into();
                record.acting_state = ActingState::Acting;
            }
            self.set_phase(BattlePhase::Turn);
        }
        Ok(())
    }

    /// Clears the most recently chosen command of the inputting subject.
    ///
    /// Returns `false` when no command had been chosen yet.
    pub fn cancel_command(&mut self) -> Result<bool, SessionError> {
        let nonce = self.nonce;
        if self.phase != BattlePhase::Input {
            return Err(SessionError::not_awaiting_input(self.phase, nonce));
        }
        let Some(subject) = self.input_subject() else {
            return Err(SessionError::no_subject(self.phase, nonce));
        };
        let Some(input) = self.turn.as_mut().and_then(|turn| turn.input.as_mut()) else {
            return Err(SessionError::no_subject(self.phase, nonce));
        };
        if input.chosen.pop().is_none() {
            return Ok(false);
        }
        let slot = input.chosen.len();
        self.emit(BattleEvent::CommandCancelled { subject, slot });
        Ok(true)
    }

    /// Queues a subject to act before the readiness order resumes.
    pub fn push_interrupt(&mut self, interrupt: Interrupt) -> Result<(), SessionError> {
        if self.phase == BattlePhase::BattleEnd {
            return Err(SessionError::battle_over(self.nonce));
        }
        if let Interrupt::Combatant(id) = &interrupt
            && self.roster.side(*id).is_none()
        {
            return Err(SessionError::unknown_combatant(*id, self.nonce));
        }
        self.interrupts.push_back(interrupt);
        Ok(())
    }

    /// Ends the battle immediately with [`BattleResult::Aborted`].
    pub fn abort(&mut self) {
        if self.phase != BattlePhase::BattleEnd {
            self.finish(BattleResult::Aborted);
        }
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn result(&self) -> Option<BattleResult> {
        self.result
    }

    pub fn is_over(&self) -> bool {
        self.phase == BattlePhase::BattleEnd
    }

    /// Holder of the current turn.
    pub fn subject(&self) -> Option<&Subject> {
        self.turn.as_ref().map(|turn| &turn.subject)
    }

    /// Combatant choosing commands, if the session waits for input.
    pub fn input_subject(&self) -> Option<CombatantId> {
        let turn = self.turn.as_ref()?;
        turn.input.as_ref()?;
        turn.subject.combatant()
    }

    /// `(filled, total)` command slots of the inputting subject.
    pub fn input_progress(&self) -> Option<(usize, usize)> {
        let input = self.turn.as_ref()?.input.as_ref()?;
        Some((input.chosen.len(), input.slots))
    }

    /// Interrupts first, then the predicted readiness order.
    pub fn preview(&self) -> &[Subject] {
        &self.preview
    }

    pub fn rounds(&self) -> u32 {
        self.rounds.rounds()
    }

    pub fn escape_ratio(&self) -> Option<f64> {
        self.escape.ratio()
    }

    pub fn can_escape(&self) -> bool {
        self.escape.is_available()
    }

    pub fn initiative(&self) -> Initiative {
        self.initiative
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn combatants(&self) -> &[Combatant] {
        &self.records
    }

    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn roster(&self) -> &R {
        &self.roster
    }

    pub fn roster_mut(&mut self) -> &mut R {
        &mut self.roster
    }

    fn record_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.records.iter_mut().find(|record| record.id == id)
    }

    /// Mirrors roster membership and liveness into the scheduling records.
    ///
    /// Newcomers start with empty readiness.
    fn sync_records(&mut self, snapshot: &RosterSnapshot) {
        for view in snapshot.views() {
            match self.records.iter_mut().find(|record| record.id == view.id) {
                Some(record) => {
                    record.side = view.side;
                    record.alive = view.is_alive();
                }
                None => {
                    let mut record = Combatant::new(view.id, view.side);
                    record.alive = view.is_alive();
                    self.records.push(record);
                }
            }
        }
    }

    fn refresh_preview(&mut self) {
        let depth = self.config.preview_depth.min(BattleConfig::MAX_PREVIEW);
        let mut preview = Preview::new();
        for interrupt in self.interrupts.iter().take(depth) {
            preview.push(interrupt.subject());
        }
        if preview.len() < depth {
            let snapshot = RosterSnapshot::capture(&self.roster);
            let prediction = crate::predict::predict(
                &self.records,
                &snapshot,
                self.speed.as_ref(),
                &self.config,
                depth - preview.len(),
            );
            preview.extend(prediction.order.into_iter().map(Subject::Combatant));
        }
        if preview != self.preview {
            self.preview = preview;
            self.presenter.show_preview(&self.preview);
        }
    }

    fn set_phase(&mut self, to: BattlePhase) {
        let from = self.phase;
        if from == to {
            return;
        }
        self.phase = to;
        self.emit(BattleEvent::PhaseChanged { from, to });
    }

    fn emit(&mut self, event: BattleEvent) {
        self.presenter.notify(&event);
    }

    fn finish(&mut self, result: BattleResult) {
        self.result = Some(result);
        self.turn = None;
        self.interrupts.clear();
        self.preview.clear();
        for record in &mut self.records {
            record.acting_state = ActingState::Idle;
            record.pending_actions.clear();
        }
        self.emit(BattleEvent::BattleEnded { result });
        self.set_phase(BattlePhase::BattleEnd);
    }
}

/// Builder for [`BattleSession`].
///
/// The decider and resolver are mandatory; everything else has a default
/// (relative speed, PCG randomness, no presentation, normal initiative).
pub struct BattleSessionBuilder<R> {
    roster: R,
    config: BattleConfig,
    decider: Option<Decider<R>>,
    resolver: Option<Resolver<R>>,
    presenter: Box<dyn Presenter + Send>,
    speed: Box<dyn SpeedModel>,
    rng: Box<dyn RngOracle>,
    seed: u64,
    initiative: Initiative,
}

impl<R> BattleSessionBuilder<R>
where
    R: RosterOracle,
{
    pub fn new(roster: R) -> Self {
        Self {
            roster,
            config: BattleConfig::default(),
            decider: None,
            resolver: None,
            presenter: Box::new(NullPresenter),
            speed: Box::new(RelativeSpeed),
            rng: Box::new(PcgRng),
            seed: 0,
            initiative: Initiative::Normal,
        }
    }

    pub fn config(mut self, config: BattleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn decider(mut self, decider: impl ActionDecider<R> + Send + 'static) -> Self {
        self.decider = Some(Box::new(decider));
        self
    }

    pub fn resolver(mut self, resolver: impl ActionResolver<R> + Send + 'static) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    pub fn presenter(mut self, presenter: impl Presenter + Send + 'static) -> Self {
        self.presenter = Box::new(presenter);
        self
    }

    pub fn speed_model(mut self, model: impl SpeedModel + 'static) -> Self {
        self.speed = Box::new(model);
        self
    }

    pub fn rng(mut self, rng: impl RngOracle + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn initiative(mut self, initiative: Initiative) -> Self {
        self.initiative = initiative;
        self
    }

    pub fn build(self) -> Result<BattleSession<R>, SessionError> {
        self.config.validate()?;
        let decider = self
            .decider
            .ok_or(SessionError::MissingCollaborator("action decider"))?;
        let resolver = self
            .resolver
            .ok_or(SessionError::MissingCollaborator("action resolver"))?;

        Ok(BattleSession {
            config: self.config,
            roster: self.roster,
            decider,
            resolver,
            presenter: self.presenter,
            speed: self.speed,
            rng: self.rng,
            seed: self.seed,
            nonce: 0,
            initiative: self.initiative,
            opening: true,
            phase: BattlePhase::Start,
            records: Vec::new(),
            turn: None,
            rounds: RoundCounter::default(),
            escape: EscapeState::default(),
            interrupts: VecDeque::new(),
            preview: Preview::new(),
            result: None,
        })
    }
}
