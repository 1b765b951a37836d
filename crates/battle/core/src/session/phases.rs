//! Per-phase steps of [`BattleSession::tick`].

use crate::config::AdvanceMode;
use crate::env::{RosterOracle, RosterSnapshot, compute_seed, context};
use crate::escape::EscapeState;
use crate::event::{BattleEvent, BattleResult, Subject};
use crate::host::{Decision, DecisionContext, Resolution};
use crate::ledger::Ledger;
use crate::state::{Action, ActingState, CombatantFlags, CombatantId, Readiness, Side};

use super::{
    ActiveTurn, BattlePhase, BattleSession, Initiative, InputSlots, Interrupt, SessionError,
};

impl<R> BattleSession<R>
where
    R: RosterOracle,
{
    pub(super) fn start_battle(&mut self, snapshot: &RosterSnapshot) -> Result<(), SessionError> {
        let threshold = self.config.threshold;
        let bound = self.config.initial_readiness_bound();
        for record in &mut self.records {
            let full = matches!(
                (self.initiative, record.side),
                (Initiative::Preemptive, Side::Party) | (Initiative::Surprise, Side::Troop)
            );
            let total = if full {
                threshold
            } else {
                let seed = compute_seed(
                    self.seed,
                    self.nonce,
                    record.id.0,
                    context::INITIAL_READINESS,
                );
                self.rng.below(seed, bound)
            };
            record.readiness = Readiness::from_total(total, threshold);
        }

        self.escape = EscapeState::new(
            &self.config,
            snapshot.mean_speed(Side::Party),
            snapshot.mean_speed(Side::Troop),
        );
        self.emit(BattleEvent::BattleStarted {
            initiative: self.initiative,
        });
        self.set_phase(BattlePhase::Waiting);
        Ok(())
    }

    pub(super) fn update_waiting(&mut self, snapshot: &RosterSnapshot) -> Result<(), SessionError> {
        if self.decided_result(snapshot).is_some() {
            self.set_phase(BattlePhase::TurnEnd);
            return Ok(());
        }

        self.queue_auto_life(snapshot);
        if let Some(interrupt) = self.interrupts.pop_front() {
            return self.begin_interrupt(interrupt, snapshot);
        }

        let ledger = Ledger::new(&self.config, self.speed.as_ref());
        let mut elapsed = Vec::new();
        let mut ready = ledger.first_ready(&self.records, snapshot);
        if ready.is_none() {
            let report = match self.config.advance_mode {
                AdvanceMode::PerTick => {
                    ledger.advance(&mut self.records, snapshot, &mut self.rounds)
                }
                AdvanceMode::UntilReady => {
                    ledger.advance_until_ready(&mut self.records, snapshot, &mut self.rounds)
                }
            };
            elapsed = report.elapsed_rounds;
            ready = ledger.first_ready(&self.records, snapshot);
        }

        for round in elapsed {
            self.emit(BattleEvent::RoundElapsed { round });
        }
        match ready {
            Some(id) => self.begin_turn(id, false),
            None => Ok(()),
        }
    }

    pub(super) fn update_turn(&mut self) -> Result<(), SessionError> {
        let nonce = self.nonce;
        let Some(turn) = self.turn.as_ref() else {
            return Err(SessionError::no_subject(self.phase, nonce));
        };
        let subject = turn.subject.clone();
        let started = turn.action_started;

        let next = match &subject {
            Subject::Combatant(id) => {
                if !self.roster.is_alive(*id) {
                    self.mark_fallen(*id);
                    self.set_phase(BattlePhase::TurnEnd);
                    return Ok(());
                }
                self.combatant(*id)
                    .and_then(|record| record.pending_actions.front().cloned())
            }
            Subject::Synthetic(_) => turn.synthetic_actions.front().cloned(),
        };
        let Some(action) = next else {
            self.set_phase(BattlePhase::TurnEnd);
            return Ok(());
        };

        if action.is_escape() {
            self.pop_action(&subject);
            return self.resolve_escape(&subject);
        }

        if !started {
            if let Some(id) = subject.combatant()
                && let Some(record) = self.record_mut(id)
            {
                record.acting_state = ActingState::Acting;
            }
            self.emit(BattleEvent::ActionStarted {
                subject: subject.clone(),
                action: action.clone(),
            });
        }

        match self.resolver.execute(&mut self.roster, &subject, &action) {
            Resolution::Done => self.pop_action(&subject),
            Resolution::InProgress => {
                if let Some(turn) = self.turn.as_mut() {
                    turn.action_started = true;
                }
            }
        }
        Ok(())
    }

    pub(super) fn end_turn(&mut self) -> Result<(), SessionError> {
        if let Some(turn) = self.turn.take() {
            let mut readiness = 0;
            let mut alive = true;
            if let Subject::Combatant(id) = turn.subject {
                alive = self.roster.is_alive(id);
                if !alive && !turn.fell {
                    self.emit(BattleEvent::SubjectFell { subject: id });
                }
                let ledger = Ledger::new(&self.config, self.speed.as_ref());
                if let Some(record) = self.records.iter_mut().find(|record| record.id == id) {
                    if alive {
                        ledger.reset_after_turn(record);
                    } else {
                        record.alive = false;
                        record.readiness = Readiness::ZERO;
                    }
                    record.acting_state = ActingState::Idle;
                    record.pending_actions.clear();
                    if !turn.interrupt {
                        record.turns_taken += 1;
                    }
                    readiness = record.readiness.total();
                }
            }
            if alive {
                self.resolver.on_turn_end(&mut self.roster, &turn.subject);
            }
            self.opening = false;
            self.emit(BattleEvent::TurnEnded {
                subject: turn.subject,
                readiness,
            });
        }

        let snapshot = RosterSnapshot::capture(&self.roster);
        match self.decided_result(&snapshot) {
            Some(result) => self.finish(result),
            None => self.set_phase(BattlePhase::Waiting),
        }
        Ok(())
    }

    /// Outcome of the battle if it is already decided.
    ///
    /// A party member waiting for auto-life keeps the party in the battle.
    fn decided_result(&self, snapshot: &RosterSnapshot) -> Option<BattleResult> {
        if self.escape.is_escaped() {
            return Some(BattleResult::Escaped);
        }
        if snapshot.is_side_defeated(Side::Party) {
            return Some(BattleResult::Defeat);
        }
        if snapshot.is_side_defeated(Side::Troop) {
            return Some(BattleResult::Victory);
        }
        None
    }

    fn queue_auto_life(&mut self, snapshot: &RosterSnapshot) {
        let Some(skill) = self.config.auto_life_skill else {
            return;
        };
        if self.interrupts.iter().any(Interrupt::is_auto_life) {
            return;
        }
        let actions: Vec<Action> = snapshot
            .side_members(Side::Party)
            .filter(|view| view.flags.contains(CombatantFlags::PENDING_REVIVAL))
            .map(|view| Action::skill(skill, vec![view.id]))
            .collect();
        if actions.is_empty() {
            return;
        }
        self.interrupts.push_front(Interrupt::Synthetic {
            label: Interrupt::AUTO_LIFE.to_owned(),
            actions,
        });
    }

    fn begin_interrupt(
        &mut self,
        interrupt: Interrupt,
        snapshot: &RosterSnapshot,
    ) -> Result<(), SessionError> {
        match interrupt {
            // Dropped silently: the interrupter died while queued.
            Interrupt::Combatant(id) if !snapshot.is_alive(id) => Ok(()),
            Interrupt::Combatant(id) => self.begin_turn(id, true),
            Interrupt::Synthetic { label, actions } => {
                let subject = Subject::Synthetic(label);
                let mut turn = ActiveTurn::new(subject.clone(), true);
                turn.synthetic_actions = actions.into();
                self.turn = Some(turn);
                self.emit(BattleEvent::SubjectSelected {
                    subject: subject.clone(),
                    interrupt: true,
                });
                self.resolver.on_turn_start(&mut self.roster, &subject);
                self.set_phase(BattlePhase::Turn);
                Ok(())
            }
        }
    }

    fn begin_turn(&mut self, id: CombatantId, interrupt: bool) -> Result<(), SessionError> {
        let subject = Subject::Combatant(id);
        self.turn = Some(ActiveTurn::new(subject.clone(), interrupt));
        self.emit(BattleEvent::SubjectSelected {
            subject: subject.clone(),
            interrupt,
        });

        self.resolver.on_turn_start(&mut self.roster, &subject);
        if !self.roster.is_alive(id) {
            self.mark_fallen(id);
            self.set_phase(BattlePhase::TurnEnd);
            return Ok(());
        }

        let decision = if self.roster.can_act(id) {
            let context = DecisionContext {
                subject: id,
                round: self.rounds.rounds(),
                turns_taken: self.combatant(id).map_or(0, |record| record.turns_taken),
            };
            self.decider.decide(&self.roster, &context)
        } else {
            Decision::Auto(Vec::new())
        };

        match decision {
            Decision::ManualInput { slots } if slots > 0 => {
                let player = self.roster.side(id) == Some(Side::Party);
                if !player || !self.roster.can_input(id) {
                    return Err(SessionError::input_not_allowed(id, self.nonce));
                }
                if let Some(record) = self.record_mut(id) {
                    record.acting_state = ActingState::Inputting;
                    record.pending_actions.clear();
                }
                if let Some(turn) = self.turn.as_mut() {
                    turn.input = Some(InputSlots {
                        slots,
                        chosen: Vec::with_capacity(slots),
                    });
                }
                self.emit(BattleEvent::InputRequested { subject: id, slots });
                self.set_phase(BattlePhase::Input);
            }
            Decision::ManualInput { .. } => self.queue_auto(id, Vec::new()),
            Decision::Auto(actions) => self.queue_auto(id, actions),
        }
        Ok(())
    }

    fn queue_auto(&mut self, id: CombatantId, actions: Vec<Action>) {
        if let Some(record) = self.record_mut(id) {
            record.acting_state = ActingState::ActingAutomatically;
            record.pending_actions = actions.into();
        }
        self.set_phase(BattlePhase::Turn);
    }

    fn resolve_escape(&mut self, subject: &Subject) -> Result<(), SessionError> {
        let nonce = self.nonce;
        let id = match subject {
            Subject::Combatant(id) if self.roster.side(*id) == Some(Side::Party) => *id,
            _ => return Err(SessionError::illegal_escape(subject.clone(), nonce)),
        };

        let roll = self
            .rng
            .unit(compute_seed(self.seed, nonce, id.0, context::ESCAPE));
        let preemptive = self.opening && self.initiative == Initiative::Preemptive;
        let Some(outcome) = self.escape.attempt(preemptive, roll) else {
            return Err(SessionError::escape_without_ratio(id, nonce));
        };
        self.emit(BattleEvent::EscapeAttempted {
            subject: id,
            outcome,
        });

        if outcome.is_success() {
            self.finish(BattleResult::Escaped);
        } else {
            if let Some(record) = self.record_mut(id) {
                record.pending_actions.clear();
            }
            self.set_phase(BattlePhase::TurnEnd);
        }
        Ok(())
    }

    fn pop_action(&mut self, subject: &Subject) {
        match subject {
            Subject::Combatant(id) => {
                if let Some(record) = self.record_mut(*id) {
                    record.pending_actions.pop_front();
                }
            }
            Subject::Synthetic(_) => {
                if let Some(turn) = self.turn.as_mut() {
                    turn.synthetic_actions.pop_front();
                }
            }
        }
        if let Some(turn) = self.turn.as_mut() {
            turn.action_started = false;
        }
    }

    /// Clears the readiness of a subject that died before its turn ended.
    fn mark_fallen(&mut self, id: CombatantId) {
        if let Some(record) = self.record_mut(id) {
            record.alive = false;
            record.readiness = Readiness::ZERO;
            record.pending_actions.clear();
        }
        let first = self
            .turn
            .as_mut()
            .is_some_and(|turn| !std::mem::replace(&mut turn.fell, true));
        if first {
            self.emit(BattleEvent::SubjectFell { subject: id });
        }
    }
}
