use std::sync::{Arc, Mutex};

use battle_core::{BattleEvent, Presenter, Subject};

use super::{Event, EventBus};

/// Shared, append-only record of every event of one battle.
#[derive(Clone, Debug, Default)]
pub struct BattleJournal {
    events: Arc<Mutex<Vec<BattleEvent>>>,
}

impl BattleJournal {
    fn push(&self, event: BattleEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(_) => tracing::warn!("Battle journal lock poisoned, event dropped"),
        }
    }

    pub fn events(&self) -> Vec<BattleEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map_or(0, |events| events.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Presenter forwarding session output to the event bus and the logs.
pub struct BusPresenter {
    bus: EventBus,
    journal: BattleJournal,
}

impl BusPresenter {
    pub fn new(bus: EventBus, journal: BattleJournal) -> Self {
        Self { bus, journal }
    }

    fn log(event: &BattleEvent) {
        match event {
            BattleEvent::BattleStarted { initiative } => {
                tracing::info!("Battle started ({initiative})");
            }
            BattleEvent::BattleEnded { result } => tracing::info!("Battle ended: {result}"),
            BattleEvent::RoundElapsed { round } => tracing::debug!("Round {round} elapsed"),
            BattleEvent::SubjectSelected { subject, interrupt } => {
                tracing::debug!("{subject} takes the turn (interrupt: {interrupt})");
            }
            BattleEvent::InputRequested { subject, slots } => {
                tracing::debug!("{subject} awaits {slots} command(s)");
            }
            BattleEvent::ActionStarted { subject, action } => {
                tracing::debug!("{subject} performs {}", action.kind);
            }
            BattleEvent::EscapeAttempted { subject, outcome } => {
                tracing::info!("{subject} tried to escape: {outcome:?}");
            }
            BattleEvent::SubjectFell { subject } => tracing::debug!("{subject} fell"),
            BattleEvent::TurnEnded { subject, readiness } => {
                tracing::debug!("{subject} ended the turn with readiness {readiness}");
            }
            BattleEvent::PhaseChanged { from, to } => tracing::trace!("Phase {from} -> {to}"),
            BattleEvent::CommandSelected { .. } | BattleEvent::CommandCancelled { .. } => {
                tracing::trace!("{event:?}");
            }
        }
    }
}

impl Presenter for BusPresenter {
    fn show_preview(&mut self, preview: &[Subject]) {
        self.bus.publish(Event::Preview(preview.to_vec()));
    }

    fn notify(&mut self, event: &BattleEvent) {
        Self::log(event);
        self.journal.push(event.clone());
        self.bus.publish(Event::Battle(event.clone()));
    }
}
