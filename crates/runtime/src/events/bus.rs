//! Topic-based event bus implementation.

use std::collections::HashMap;

use battle_core::{BattleEvent, Subject};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Phase changes, round rollovers, subject selection and the turn preview
    Schedule,
    /// Input and action execution of the current subject
    Turn,
    /// Battle start, escape attempts and the final result
    Outcome,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Schedule, Topic::Turn, Topic::Outcome];
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Battle(BattleEvent),
    /// The upcoming subjects changed.
    Preview(Vec<Subject>),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Preview(_) => Topic::Schedule,
            Event::Battle(event) => match event {
                BattleEvent::PhaseChanged { .. }
                | BattleEvent::RoundElapsed { .. }
                | BattleEvent::SubjectSelected { .. } => Topic::Schedule,
                BattleEvent::InputRequested { .. }
                | BattleEvent::CommandSelected { .. }
                | BattleEvent::CommandCancelled { .. }
                | BattleEvent::ActionStarted { .. }
                | BattleEvent::SubjectFell { .. }
                | BattleEvent::TurnEnded { .. } => Topic::Turn,
                BattleEvent::BattleStarted { .. }
                | BattleEvent::EscapeAttempted { .. }
                | BattleEvent::BattleEnded { .. } => Topic::Outcome,
            },
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Every topic channel exists from construction on.
#[derive(Clone)]
pub struct EventBus {
    schedule: broadcast::Sender<Event>,
    turn: broadcast::Sender<Event>,
    outcome: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            schedule: broadcast::channel(capacity).0,
            turn: broadcast::channel(capacity).0,
            outcome: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Schedule => &self.schedule,
            Topic::Turn => &self.turn,
            Topic::Outcome => &self.outcome,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use battle_core::{BattleResult, CombatantId};

    use super::*;

    #[test]
    fn events_reach_only_their_topic() {
        let bus = EventBus::with_capacity(8);
        let mut turn = bus.subscribe(Topic::Turn);
        let mut outcome = bus.subscribe(Topic::Outcome);

        bus.publish(Event::Battle(BattleEvent::BattleEnded {
            result: BattleResult::Victory,
        }));

        assert!(turn.try_recv().is_err());
        assert_eq!(
            outcome.try_recv().unwrap(),
            Event::Battle(BattleEvent::BattleEnded {
                result: BattleResult::Victory
            })
        );
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        let bus = EventBus::default();
        bus.publish(Event::Preview(vec![Subject::Combatant(CombatantId(0))]));

        let mut schedule = bus.subscribe(Topic::Schedule);
        assert!(schedule.try_recv().is_err());
    }
}
