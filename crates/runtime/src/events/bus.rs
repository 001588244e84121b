//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::{EnumCount, EnumIter, IntoEnumIterator};
use tokio::sync::broadcast;

use combat_core::CombatEvent;

/// Topics for event routing
#[derive(
    Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize, EnumIter, EnumCount,
)]
pub enum Topic {
    /// Accumulator progress, draws, shuffles and locked totals
    Phase,
    /// Step machine, targeting, round boundaries and game over
    Turn,
    /// Damage, block, healing and relic ownership
    Combat,
    /// Rejected commands and skipped operations
    Diagnostic,
}

impl Topic {
    pub fn of(event: &CombatEvent) -> Topic {
        match event {
            CombatEvent::PhaseProgress { .. }
            | CombatEvent::CardDrawn { .. }
            | CombatEvent::DeckShuffled { .. }
            | CombatEvent::TotalLocked { .. }
            | CombatEvent::EnemyPhaseStarted { .. }
            | CombatEvent::EnemyPhaseEnded { .. } => Topic::Phase,
            CombatEvent::StepChanged { .. }
            | CombatEvent::TargetChanged { .. }
            | CombatEvent::RoundStarted { .. }
            | CombatEvent::RoundResolved { .. }
            | CombatEvent::GameOver { .. } => Topic::Turn,
            CombatEvent::DamageApplied { .. }
            | CombatEvent::Blocked { .. }
            | CombatEvent::UnitHealed { .. }
            | CombatEvent::RelicAcquired { .. }
            | CombatEvent::RelicLost { .. } => Topic::Combat,
            CombatEvent::Diagnostic { .. } => Topic::Diagnostic,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// A combat event stamped with the turn it happened in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub turn: u32,
    pub payload: CombatEvent,
}

impl Event {
    pub fn topic(&self) -> Topic {
        Topic::of(&self.payload)
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. [`EventBus::subscribe_all`] receives every event
/// in publication order.
pub struct EventBus {
    topics: Arc<[broadcast::Sender<Event>]>,
    all: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let topics = Topic::iter()
            .map(|_| broadcast::channel(capacity).0)
            .collect::<Vec<_>>();
        debug_assert_eq!(topics.len(), Topic::COUNT);

        Self {
            topics: topics.into(),
            all: broadcast::channel(capacity).0,
        }
    }

    /// Publish an event to its topic and to the firehose.
    ///
    /// Events are fire-and-forget; having no subscribers is not an error.
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.topics[topic.index()].send(event.clone()).is_err() {
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
        let _ = self.all.send(event);
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.topics[topic.index()].subscribe()
    }

    /// Subscribe to every topic through a single ordered stream.
    pub fn subscribe_all(&self) -> broadcast::Receiver<Event> {
        self.all.subscribe()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            topics: Arc::clone(&self.topics),
            all: self.all.clone(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
