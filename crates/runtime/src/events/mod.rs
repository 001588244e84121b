//! Topic-based event bus for runtime events.
//!
//! The combat core collects [`combat_core::CombatEvent`]s in an outbox; the
//! session drains it after every action and publishes each event to the
//! topic it belongs to. Consumers subscribe only to the topics they need.

mod bus;

pub use bus::{Event, EventBus, Topic};
