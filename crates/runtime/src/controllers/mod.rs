//! Phase controllers driving one round of combat.
//!
//! Controllers hold no combat state of their own. They borrow the session
//! state for the duration of one phase, push actions through the async queue
//! runner and publish the resulting events.
mod enemy;
mod player;
mod resolution;
mod runner;

pub use enemy::EnemyPhaseController;
pub use player::PlayerPhaseController;
pub use resolution::ResolutionController;

pub(crate) use runner::run_queue;
