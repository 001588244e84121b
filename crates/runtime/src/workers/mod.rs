//! Worker tasks that back the runtime orchestration.
//!
//! A single combat worker owns the session; every command is serialized
//! through its channel.

mod combat;

pub(crate) use combat::{Command, CombatWorker};
