//! Public runtime API surface.
//!
//! Gathers the types exposed to clients so the session and worker layers can
//! stay focused on combat flow and task plumbing.

pub mod errors;
pub mod handle;
pub mod providers;

pub use errors::{Result, RuntimeError};
pub use handle::RuntimeHandle;
pub use providers::{PlayerCommand, PlayerProvider};
