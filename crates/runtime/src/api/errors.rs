//! Unified error types surfaced by the runtime API.
//!
//! Wraps rejections from the combat rules, command guards and worker
//! coordination so clients can bubble them up with consistent context.
use std::time::Duration;

use thiserror::Error;
use tokio::sync::oneshot;

use combat_core::{
    ActionError, CombatError, ErrorSeverity, Outcome, RelicError, Step, TargetingError,
    ThresholdError,
};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("combat is busy, command rejected")]
    Busy,

    #[error("input debounced, retry in {remaining:?}")]
    Debounced { remaining: Duration },

    #[error("combat is over ({outcome})")]
    GameOver { outcome: Outcome },

    #[error("combat has not started")]
    NotStarted,

    #[error("combat has already started")]
    AlreadyStarted,

    #[error("{command} is not allowed during {step}")]
    InvalidStep { step: Step, command: &'static str },

    #[error("encounter is invalid: {reason}")]
    InvalidEncounter { reason: String },

    #[error(transparent)]
    Targeting(#[from] TargetingError),

    #[error(transparent)]
    Threshold(#[from] ThresholdError),

    #[error(transparent)]
    Relic(#[from] RelicError),

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error("runtime requires an encounter to be configured before building")]
    MissingEncounter,

    #[error("combat worker command channel closed")]
    CommandChannelClosed,

    #[error("combat worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("combat worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),
}

impl CombatError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Busy | Self::Debounced { .. } => ErrorSeverity::Recoverable,
            Self::GameOver { .. }
            | Self::NotStarted
            | Self::AlreadyStarted
            | Self::InvalidStep { .. } => ErrorSeverity::Validation,
            Self::InvalidEncounter { .. } | Self::MissingEncounter => ErrorSeverity::Configuration,
            Self::Targeting(e) => e.severity(),
            Self::Threshold(e) => e.severity(),
            Self::Relic(e) => e.severity(),
            Self::Action(e) => e.severity(),
            Self::CommandChannelClosed | Self::ReplyChannelClosed(_) | Self::WorkerJoin(_) => {
                ErrorSeverity::Internal
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Busy => "RUNTIME_BUSY",
            Self::Debounced { .. } => "RUNTIME_DEBOUNCED",
            Self::GameOver { .. } => "RUNTIME_GAME_OVER",
            Self::NotStarted => "RUNTIME_NOT_STARTED",
            Self::AlreadyStarted => "RUNTIME_ALREADY_STARTED",
            Self::InvalidStep { .. } => "RUNTIME_INVALID_STEP",
            Self::InvalidEncounter { .. } => "RUNTIME_INVALID_ENCOUNTER",
            Self::Targeting(e) => e.error_code(),
            Self::Threshold(e) => e.error_code(),
            Self::Relic(e) => e.error_code(),
            Self::Action(e) => e.error_code(),
            Self::MissingEncounter => "RUNTIME_MISSING_ENCOUNTER",
            Self::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            Self::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            Self::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
        }
    }
}

#[cfg(test)]
mod tests {
    use combat_core::UnitId;

    use super::*;

    #[test]
    fn guards_are_recoverable_and_rules_are_validation() {
        assert!(RuntimeError::Busy.severity().is_recoverable());
        assert_eq!(
            RuntimeError::InvalidStep {
                step: Step::Resolve,
                command: "draw"
            }
            .severity(),
            ErrorSeverity::Validation
        );
    }

    #[test]
    fn wrapped_errors_keep_their_codes() {
        let err = RuntimeError::from(TargetingError::DeadEnemy { enemy: UnitId(2) });
        assert_eq!(err.error_code(), "TARGET_DEAD_ENEMY");
        assert_eq!(err.to_string(), "enemy#2 is already dead");
    }
}
