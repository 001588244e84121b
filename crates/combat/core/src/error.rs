//! Common error infrastructure for combat-core.
//!
//! Domain-specific errors (`ThresholdError`, `TargetingError`, `ActionError`,
//! `RelicError`) live next to the code that raises them. This module provides
//! the shared classification used by the runtime to decide between "reject and
//! report" and "log and skip".

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the command may succeed later (e.g. waiting for a target)
/// - **Validation**: invalid input, rejected without any state change
/// - **Configuration**: malformed tuning data; the operation is skipped with a safe default
/// - **Internal**: unexpected state inconsistency that should be investigated
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Configuration,
    Internal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Configuration => "configuration",
            Self::Internal => "internal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if the failing operation should be skipped instead of rejected.
    pub const fn is_skippable(&self) -> bool {
        matches!(self, Self::Configuration)
    }
}

/// Common trait for all combat-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait CombatError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Used for diagnostics events and testing.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
