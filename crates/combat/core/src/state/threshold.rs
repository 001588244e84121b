use crate::config::CombatConfig;
use crate::error::{CombatError, ErrorSeverity};

/// Bust ceiling for one phase's accumulation.
///
/// Always at least [`CombatConfig::MIN_THRESHOLD`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u32"))]
pub struct Threshold(u32);

impl Threshold {
    pub const MIN: Threshold = Threshold(CombatConfig::MIN_THRESHOLD);
    pub const DEFAULT: Threshold = Threshold(CombatConfig::DEFAULT_THRESHOLD);

    pub fn new(value: u32) -> Result<Self, ThresholdError> {
        if value < CombatConfig::MIN_THRESHOLD {
            return Err(ThresholdError::BelowMinimum {
                value: i64::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Validates a signed value produced by the relic pipeline.
    pub fn from_signed(value: i64) -> Result<Self, ThresholdError> {
        let value = u32::try_from(value).map_err(|_| ThresholdError::BelowMinimum { value })?;
        Self::new(value)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for Threshold {
    type Error = ThresholdError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Threshold> for u32 {
    fn from(threshold: Threshold) -> Self {
        threshold.0
    }
}

impl core::fmt::Display for Threshold {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ThresholdError {
    #[error("threshold {value} is below the minimum of {}", CombatConfig::MIN_THRESHOLD)]
    BelowMinimum { value: i64 },
}

impl CombatError for ThresholdError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Configuration
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::BelowMinimum { .. } => "THRESHOLD_BELOW_MINIMUM",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_values_below_minimum() {
        assert!(Threshold::new(4).is_err());
        assert!(Threshold::new(0).is_err());
        assert_eq!(Threshold::new(5).map(Threshold::get), Ok(5));
    }

    #[test]
    fn rejects_negative_pipeline_results() {
        assert_eq!(
            Threshold::from_signed(-3),
            Err(ThresholdError::BelowMinimum { value: -3 })
        );
        assert_eq!(Threshold::from_signed(25).map(Threshold::get), Ok(25));
    }
}
