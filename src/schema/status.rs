//! Optimization status - lifecycle state derived from the step history

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Step;

/// Status of an optimization campaign.
///
/// ```text
/// Initializing ──> Suggesting <──> Acquiring ──> Finished
///       └────────────────┴────────────┴──────────> Error
/// ```
///
/// Status is never set by hand: it is recomputed from the step history
/// with [`OptimizationStatus::derive`] whenever a record is normalized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptimizationStatus {
    /// No steps yet.
    #[default]
    Initializing,
    /// The last step is a recommendation waiting to be executed.
    Suggesting,
    /// The last step has been executed; more may follow.
    Acquiring,
    /// The engine reported the campaign as finished.
    Finished,
    /// Upstream resolution failed. Terminal.
    Error,
}

/// Signals from the optimization engine that the step history alone
/// cannot express.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignSignals {
    /// The engine considers the campaign complete.
    #[serde(default)]
    pub finished: bool,
    /// An upstream resolution step failed.
    #[serde(default)]
    pub failed: bool,
}

impl CampaignSignals {
    /// Signals for a campaign the engine has marked as finished.
    #[must_use]
    pub const fn finished() -> Self {
        Self {
            finished: true,
            failed: false,
        }
    }
}

impl OptimizationStatus {
    /// Derive the status from the step history.
    ///
    /// `failed` wins over everything. A pending recommendation keeps the
    /// campaign in `Suggesting` even when `finished` is set.
    #[must_use]
    pub fn derive(steps: &[Step], signals: CampaignSignals) -> Self {
        if signals.failed {
            return Self::Error;
        }
        match steps.last() {
            None => Self::Initializing,
            Some(last) if last.values_used().is_none() => Self::Suggesting,
            Some(_) if signals.finished => Self::Finished,
            Some(_) => Self::Acquiring,
        }
    }

    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Error)
    }

    /// Status name as shown to users and search facets.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initializing => "Initializing",
            Self::Suggesting => "Suggesting",
            Self::Acquiring => "Acquiring",
            Self::Finished => "Finished",
            Self::Error => "Error",
        }
    }
}

impl fmt::Display for OptimizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Row;

    #[test]
    fn test_status_default() {
        assert_eq!(OptimizationStatus::default(), OptimizationStatus::Initializing);
    }

    #[test]
    fn test_derive_lifecycle() {
        let none = CampaignSignals::default();
        let executed = Step::executed(Row::new());
        let pending = Step::recommended(Row::new());

        assert_eq!(
            OptimizationStatus::derive(&[], none),
            OptimizationStatus::Initializing
        );
        assert_eq!(
            OptimizationStatus::derive(&[executed.clone(), pending.clone()], none),
            OptimizationStatus::Suggesting
        );
        assert_eq!(
            OptimizationStatus::derive(&[executed.clone()], none),
            OptimizationStatus::Acquiring
        );
        assert_eq!(
            OptimizationStatus::derive(&[executed], CampaignSignals::finished()),
            OptimizationStatus::Finished
        );
        assert_eq!(
            OptimizationStatus::derive(&[pending], CampaignSignals::finished()),
            OptimizationStatus::Suggesting
        );
    }

    #[test]
    fn test_failed_overrides_shape() {
        let failed = CampaignSignals {
            finished: true,
            failed: true,
        };
        assert_eq!(OptimizationStatus::derive(&[], failed), OptimizationStatus::Error);
        assert!(OptimizationStatus::Error.is_terminal());
        assert!(!OptimizationStatus::Acquiring.is_terminal());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(OptimizationStatus::Suggesting.to_string(), "Suggesting");
    }
}
