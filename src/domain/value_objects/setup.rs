//! Setup type value object module
//!
//! A changeover between two consecutive tasks on the same machine takes one
//! of two forms: a full subseries swap (the mold is exchanged, 4 hours) or
//! an IML-insert swap (labeling inserts are mounted or removed, 1 hour).
//! The planning board identifies them by their Dutch names.

use serde::{Deserialize, Serialize};

/// Kind of preparation interval between two consecutive tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SetupType {
    /// Subseries changeover, written as `"ombouw"` in the output tables.
    SubseriesSwap,
    /// IML-insert changeover, written as `"ombouw2"` in the output tables.
    ImlSwap,
}

impl SetupType {
    /// Fixed duration of the changeover in seconds.
    pub fn duration_seconds(&self) -> i64 {
        match self {
            SetupType::SubseriesSwap => 4 * 3_600,
            SetupType::ImlSwap => 3_600,
        }
    }

    /// Wire label used by the output tables and the planning board.
    pub fn label(&self) -> &'static str {
        match self {
            SetupType::SubseriesSwap => "ombouw",
            SetupType::ImlSwap => "ombouw2",
        }
    }

    /// Label with the first letter upper-cased, for human-readable reasons.
    pub fn capitalized_label(&self) -> &'static str {
        match self {
            SetupType::SubseriesSwap => "Ombouw",
            SetupType::ImlSwap => "Ombouw2",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_durations() {
        assert_eq!(SetupType::SubseriesSwap.duration_seconds(), 14_400);
        assert_eq!(SetupType::ImlSwap.duration_seconds(), 3_600);
    }

    #[test]
    fn test_labels() {
        assert_eq!(SetupType::SubseriesSwap.label(), "ombouw");
        assert_eq!(SetupType::ImlSwap.label(), "ombouw2");
        assert_eq!(SetupType::SubseriesSwap.capitalized_label(), "Ombouw");
    }
}
