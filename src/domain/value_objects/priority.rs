//! Priority value object module
//!
//! This module defines the Priority variant that replaces the raw priority
//! codes carried by order documents. Each variant knows its own contribution
//! to the minimization objective, so the weighting table lives in exactly
//! one place.

use serde::{Deserialize, Serialize};

/// Scheduling priority of an order
///
/// Raw codes come from the order documents as `{0,1,2,3,4,5,7}`; code 0
/// means "no priority set" and is adjusted to the normal level (6) during
/// task expansion. Code 6 is therefore never stored but exists as the
/// adjusted default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    /// Code 1: emergency order, forced to start immediately.
    Emergency,
    /// Code 2: already running on a machine, keeps its slot unless an
    /// emergency claims the machine.
    Running,
    /// Code 3: as soon as possible, without interrupting running work.
    AsapNoInterrupt,
    /// Code 4: the deadline must not be missed.
    MustMeetDeadline,
    /// Code 5: normal order whose due date drives its penalty.
    DueDate,
    /// Code 6 (and raw 0): normal order, only the universal end-time term.
    Normal,
    /// Code 7: stock fill, discouraged from preceding prioritized work.
    StockFill,
}

impl Priority {
    /// Weight applied to the end time of a chosen emergency task.
    pub const EMERGENCY_END_WEIGHT: i64 = 10_000;

    /// Weight applied to the end time of a running task displaced from
    /// immediate start by an emergency on the same machine.
    pub const DISPLACED_RUNNING_END_WEIGHT: i64 = 1_000;

    /// Flat penalty when a stock-fill task directly precedes a task of any
    /// other priority on the same machine.
    pub const STOCK_FILL_SUCCESSOR_PENALTY: i64 = 3_000;

    /// Maps a raw priority code to its variant.
    ///
    /// Code 0 is adjusted to [`Priority::Normal`]; unknown codes fall back
    /// to normal as well, since an unrecognized code must never abort a run.
    pub fn from_raw(code: i64) -> Self {
        match code {
            1 => Priority::Emergency,
            2 => Priority::Running,
            3 => Priority::AsapNoInterrupt,
            4 => Priority::MustMeetDeadline,
            5 => Priority::DueDate,
            7 => Priority::StockFill,
            _ => Priority::Normal,
        }
    }

    /// The adjusted numeric code of this variant.
    pub fn code(&self) -> u8 {
        match self {
            Priority::Emergency => 1,
            Priority::Running => 2,
            Priority::AsapNoInterrupt => 3,
            Priority::MustMeetDeadline => 4,
            Priority::DueDate => 5,
            Priority::Normal => 6,
            Priority::StockFill => 7,
        }
    }

    /// Weight of the chosen end time in the objective, beyond the universal
    /// weight of 1 that every chosen task contributes.
    pub fn end_time_weight(&self) -> i64 {
        match self {
            Priority::AsapNoInterrupt => 50,
            _ => 0,
        }
    }

    /// Weight of the deadline slack in the objective.
    pub fn deadline_slack_weight(&self, is_past_due: bool) -> i64 {
        match self {
            Priority::MustMeetDeadline => 20,
            Priority::DueDate => {
                if is_past_due {
                    10
                } else {
                    5
                }
            }
            _ => 0,
        }
    }

    /// Whether this task is pinned to start at second 0.
    pub fn forces_immediate_start(&self) -> bool {
        matches!(self, Priority::Emergency | Priority::Running)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_adjusts_zero_to_normal() {
        assert_eq!(Priority::from_raw(0), Priority::Normal);
        assert_eq!(Priority::from_raw(0).code(), 6);
    }

    #[test]
    fn test_from_raw_known_codes() {
        assert_eq!(Priority::from_raw(1), Priority::Emergency);
        assert_eq!(Priority::from_raw(2), Priority::Running);
        assert_eq!(Priority::from_raw(3), Priority::AsapNoInterrupt);
        assert_eq!(Priority::from_raw(4), Priority::MustMeetDeadline);
        assert_eq!(Priority::from_raw(5), Priority::DueDate);
        assert_eq!(Priority::from_raw(7), Priority::StockFill);
    }

    #[test]
    fn test_from_raw_unknown_code_is_normal() {
        assert_eq!(Priority::from_raw(42), Priority::Normal);
        assert_eq!(Priority::from_raw(-3), Priority::Normal);
    }

    #[test]
    fn test_slack_weights() {
        assert_eq!(Priority::MustMeetDeadline.deadline_slack_weight(false), 20);
        assert_eq!(Priority::DueDate.deadline_slack_weight(true), 10);
        assert_eq!(Priority::DueDate.deadline_slack_weight(false), 5);
        assert_eq!(Priority::Normal.deadline_slack_weight(true), 0);
    }

    #[test]
    fn test_end_time_weights() {
        assert_eq!(Priority::AsapNoInterrupt.end_time_weight(), 50);
        assert_eq!(Priority::StockFill.end_time_weight(), 0);
        assert_eq!(Priority::Normal.end_time_weight(), 0);
    }
}
