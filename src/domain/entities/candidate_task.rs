//! Candidate task entity module
//!
//! This module defines the CandidateTask entity: one concrete option for
//! executing an order on one specific machine with one specific IML variant.
//! The task expander emits zero or more candidates per order and the solver
//! must choose exactly one per order.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{Priority, SetupType};

use super::schedule::InfoCode;

/// One (order, machine, IML) execution option
///
/// Candidates carry everything the constraint model and the result
/// extraction need: the computed duration, the deadline flags, the adjusted
/// priority, and the descriptive fields shown on the planning board.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateTask {
    /// Stable identifier: `order_subseries_machine_iml`
    pub id: String,
    /// Key grouping all candidates of the same order
    pub order_id: String,
    /// Identifier of the backing order document
    pub document_id: String,
    /// Product family of the order
    pub subseries: i64,
    /// Target machine of this candidate
    pub machine_id: i64,
    /// Whether this candidate runs with in-mold labeling
    pub iml: bool,
    /// Production duration in seconds
    pub duration_seconds: i64,
    /// Absolute due date of the order
    pub due_date: NaiveDateTime,
    /// The due date already lies in the past
    pub is_past_due: bool,
    /// The due date lies within the production duration from "now"
    pub impossible_deadline: bool,
    /// Adjusted scheduling priority
    pub priority: Priority,
    /// Collected information messages, space-joined
    pub info: String,
    /// Article description
    pub description: String,
    /// Mold name
    pub mold_name: String,
    /// Hot-runner text
    pub hot_runner: String,
}

impl CandidateTask {
    /// Builds the stable candidate identifier.
    pub fn task_id(order_id: &str, subseries: i64, machine_id: i64, iml: bool) -> String {
        format!("{}_{}_{}_{}", order_id, subseries, machine_id, iml)
    }

    /// The changeover required between this task and its direct successor
    /// on the same machine, if any.
    ///
    /// Different subseries need a full mold exchange; the same subseries
    /// needs an insert swap when either side runs with IML.
    pub fn setup_to(&self, next: &CandidateTask) -> Option<SetupType> {
        if self.subseries != next.subseries {
            Some(SetupType::SubseriesSwap)
        } else if self.iml || next.iml {
            Some(SetupType::ImlSwap)
        } else {
            None
        }
    }

    /// The information code of the output row.
    pub fn info_code(&self) -> InfoCode {
        if self.impossible_deadline {
            InfoCode::ImpossibleDeadline
        } else if self.is_past_due {
            InfoCode::PastDueDate
        } else {
            InfoCode::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn task(subseries: i64, iml: bool) -> CandidateTask {
        CandidateTask {
            id: CandidateTask::task_id("o1", subseries, 3, iml),
            order_id: "o1".to_string(),
            document_id: "doc-1".to_string(),
            subseries,
            machine_id: 3,
            iml,
            duration_seconds: 3_600,
            due_date: NaiveDate::from_ymd_opt(2026, 4, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            is_past_due: false,
            impossible_deadline: false,
            priority: Priority::Normal,
            info: String::new(),
            description: "article".to_string(),
            mold_name: "M-1".to_string(),
            hot_runner: "No Hotrunner Needed".to_string(),
        }
    }

    #[test]
    fn test_task_id_format() {
        assert_eq!(CandidateTask::task_id("o1", 11, 3, true), "o1_11_3_true");
    }

    #[test]
    fn test_setup_subseries_swap_wins() {
        // Differing subseries always need the full mold exchange, even when
        // IML is involved on either side.
        assert_eq!(
            task(11, true).setup_to(&task(12, false)),
            Some(SetupType::SubseriesSwap)
        );
        assert_eq!(
            task(11, false).setup_to(&task(12, true)),
            Some(SetupType::SubseriesSwap)
        );
    }

    #[test]
    fn test_setup_iml_swap_same_subseries() {
        assert_eq!(task(11, true).setup_to(&task(11, false)), Some(SetupType::ImlSwap));
        assert_eq!(task(11, false).setup_to(&task(11, true)), Some(SetupType::ImlSwap));
        assert_eq!(task(11, true).setup_to(&task(11, true)), Some(SetupType::ImlSwap));
    }

    #[test]
    fn test_setup_none_for_plain_same_subseries() {
        assert_eq!(task(11, false).setup_to(&task(11, false)), None);
    }

    #[test]
    fn test_info_code_precedence() {
        let mut t = task(11, false);
        assert_eq!(t.info_code(), InfoCode::Normal);

        t.is_past_due = true;
        assert_eq!(t.info_code(), InfoCode::PastDueDate);

        // An impossible deadline outranks the past-due flag.
        t.impossible_deadline = true;
        assert_eq!(t.info_code(), InfoCode::ImpossibleDeadline);
    }
}
