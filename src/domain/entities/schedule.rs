//! Schedule output entity module
//!
//! This module defines the two tables a scheduling run produces: the chosen
//! production intervals and the inferred preparation intervals between
//! consecutive tasks on a machine.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::SetupType;

/// Condition of the deadline of a scheduled order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfoCode {
    /// The deadline can be met
    Normal,
    /// The deadline lies within the production duration from "now"
    ImpossibleDeadline,
    /// The deadline already passed when the run started
    PastDueDate,
}

impl InfoCode {
    /// Numeric code written to the output table.
    pub fn as_u8(&self) -> u8 {
        match self {
            InfoCode::Normal => 0,
            InfoCode::ImpossibleDeadline => 1,
            InfoCode::PastDueDate => 2,
        }
    }
}

/// A chosen (order, machine) pair with its concrete production interval
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduledOrder {
    /// Identifier of the backing order document
    pub document_id: String,
    pub machine_id: i64,
    pub subseries: i64,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// Net production duration in hours, excluding weekend pauses
    pub duration_hours: f64,
    /// Whether the chosen variant runs with in-mold labeling
    pub iml: bool,
    pub info_code: InfoCode,
    /// Space-joined information messages from task expansion
    pub extra_info: String,
    /// Forbidden weekend days the interval pauses over
    pub weekends_inside: Vec<NaiveDate>,
}

/// A changeover interval between two consecutive tasks on a machine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreparationInterval {
    /// Document id of the successor order, linking the swap to its cause
    pub document_id: String,
    pub machine_id: i64,
    pub setup_type: SetupType,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub duration_hours: f64,
    /// Human-readable explanation shown on the planning board
    pub reason: String,
    pub first_description: String,
    pub second_description: String,
    pub first_mold: String,
    pub second_mold: String,
    pub first_hot_runner: String,
    pub second_hot_runner: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_code_values() {
        assert_eq!(InfoCode::Normal.as_u8(), 0);
        assert_eq!(InfoCode::ImpossibleDeadline.as_u8(), 1);
        assert_eq!(InfoCode::PastDueDate.as_u8(), 2);
    }
}
