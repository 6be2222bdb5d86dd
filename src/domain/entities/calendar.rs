//! Calendar entity module
//!
//! This module defines the factory calendar facts consumed by the
//! constraint model: machine maintenance windows, day-level technician
//! capacity, subseries blackout windows, and weekend availability per
//! machine.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A fixed window during which a machine is unavailable
///
/// Merged from the maintenance collection and from downtime batches; both
/// behave identically in the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaintenanceWindow {
    pub machine_id: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Changeover-technician capacity on a specific day
///
/// Only days that deviate from the default pool size are recorded; the
/// per-day explosion keeps the minimum capacity when ranges overlap.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TechnicianAvailability {
    pub date: NaiveDate,
    /// Number of concurrent subseries swaps possible on this day
    pub capacity: u32,
}

/// A window during which a subseries cannot be produced on any machine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubseriesBlackout {
    pub subseries: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// A weekend day explicitly opened for production on one machine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AvailableWeekendDay {
    pub machine_id: i64,
    pub date: NaiveDate,
}

/// A weekend day on which a machine may not start or end work
///
/// Computed by inverting the available weekend days against every Saturday
/// and Sunday inside the horizon. A task may span such a day only by
/// pausing over it, which extends its end by 24 hours per day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ForbiddenWeekendDay {
    pub machine_id: i64,
    pub date: NaiveDate,
}
