//! Planning store repository module
//!
//! The document store holding the input tables and the planning-board
//! output is an external collaborator; this module defines the trait the
//! core consumes it through, plus the raw record types mirroring the stored
//! document schemas. Date fields stay strings here: parsing them, and
//! dropping rows that fail to parse, is the input assembler's job.

use serde::{Deserialize, Serialize};

use crate::domain::errors::PlanningError;

/// An open order document, already joined with its mold register entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderRecord {
    /// Document identifier
    #[serde(rename = "_id")]
    pub id: String,
    /// Product family, joined in from the mold register
    #[serde(rename = "subserieID")]
    pub subseries: Option<i64>,
    /// Article description
    #[serde(default)]
    pub description: Option<String>,
    /// Mold name, joined in from the mold register
    #[serde(rename = "matrijsName", default)]
    pub mold_name: Option<String>,
    /// Hot-runner requirement, joined in from the mold register
    #[serde(rename = "hotrunner", default)]
    pub hot_runner: Option<String>,
    /// Requested quantity of parts
    #[serde(rename = "aantal")]
    pub quantity: Option<i64>,
    /// Whether in-mold labeling was requested
    #[serde(default)]
    pub iml: Option<bool>,
    /// Due date as stored, not yet parsed
    #[serde(rename = "leverDatum")]
    pub due_date: Option<String>,
    /// Raw priority code in `{0,1,2,3,4,5,7}`
    #[serde(default)]
    pub priority: Option<i64>,
}

/// A measured cycle-time row for one (subseries, machine, IML) combination
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CycleStatRecord {
    #[serde(rename = "subserieID")]
    pub subseries: Option<i64>,
    #[serde(rename = "machineID")]
    pub machine_id: Option<i64>,
    /// Stored as 0/1 in the collection
    #[serde(rename = "IML", default)]
    pub iml: Option<i64>,
    #[serde(rename = "cav", default)]
    pub cavity: Option<u32>,
    #[serde(rename = "cycleAvg", default)]
    pub cycle_avg: Option<f64>,
}

/// A technician-availability range (`resourceId = -1` batch rows)
///
/// Dates use the `%Y-%m-%dT%H:%M` string format of the source documents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TechnicianWindowRecord {
    #[serde(rename = "startDate")]
    pub start_date: String,
    #[serde(rename = "endDate")]
    pub end_date: String,
    /// Concurrent subseries swaps possible during the range
    #[serde(rename = "ombouwersBeschikbaar")]
    pub available: u32,
}

/// A weekend-availability row from the resource time ranges collection
///
/// A `duration = 2, duration_unit = "d"` row expands to two consecutive
/// available dates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeekendAvailabilityRecord {
    #[serde(rename = "resourceId")]
    pub machine_id: i64,
    #[serde(rename = "startDate")]
    pub start_date: String,
    pub duration: u32,
    #[serde(rename = "durationUnit")]
    pub duration_unit: String,
}

/// A machine-unavailability window, from maintenance or downtime batches
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaintenanceRecord {
    #[serde(rename = "machineId", alias = "resourceId")]
    pub machine_id: Option<i64>,
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}

/// A subseries blackout window from the mold status collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlackoutRecord {
    #[serde(rename = "subserieId")]
    pub subseries: Option<i64>,
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}

/// Read/write access to the planning document store
///
/// Implementations own connection handling; every method failing with
/// [`PlanningError::Connectivity`] aborts the run.
#[cfg_attr(test, mockall::automock)]
pub trait PlanningStore: Send + Sync {
    /// Open orders: active batches that are not changeover rows and are not
    /// planned on external machines, enriched from the mold register.
    fn open_orders(&self) -> Result<Vec<OrderRecord>, PlanningError>;

    /// Measured cycle statistics per (subseries, machine, IML).
    fn cycle_statistics(&self) -> Result<Vec<CycleStatRecord>, PlanningError>;

    /// Technician-availability ranges for days with a reduced pool.
    fn technician_windows(&self) -> Result<Vec<TechnicianWindowRecord>, PlanningError>;

    /// Weekend days explicitly opened for production.
    fn weekend_availability(&self) -> Result<Vec<WeekendAvailabilityRecord>, PlanningError>;

    /// Planned maintenance windows from the maintenance collection.
    fn maintenance_windows(&self) -> Result<Vec<MaintenanceRecord>, PlanningError>;

    /// Additional machine downtime recorded as future standstill batches.
    fn downtime_batches(&self) -> Result<Vec<MaintenanceRecord>, PlanningError>;

    /// Subseries blackout windows; rows ending in the past are still
    /// returned and filtered by the assembler.
    fn subseries_blackouts(&self) -> Result<Vec<BlackoutRecord>, PlanningError>;

    /// Replaces the planning-suggestion collection with the given records:
    /// delete all, then insert.
    fn replace_planning_suggestion(
        &self,
        records: Vec<serde_json::Value>,
    ) -> Result<usize, PlanningError>;
}
