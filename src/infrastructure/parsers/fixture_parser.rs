//! Planning fixture parser module
//!
//! Parses a JSON fixture holding all input tables of a scheduling run, in
//! the field naming of the stored documents. Fixtures back the CLI runner
//! and integration tests; every table is optional and defaults to empty.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::entities::Machine;
use crate::domain::repositories::{
    BlackoutRecord, CycleStatRecord, MaintenanceRecord, OrderRecord, TechnicianWindowRecord,
    WeekendAvailabilityRecord,
};
use crate::infrastructure::repositories::{InMemoryPlanningStore, StaticMachineDirectory};

/// All input tables of one scheduling run
#[derive(Debug, Default, Deserialize)]
pub struct PlanningFixture {
    #[serde(default)]
    pub machines: Vec<Machine>,
    #[serde(default)]
    pub orders: Vec<OrderRecord>,
    #[serde(default)]
    pub cycle_statistics: Vec<CycleStatRecord>,
    #[serde(default)]
    pub technician_windows: Vec<TechnicianWindowRecord>,
    #[serde(default)]
    pub weekend_availability: Vec<WeekendAvailabilityRecord>,
    #[serde(default)]
    pub maintenance_windows: Vec<MaintenanceRecord>,
    #[serde(default)]
    pub downtime_batches: Vec<MaintenanceRecord>,
    #[serde(default)]
    pub subseries_blackouts: Vec<BlackoutRecord>,
}

impl PlanningFixture {
    /// Builds the repository pair a run needs from this fixture.
    pub fn into_repositories(self) -> (InMemoryPlanningStore, StaticMachineDirectory) {
        let store = InMemoryPlanningStore::new()
            .with_orders(self.orders)
            .with_cycle_statistics(self.cycle_statistics)
            .with_technician_windows(self.technician_windows)
            .with_weekend_availability(self.weekend_availability)
            .with_maintenance_windows(self.maintenance_windows)
            .with_downtime_batches(self.downtime_batches)
            .with_subseries_blackouts(self.subseries_blackouts);
        let directory = StaticMachineDirectory::new(self.machines);
        (store, directory)
    }
}

/// Parses planning fixtures from JSON
pub struct FixtureParser;

impl FixtureParser {
    pub fn new() -> Self {
        Self
    }

    /// Parses a fixture file.
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<PlanningFixture> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read fixture file: {}", path.as_ref().display())
        })?;
        self.parse_str(&content)
    }

    /// Parses fixture JSON from a string.
    pub fn parse_str(&self, content: &str) -> Result<PlanningFixture> {
        serde_json::from_str(content).context("Failed to parse planning fixture JSON")
    }
}

impl Default for FixtureParser {
    fn default() -> Self {
        Self::new()
    }
}
