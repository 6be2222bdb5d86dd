//! In-memory planning store implementation
//!
//! This module provides an in-memory implementation of the PlanningStore
//! trait. Input tables are plain vectors seeded up front; the
//! planning-suggestion output is held behind a mutex so the store can be
//! shared across threads. Suitable for fixtures, tests and local runs.

use std::sync::Mutex;

use serde_json::Value;

use crate::domain::errors::PlanningError;
use crate::domain::repositories::{
    BlackoutRecord, CycleStatRecord, MaintenanceRecord, OrderRecord, PlanningStore,
    TechnicianWindowRecord, WeekendAvailabilityRecord,
};

/// In-memory implementation of the PlanningStore trait
#[derive(Default)]
pub struct InMemoryPlanningStore {
    orders: Vec<OrderRecord>,
    cycle_statistics: Vec<CycleStatRecord>,
    technician_windows: Vec<TechnicianWindowRecord>,
    weekend_availability: Vec<WeekendAvailabilityRecord>,
    maintenance_windows: Vec<MaintenanceRecord>,
    downtime_batches: Vec<MaintenanceRecord>,
    subseries_blackouts: Vec<BlackoutRecord>,
    planning_suggestion: Mutex<Vec<Value>>,
}

impl InMemoryPlanningStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_orders(mut self, orders: Vec<OrderRecord>) -> Self {
        self.orders = orders;
        self
    }

    pub fn with_cycle_statistics(mut self, rows: Vec<CycleStatRecord>) -> Self {
        self.cycle_statistics = rows;
        self
    }

    pub fn with_technician_windows(mut self, rows: Vec<TechnicianWindowRecord>) -> Self {
        self.technician_windows = rows;
        self
    }

    pub fn with_weekend_availability(mut self, rows: Vec<WeekendAvailabilityRecord>) -> Self {
        self.weekend_availability = rows;
        self
    }

    pub fn with_maintenance_windows(mut self, rows: Vec<MaintenanceRecord>) -> Self {
        self.maintenance_windows = rows;
        self
    }

    pub fn with_downtime_batches(mut self, rows: Vec<MaintenanceRecord>) -> Self {
        self.downtime_batches = rows;
        self
    }

    pub fn with_subseries_blackouts(mut self, rows: Vec<BlackoutRecord>) -> Self {
        self.subseries_blackouts = rows;
        self
    }

    /// The planning-suggestion records written by the last run.
    pub fn planning_suggestion(&self) -> Vec<Value> {
        self.planning_suggestion
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

impl PlanningStore for InMemoryPlanningStore {
    fn open_orders(&self) -> Result<Vec<OrderRecord>, PlanningError> {
        Ok(self.orders.clone())
    }

    fn cycle_statistics(&self) -> Result<Vec<CycleStatRecord>, PlanningError> {
        Ok(self.cycle_statistics.clone())
    }

    fn technician_windows(&self) -> Result<Vec<TechnicianWindowRecord>, PlanningError> {
        Ok(self.technician_windows.clone())
    }

    fn weekend_availability(&self) -> Result<Vec<WeekendAvailabilityRecord>, PlanningError> {
        Ok(self.weekend_availability.clone())
    }

    fn maintenance_windows(&self) -> Result<Vec<MaintenanceRecord>, PlanningError> {
        Ok(self.maintenance_windows.clone())
    }

    fn downtime_batches(&self) -> Result<Vec<MaintenanceRecord>, PlanningError> {
        Ok(self.downtime_batches.clone())
    }

    fn subseries_blackouts(&self) -> Result<Vec<BlackoutRecord>, PlanningError> {
        Ok(self.subseries_blackouts.clone())
    }

    fn replace_planning_suggestion(
        &self,
        records: Vec<Value>,
    ) -> Result<usize, PlanningError> {
        let mut suggestion = self
            .planning_suggestion
            .lock()
            .map_err(|_| PlanningError::Connectivity("planning store lock poisoned".to_string()))?;
        suggestion.clear();
        let inserted = records.len();
        suggestion.extend(records);
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_replace_planning_suggestion_deletes_previous_contents() {
        let store = InMemoryPlanningStore::new();
        store
            .replace_planning_suggestion(vec![json!({"old": true})])
            .unwrap();
        let inserted = store
            .replace_planning_suggestion(vec![json!({"new": 1}), json!({"new": 2})])
            .unwrap();

        assert_eq!(inserted, 2);
        let records = store.planning_suggestion();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["new"], 1);
    }

    #[test]
    fn test_seeded_tables_round_trip() {
        let store = InMemoryPlanningStore::new().with_orders(vec![OrderRecord {
            id: "doc-1".to_string(),
            subseries: Some(11),
            description: None,
            mold_name: None,
            hot_runner: None,
            quantity: Some(100),
            iml: None,
            due_date: Some("2026-04-01".to_string()),
            priority: None,
        }]);

        assert_eq!(store.open_orders().unwrap().len(), 1);
        assert!(store.cycle_statistics().unwrap().is_empty());
    }
}
