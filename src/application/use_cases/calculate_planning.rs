//! Calculate planning use case
//!
//! The single entry point of a scheduling run: assembles inputs, expands
//! tasks, builds the constraint model, solves it within the caller's time
//! budget, extracts the result tables and replaces the planning-suggestion
//! collection. Every exit path, successful or not, runs the finalizer:
//! close the directory session, write the feedback document, trim the log
//! collection and write this run's log. Finalizer failures are logged and
//! never re-raised.

use std::sync::Arc;

use tracing::{error, info};

use crate::application::services::{ModelBuilder, ResultExtractor};
use crate::application::use_cases::{InputAssembler, TaskExpander};
use crate::domain::entities::{PreparationInterval, ScheduledOrder};
use crate::domain::errors::PlanningError;
use crate::domain::repositories::log_store::RUN_LOGS_TO_KEEP;
use crate::domain::repositories::{LogStore, MachineDirectory, PlanningStore};
use crate::domain::value_objects::RunClock;
use crate::infrastructure::logging::RunLog;
use crate::infrastructure::output::PlanningBoardWriter;
use crate::solver::search::{CpSolver, SolverConfig};
use crate::solver::solution::SolverStatus;

/// What a run produced, beyond its side effects on the stores
pub struct PlanningOutcome {
    pub status: SolverStatus,
    pub wall_seconds: f64,
    pub scheduled: Vec<ScheduledOrder>,
    pub preparations: Vec<PreparationInterval>,
}

/// Entry point used by the HTTP layer to start a run in the background
pub trait PlanningRunner: Send + Sync {
    fn run(&self, duration_seconds: u64) -> Result<(), PlanningError>;
}

/// Orchestrates one full scheduling run
pub struct CalculatePlanning {
    store: Arc<dyn PlanningStore>,
    directory: Arc<dyn MachineDirectory>,
    log_store: Arc<dyn LogStore>,
}

impl CalculatePlanning {
    pub fn new(
        store: Arc<dyn PlanningStore>,
        directory: Arc<dyn MachineDirectory>,
        log_store: Arc<dyn LogStore>,
    ) -> Self {
        Self {
            store,
            directory,
            log_store,
        }
    }

    /// Runs the pipeline with "now" captured from the wall clock.
    pub fn execute(&self, duration_seconds: u64) -> Result<PlanningOutcome, PlanningError> {
        self.execute_at(RunClock::start_of_run(), duration_seconds)
    }

    /// Runs the pipeline with a caller-supplied clock.
    pub fn execute_at(
        &self,
        clock: RunClock,
        duration_seconds: u64,
    ) -> Result<PlanningOutcome, PlanningError> {
        let mut log = RunLog::new("Preparation Logs");
        let result = self.run_pipeline(clock, duration_seconds, &mut log);
        if let Err(e) = &result {
            error!("calculate_planning failed: {}", e);
            log.error(format!("Unhandled failure in calculate_planning: {}", e));
        }
        self.finalize(&mut log);
        result
    }

    fn run_pipeline(
        &self,
        clock: RunClock,
        duration_seconds: u64,
        log: &mut RunLog,
    ) -> Result<PlanningOutcome, PlanningError> {
        info!("Starting calculate_planning with a {} second budget", duration_seconds);
        self.directory.open_session()?;
        log.info("Opened machine directory session");

        let inputs = InputAssembler::new(clock).assemble(
            self.store.as_ref(),
            self.directory.as_ref(),
            log,
        )?;

        // The preparation phase log is flushed before model construction so
        // a solver crash cannot lose it.
        self.write_phase_log(log, "CPSAT Log");

        let tasks = TaskExpander::new(clock).expand(&inputs.orders, &inputs.capabilities, log);
        let model = ModelBuilder::new(clock).build(tasks, &inputs, log);

        log.info(format!("Setting max solver time to {} seconds", duration_seconds));
        log.info("Setting max solver workers to 4");
        let solver = CpSolver::new(SolverConfig {
            max_time_seconds: duration_seconds,
            num_workers: 4,
            log_search_progress: true,
        });
        let outcome = solver.solve(&model);
        log.feedback(format!(
            "Solver took {:.3} seconds to find this solution",
            outcome.wall_seconds
        ));

        let (scheduled, preparations) =
            ResultExtractor::new(clock).extract(&model, &outcome, log);

        log.scoped("Writing Schedule", |log| {
            let records =
                PlanningBoardWriter::new().records(&inputs.raw_orders, &scheduled, &preparations);
            let inserted = self.store.replace_planning_suggestion(records)?;
            log.info(format!(
                "Replaced the planning suggestion collection with {} records",
                inserted
            ));
            Ok::<_, PlanningError>(())
        })?;

        if let Err(e) = self.log_store.replace_feedback(log.feedback_document()) {
            log.error(format!("Error writing feedback document: {}", e));
        }

        info!(
            status = outcome.status.name(),
            scheduled = scheduled.len(),
            preparations = preparations.len(),
            "calculate_planning finished"
        );
        Ok(PlanningOutcome {
            status: outcome.status,
            wall_seconds: outcome.wall_seconds,
            scheduled,
            preparations,
        })
    }

    /// Writes the current log tree and feedback, then starts a fresh tree.
    fn write_phase_log(&self, log: &mut RunLog, next_root: &str) {
        if let Err(e) = self.log_store.write_run_log(log.to_document()) {
            log.error(format!("Error writing phase log: {}", e));
        }
        if let Err(e) = self.log_store.replace_feedback(log.feedback_document()) {
            log.error(format!("Error writing feedback document: {}", e));
        }
        log.reset(next_root);
    }

    fn finalize(&self, log: &mut RunLog) {
        log.scoped("Finalization", |log| {
            log.info("Logging out of the machine directory session...");
            match self.directory.close_session() {
                Ok(()) => log.info("Machine directory logout successful."),
                Err(e) => log.error(format!("Machine directory logout failed: {}", e)),
            }

            if let Err(e) = self.log_store.replace_feedback(log.feedback_document()) {
                log.error(format!("Error writing feedback document: {}", e));
            }

            log.scoped("Log Cleanup", |log| match self
                .log_store
                .trim_run_logs(RUN_LOGS_TO_KEEP)
            {
                Ok(0) => log.info("Cleanup not needed"),
                Ok(removed) => {
                    log.info(format!("Cleanup successful: deleted {} older log records", removed))
                }
                Err(e) => log.error(format!("Error during log cleanup: {}", e)),
            });

            log.info("Writing main hierarchical log...");
        });

        if let Err(e) = self.log_store.write_run_log(log.to_document()) {
            error!("Error writing run log: {}", e);
        }
    }
}

impl PlanningRunner for CalculatePlanning {
    fn run(&self, duration_seconds: u64) -> Result<(), PlanningError> {
        self.execute(duration_seconds).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{InfoCode, Machine};
    use crate::domain::repositories::planning_store::MockPlanningStore;
    use crate::domain::repositories::{
        CycleStatRecord, OrderRecord, TechnicianWindowRecord, WeekendAvailabilityRecord,
    };
    use crate::domain::value_objects::SetupType;
    use crate::infrastructure::repositories::{
        InMemoryLogStore, InMemoryPlanningStore, StaticMachineDirectory,
    };
    use chrono::NaiveDate;

    fn clock() -> RunClock {
        // Monday morning.
        RunClock::new(
            NaiveDate::from_ymd_opt(2026, 3, 2)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
        )
    }

    fn order(id: &str, subseries: i64, quantity: i64, due: &str, priority: i64) -> OrderRecord {
        OrderRecord {
            id: id.to_string(),
            subseries: Some(subseries),
            description: Some(format!("article {}", id)),
            mold_name: Some(format!("mold {}", subseries)),
            hot_runner: None,
            quantity: Some(quantity),
            iml: Some(false),
            due_date: Some(due.to_string()),
            priority: Some(priority),
        }
    }

    fn cycle(subseries: i64, machine_id: i64, iml: bool) -> CycleStatRecord {
        CycleStatRecord {
            subseries: Some(subseries),
            machine_id: Some(machine_id),
            iml: Some(if iml { 1 } else { 0 }),
            cavity: Some(4),
            cycle_avg: Some(10.0),
        }
    }

    fn machines() -> Vec<Machine> {
        vec![
            Machine {
                id: 3,
                name: "M3".to_string(),
            },
            Machine {
                id: 4,
                name: "M4".to_string(),
            },
        ]
    }

    fn use_case(
        store: InMemoryPlanningStore,
    ) -> (
        CalculatePlanning,
        Arc<InMemoryPlanningStore>,
        Arc<StaticMachineDirectory>,
        Arc<InMemoryLogStore>,
    ) {
        let store = Arc::new(store);
        let directory = Arc::new(StaticMachineDirectory::new(machines()));
        let log_store = Arc::new(InMemoryLogStore::new());
        let use_case = CalculatePlanning::new(
            store.clone() as Arc<dyn PlanningStore>,
            directory.clone() as Arc<dyn MachineDirectory>,
            log_store.clone() as Arc<dyn LogStore>,
        );
        (use_case, store, directory, log_store)
    }

    #[test]
    fn test_single_order_run_end_to_end() {
        let store = InMemoryPlanningStore::new()
            .with_orders(vec![order("doc-1", 11, 8, "2026-03-02T09:00", 0)])
            .with_cycle_statistics(vec![cycle(11, 3, false)]);
        let (use_case, store, directory, log_store) = use_case(store);

        let outcome = use_case.execute_at(clock(), 2).unwrap();
        assert!(outcome.status.is_success());
        assert_eq!(outcome.scheduled.len(), 1);
        assert!(outcome.preparations.is_empty());

        let row = &outcome.scheduled[0];
        // 8 parts / 4 cavities * 10 s = 20 seconds of production.
        assert_eq!(row.start_time, clock().now());
        assert_eq!(row.end_time, clock().datetime_at(20));
        assert_eq!(row.duration_hours, 20.0 / 3_600.0);
        assert_eq!(row.info_code, InfoCode::Normal);
        assert_eq!(row.machine_id, 3);

        // The planning suggestion was replaced with the stamped order.
        let records = store.planning_suggestion();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["resourceId"], 3);
        assert_eq!(records[0]["purchaseID"], "doc-1");

        // Phase log plus final log, session closed exactly once.
        assert_eq!(log_store.run_logs().len(), 2);
        assert_eq!(directory.opened_sessions(), 1);
        assert_eq!(directory.closed_sessions(), 1);

        // The solver wall time landed in the feedback document.
        let feedback = log_store.feedback().unwrap();
        assert!(feedback["1"].as_str().unwrap().starts_with("Solver took"));
    }

    #[test]
    fn test_past_due_order_is_scheduled_with_info_code() {
        let store = InMemoryPlanningStore::new()
            .with_orders(vec![order("late", 11, 800, "2026-03-02T07:00", 5)])
            .with_cycle_statistics(vec![cycle(11, 3, false)]);
        let (use_case, _, _, _) = use_case(store);

        let outcome = use_case.execute_at(clock(), 2).unwrap();
        assert_eq!(outcome.scheduled.len(), 1);
        assert_eq!(outcome.scheduled[0].info_code, InfoCode::PastDueDate);
        // No hard start constraint: the order simply starts immediately on
        // the free machine.
        assert_eq!(outcome.scheduled[0].start_time, clock().now());
    }

    #[test]
    fn test_iml_swap_produces_preparation_row() {
        let store = InMemoryPlanningStore::new()
            .with_orders(vec![
                OrderRecord {
                    iml: Some(true),
                    ..order("iml-order", 11, 1440, "2026-03-20T00:00", 0)
                },
                order("plain-order", 11, 1440, "2026-03-21T00:00", 0),
            ])
            // Machine 3 is the only machine and supports IML.
            .with_cycle_statistics(vec![cycle(11, 3, true)]);
        let (use_case, store, _, _) = use_case(store);

        let outcome = use_case.execute_at(clock(), 2).unwrap();
        assert_eq!(outcome.scheduled.len(), 2);
        assert_eq!(outcome.preparations.len(), 1);

        let prep = &outcome.preparations[0];
        assert_eq!(prep.setup_type, SetupType::ImlSwap);
        assert_eq!(prep.duration_hours, 1.0);

        let records = store.planning_suggestion();
        // One standstill record and two order documents.
        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["stilstand"], 1);
        assert_eq!(records[0]["type"], "ombouw2");
    }

    #[test]
    fn test_order_without_capable_machine_reaches_feedback() {
        let store = InMemoryPlanningStore::new()
            .with_orders(vec![order("doc-1", 99, 8, "2026-03-20T00:00", 0)])
            .with_cycle_statistics(vec![cycle(11, 3, false)]);
        let (use_case, store, _, log_store) = use_case(store);

        let outcome = use_case.execute_at(clock(), 2).unwrap();
        assert!(outcome.scheduled.is_empty());

        let feedback = log_store.feedback().unwrap();
        let values: Vec<String> = (1..=2)
            .filter_map(|i| feedback[i.to_string()].as_str().map(str::to_string))
            .collect();
        assert!(values
            .iter()
            .any(|v| v.contains("No machines capable of making subserie with ID: 99")));

        // The unplaceable order still passes through to the board unstamped.
        let records = store.planning_suggestion();
        assert_eq!(records.len(), 1);
        assert!(records[0].get("resourceId").is_none());
    }

    #[test]
    fn test_technician_shortage_limits_concurrent_swaps() {
        // Four machines, each with two orders of different subseries, and
        // only two technicians available this week.
        let mut orders = Vec::new();
        let mut cycles = Vec::new();
        for machine in 1..=4i64 {
            orders.push(order(
                &format!("first-{}", machine),
                100 + machine,
                1440,
                "2026-03-20T00:00",
                0,
            ));
            orders.push(order(
                &format!("second-{}", machine),
                200 + machine,
                1440,
                "2026-03-21T00:00",
                0,
            ));
            cycles.push(cycle(100 + machine, machine, false));
            cycles.push(cycle(200 + machine, machine, false));
        }
        let store = InMemoryPlanningStore::new()
            .with_orders(orders)
            .with_cycle_statistics(cycles)
            .with_technician_windows(vec![TechnicianWindowRecord {
                start_date: "2026-03-02T00:00".to_string(),
                end_date: "2026-03-08T23:59".to_string(),
                available: 2,
            }]);

        let directory = Arc::new(StaticMachineDirectory::new(
            (1..=4i64)
                .map(|id| Machine {
                    id,
                    name: format!("M{}", id),
                })
                .collect(),
        ));
        let log_store = Arc::new(InMemoryLogStore::new());
        let store = Arc::new(store);
        let use_case = CalculatePlanning::new(
            store.clone() as Arc<dyn PlanningStore>,
            directory as Arc<dyn MachineDirectory>,
            log_store as Arc<dyn LogStore>,
        );

        let outcome = use_case.execute_at(clock(), 3).unwrap();
        let swaps: Vec<_> = outcome
            .preparations
            .iter()
            .filter(|p| p.setup_type == SetupType::SubseriesSwap)
            .collect();
        assert_eq!(swaps.len(), 4);
        for swap in &swaps {
            let concurrent = swaps
                .iter()
                .filter(|other| {
                    other.start_time <= swap.start_time && swap.start_time < other.end_time
                })
                .count();
            assert!(concurrent <= 2, "more than two swaps run at once");
        }
        // Subseries swaps start inside the allowed morning window.
        for swap in &swaps {
            use chrono::Timelike;
            let hour = swap.start_time.hour();
            assert!((6..13).contains(&hour), "swap starts at {}", swap.start_time);
        }
    }

    #[test]
    fn test_weekend_availability_expands_two_days() {
        // A 48 h order starting Friday noon on a machine whose Saturday is
        // closed pauses over the weekend day.
        let friday_clock = RunClock::new(
            NaiveDate::from_ymd_opt(2026, 3, 6)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        );
        let store = InMemoryPlanningStore::new()
            .with_orders(vec![order("doc-1", 11, 69120, "2026-03-20T00:00", 0)])
            .with_cycle_statistics(vec![cycle(11, 3, false)])
            // Sunday is opened for machine 3, Saturday stays closed.
            .with_weekend_availability(vec![WeekendAvailabilityRecord {
                machine_id: 3,
                start_date: "2026-03-08T00:00".to_string(),
                duration: 1,
                duration_unit: "d".to_string(),
            }]);
        let (use_case, _, _, _) = use_case(store);

        let outcome = use_case.execute_at(friday_clock, 2).unwrap();
        let row = &outcome.scheduled[0];
        // 69120 parts / 4 * 10 s = 48 h of production plus a 24 h pause.
        assert_eq!(row.start_time, friday_clock.now());
        assert_eq!(row.end_time, friday_clock.datetime_at((48 + 24) * 3_600));
        assert_eq!(
            row.weekends_inside,
            vec![NaiveDate::from_ymd_opt(2026, 3, 7).unwrap()]
        );
    }

    #[test]
    fn test_connectivity_failure_still_runs_finalizer() {
        let mut store = MockPlanningStore::new();
        store.expect_open_orders().returning(|| {
            Err(PlanningError::Connectivity(
                "document store unreachable".to_string(),
            ))
        });

        let store = Arc::new(store);
        let directory = Arc::new(StaticMachineDirectory::new(machines()));
        let log_store = Arc::new(InMemoryLogStore::new());
        let use_case = CalculatePlanning::new(
            store as Arc<dyn PlanningStore>,
            directory.clone() as Arc<dyn MachineDirectory>,
            log_store.clone() as Arc<dyn LogStore>,
        );

        let result = use_case.execute_at(clock(), 2);
        assert!(matches!(result, Err(PlanningError::Connectivity(_))));

        // The finalizer closed the session and wrote the run log anyway.
        assert_eq!(directory.closed_sessions(), 1);
        assert_eq!(log_store.run_logs().len(), 1);
        let doc = &log_store.run_logs()[0];
        assert!(doc["steps"].get("Finalization").is_some());
    }
}
