//! Result extractor service
//!
//! Decodes the solver outcome back into the two output tables: scheduled
//! orders with absolute times and weekend annotations, and preparation
//! intervals with their human-readable reasons. A non-success status yields
//! two empty tables and an error log entry.

use crate::domain::entities::{PreparationInterval, ScheduledOrder};
use crate::domain::value_objects::RunClock;
use crate::infrastructure::logging::RunLog;
use crate::solver::model::ScheduleModel;
use crate::solver::solution::{SolveOutcome, SolverStatus};

/// Decodes a solve outcome into output tables
pub struct ResultExtractor {
    clock: RunClock,
}

impl ResultExtractor {
    pub fn new(clock: RunClock) -> Self {
        Self { clock }
    }

    pub fn extract(
        &self,
        model: &ScheduleModel,
        outcome: &SolveOutcome,
        log: &mut RunLog,
    ) -> (Vec<ScheduledOrder>, Vec<PreparationInterval>) {
        log.push_context("Extracting Results");
        log.info("Extracting and processing final results from solver");

        if !outcome.status.is_success() {
            if outcome.status == SolverStatus::Infeasible {
                log.error("No feasible schedule found (INFEASIBLE).");
            } else {
                log.error(format!("Solver status: {}", outcome.status.name()));
            }
            log.pop_context();
            return (Vec::new(), Vec::new());
        }
        log.info(format!("Solver status: {}", outcome.status.name()));

        let Some(solution) = outcome.solution.as_ref() else {
            log.error("Solver reported success but returned no solution");
            log.pop_context();
            return (Vec::new(), Vec::new());
        };

        let mut scheduled = Vec::with_capacity(solution.tasks.len());
        for chosen in &solution.tasks {
            let interval = model.task(chosen.task_index);
            let mut weekends = chosen.weekends_inside.clone();
            weekends.sort_unstable();
            scheduled.push(ScheduledOrder {
                document_id: interval.task.document_id.clone(),
                machine_id: interval.task.machine_id,
                subseries: interval.task.subseries,
                start_time: self.clock.datetime_at(chosen.start),
                end_time: self.clock.datetime_at(chosen.end),
                duration_hours: interval.duration as f64 / 3_600.0,
                iml: interval.task.iml,
                info_code: interval.task.info_code(),
                extra_info: interval.task.info.clone(),
                weekends_inside: weekends,
            });
        }
        scheduled.sort_by(|a, b| (a.machine_id, a.start_time).cmp(&(b.machine_id, b.start_time)));
        log.info(format!("Extracted {} scheduled orders", scheduled.len()));

        let mut preparations = Vec::with_capacity(solution.preparations.len());
        for prep in &solution.preparations {
            let first = &model.task(prep.predecessor).task;
            let second = &model.task(prep.successor).task;
            let reason = format!(
                "{} between 2 subseries:\n\nOrder 1 description: {}\n\nOrder 2 description: {}, linked to document {}",
                prep.setup.capitalized_label(),
                first.description,
                second.description,
                second.document_id
            );
            preparations.push(PreparationInterval {
                document_id: second.document_id.clone(),
                machine_id: prep.machine_id,
                setup_type: prep.setup,
                start_time: self.clock.datetime_at(prep.start),
                end_time: self.clock.datetime_at(prep.end),
                duration_hours: prep.setup.duration_seconds() as f64 / 3_600.0,
                reason,
                first_description: first.description.clone(),
                second_description: second.description.clone(),
                first_mold: first.mold_name.clone(),
                second_mold: second.mold_name.clone(),
                first_hot_runner: first.hot_runner.clone(),
                second_hot_runner: second.hot_runner.clone(),
            });
        }
        log.info(format!("Extracted {} preparation intervals", preparations.len()));

        log.pop_context();
        (scheduled, preparations)
    }
}
