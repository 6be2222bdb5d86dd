//! Model builder service
//!
//! Translates the candidate tasks and the factory calendar into the
//! constraint model. The builder owns the model exclusively while it is
//! under construction and releases it only when every table is complete;
//! registration follows a fixed order because later constraints read the
//! interval lists of earlier ones:
//!
//! 1. task intervals, 2. capacity-reduction intervals, 3. the allowed
//! swap-start domain, 4. the forbidden-hour blockers, 5. per-machine tables
//! (maintenance, blackouts, forbidden weekend days), 6. the global
//! technician capacity.

use chrono::Datelike;

use crate::application::use_cases::PlanningInputs;
use crate::domain::entities::CandidateTask;
use crate::domain::value_objects::{RunClock, HORIZON_SECONDS, SECONDS_PER_DAY};
use crate::infrastructure::logging::RunLog;
use crate::solver::model::{
    CapacityReduction, ScheduleModel, WeekendDayWindow, DEFAULT_SWAP_CAPACITY,
};

/// Hour at which a subseries swap may start.
const SWAP_WINDOW_OPENS: u32 = 6;
/// Hour from which no subseries swap may start.
const SWAP_WINDOW_CLOSES: u32 = 13;

/// Builds the schedule model from expanded tasks and normalized inputs
pub struct ModelBuilder {
    clock: RunClock,
}

impl ModelBuilder {
    pub fn new(clock: RunClock) -> Self {
        Self { clock }
    }

    pub fn build(
        &self,
        tasks: Vec<CandidateTask>,
        inputs: &PlanningInputs,
        log: &mut RunLog,
    ) -> ScheduleModel {
        let mut model = ScheduleModel::new(HORIZON_SECONDS);
        log.push_context("Creating Optimal Schedule");
        log.info("Starting the creation of the model");

        log.scoped("Creating Intervals", |log| {
            for task in tasks {
                let due_seconds = self.clock.seconds_from_now(task.due_date);
                model.add_task(task, due_seconds);
            }
            log.info(format!(
                "Created optional intervals for {} candidate tasks across {} orders",
                model.task_count(),
                model.order_groups().len()
            ));
        });

        self.add_capacity_reductions(&mut model, inputs, log);
        self.add_swap_start_domain(&mut model, inputs, log);
        self.add_hour_blockers(&mut model, log);
        self.add_machine_tables(&mut model, inputs, log);

        log.scoped("General Constraints", |log| {
            model.set_swap_capacity(DEFAULT_SWAP_CAPACITY);
            log.info(format!(
                "Set cumulative swap capacity to {} with {} reduction intervals",
                DEFAULT_SWAP_CAPACITY,
                model.capacity_reductions().len()
            ));
        });

        log.info("Finished adding all of the constraints");
        log.pop_context();
        model
    }

    /// One fixed interval per contiguous run of days with the same reduced
    /// technician capacity, demanding the deficit against the default pool.
    fn add_capacity_reductions(
        &self,
        model: &mut ScheduleModel,
        inputs: &PlanningInputs,
        log: &mut RunLog,
    ) {
        log.scoped("Capacity Reduction Intervals", |log| {
            let reduced: Vec<_> = inputs
                .technician_days
                .iter()
                .filter(|day| day.capacity < DEFAULT_SWAP_CAPACITY)
                .collect();

            let mut index = 0;
            while index < reduced.len() {
                let run_start = reduced[index];
                let mut last = run_start;
                while index + 1 < reduced.len() {
                    let next = reduced[index + 1];
                    let contiguous = last
                        .date
                        .succ_opt()
                        .map(|d| d == next.date)
                        .unwrap_or(false);
                    if contiguous && next.capacity == last.capacity {
                        last = next;
                        index += 1;
                    } else {
                        break;
                    }
                }
                let (start, _) = self.clock.day_window(run_start.date);
                let (day_start, _) = self.clock.day_window(last.date);
                let reduction = CapacityReduction {
                    start,
                    end: day_start + SECONDS_PER_DAY,
                    demand: DEFAULT_SWAP_CAPACITY - run_start.capacity,
                };
                log.info(format!(
                    "Reduction from {} to {} with demand {}",
                    run_start.date, last.date, reduction.demand
                ));
                model.add_capacity_reduction(reduction);
                index += 1;
            }
            log.info(format!(
                "Created {} capacity reduction intervals",
                model.capacity_reductions().len()
            ));
        });
    }

    /// The allowed swap-start domain: 06:00-13:00 on every weekday and on
    /// every weekend day explicitly opened for production.
    fn add_swap_start_domain(
        &self,
        model: &mut ScheduleModel,
        inputs: &PlanningInputs,
        log: &mut RunLog,
    ) {
        log.scoped("Subserie Swap Time Ranges", |log| {
            let open_dates: std::collections::BTreeSet<_> = inputs
                .available_weekends
                .iter()
                .map(|day| day.date)
                .collect();

            let mut intervals = Vec::new();
            let mut date = self.clock.today();
            let last = self.clock.horizon_end_date();
            while date <= last {
                let weekday = date.weekday().num_days_from_monday() < 5;
                if weekday || open_dates.contains(&date) {
                    intervals.push((
                        self.clock.at_time(date, SWAP_WINDOW_OPENS, 0),
                        self.clock.at_time(date, SWAP_WINDOW_CLOSES, 0),
                    ));
                }
                date = match date.succ_opt() {
                    Some(next) => next,
                    None => break,
                };
            }
            log.info(format!(
                "Created allowed start domain for subserie swaps with {} day windows",
                intervals.len()
            ));
            model.set_allowed_swap_starts(intervals);
        });
    }

    /// Mandatory blocker bands covering the forbidden swap hours, 13:00 of
    /// each day to 06:00 of the next.
    fn add_hour_blockers(&self, model: &mut ScheduleModel, log: &mut RunLog) {
        log.scoped("Cumulative Blocking Intervals", |log| {
            let mut date = match self.clock.today().pred_opt() {
                Some(yesterday) => yesterday,
                None => self.clock.today(),
            };
            let last = self.clock.horizon_end_date();
            let mut count = 0usize;
            while date <= last {
                let next = match date.succ_opt() {
                    Some(next) => next,
                    None => break,
                };
                let start = self.clock.at_time(date, SWAP_WINDOW_CLOSES, 0);
                let end = self.clock.at_time(next, SWAP_WINDOW_OPENS, 0);
                if end > 0 {
                    model.add_hour_blocker(start, end);
                    count += 1;
                }
                date = next;
            }
            log.info(format!("Created {} mandatory blocking intervals", count));
        });
    }

    /// Per-machine tables: maintenance windows, subseries blackouts and
    /// forbidden weekend days.
    fn add_machine_tables(
        &self,
        model: &mut ScheduleModel,
        inputs: &PlanningInputs,
        log: &mut RunLog,
    ) {
        log.scoped("Machine Maintenance Constraint", |log| {
            for window in &inputs.maintenance {
                model.add_maintenance_window(
                    window.machine_id,
                    self.clock.seconds_from_now(window.start),
                    self.clock.seconds_from_now(window.end),
                );
            }
            log.info(format!(
                "Registered {} maintenance windows",
                inputs.maintenance.len()
            ));
        });

        log.scoped("Subserie Unavailable Constraint", |log| {
            for blackout in &inputs.blackouts {
                model.add_subseries_blackout(
                    blackout.subseries,
                    self.clock.seconds_from_now(blackout.start),
                    self.clock.seconds_from_now(blackout.end),
                );
            }
            log.info(format!(
                "Registered {} subserie blackout windows",
                inputs.blackouts.len()
            ));
        });

        log.scoped("Weekend Constraint", |log| {
            for day in &inputs.forbidden_weekends {
                let (start, end) = self.clock.day_window(day.date);
                model.add_forbidden_weekend_day(
                    day.machine_id,
                    WeekendDayWindow {
                        date: day.date,
                        start,
                        end,
                    },
                );
            }
            log.info(format!(
                "Registered {} forbidden weekend days",
                inputs.forbidden_weekends.len()
            ));
        });
    }
}
