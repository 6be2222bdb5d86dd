//! Schedule model module
//!
//! The constraint model of one scheduling run: optional task intervals with
//! their presence grouped into exactly-one sets per order, plus the shared
//! side tables every later constraint reads — per-machine maintenance,
//! subseries blackouts, forbidden weekend days, technician capacity
//! reductions, the allowed swap-start domain and the forbidden-hour
//! blockers.
//!
//! The model is built by exactly one owner and handed to the solver by
//! reference once construction is complete; nothing mutates it after the
//! solve begins.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::entities::CandidateTask;

/// Default number of changeover technicians, the capacity of the cumulative
/// constraint on subseries swaps.
pub const DEFAULT_SWAP_CAPACITY: u32 = 3;

/// One optional task interval with its presence and metadata
///
/// The compound record of the model: start and end are decided by the
/// solver inside `[0, horizon]`, the duration is fixed, and the candidate
/// task rides along for result extraction.
#[derive(Debug, Clone)]
pub struct TaskInterval {
    pub task: CandidateTask,
    /// Fixed production duration in seconds
    pub duration: i64,
    /// Due date in seconds from "now"; negative when already past
    pub due_seconds: i64,
}

/// A fixed interval consuming technician capacity
///
/// Covers a contiguous run of days on which fewer technicians are
/// available; the demand is the size of the deficit. Half-open `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacityReduction {
    pub start: i64,
    pub end: i64,
    pub demand: u32,
}

/// The `[00:00:00, 23:59:59]` window of one forbidden weekend day, in model
/// seconds. Bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeekendDayWindow {
    pub date: NaiveDate,
    pub start: i64,
    pub end: i64,
}

/// The full constraint model handed to the solver
#[derive(Debug, Default)]
pub struct ScheduleModel {
    horizon: i64,
    tasks: Vec<TaskInterval>,
    order_groups: BTreeMap<String, Vec<usize>>,
    machine_tasks: BTreeMap<i64, Vec<usize>>,
    maintenance: BTreeMap<i64, Vec<(i64, i64)>>,
    blackouts: BTreeMap<i64, Vec<(i64, i64)>>,
    forbidden_weekends: BTreeMap<i64, Vec<WeekendDayWindow>>,
    swap_capacity: u32,
    capacity_reductions: Vec<CapacityReduction>,
    allowed_swap_starts: Vec<(i64, i64)>,
    hour_blockers: Vec<(i64, i64)>,
}

impl ScheduleModel {
    /// Creates an empty model bounded by the given horizon.
    pub fn new(horizon: i64) -> Self {
        Self {
            horizon,
            swap_capacity: DEFAULT_SWAP_CAPACITY,
            ..Default::default()
        }
    }

    /// Registers a candidate task as an optional interval on its machine
    /// and in the exactly-one group of its order. Returns the task index.
    pub fn add_task(&mut self, task: CandidateTask, due_seconds: i64) -> usize {
        let index = self.tasks.len();
        self.order_groups
            .entry(task.order_id.clone())
            .or_default()
            .push(index);
        self.machine_tasks
            .entry(task.machine_id)
            .or_default()
            .push(index);
        let duration = task.duration_seconds;
        self.tasks.push(TaskInterval {
            task,
            duration,
            due_seconds,
        });
        index
    }

    /// Registers a fixed maintenance interval on a machine. Windows that
    /// already ended or are empty are ignored.
    pub fn add_maintenance_window(&mut self, machine_id: i64, start: i64, end: i64) {
        if end <= start || end <= 0 {
            return;
        }
        let windows = self.maintenance.entry(machine_id).or_default();
        windows.push((start, end));
        windows.sort_unstable();
    }

    /// Registers a blackout window for a subseries.
    pub fn add_subseries_blackout(&mut self, subseries: i64, start: i64, end: i64) {
        if end <= start || end <= 0 {
            return;
        }
        let windows = self.blackouts.entry(subseries).or_default();
        windows.push((start, end));
        windows.sort_unstable();
    }

    /// Registers a forbidden weekend day on a machine.
    pub fn add_forbidden_weekend_day(&mut self, machine_id: i64, window: WeekendDayWindow) {
        if window.end <= 0 {
            return;
        }
        let windows = self.forbidden_weekends.entry(machine_id).or_default();
        windows.push(window);
        windows.sort_unstable_by_key(|w| w.start);
    }

    /// Sets the technician pool size backing the cumulative constraint.
    pub fn set_swap_capacity(&mut self, capacity: u32) {
        self.swap_capacity = capacity;
    }

    /// Registers one capacity-reduction interval.
    pub fn add_capacity_reduction(&mut self, reduction: CapacityReduction) {
        if reduction.end <= reduction.start || reduction.end <= 0 || reduction.demand == 0 {
            return;
        }
        self.capacity_reductions.push(reduction);
        self.capacity_reductions.sort_unstable_by_key(|r| r.start);
    }

    /// Sets the allowed swap-start domain as `[lo, hi]` second pairs.
    /// Intervals are clamped to the model range, sorted and merged.
    pub fn set_allowed_swap_starts(&mut self, intervals: Vec<(i64, i64)>) {
        let mut clamped: Vec<(i64, i64)> = intervals
            .into_iter()
            .filter(|&(_, hi)| hi >= 0)
            .map(|(lo, hi)| (lo.max(0), hi.min(self.horizon)))
            .filter(|&(lo, hi)| lo <= hi)
            .collect();
        clamped.sort_unstable();

        let mut merged: Vec<(i64, i64)> = Vec::with_capacity(clamped.len());
        for (lo, hi) in clamped {
            match merged.last_mut() {
                Some((_, last_hi)) if lo <= *last_hi + 1 => *last_hi = (*last_hi).max(hi),
                _ => merged.push((lo, hi)),
            }
        }
        self.allowed_swap_starts = merged;
    }

    /// Registers one forbidden-hour blocker band, half-open `[start, end)`.
    pub fn add_hour_blocker(&mut self, start: i64, end: i64) {
        if end <= start || end <= 0 {
            return;
        }
        self.hour_blockers.push((start, end));
        self.hour_blockers.sort_unstable();
    }

    pub fn horizon(&self) -> i64 {
        self.horizon
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn task(&self, index: usize) -> &TaskInterval {
        &self.tasks[index]
    }

    pub fn tasks(&self) -> &[TaskInterval] {
        &self.tasks
    }

    /// Exactly-one groups: order key to the candidate task indices of which
    /// the solver must choose one.
    pub fn order_groups(&self) -> &BTreeMap<String, Vec<usize>> {
        &self.order_groups
    }

    /// Candidate task indices per machine.
    pub fn machine_tasks(&self) -> &BTreeMap<i64, Vec<usize>> {
        &self.machine_tasks
    }

    pub fn maintenance_on(&self, machine_id: i64) -> &[(i64, i64)] {
        self.maintenance
            .get(&machine_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn blackouts_for(&self, subseries: i64) -> &[(i64, i64)] {
        self.blackouts
            .get(&subseries)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn forbidden_weekends_on(&self, machine_id: i64) -> &[WeekendDayWindow] {
        self.forbidden_weekends
            .get(&machine_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn swap_capacity(&self) -> u32 {
        self.swap_capacity
    }

    pub fn capacity_reductions(&self) -> &[CapacityReduction] {
        &self.capacity_reductions
    }

    pub fn allowed_swap_starts(&self) -> &[(i64, i64)] {
        &self.allowed_swap_starts
    }

    pub fn hour_blockers(&self) -> &[(i64, i64)] {
        &self.hour_blockers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Priority;
    use chrono::NaiveDate;

    fn task(order_id: &str, machine_id: i64) -> CandidateTask {
        CandidateTask {
            id: CandidateTask::task_id(order_id, 11, machine_id, false),
            order_id: order_id.to_string(),
            document_id: order_id.to_string(),
            subseries: 11,
            machine_id,
            iml: false,
            duration_seconds: 3_600,
            due_date: NaiveDate::from_ymd_opt(2026, 4, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            is_past_due: false,
            impossible_deadline: false,
            priority: Priority::Normal,
            info: String::new(),
            description: String::new(),
            mold_name: String::new(),
            hot_runner: String::new(),
        }
    }

    #[test]
    fn test_add_task_registers_groups() {
        let mut model = ScheduleModel::new(1_000_000);
        model.add_task(task("o1", 3), 500);
        model.add_task(task("o1", 4), 500);
        model.add_task(task("o2", 3), 800);

        assert_eq!(model.task_count(), 3);
        assert_eq!(model.order_groups()["o1"], vec![0, 1]);
        assert_eq!(model.order_groups()["o2"], vec![2]);
        assert_eq!(model.machine_tasks()[&3], vec![0, 2]);
        assert_eq!(model.machine_tasks()[&4], vec![1]);
    }

    #[test]
    fn test_past_windows_are_ignored() {
        let mut model = ScheduleModel::new(1_000_000);
        model.add_maintenance_window(3, -7_200, -3_600);
        model.add_maintenance_window(3, 100, 100);
        model.add_maintenance_window(3, 100, 200);

        assert_eq!(model.maintenance_on(3), &[(100, 200)]);
    }

    #[test]
    fn test_swap_start_domain_is_merged_and_clamped() {
        let mut model = ScheduleModel::new(1_000_000);
        model.set_allowed_swap_starts(vec![(-500, 300), (200, 400), (900, 1_000), (-90, -10)]);

        assert_eq!(model.allowed_swap_starts(), &[(0, 400), (900, 1_000)]);
    }

    #[test]
    fn test_zero_demand_reduction_is_dropped() {
        let mut model = ScheduleModel::new(1_000_000);
        model.add_capacity_reduction(CapacityReduction {
            start: 0,
            end: 86_400,
            demand: 0,
        });
        assert!(model.capacity_reductions().is_empty());
    }
}
