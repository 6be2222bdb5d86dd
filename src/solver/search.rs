//! Solver search module
//!
//! A deterministic, time-budgeted search over the schedule model. The
//! solver picks one candidate per order (exactly-one), sequences the chosen
//! tasks per machine, and places every interval at its earliest feasible
//! time honoring the no-overlap, maintenance, blackout, weekend,
//! swap-window and cumulative-capacity constraints. Several assignment
//! strategies are tried and the best schedule is refined by single-order
//! reassignment until the wall-clock budget runs out.
//!
//! The search is heuristic: it proves nothing optimal, it returns the best
//! schedule found within the budget.

use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tracing::info;

use crate::domain::value_objects::{Priority, SetupType, SECONDS_PER_DAY};

use super::model::ScheduleModel;
use super::solution::{
    ScheduledPreparation, ScheduledTask, Solution, SolveOutcome, SolverStatus,
};

/// Solver tunables: the wall-clock budget and the knobs kept for parity
/// with the production configuration.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Wall-clock budget in seconds
    pub max_time_seconds: u64,
    /// Worker count; the search itself is single-threaded and records the
    /// value for the run log only
    pub num_workers: usize,
    /// Emit one progress line per strategy and improvement round
    pub log_search_progress: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_time_seconds: 60,
            num_workers: 4,
            log_search_progress: true,
        }
    }
}

/// Chosen candidate per order key.
type Assignment = BTreeMap<String, usize>;

/// A fully placed schedule before decoding into a [`Solution`].
struct Draft {
    tasks: Vec<ScheduledTask>,
    preparations: Vec<ScheduledPreparation>,
    /// Chosen task indices per machine in execution order
    sequences: BTreeMap<i64, Vec<usize>>,
}

/// Placement of a single task interval.
struct Placement {
    start: i64,
    end: i64,
    weekends_inside: Vec<NaiveDate>,
}

const ASSIGNMENT_STRATEGIES: usize = 4;
const MAX_REPAIR_ATTEMPTS: usize = 64;
const MAX_PLACEMENT_STEPS: usize = 100_000;

/// The constraint solver
pub struct CpSolver {
    config: SolverConfig,
}

impl CpSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Searches for the best schedule within the configured time budget.
    pub fn solve(&self, model: &ScheduleModel) -> SolveOutcome {
        let started = Instant::now();
        let deadline = started + Duration::from_secs(self.config.max_time_seconds.max(1));

        if model.task_count() == 0 {
            return SolveOutcome {
                status: SolverStatus::Optimal,
                solution: Some(Solution::default()),
                wall_seconds: started.elapsed().as_secs_f64(),
            };
        }

        let mut best: Option<(Assignment, Draft, i64)> = None;
        for strategy in 0..ASSIGNMENT_STRATEGIES {
            let assignment = initial_assignment(model, strategy);
            if let Some((assignment, draft, objective)) =
                schedule_with_repair(model, assignment)
            {
                if self.config.log_search_progress {
                    info!(strategy, objective, "assignment strategy produced a schedule");
                }
                if best.as_ref().map(|(_, _, b)| objective < *b).unwrap_or(true) {
                    best = Some((assignment, draft, objective));
                }
            }
            if Instant::now() >= deadline {
                break;
            }
        }

        let Some((mut assignment, mut draft, mut objective)) = best else {
            return SolveOutcome {
                status: SolverStatus::Infeasible,
                solution: None,
                wall_seconds: started.elapsed().as_secs_f64(),
            };
        };

        self.improve(model, &mut assignment, &mut draft, &mut objective, deadline);

        SolveOutcome {
            status: SolverStatus::Feasible,
            solution: Some(Solution {
                tasks: draft.tasks,
                preparations: draft.preparations,
                objective,
            }),
            wall_seconds: started.elapsed().as_secs_f64(),
        }
    }

    /// Reassigns one order at a time to an alternative candidate and keeps
    /// every change that lowers the objective.
    fn improve(
        &self,
        model: &ScheduleModel,
        assignment: &mut Assignment,
        draft: &mut Draft,
        objective: &mut i64,
        deadline: Instant,
    ) {
        let order_keys: Vec<String> = model.order_groups().keys().cloned().collect();
        let mut improved = true;
        while improved && Instant::now() < deadline {
            improved = false;
            for key in &order_keys {
                let current = assignment[key];
                let candidates = model.order_groups()[key].clone();
                for alternative in candidates {
                    if alternative == current {
                        continue;
                    }
                    if Instant::now() >= deadline {
                        return;
                    }
                    let mut trial = assignment.clone();
                    trial.insert(key.clone(), alternative);
                    if let Ok(trial_draft) = schedule_assignment(model, &trial) {
                        let trial_objective = evaluate(model, &trial_draft);
                        if trial_objective < *objective {
                            if self.config.log_search_progress {
                                info!(
                                    order = key.as_str(),
                                    objective = trial_objective,
                                    "improvement pass lowered the objective"
                                );
                            }
                            *assignment = trial;
                            *draft = trial_draft;
                            *objective = trial_objective;
                            improved = true;
                            break;
                        }
                    }
                }
            }
        }
    }
}

/// Builds a starting assignment with one of the selection heuristics.
fn initial_assignment(model: &ScheduleModel, strategy: usize) -> Assignment {
    let mut load: BTreeMap<i64, i64> = BTreeMap::new();
    let mut machine_subseries: BTreeMap<i64, BTreeSet<i64>> = BTreeMap::new();
    let mut assignment = Assignment::new();

    let mut order_keys: Vec<&String> = model.order_groups().keys().collect();
    if strategy == 3 {
        // Urgency order: handle tight due dates first.
        order_keys.sort_by_key(|key| {
            model.order_groups()[*key]
                .iter()
                .map(|&i| model.task(i).due_seconds)
                .min()
                .unwrap_or(i64::MAX)
        });
    }

    for key in order_keys {
        let candidates = &model.order_groups()[key];
        let chosen = candidates
            .iter()
            .copied()
            .min_by_key(|&i| {
                let interval = model.task(i);
                let machine = interval.task.machine_id;
                let machine_load = load.get(&machine).copied().unwrap_or(0);
                match strategy {
                    0 => (interval.duration, machine_load, machine),
                    2 => {
                        let clustered = machine_subseries
                            .get(&machine)
                            .map(|set| set.contains(&interval.task.subseries))
                            .unwrap_or(false);
                        (
                            if clustered { 0 } else { 1 },
                            machine_load + interval.duration,
                            machine,
                        )
                    }
                    _ => (machine_load + interval.duration, interval.duration, machine),
                }
            })
            .unwrap_or(candidates[0]);

        let interval = model.task(chosen);
        *load.entry(interval.task.machine_id).or_insert(0) += interval.duration;
        machine_subseries
            .entry(interval.task.machine_id)
            .or_default()
            .insert(interval.task.subseries);
        assignment.insert(key.clone(), chosen);
    }
    assignment
}

/// Schedules an assignment; on failure, swaps the failing order to an
/// untried candidate and retries.
fn schedule_with_repair(
    model: &ScheduleModel,
    mut assignment: Assignment,
) -> Option<(Assignment, Draft, i64)> {
    let mut banned: BTreeMap<String, BTreeSet<usize>> = BTreeMap::new();
    for _ in 0..MAX_REPAIR_ATTEMPTS {
        match schedule_assignment(model, &assignment) {
            Ok(draft) => {
                let objective = evaluate(model, &draft);
                return Some((assignment, draft, objective));
            }
            Err(order_key) => {
                let current = assignment[&order_key];
                banned.entry(order_key.clone()).or_default().insert(current);
                let blocked = &banned[&order_key];
                let next = model.order_groups()[&order_key]
                    .iter()
                    .copied()
                    .find(|i| !blocked.contains(i));
                match next {
                    Some(candidate) => {
                        assignment.insert(order_key, candidate);
                    }
                    None => return None,
                }
            }
        }
    }
    None
}

/// Places every chosen task and the induced preparation intervals.
///
/// Machines are processed in id order sharing one technician ledger, so the
/// cumulative constraint holds across machines by construction. Returns the
/// order key of the first candidate that could not be placed.
fn schedule_assignment(model: &ScheduleModel, assignment: &Assignment) -> Result<Draft, String> {
    let mut by_machine: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for &index in assignment.values() {
        by_machine
            .entry(model.task(index).task.machine_id)
            .or_default()
            .push(index);
    }

    let emergency_machines: BTreeSet<i64> = assignment
        .values()
        .filter(|&&i| model.task(i).task.priority == Priority::Emergency)
        .map(|&i| model.task(i).task.machine_id)
        .collect();

    let mut ledger = SwapLedger::default();
    let mut draft = Draft {
        tasks: Vec::with_capacity(assignment.len()),
        preparations: Vec::new(),
        sequences: BTreeMap::new(),
    };

    for (machine_id, mut sequence) in by_machine {
        sequence.sort_by(|&a, &b| {
            let ta = model.task(a);
            let tb = model.task(b);
            (sequence_rank(ta.task.priority), ta.due_seconds, &ta.task.id).cmp(&(
                sequence_rank(tb.task.priority),
                tb.due_seconds,
                &tb.task.id,
            ))
        });

        let mut cursor = 0i64;
        let mut previous: Option<usize> = None;
        for &index in &sequence {
            let interval = model.task(index);

            if let Some(prev_index) = previous {
                let setup = model.task(prev_index).task.setup_to(&interval.task);
                if let Some(setup) = setup {
                    let placed = match setup {
                        SetupType::SubseriesSwap => {
                            place_subseries_swap(model, machine_id, cursor, &mut ledger)
                        }
                        SetupType::ImlSwap => place_iml_swap(model, machine_id, cursor),
                    }
                    .ok_or_else(|| interval.task.order_id.clone())?;
                    cursor = placed.1;
                    draft.preparations.push(ScheduledPreparation {
                        machine_id,
                        predecessor: prev_index,
                        successor: index,
                        setup,
                        start: placed.0,
                        end: placed.1,
                    });
                }
            }

            let forced_start = interval.task.priority == Priority::Emergency
                || (interval.task.priority == Priority::Running
                    && !emergency_machines.contains(&machine_id));
            let placement = if forced_start {
                if cursor > 0 {
                    return Err(interval.task.order_id.clone());
                }
                place_task_fixed(model, machine_id, index, 0)
            } else {
                place_task(model, machine_id, index, cursor)
            }
            .ok_or_else(|| interval.task.order_id.clone())?;

            cursor = placement.end;
            draft.tasks.push(ScheduledTask {
                task_index: index,
                start: placement.start,
                end: placement.end,
                weekends_inside: placement.weekends_inside,
            });
            previous = Some(index);
        }
        draft.sequences.insert(machine_id, sequence);
    }

    Ok(draft)
}

/// Execution-order rank per priority: pinned tasks lead, stock fill trails.
fn sequence_rank(priority: Priority) -> u8 {
    match priority {
        Priority::Emergency => 0,
        Priority::Running => 1,
        Priority::StockFill => 3,
        _ => 2,
    }
}

/// Finds the earliest feasible start for a task at or after `earliest`.
fn place_task(
    model: &ScheduleModel,
    machine_id: i64,
    index: usize,
    earliest: i64,
) -> Option<Placement> {
    let interval = model.task(index);
    let weekends = model.forbidden_weekends_on(machine_id);
    let maintenance = model.maintenance_on(machine_id);
    let blackouts = model.blackouts_for(interval.task.subseries);

    let mut start = earliest.max(0);
    for _ in 0..MAX_PLACEMENT_STEPS {
        if start > model.horizon() {
            return None;
        }
        if let Some(day) = weekends.iter().find(|w| w.start <= start && start <= w.end) {
            start = day.end + 1;
            continue;
        }
        let (end, weekends_inside) =
            extend_over_weekends(start, interval.duration, weekends)?;
        if end > model.horizon() {
            return None;
        }
        if let Some(&(_, window_end)) = maintenance
            .iter()
            .find(|&&(ws, we)| start < we && ws < end)
        {
            start = window_end.max(start + 1);
            continue;
        }
        if let Some(&(_, window_end)) = blackouts
            .iter()
            .find(|&&(ws, we)| start < we && ws < end)
        {
            start = window_end.max(start + 1);
            continue;
        }
        return Some(Placement {
            start,
            end,
            weekends_inside,
        });
    }
    None
}

/// Places a task at a fixed start or fails.
fn place_task_fixed(
    model: &ScheduleModel,
    machine_id: i64,
    index: usize,
    start: i64,
) -> Option<Placement> {
    let interval = model.task(index);
    let weekends = model.forbidden_weekends_on(machine_id);

    if weekends.iter().any(|w| w.start <= start && start <= w.end) {
        return None;
    }
    let (end, weekends_inside) = extend_over_weekends(start, interval.duration, weekends)?;
    if end > model.horizon() {
        return None;
    }
    let blocked = model
        .maintenance_on(machine_id)
        .iter()
        .any(|&(ws, we)| start < we && ws < end)
        || model
            .blackouts_for(interval.task.subseries)
            .iter()
            .any(|&(ws, we)| start < we && ws < end);
    if blocked {
        return None;
    }
    Some(Placement {
        start,
        end,
        weekends_inside,
    })
}

/// Computes the end of a task that pauses over forbidden weekend days.
///
/// The end satisfies `end = start + duration + 86400 * k` where `k` is the
/// number of forbidden days lying strictly inside `[start, end]`, and the
/// end itself never falls inside a forbidden day. Returns the end and the
/// dates paused over.
pub(crate) fn extend_over_weekends(
    start: i64,
    duration: i64,
    weekends: &[super::model::WeekendDayWindow],
    // the window list is sorted by start
) -> Option<(i64, Vec<NaiveDate>)> {
    let mut extension = 0i64;
    for _ in 0..MAX_PLACEMENT_STEPS {
        let end = start + duration + extension;
        let needed = weekends
            .iter()
            .filter(|w| w.start > start && w.end < end)
            .count() as i64
            * SECONDS_PER_DAY;
        if needed > extension {
            extension = needed;
            continue;
        }
        if weekends.iter().any(|w| w.start <= end && end <= w.end) {
            // The raw end lands inside a forbidden day; pausing over that
            // day pushes it past the day's end.
            extension += SECONDS_PER_DAY;
            continue;
        }
        let inside = weekends
            .iter()
            .filter(|w| w.start > start && w.end < end)
            .map(|w| w.date)
            .collect();
        return Some((end, inside));
    }
    None
}

/// Finds the earliest start for a subseries swap: inside the allowed
/// swap-start domain, clear of the forbidden-hour bands and machine
/// maintenance, with a free technician for the whole duration.
fn place_subseries_swap(
    model: &ScheduleModel,
    machine_id: i64,
    earliest: i64,
    ledger: &mut SwapLedger,
) -> Option<(i64, i64)> {
    let duration = SetupType::SubseriesSwap.duration_seconds();
    let maintenance = model.maintenance_on(machine_id);

    for &(window_start, window_end) in model.allowed_swap_starts() {
        if window_end < earliest {
            continue;
        }
        let mut start = window_start.max(earliest);
        'window: for _ in 0..MAX_PLACEMENT_STEPS {
            if start > window_end {
                break 'window;
            }
            let end = start + duration;
            if end > model.horizon() {
                return None;
            }
            if model
                .hour_blockers()
                .iter()
                .any(|&(bs, be)| start < be && bs < end)
            {
                // Blocker bands directly follow each window; any later
                // start in this window collides too.
                break 'window;
            }
            if let Some(&(_, we)) = maintenance.iter().find(|&&(ws, we)| start < we && ws < end)
            {
                start = we.max(start + 1);
                continue;
            }
            match ledger.first_conflict(model, start, end) {
                Some(retry_at) => {
                    start = retry_at.max(start + 1);
                }
                None => {
                    ledger.commit(start, end);
                    return Some((start, end));
                }
            }
        }
    }
    None
}

/// Finds the earliest start for an IML swap: neither its start nor its end
/// may fall inside a forbidden weekend day of the machine, and it must not
/// overlap maintenance.
fn place_iml_swap(model: &ScheduleModel, machine_id: i64, earliest: i64) -> Option<(i64, i64)> {
    let duration = SetupType::ImlSwap.duration_seconds();
    let weekends = model.forbidden_weekends_on(machine_id);
    let maintenance = model.maintenance_on(machine_id);

    let mut start = earliest.max(0);
    for _ in 0..MAX_PLACEMENT_STEPS {
        let end = start + duration;
        if end > model.horizon() {
            return None;
        }
        if let Some(day) = weekends.iter().find(|w| w.start <= start && start <= w.end) {
            start = day.end + 1;
            continue;
        }
        if let Some(day) = weekends.iter().find(|w| w.start <= end && end <= w.end) {
            start = day.end + 1;
            continue;
        }
        if let Some(&(_, we)) = maintenance.iter().find(|&&(ws, we)| start < we && ws < end) {
            start = we.max(start + 1);
            continue;
        }
        return Some((start, end));
    }
    None
}

/// Placed subseries-swap intervals, checked against the technician pool and
/// its reductions.
#[derive(Default)]
struct SwapLedger {
    placed: Vec<(i64, i64)>,
}

impl SwapLedger {
    /// `None` when a swap fits in `[start, end)`; otherwise the earliest
    /// time worth retrying from.
    fn first_conflict(&self, model: &ScheduleModel, start: i64, end: i64) -> Option<i64> {
        let capacity = i64::from(model.swap_capacity());
        let mut probes = vec![start];
        for &(ps, _) in &self.placed {
            if ps > start && ps < end {
                probes.push(ps);
            }
        }
        for reduction in model.capacity_reductions() {
            if reduction.start > start && reduction.start < end {
                probes.push(reduction.start);
            }
        }
        probes.sort_unstable();
        probes.dedup();

        for probe in probes {
            let mut used = 1i64;
            let mut release = i64::MAX;
            for &(ps, pe) in &self.placed {
                if ps <= probe && probe < pe {
                    used += 1;
                    release = release.min(pe);
                }
            }
            for reduction in model.capacity_reductions() {
                if reduction.start <= probe && probe < reduction.end {
                    used += i64::from(reduction.demand);
                    release = release.min(reduction.end);
                }
            }
            if used > capacity {
                return Some(if release == i64::MAX { end } else { release });
            }
        }
        None
    }

    fn commit(&mut self, start: i64, end: i64) {
        self.placed.push((start, end));
    }
}

/// Computes the minimization objective of a placed schedule.
fn evaluate(model: &ScheduleModel, draft: &Draft) -> i64 {
    let emergency_machines: BTreeSet<i64> = draft
        .tasks
        .iter()
        .filter(|t| model.task(t.task_index).task.priority == Priority::Emergency)
        .map(|t| model.task(t.task_index).task.machine_id)
        .collect();

    let mut objective = 0i64;
    for scheduled in &draft.tasks {
        let interval = model.task(scheduled.task_index);
        let end = scheduled.end;

        // Universal chosen-end contribution plus the per-priority weights.
        objective += end;
        objective += interval.task.priority.end_time_weight() * end;
        match interval.task.priority {
            Priority::Emergency => objective += Priority::EMERGENCY_END_WEIGHT * end,
            Priority::Running if emergency_machines.contains(&interval.task.machine_id) => {
                objective += Priority::DISPLACED_RUNNING_END_WEIGHT * end
            }
            _ => {}
        }

        let slack = (end - interval.due_seconds).max(0);
        objective += interval
            .task
            .priority
            .deadline_slack_weight(interval.task.is_past_due)
            * slack;
    }

    for sequence in draft.sequences.values() {
        for pair in sequence.windows(2) {
            let first = model.task(pair[0]);
            let second = model.task(pair[1]);
            if first.task.priority == Priority::StockFill
                && second.task.priority != Priority::StockFill
            {
                objective += Priority::STOCK_FILL_SUCCESSOR_PENALTY;
            }
        }
    }
    objective
}
