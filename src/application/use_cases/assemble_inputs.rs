//! Input assembler use case
//!
//! Pulls the reference tables from the planning store and the machine
//! directory and normalizes them into the typed tables the rest of the
//! pipeline consumes. Rows that fail validation (unparseable dates, missing
//! ids, non-positive quantities) are dropped with a log or feedback entry;
//! they never abort the run.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::domain::entities::{
    AvailableWeekendDay, ForbiddenWeekendDay, Machine, MachineCapability, MaintenanceWindow,
    Order, SubseriesBlackout, TechnicianAvailability,
};
use crate::domain::errors::PlanningError;
use crate::domain::repositories::{
    BlackoutRecord, CycleStatRecord, MachineDirectory, MaintenanceRecord, OrderRecord,
    PlanningStore, TechnicianWindowRecord, WeekendAvailabilityRecord,
};
use crate::domain::value_objects::{Priority, RunClock};
use crate::infrastructure::logging::RunLog;

/// All normalized input tables of one scheduling run
pub struct PlanningInputs {
    /// Raw order documents, kept for stamping the planning-board output
    pub raw_orders: Vec<OrderRecord>,
    pub orders: Vec<Order>,
    pub capabilities: Vec<MachineCapability>,
    pub machines: Vec<Machine>,
    /// Per-day technician capacity where it deviates from the default
    pub technician_days: Vec<TechnicianAvailability>,
    pub maintenance: Vec<MaintenanceWindow>,
    pub blackouts: Vec<SubseriesBlackout>,
    pub available_weekends: Vec<AvailableWeekendDay>,
    pub forbidden_weekends: Vec<ForbiddenWeekendDay>,
}

/// Fetches and normalizes every input table
pub struct InputAssembler {
    clock: RunClock,
}

impl InputAssembler {
    pub fn new(clock: RunClock) -> Self {
        Self { clock }
    }

    pub fn assemble(
        &self,
        store: &dyn PlanningStore,
        directory: &dyn MachineDirectory,
        log: &mut RunLog,
    ) -> Result<PlanningInputs, PlanningError> {
        log.push_context("Retrieving Input Data");
        let result = self.fetch_and_normalize(store, directory, log);
        log.pop_context();
        result
    }

    fn fetch_and_normalize(
        &self,
        store: &dyn PlanningStore,
        directory: &dyn MachineDirectory,
        log: &mut RunLog,
    ) -> Result<PlanningInputs, PlanningError> {
        let machines = log.scoped("Machine Names", |log| {
            let machines = directory.machines();
            if let Ok(machines) = &machines {
                log.info(format!("Retrieved {} machines from the directory", machines.len()));
            }
            machines
        })?;

        let raw_orders = log.scoped("All Open Orders", |log| {
            let raw = store.open_orders()?;
            log.info(format!("Retrieved {} open order documents", raw.len()));
            Ok::<_, PlanningError>(raw)
        })?;
        let orders = log.scoped("All Open Orders", |log| {
            normalize_orders(&raw_orders, log)
        });

        let capabilities = log.scoped("Average Cycle Time", |log| {
            let rows = store.cycle_statistics()?;
            Ok::<_, PlanningError>(normalize_capabilities(rows, log))
        })?;

        let technician_days = log.scoped("Technician Unavailability", |log| {
            let rows = store.technician_windows()?;
            Ok::<_, PlanningError>(explode_technician_windows(&rows, self.clock.today(), log))
        })?;

        let available_weekends = log.scoped("Available Weekends", |log| {
            let rows = store.weekend_availability()?;
            Ok::<_, PlanningError>(expand_weekend_availability(&rows, log))
        })?;

        let maintenance = log.scoped("Processing Machine Unavailable Timespans", |log| {
            let mut rows = store.maintenance_windows()?;
            rows.extend(store.downtime_batches()?);
            Ok::<_, PlanningError>(normalize_maintenance(rows, log))
        })?;

        let blackouts = log.scoped("Subserie Unavailability", |log| {
            let rows = store.subseries_blackouts()?;
            Ok::<_, PlanningError>(normalize_blackouts(rows, self.clock.now(), log))
        })?;

        let forbidden_weekends = log.scoped("Unavailable Weekends", |log| {
            let forbidden =
                forbidden_weekend_days(&machines, &available_weekends, &self.clock);
            log.info(format!(
                "Identified {} unavailable machine/weekend slots",
                forbidden.len()
            ));
            forbidden
        });

        log.info("Finished fetching and processing all input data.");

        Ok(PlanningInputs {
            raw_orders,
            orders,
            capabilities,
            machines,
            technician_days,
            maintenance,
            blackouts,
            available_weekends,
            forbidden_weekends,
        })
    }
}

/// Parses the datetime formats that occur in the stored documents.
pub fn parse_flexible_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Validates order documents into [`Order`] entities, dropping unusable
/// rows with a feedback entry.
pub fn normalize_orders(records: &[OrderRecord], log: &mut RunLog) -> Vec<Order> {
    let mut orders = Vec::with_capacity(records.len());
    for record in records {
        let Some(subseries) = record.subseries else {
            log.info(format!(
                "Dropping order {} due to a missing subseries id",
                record.id
            ));
            continue;
        };
        let due_date = record.due_date.as_deref().and_then(parse_flexible_datetime);
        let Some(due_date) = due_date else {
            log.info(format!(
                "Discarding order {} due to unparseable due date",
                record.id
            ));
            log.feedback(format!(
                "Order cannot be placed because the due date is not a valid date: {}",
                record.due_date.clone().unwrap_or_default()
            ));
            continue;
        };
        let quantity = record.quantity.unwrap_or(0);
        if quantity <= 0 {
            log.info(format!(
                "Dropping order {} due to a non-positive quantity",
                record.id
            ));
            continue;
        }
        orders.push(Order {
            document_id: record.id.clone(),
            subseries,
            description: record.description.clone().unwrap_or_default(),
            mold_name: record.mold_name.clone().unwrap_or_default(),
            hot_runner: record.hot_runner.clone(),
            quantity: quantity as u32,
            iml_requested: record.iml.unwrap_or(false),
            due_date,
            priority: Priority::from_raw(record.priority.unwrap_or(0)),
        });
    }
    log.info(format!("Kept {} of {} order rows", orders.len(), records.len()));
    orders
}

fn normalize_capabilities(records: Vec<CycleStatRecord>, log: &mut RunLog) -> Vec<MachineCapability> {
    let total = records.len();
    let capabilities: Vec<MachineCapability> = records
        .into_iter()
        .filter_map(|record| {
            Some(MachineCapability {
                subseries: record.subseries?,
                machine_id: record.machine_id?,
                iml_capable: record.iml.unwrap_or(0) != 0,
                cavity: record.cavity,
                cycle_avg: record.cycle_avg,
            })
        })
        .collect();
    if capabilities.len() < total {
        log.info(format!(
            "Dropped {} cycle rows with missing id columns",
            total - capabilities.len()
        ));
    }
    log.info(format!("Loaded {} cycle statistic rows", capabilities.len()));
    capabilities
}

/// Explodes availability ranges into one row per day, clamping ranges that
/// started in the past to today and keeping the minimum capacity on
/// duplicate dates.
pub fn explode_technician_windows(
    records: &[TechnicianWindowRecord],
    today: NaiveDate,
    log: &mut RunLog,
) -> Vec<TechnicianAvailability> {
    let mut per_day: std::collections::BTreeMap<NaiveDate, u32> = std::collections::BTreeMap::new();
    for record in records {
        let start = parse_flexible_datetime(&record.start_date);
        let end = parse_flexible_datetime(&record.end_date);
        let (Some(start), Some(end)) = (start, end) else {
            log.error(format!(
                "Discarding technician window with invalid dates: {} - {}",
                record.start_date, record.end_date
            ));
            continue;
        };
        let mut date = start.date().max(today);
        while date <= end.date() {
            per_day
                .entry(date)
                .and_modify(|capacity| *capacity = (*capacity).min(record.available))
                .or_insert(record.available);
            date = match date.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }
    }
    let days: Vec<TechnicianAvailability> = per_day
        .into_iter()
        .map(|(date, capacity)| TechnicianAvailability { date, capacity })
        .collect();
    log.info(format!(
        "Found {} date entries with a technician availability change",
        days.len()
    ));
    days
}

/// Expands weekend-availability rows into per-day entries; a two-day row
/// yields two consecutive dates.
pub fn expand_weekend_availability(
    records: &[WeekendAvailabilityRecord],
    log: &mut RunLog,
) -> Vec<AvailableWeekendDay> {
    let mut days = Vec::new();
    for record in records {
        let Some(start) = parse_flexible_datetime(&record.start_date) else {
            log.error(format!(
                "Discarding weekend availability row with invalid start date: {}",
                record.start_date
            ));
            continue;
        };
        days.push(AvailableWeekendDay {
            machine_id: record.machine_id,
            date: start.date(),
        });
        if record.duration == 2 && record.duration_unit == "d" {
            if let Some(next) = start.date().succ_opt() {
                days.push(AvailableWeekendDay {
                    machine_id: record.machine_id,
                    date: next,
                });
            }
        }
    }
    days.sort_by_key(|d| (d.machine_id, d.date));
    log.info(format!("Transformed weekend data into {} machine/date entries", days.len()));
    days
}

fn normalize_maintenance(records: Vec<MaintenanceRecord>, log: &mut RunLog) -> Vec<MaintenanceWindow> {
    let mut windows = Vec::new();
    for record in records {
        let machine_id = record.machine_id;
        let start = record.start_date.as_deref().and_then(parse_flexible_datetime);
        let end = record.end_date.as_deref().and_then(parse_flexible_datetime);
        match (machine_id, start, end) {
            (Some(machine_id), Some(start), Some(end)) if end > start => {
                windows.push(MaintenanceWindow {
                    machine_id,
                    start,
                    end,
                });
            }
            _ => {
                log.info(format!(
                    "Discarding unavailability entry due to invalid fields: machine={:?}, start={:?}, end={:?}",
                    record.machine_id, record.start_date, record.end_date
                ));
            }
        }
    }
    log.info(format!("Kept {} machine unavailability windows", windows.len()));
    windows
}

fn normalize_blackouts(
    records: Vec<BlackoutRecord>,
    now: NaiveDateTime,
    log: &mut RunLog,
) -> Vec<SubseriesBlackout> {
    let mut blackouts = Vec::new();
    let mut past = 0usize;
    for record in records {
        let subseries = record.subseries;
        let start = record.start_date.as_deref().and_then(parse_flexible_datetime);
        let end = record.end_date.as_deref().and_then(parse_flexible_datetime);
        match (subseries, start, end) {
            (Some(subseries), Some(start), Some(end)) => {
                if end < now {
                    past += 1;
                    continue;
                }
                blackouts.push(SubseriesBlackout {
                    subseries,
                    start,
                    end,
                });
            }
            _ => log.info(format!(
                "Discarding subserie restriction with invalid fields: {:?}",
                record.subseries
            )),
        }
    }
    if past > 0 {
        log.info(format!(
            "Identified {} restriction entries with an end date in the past. These will be discarded.",
            past
        ));
    }
    let rows: Vec<serde_json::Value> = blackouts
        .iter()
        .filter_map(|blackout| serde_json::to_value(blackout).ok())
        .collect();
    log.add_records("Subserie unavailability entries to be used", rows);
    log.info(format!("Returning {} usable restriction entries", blackouts.len()));
    blackouts
}

/// Inverts the available weekend days: every Saturday and Sunday inside the
/// horizon is forbidden for a machine unless explicitly opened.
pub fn forbidden_weekend_days(
    machines: &[Machine],
    available: &[AvailableWeekendDay],
    clock: &RunClock,
) -> Vec<ForbiddenWeekendDay> {
    let open: BTreeSet<(i64, NaiveDate)> = available
        .iter()
        .map(|day| (day.machine_id, day.date))
        .collect();

    let mut forbidden = Vec::new();
    let mut date = clock.today();
    let last = clock.horizon_end_date();
    while date <= last {
        if date.weekday().num_days_from_monday() >= 5 {
            for machine in machines {
                if !open.contains(&(machine.id, date)) {
                    forbidden.push(ForbiddenWeekendDay {
                        machine_id: machine.id,
                        date,
                    });
                }
            }
        }
        date = match date.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    forbidden.sort_by_key(|d| (d.machine_id, d.date));
    forbidden
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log() -> RunLog {
        RunLog::new("Test Run")
    }

    #[test]
    fn test_parse_flexible_datetime_formats() {
        assert!(parse_flexible_datetime("2026-03-02T08:00").is_some());
        assert!(parse_flexible_datetime("2026-03-02T08:00:30").is_some());
        assert!(parse_flexible_datetime("2026-03-02 08:00:30").is_some());
        assert!(parse_flexible_datetime("2026-03-02").is_some());
        assert!(parse_flexible_datetime("not a date").is_none());
        assert!(parse_flexible_datetime("").is_none());
    }

    #[test]
    fn test_normalize_orders_drops_bad_due_date_with_feedback() {
        let mut log = log();
        let records = vec![
            OrderRecord {
                id: "ok".to_string(),
                subseries: Some(11),
                description: Some("article".to_string()),
                mold_name: Some("M-11".to_string()),
                hot_runner: None,
                quantity: Some(100),
                iml: Some(false),
                due_date: Some("2026-04-01".to_string()),
                priority: Some(0),
            },
            OrderRecord {
                id: "broken".to_string(),
                subseries: Some(11),
                description: None,
                mold_name: None,
                hot_runner: None,
                quantity: Some(100),
                iml: None,
                due_date: Some("31/02/2026".to_string()),
                priority: None,
            },
        ];

        let orders = normalize_orders(&records, &mut log);
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].document_id, "ok");
        assert_eq!(orders[0].priority, Priority::Normal);
        assert!(log.feedback_list()[0].contains("not a valid date"));
    }

    #[test]
    fn test_normalize_orders_drops_missing_subseries_and_zero_quantity() {
        let mut log = log();
        let records = vec![
            OrderRecord {
                id: "no-sub".to_string(),
                subseries: None,
                description: None,
                mold_name: None,
                hot_runner: None,
                quantity: Some(10),
                iml: None,
                due_date: Some("2026-04-01".to_string()),
                priority: None,
            },
            OrderRecord {
                id: "no-qty".to_string(),
                subseries: Some(4),
                description: None,
                mold_name: None,
                hot_runner: None,
                quantity: Some(0),
                iml: None,
                due_date: Some("2026-04-01".to_string()),
                priority: None,
            },
        ];

        assert!(normalize_orders(&records, &mut log).is_empty());
    }

    #[test]
    fn test_explode_technician_windows_takes_minimum_per_day() {
        let mut log = log();
        let today = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let records = vec![
            TechnicianWindowRecord {
                start_date: "2026-03-03T00:00".to_string(),
                end_date: "2026-03-04T23:59".to_string(),
                available: 2,
            },
            TechnicianWindowRecord {
                start_date: "2026-03-04T00:00".to_string(),
                end_date: "2026-03-05T23:59".to_string(),
                available: 1,
            },
        ];

        let days = explode_technician_windows(&records, today, &mut log);
        assert_eq!(days.len(), 3);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2026, 3, 3).unwrap());
        assert_eq!(days[0].capacity, 2);
        // Overlap on the 4th keeps the lower value.
        assert_eq!(days[1].capacity, 1);
        assert_eq!(days[2].capacity, 1);
    }

    #[test]
    fn test_explode_technician_windows_clamps_to_today() {
        let mut log = log();
        let today = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let records = vec![TechnicianWindowRecord {
            start_date: "2026-02-27T00:00".to_string(),
            end_date: "2026-03-03T23:59".to_string(),
            available: 2,
        }];

        let days = explode_technician_windows(&records, today, &mut log);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, today);
    }

    #[test]
    fn test_expand_weekend_availability_two_day_rows() {
        let mut log = log();
        let records = vec![WeekendAvailabilityRecord {
            machine_id: 3,
            start_date: "2026-03-07T00:00".to_string(),
            duration: 2,
            duration_unit: "d".to_string(),
        }];

        let days = expand_weekend_availability(&records, &mut log);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2026, 3, 7).unwrap());
        assert_eq!(days[1].date, NaiveDate::from_ymd_opt(2026, 3, 8).unwrap());
    }

    #[test]
    fn test_normalize_blackouts_discards_past_windows() {
        let mut log = log();
        let now = NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let records = vec![
            BlackoutRecord {
                subseries: Some(11),
                start_date: Some("2026-01-01T00:00".to_string()),
                end_date: Some("2026-02-01T00:00".to_string()),
            },
            BlackoutRecord {
                subseries: Some(11),
                start_date: Some("2026-03-10T00:00".to_string()),
                end_date: Some("2026-03-20T00:00".to_string()),
            },
        ];

        let blackouts = normalize_blackouts(records, now, &mut log);
        assert_eq!(blackouts.len(), 1);
        assert_eq!(
            blackouts[0].start,
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap().and_hms_opt(0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_forbidden_weekend_days_inverts_availability() {
        let clock = RunClock::new(
            NaiveDate::from_ymd_opt(2026, 3, 2)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
        );
        let machines = vec![
            Machine {
                id: 3,
                name: "M3".to_string(),
            },
            Machine {
                id: 4,
                name: "M4".to_string(),
            },
        ];
        let saturday = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        let available = vec![AvailableWeekendDay {
            machine_id: 3,
            date: saturday,
        }];

        let forbidden = forbidden_weekend_days(&machines, &available, &clock);

        // Machine 3 may work that Saturday, machine 4 may not.
        assert!(!forbidden
            .iter()
            .any(|d| d.machine_id == 3 && d.date == saturday));
        assert!(forbidden
            .iter()
            .any(|d| d.machine_id == 4 && d.date == saturday));
        // Both machines are blocked on the Sunday.
        let sunday = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
        assert!(forbidden.iter().any(|d| d.machine_id == 3 && d.date == sunday));
        // Every entry is a Saturday or Sunday.
        assert!(forbidden
            .iter()
            .all(|d| d.date.weekday().num_days_from_monday() >= 5));
    }
}
