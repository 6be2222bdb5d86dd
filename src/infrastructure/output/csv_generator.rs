//! CSV report generator
//!
//! Writes the two output tables of a run as CSV files for offline
//! inspection: `scheduled_orders.csv` and `preparation_intervals.csv`.

use std::fs::File;
use std::path::Path;

use anyhow::Result;
use csv::Writer;

use crate::domain::entities::{PreparationInterval, ScheduledOrder};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct CsvGenerator;

impl CsvGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Writes both tables into the given directory.
    pub fn generate<P: AsRef<Path>>(
        &self,
        scheduled: &[ScheduledOrder],
        preparations: &[PreparationInterval],
        output_dir: P,
    ) -> Result<()> {
        let dir = output_dir.as_ref();
        self.write_scheduled_orders(scheduled, dir.join("scheduled_orders.csv"))?;
        self.write_preparations(preparations, dir.join("preparation_intervals.csv"))?;
        Ok(())
    }

    fn write_scheduled_orders<P: AsRef<Path>>(
        &self,
        scheduled: &[ScheduledOrder],
        path: P,
    ) -> Result<()> {
        let file = File::create(path)?;
        let mut wtr = Writer::from_writer(file);

        wtr.write_record([
            "Document ID",
            "Machine",
            "Subseries",
            "Start Time",
            "End Time",
            "Duration Hours",
            "IML",
            "Info Code",
            "Weekends Inside",
            "Extra Info",
        ])?;

        for row in scheduled {
            let weekends = row
                .weekends_inside
                .iter()
                .map(|date| date.format("%Y-%m-%d").to_string())
                .collect::<Vec<_>>()
                .join("; ");
            wtr.write_record([
                row.document_id.as_str(),
                &row.machine_id.to_string(),
                &row.subseries.to_string(),
                &row.start_time.format(TIME_FORMAT).to_string(),
                &row.end_time.format(TIME_FORMAT).to_string(),
                &row.duration_hours.to_string(),
                &row.iml.to_string(),
                &row.info_code.as_u8().to_string(),
                &weekends,
                row.extra_info.as_str(),
            ])?;
        }

        wtr.flush()?;
        Ok(())
    }

    fn write_preparations<P: AsRef<Path>>(
        &self,
        preparations: &[PreparationInterval],
        path: P,
    ) -> Result<()> {
        let file = File::create(path)?;
        let mut wtr = Writer::from_writer(file);

        wtr.write_record([
            "Machine",
            "Type",
            "Start Time",
            "End Time",
            "Duration Hours",
            "First Mold",
            "Second Mold",
            "Reason",
        ])?;

        for prep in preparations {
            wtr.write_record([
                &prep.machine_id.to_string(),
                prep.setup_type.label(),
                &prep.start_time.format(TIME_FORMAT).to_string(),
                &prep.end_time.format(TIME_FORMAT).to_string(),
                &prep.duration_hours.to_string(),
                prep.first_mold.as_str(),
                prep.second_mold.as_str(),
                prep.reason.as_str(),
            ])?;
        }

        wtr.flush()?;
        Ok(())
    }
}

impl Default for CsvGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::InfoCode;
    use chrono::NaiveDate;

    #[test]
    fn test_csv_files_are_written() {
        let dir = std::env::temp_dir().join("moldplan_csv_generator_test");
        std::fs::create_dir_all(&dir).unwrap();

        let scheduled = vec![ScheduledOrder {
            document_id: "doc-1".to_string(),
            machine_id: 3,
            subseries: 11,
            start_time: NaiveDate::from_ymd_opt(2026, 3, 2)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
            end_time: NaiveDate::from_ymd_opt(2026, 3, 2)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            duration_hours: 2.0,
            iml: false,
            info_code: InfoCode::Normal,
            extra_info: String::new(),
            weekends_inside: Vec::new(),
        }];

        CsvGenerator::new().generate(&scheduled, &[], &dir).unwrap();

        let orders = std::fs::read_to_string(dir.join("scheduled_orders.csv")).unwrap();
        assert!(orders.contains("doc-1"));
        assert!(orders.contains("2026-03-02 08:00:00"));

        let preps = std::fs::read_to_string(dir.join("preparation_intervals.csv")).unwrap();
        assert!(preps.starts_with("Machine,Type"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
