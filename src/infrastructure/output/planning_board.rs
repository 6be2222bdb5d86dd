//! Planning board output module
//!
//! Builds the records replacing the planning-suggestion collection after a
//! run: the original order documents stamped with their scheduled slot, and
//! one standstill record per preparation interval with the fixed literals
//! the planning board expects.

use serde_json::{json, Value};

use crate::domain::entities::{PreparationInterval, ScheduledOrder};
use crate::domain::repositories::OrderRecord;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Builds planning-suggestion records from the output tables
pub struct PlanningBoardWriter;

impl PlanningBoardWriter {
    pub fn new() -> Self {
        Self
    }

    /// The full replacement payload: every preparation record followed by
    /// every order document, scheduled ones stamped in place.
    pub fn records(
        &self,
        raw_orders: &[OrderRecord],
        scheduled: &[ScheduledOrder],
        preparations: &[PreparationInterval],
    ) -> Vec<Value> {
        let mut records: Vec<Value> = preparations
            .iter()
            .map(|prep| self.preparation_record(prep))
            .collect();

        for order in raw_orders {
            let mut document = serde_json::to_value(order).unwrap_or_else(|_| json!({}));
            if let Some(row) = scheduled.iter().find(|row| row.document_id == order.id) {
                self.stamp_order(&mut document, row);
            }
            records.push(document);
        }
        records
    }

    fn stamp_order(&self, document: &mut Value, row: &ScheduledOrder) {
        let Some(fields) = document.as_object_mut() else {
            return;
        };
        fields.insert("resourceId".to_string(), json!(row.machine_id));
        fields.insert("duration".to_string(), json!(row.duration_hours));
        fields.insert(
            "startDate".to_string(),
            json!(row.start_time.format(TIME_FORMAT).to_string()),
        );
        fields.insert(
            "endDate".to_string(),
            json!(row.end_time.format(TIME_FORMAT).to_string()),
        );
        fields.insert("comment".to_string(), json!(self.weekend_comment(row)));
        fields.insert("purchaseID".to_string(), json!(row.document_id));
    }

    /// The comment describing weekend pauses inside the batch.
    fn weekend_comment(&self, row: &ScheduledOrder) -> String {
        let mut comment = "Opmerkingen: ".to_string();
        if !row.weekends_inside.is_empty() {
            let dates: Vec<String> = row
                .weekends_inside
                .iter()
                .map(|date| date.format("%Y-%m-%d").to_string())
                .collect();
            comment.push_str(&format!(
                "the following weekend days without production fall inside this batch: {}, a total of {} extra hours was added to the task",
                dates.join(", "),
                row.weekends_inside.len() * 24
            ));
        }
        comment
    }

    fn preparation_record(&self, prep: &PreparationInterval) -> Value {
        json!({
            "stilstand": 1,
            "uren": prep.duration_hours,
            "baseDuration": prep.duration_hours,
            "resourceId": prep.machine_id,
            "startDate": prep.start_time.format(TIME_FORMAT).to_string(),
            "endDate": prep.end_time.format(TIME_FORMAT).to_string(),
            "groupId": -1,
            "matrijs": -1,
            "opmerking": prep.reason,
            "ombouwRef": prep.document_id,
            "removed": 0,
            "splitAantal": null,
            "comment": "",
            "durationUnit": "h",
            "parentId": prep.machine_id,
            "description": prep.reason,
            "eventColor": "indigo",
            "edited": false,
            "opstart": "01/01/2100",
            "leverDatum": "01/01/2100",
            "type": prep.setup_type.label(),
        })
    }
}

impl Default for PlanningBoardWriter {
    fn default() -> Self {
        Self::new()
    }
}
