//! Order entity module
//!
//! This module defines the Order entity, a production request read from the
//! planning store. Orders are consumed by the task expander and never
//! mutated by the core.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Priority;

/// A production request for a quantity of parts from one subseries
///
/// Orders arrive enriched with mold information from the mold register
/// (mold name, hot-runner requirement, article description). The raw
/// priority code has already been adjusted: a document priority of 0 reads
/// as [`Priority::Normal`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Identifier of the backing document in the planning store
    pub document_id: String,
    /// Product family whose molds can produce this order
    pub subseries: i64,
    /// Human-readable article description
    pub description: String,
    /// Name of the mold attached to the order
    pub mold_name: String,
    /// Hot-runner requirement, if any
    pub hot_runner: Option<String>,
    /// Requested quantity of parts
    pub quantity: u32,
    /// Whether in-mold labeling was requested
    pub iml_requested: bool,
    /// Absolute due date of the order
    pub due_date: NaiveDateTime,
    /// Adjusted scheduling priority
    pub priority: Priority,
}

impl Order {
    /// The hot-runner text surfaced in task information, with the fallback
    /// used when the mold register carries no value.
    pub fn hot_runner_label(&self) -> String {
        self.hot_runner
            .clone()
            .unwrap_or_else(|| "No Hotrunner Needed".to_string())
    }
}
