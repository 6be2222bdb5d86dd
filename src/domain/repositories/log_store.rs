//! Log store repository module
//!
//! Each run writes one hierarchical log document and one user-feedback
//! document. Persistence is an external concern behind this trait; the run
//! finalizer trims the log collection to a fixed number of recent entries.

use crate::domain::errors::PlanningError;

/// Number of run-log documents kept by the retention policy.
pub const RUN_LOGS_TO_KEEP: usize = 9;

/// Persistence for run-log and feedback documents
#[cfg_attr(test, mockall::automock)]
pub trait LogStore: Send + Sync {
    /// Appends one hierarchical run-log document.
    fn write_run_log(&self, document: serde_json::Value) -> Result<(), PlanningError>;

    /// Deletes all but the `keep` most recent run-log documents, returning
    /// how many were removed.
    fn trim_run_logs(&self, keep: usize) -> Result<usize, PlanningError>;

    /// Replaces the feedback document: delete previous contents, then
    /// insert the given document (skipped when `None`, i.e. no feedback).
    fn replace_feedback(&self, document: Option<serde_json::Value>)
        -> Result<(), PlanningError>;
}
