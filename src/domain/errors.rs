//! Planning error taxonomy
//!
//! This module defines the error categories of a scheduling run. Only
//! connectivity and solver failures abort a run; input-validation and
//! modeling problems are handled where they occur (row dropped, constraint
//! skipped) and surface as log or feedback entries instead of errors.

use thiserror::Error;

/// Errors raised during a scheduling run
///
/// The variants mirror the stages of the pipeline: talking to the external
/// stores, validating input rows, building the constraint model, solving it,
/// and cleaning up afterwards.
#[derive(Debug, Error)]
pub enum PlanningError {
    /// The document store or the machine-directory session is unreachable.
    /// Fatal: the run aborts, but the finalizer still executes.
    #[error("connectivity failure: {0}")]
    Connectivity(String),

    /// An input row could not be used (unparseable date, missing id, no
    /// eligible machine). Never fatal; carried here only so repository
    /// implementations can classify their own failures.
    #[error("input validation failure: {0}")]
    InputValidation(String),

    /// A constraint could not be registered (missing swap-start domain,
    /// empty assignment list). Never fatal; the constraint is skipped.
    #[error("modeling failure: {0}")]
    Modeling(String),

    /// The solver finished without a usable schedule.
    #[error("solver failure: {0}")]
    Solver(String),

    /// A finalizer step failed (session logout, log write). Logged, never
    /// re-raised.
    #[error("cleanup failure: {0}")]
    Cleanup(String),
}
