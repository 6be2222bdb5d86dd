//! Machine directory repository module
//!
//! The machine list lives in the external registration system and is
//! fetched through a session-scoped Data API. The session is opened before
//! input assembly and closed best-effort by the run finalizer; a close
//! failure must never mask a scheduling failure.

use crate::domain::entities::Machine;
use crate::domain::errors::PlanningError;

/// Session-scoped access to the machine directory
#[cfg_attr(test, mockall::automock)]
pub trait MachineDirectory: Send + Sync {
    /// Opens the API session. Failure is a connectivity error and aborts
    /// the run.
    fn open_session(&self) -> Result<(), PlanningError>;

    /// Fetches the machine directory. Requires an open session.
    fn machines(&self) -> Result<Vec<Machine>, PlanningError>;

    /// Closes the API session. Called on every exit path; errors are
    /// reported as [`PlanningError::Cleanup`] and only logged.
    fn close_session(&self) -> Result<(), PlanningError>;
}
