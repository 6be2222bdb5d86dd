//! Static machine directory implementation
//!
//! Serves a fixed machine list behind the session-scoped directory trait.
//! The session bookkeeping is real: fetching without an open session is a
//! connectivity error, and open/close calls are counted so the run
//! finalizer behavior can be asserted in tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::domain::entities::Machine;
use crate::domain::errors::PlanningError;
use crate::domain::repositories::MachineDirectory;

/// Fixed-list implementation of the MachineDirectory trait
#[derive(Default)]
pub struct StaticMachineDirectory {
    machines: Vec<Machine>,
    session_open: AtomicBool,
    opened: AtomicUsize,
    closed: AtomicUsize,
}

impl StaticMachineDirectory {
    pub fn new(machines: Vec<Machine>) -> Self {
        Self {
            machines,
            ..Default::default()
        }
    }

    /// How often a session was opened.
    pub fn opened_sessions(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// How often a session was closed.
    pub fn closed_sessions(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

impl MachineDirectory for StaticMachineDirectory {
    fn open_session(&self) -> Result<(), PlanningError> {
        self.session_open.store(true, Ordering::SeqCst);
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn machines(&self) -> Result<Vec<Machine>, PlanningError> {
        if !self.session_open.load(Ordering::SeqCst) {
            return Err(PlanningError::Connectivity(
                "machine directory session is not open".to_string(),
            ));
        }
        Ok(self.machines.clone())
    }

    fn close_session(&self) -> Result<(), PlanningError> {
        self.session_open.store(false, Ordering::SeqCst);
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
