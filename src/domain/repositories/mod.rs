pub mod log_store;
pub mod machine_directory;
pub mod planning_store;

pub use log_store::LogStore;
pub use machine_directory::MachineDirectory;
pub use planning_store::{
    BlackoutRecord, CycleStatRecord, MaintenanceRecord, OrderRecord, PlanningStore,
    TechnicianWindowRecord, WeekendAvailabilityRecord,
};
