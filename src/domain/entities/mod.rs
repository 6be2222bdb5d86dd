pub mod calendar;
pub mod candidate_task;
pub mod machine;
pub mod order;
pub mod schedule;

pub use calendar::{
    AvailableWeekendDay, ForbiddenWeekendDay, MaintenanceWindow, SubseriesBlackout,
    TechnicianAvailability,
};
pub use candidate_task::CandidateTask;
pub use machine::{Machine, MachineCapability};
pub use order::Order;
pub use schedule::{InfoCode, PreparationInterval, ScheduledOrder};
