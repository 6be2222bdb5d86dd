pub mod priority;
pub mod run_clock;
pub mod setup;

pub use priority::Priority;
pub use run_clock::{RunClock, HORIZON_SECONDS, SECONDS_PER_DAY};
pub use setup::SetupType;
