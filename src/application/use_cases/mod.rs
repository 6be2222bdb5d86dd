pub mod assemble_inputs;
pub mod calculate_planning;
pub mod expand_tasks;

pub use assemble_inputs::{InputAssembler, PlanningInputs};
pub use calculate_planning::{CalculatePlanning, PlanningOutcome, PlanningRunner};
pub use expand_tasks::TaskExpander;
