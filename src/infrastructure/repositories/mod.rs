pub mod in_memory_log_store;
pub mod in_memory_planning_store;
pub mod static_machine_directory;

pub use in_memory_log_store::InMemoryLogStore;
pub use in_memory_planning_store::InMemoryPlanningStore;
pub use static_machine_directory::StaticMachineDirectory;
