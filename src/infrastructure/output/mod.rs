pub mod csv_generator;
pub mod json_generator;
pub mod planning_board;

pub use csv_generator::CsvGenerator;
pub use json_generator::JsonGenerator;
pub use planning_board::PlanningBoardWriter;
