pub mod domain;
pub mod application;
pub mod solver;
pub mod infrastructure;
pub mod presentation;
pub mod web;

pub use domain::entities;
pub use domain::value_objects;
pub use application::use_cases;
pub use infrastructure::parsers;
pub use infrastructure::output;
