pub mod fixture_parser;

pub use fixture_parser::{FixtureParser, PlanningFixture};
