//! CLI Commands module
//!
//! Implements the `plan` command: load a fixture, run one scheduling pass,
//! write the selected reports and print a summary of the outcome.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::application::use_cases::{CalculatePlanning, PlanningOutcome};
use crate::domain::repositories::{LogStore, MachineDirectory, PlanningStore};
use crate::domain::value_objects::SetupType;
use crate::infrastructure::output::{CsvGenerator, JsonGenerator, PlanningBoardWriter};
use crate::infrastructure::parsers::FixtureParser;
use crate::infrastructure::repositories::InMemoryLogStore;
use crate::presentation::cli::OutputFormat;

/// Command running one scheduling pass from a fixture
pub struct PlanCommand;

impl PlanCommand {
    pub fn execute(
        fixtures: &Path,
        duration: u64,
        output_dir: &Path,
        format: &OutputFormat,
    ) -> Result<()> {
        info!("Loading planning fixture from {}", fixtures.display());
        let fixture = FixtureParser::new().parse_file(fixtures)?;
        let (store, directory) = fixture.into_repositories();

        let store = Arc::new(store);
        let directory = Arc::new(directory);
        let log_store = Arc::new(InMemoryLogStore::new());
        let use_case = CalculatePlanning::new(
            store.clone() as Arc<dyn PlanningStore>,
            directory as Arc<dyn MachineDirectory>,
            log_store as Arc<dyn LogStore>,
        );

        let outcome = use_case
            .execute(duration)
            .map_err(|e| anyhow::anyhow!(e))
            .context("Scheduling run failed")?;

        fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;

        if format.should_generate_csv() {
            CsvGenerator::new().generate(&outcome.scheduled, &outcome.preparations, output_dir)?;
            info!("Wrote CSV reports to {}", output_dir.display());
        }
        if format.should_generate_json() {
            JsonGenerator::new().generate(&store.planning_suggestion(), output_dir)?;
            info!("Wrote planning board JSON to {}", output_dir.display());
        }

        Self::print_summary(&outcome);
        Ok(())
    }

    /// Prints a short outcome summary to the console.
    fn print_summary(outcome: &PlanningOutcome) {
        println!("\n{}", "=".repeat(72));
        println!("PRODUCTION SCHEDULE SUMMARY");
        println!("{}", "=".repeat(72));
        println!("  Solver status:          {}", outcome.status.name());
        println!("  Wall time:              {:.3}s", outcome.wall_seconds);
        println!("  Scheduled orders:       {}", outcome.scheduled.len());

        let subseries_swaps = outcome
            .preparations
            .iter()
            .filter(|p| p.setup_type == SetupType::SubseriesSwap)
            .count();
        let iml_swaps = outcome.preparations.len() - subseries_swaps;
        println!("  Subseries changeovers:  {}", subseries_swaps);
        println!("  IML changeovers:        {}", iml_swaps);

        let machines: std::collections::BTreeSet<i64> =
            outcome.scheduled.iter().map(|row| row.machine_id).collect();
        println!("  Machines in use:        {}", machines.len());

        if let Some(last) = outcome.scheduled.iter().map(|row| row.end_time).max() {
            println!("  Schedule ends at:       {}", last.format("%Y-%m-%d %H:%M:%S"));
        }
        println!("{}\n", "=".repeat(72));
    }
}

/// Command serving the HTTP endpoints backed by a fixture store
pub struct ServeCommand;

impl ServeCommand {
    pub fn build_runner(fixtures: &Path) -> Result<Arc<CalculatePlanning>> {
        let fixture = FixtureParser::new().parse_file(fixtures)?;
        let (store, directory) = fixture.into_repositories();
        Ok(Arc::new(CalculatePlanning::new(
            Arc::new(store) as Arc<dyn PlanningStore>,
            Arc::new(directory) as Arc<dyn MachineDirectory>,
            Arc::new(InMemoryLogStore::new()) as Arc<dyn LogStore>,
        )))
    }
}
