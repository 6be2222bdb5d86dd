pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "moldplan")]
#[command(author = "Moldplan Team")]
#[command(version = "0.1.0")]
#[command(about = "Constraint-based production scheduler for injection-molding machines", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Run one scheduling pass against a fixture file and write reports")]
    Plan {
        #[arg(short, long, value_name = "FILE", help = "Input planning fixture (JSON)")]
        fixtures: PathBuf,

        #[arg(short, long, value_name = "SECONDS", default_value = "60", help = "Solver wall-clock budget")]
        duration: u64,

        #[arg(short, long, value_name = "DIR", default_value = "output", help = "Output directory for reports")]
        output: PathBuf,

        #[arg(long, value_enum, default_value = "all", help = "Report format")]
        format: OutputFormat,
    },

    #[command(about = "Serve the planning HTTP endpoints")]
    Serve {
        #[arg(short, long, value_name = "FILE", help = "Input planning fixture (JSON)")]
        fixtures: PathBuf,

        #[arg(long, default_value = "0.0.0.0", help = "Bind address")]
        host: String,

        #[arg(short, long, default_value = "8000", help = "Bind port")]
        port: u16,
    },
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
    All,
}

impl OutputFormat {
    pub fn should_generate_json(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::All)
    }

    pub fn should_generate_csv(&self) -> bool {
        matches!(self, OutputFormat::Csv | OutputFormat::All)
    }
}
