use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use moldplan::infrastructure::config::Settings;
use moldplan::presentation::cli::commands::{PlanCommand, ServeCommand};
use moldplan::presentation::cli::{Cli, Commands};
use moldplan::web::server::{start_web_server, ServerConfig};

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("moldplan=debug,info")
    } else {
        EnvFilter::new("moldplan=info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let settings = Settings::from_env();
    if !settings.has_store_connection() {
        tracing::debug!("MONGODB_URI not set; running against fixture repositories");
    }

    match cli.command {
        Commands::Plan {
            fixtures,
            duration,
            output,
            format,
        } => PlanCommand::execute(&fixtures, duration, &output, &format),
        Commands::Serve {
            fixtures,
            host,
            port,
        } => {
            let runner = ServeCommand::build_runner(&fixtures)?;
            let config = ServerConfig { host, port };
            actix_web::rt::System::new()
                .block_on(start_web_server(config, runner))
                .map_err(Into::into)
        }
    }
}
