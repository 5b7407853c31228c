//! Campsuite CLI - Main Entry Point
//!
//! Switch suite environments, provision browser drivers and build the
//! results dashboard.

use clap::{Parser, Subcommand};

use campsuite_cli::commands::{dashboard, driver, env};
use campsuite_cli::output;

/// Campsuite - BDD browser suite for the automationcamp practice site
#[derive(Parser)]
#[command(name = "campsuite")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Switch or inspect the test environment
    #[command(subcommand)]
    Env(env::EnvCommands),

    /// Detect the browser and provision chromedriver
    #[command(subcommand)]
    Driver(driver::DriverCommands),

    /// Generate the HTML results dashboard
    Dashboard(dashboard::DashboardArgs),

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Env(cmd) => env::execute(cmd, cli.format).await?,
        Commands::Driver(cmd) => driver::execute(cmd, cli.format).await?,
        Commands::Dashboard(args) => dashboard::execute(args, cli.format).await?,
        Commands::Version => {
            println!("Campsuite CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("BDD browser suite for https://play1.automationcamp.ir");
        }
    }

    Ok(())
}
