//! quotactl - OpenStack project quota tool
//!
//! Snapshots project quotas to JSON, reapplies a snapshot, and compares
//! projects against a reference quota set.

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "quotactl")]
#[command(author, version, about = "Snapshot, apply and compare OpenStack project quotas", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format: json (default) or table
    #[arg(long, global = true, default_value = "json")]
    format: output::OutputFormat,

    /// Suppress status messages
    #[arg(long, global = true)]
    quiet: bool,

    /// Log progress (info level)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Log everything (debug level)
    #[arg(long, short, global = true)]
    debug: bool,

    /// Named cloud from clouds.yaml
    #[arg(long, env = "OS_CLOUD", global = true)]
    os_cloud: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the quotas of some or all projects as JSON
    Get(commands::get::GetArgs),

    /// Write quotas from a snapshot back to the cloud (dry run unless --commit)
    Apply(commands::apply::ApplyArgs),

    /// Report projects whose quotas differ from a reference
    Compare(commands::compare::CompareArgs),
}

fn init_logging(verbose: bool, debug: bool) {
    let level = if debug {
        LevelFilter::Debug
    } else if verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };

    // RUST_LOG, when set, overrides the flag-derived level
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.debug);

    if let Err(err) = run(cli).await {
        output::print_error(&format!("Error: {:#}", err));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let ctx = commands::Context {
        format: cli.format,
        quiet: cli.quiet,
        os_cloud: cli.os_cloud,
    };

    match cli.command {
        Commands::Get(args) => commands::get::execute(&ctx, args).await,
        Commands::Apply(args) => commands::apply::execute(&ctx, args).await,
        Commands::Compare(args) => commands::compare::execute(&ctx, args).await,
    }
}
