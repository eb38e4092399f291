//! Crossfeed CLI - Command-line interface
//!
//! Inspects catalogs and drives simulated viewing sessions.

mod commands;

use std::path::PathBuf;

use clap::Parser;
use crossfeed_core::tracing_setup::{CliLogLevel, init_tracing};

#[derive(Parser)]
#[command(name = "crossfeed")]
#[command(about = "Two-axis short-form video feed navigator")]
#[command(version)]
struct Cli {
    /// Console log level (the log file always captures everything)
    #[arg(long, value_enum, default_value_t = CliLogLevel::Warn, global = true)]
    log_level: CliLogLevel,

    /// Directory for the full debug log
    #[arg(long, global = true)]
    logs_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_tracing_level(), cli.logs_dir.as_deref())?;

    if let Err(e) = commands::handle_command(cli.command).await {
        if e.is_user_error() {
            eprintln!("{}", e.user_message());
            std::process::exit(2);
        }
        return Err(e.into());
    }

    Ok(())
}
