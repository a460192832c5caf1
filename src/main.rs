use anyhow::Result;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

use dupescan::cmd::{self, MatchArgs, ScanArgs};
use dupescan::logging::{self, LogLevel};

#[derive(Debug, Parser)]
#[command(
    name = "dupescan",
    about = "Find duplicate file content across directory trees"
)]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Also append JSON log lines to this file
    #[arg(long, global = true)]
    log_file: Option<Utf8PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scan a directory tree into a content inventory
    Scan(ScanArgs),
    /// Match a source inventory against one or more target inventories
    Match(MatchArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level: LogLevel = cli.log_level.parse()?;
    logging::init(level, cli.log_file.as_deref())?;

    match &cli.command {
        Command::Scan(args) => cmd::run_scan(args),
        Command::Match(args) => cmd::run_match(args),
    }
}
