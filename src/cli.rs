use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Validate and repair BAL address files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate a BAL file against a profile and emit a JSON report
    Validate(ValidateArgs),
    /// Apply deterministic repairs to a BAL file and emit the fixed file
    Autofix(AutofixArgs),
    /// List the configured validation profiles
    Profiles,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Input BAL file ('-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Profile code to report against
    #[arg(short = 'p', long, default_value = "1.3-relax")]
    pub profile: String,
    /// Omit the per-row detail array from the report
    #[arg(long = "no-rows")]
    pub no_rows: bool,
    /// Pretty-print the JSON report
    #[arg(long)]
    pub pretty: bool,
    /// Output file for the report (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Maximum number of row-validation worker threads
    #[arg(long = "jobs")]
    pub jobs: Option<usize>,
}

#[derive(Debug, Args)]
pub struct AutofixArgs {
    /// Input BAL file ('-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Output file for the repaired BAL ('-' or omitted writes stdout)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}
