pub mod autofix;
pub mod cli;
pub mod dataset;
pub mod decode;
pub mod error;
pub mod fields;
pub mod filecheck;
pub mod io_utils;
pub mod parse;
pub mod profiles;
pub mod report;
pub mod rows;
pub mod schema;
pub mod validate;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, info};

use crate::autofix::AutofixStatus;
use crate::cli::{Cli, Commands};

pub use crate::autofix::{AutofixOutcome, autofix as autofix_file};
pub use crate::error::ValidatorError;
pub use crate::report::ValidationReport;
pub use crate::validate::{ValidateOptions, validate as validate_file};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("bal_validator", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Validate(args) => handle_validate(&args),
        Commands::Autofix(args) => handle_autofix(&args),
        Commands::Profiles => handle_profiles(),
    }
}

fn handle_validate(args: &cli::ValidateArgs) -> Result<()> {
    info!(
        "Validating '{}' against profile '{}'",
        args.input.display(),
        args.profile
    );
    let bytes = io_utils::read_input(&args.input)?;
    let options = ValidateOptions {
        profile: args.profile.clone(),
        include_rows: !args.no_rows,
        concurrency: args.jobs,
    };
    let report = validate::validate(&bytes, &options)?;
    if report.parse_ok {
        info!(
            "{} unique error(s); profile '{}' valid: {}",
            report.unique_errors.len(),
            args.profile,
            report.is_valid_for(&args.profile)
        );
    } else {
        info!("Structural parse failed; content validation skipped");
    }
    let mut json = if args.pretty {
        serde_json::to_vec_pretty(&report)?
    } else {
        serde_json::to_vec(&report)?
    };
    json.push(b'\n');
    io_utils::write_output(args.output.as_deref(), &json)
}

fn handle_autofix(args: &cli::AutofixArgs) -> Result<()> {
    info!("Repairing '{}'", args.input.display());
    let bytes = io_utils::read_input(&args.input)?;
    let outcome = autofix::autofix(&bytes)?;
    match outcome.status {
        AutofixStatus::Conformant => info!("Repaired file is fully conformant"),
        AutofixStatus::Improved => info!("Repaired file improved but is still non-conformant"),
        AutofixStatus::Unchanged => info!("Nothing to repair"),
    }
    io_utils::write_output(args.output.as_deref(), &outcome.bytes)
}

fn handle_profiles() -> Result<()> {
    let catalog = profiles::ProfileCatalog::default();
    for profile in catalog.iter() {
        println!(
            "{:<10} {:<20} format {}  relax: {}",
            profile.code,
            profile.name,
            profile.version,
            profile.relax
        );
    }
    Ok(())
}
