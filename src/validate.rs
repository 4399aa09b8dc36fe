//! Pipeline orchestration: decode, parse, resolve, validate rows in
//! parallel, dataset invariants, file-property checks, profile evaluation.
//!
//! Row validation fans out across a rayon pool (optionally bounded) and
//! fans back in preserving source order; the dataset validator and profile
//! evaluator only run after every row result is collected.

use anyhow::{Context, Result};
use log::debug;
use rayon::prelude::*;

use crate::dataset::validate_dataset;
use crate::decode::decode;
use crate::error::ValidatorError;
use crate::fields::{FieldResolution, resolve_fields};
use crate::filecheck::check_file;
use crate::parse::{ParsedTable, parse_table};
use crate::profiles::ProfileCatalog;
use crate::report::{NotFoundField, RowReport, ValidationReport};
use crate::rows::{ValidatedRow, validate_row};

/// File-level code raised when the profile forbids unmapped columns.
pub const UNKNOWN_COLUMNS: &str = "file.colonnes_inconnues";

#[derive(Debug, Clone)]
pub struct ValidateOptions {
    /// Profile code the detailed report is computed for.
    pub profile: String,
    /// When false, the per-row detail array is omitted from the report;
    /// validity outcomes never change.
    pub include_rows: bool,
    /// Upper bound on row-validation worker threads. `None` uses the
    /// default rayon pool.
    pub concurrency: Option<usize>,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        ValidateOptions {
            profile: "1.3".to_string(),
            include_rows: true,
            concurrency: None,
        }
    }
}

/// Validates a BAL file against the built-in profile catalog.
pub fn validate(bytes: &[u8], options: &ValidateOptions) -> Result<ValidationReport> {
    validate_with_catalog(bytes, options, ProfileCatalog::default())
}

pub fn validate_with_catalog(
    bytes: &[u8],
    options: &ValidateOptions,
    catalog: ProfileCatalog,
) -> Result<ValidationReport> {
    // Unknown profile codes fail before any parsing occurs.
    let profile = catalog
        .get(&options.profile)
        .ok_or_else(|| ValidatorError::UnknownProfile(options.profile.clone()))?;

    let decoded = decode(bytes)?;
    let filecheck = check_file(&decoded);
    let table = parse_table(&decoded);
    if !table.parse_ok {
        debug!("Structural parse failed, skipping content validation");
        return Ok(ValidationReport::parse_failed(&filecheck, &table));
    }

    let resolution = resolve_fields(&table.headers, profile.version);
    let validated = run_rows(&table, &resolution, options.concurrency)?;

    let mut global_errors: Vec<String> = Vec::new();
    for name in &resolution.not_found {
        push_unique(&mut global_errors, format!("field.{name}.manquant"));
    }
    if profile.forbid_unknown_columns && resolution.unknown_headers().next().is_some() {
        push_unique(&mut global_errors, UNKNOWN_COLUMNS.to_string());
    }
    for code in validate_dataset(&validated, &resolution) {
        push_unique(&mut global_errors, code);
    }
    for code in filecheck.error_codes() {
        push_unique(&mut global_errors, code.to_string());
    }

    let mut rows_errors: Vec<String> = Vec::new();
    for row in &validated {
        for error in &row.errors {
            push_unique(&mut rows_errors, error.code.clone());
        }
    }

    let mut unique_errors = global_errors.clone();
    for code in &rows_errors {
        push_unique(&mut unique_errors, code.clone());
    }

    let profiles_validation = catalog.evaluate(&unique_errors);
    let profil_errors = catalog.profile_errors(profile, &unique_errors);
    let not_found_fields: Vec<NotFoundField> = resolution
        .not_found
        .iter()
        .map(|name| NotFoundField {
            schema_name: name.to_string(),
            level: profile.severity(&format!("field.{name}.manquant")),
        })
        .collect();

    let rows = options.include_rows.then(|| {
        validated
            .iter()
            .map(|row| RowReport::from_validated(row, profile))
            .collect()
    });

    Ok(ValidationReport {
        encoding: filecheck.encoding,
        delimiter: filecheck.delimiter,
        linebreak: filecheck.linebreak,
        original_fields: table.headers.clone(),
        parse_ok: true,
        parse_errors: table.parse_errors.clone(),
        fields: resolution.fields.clone(),
        not_found_fields,
        rows,
        profiles_validation,
        global_errors,
        rows_errors,
        unique_errors,
        profil_errors,
    })
}

/// Fan out row validation, fan in preserving source order. Rows share only
/// the read-only resolution, so this is embarrassingly parallel.
pub(crate) fn run_rows(
    table: &ParsedTable,
    resolution: &FieldResolution,
    concurrency: Option<usize>,
) -> Result<Vec<ValidatedRow>> {
    let run = || {
        table
            .rows
            .par_iter()
            .map(|raw| validate_row(raw, resolution))
            .collect::<Vec<_>>()
    };
    match concurrency {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .context("Building row-validation thread pool")?;
            Ok(pool.install(run))
        }
        None => Ok(run()),
    }
}

fn push_unique(set: &mut Vec<String>, code: String) {
    if !set.iter().any(|existing| *existing == code) {
        set.push(code);
    }
}
