//! Bounded, deterministic repair pass.
//!
//! Only error codes on the fixable list are repaired, by applying the
//! remediation the row validator already computed for that field. The
//! repaired file keeps the original column order, delimiter, and line-break
//! style; untouched values are written back verbatim. The whole pipeline is
//! re-run on the output to classify the result, since repair never
//! guarantees full conformance.

use std::collections::BTreeMap;

use anyhow::Result;
use csv::{Terminator, WriterBuilder};
use log::{debug, info};

use crate::decode::{LineBreak, decode};
use crate::error::ValidatorError;
use crate::fields::resolve_fields;
use crate::parse::parse_table;
use crate::schema::FormatVersion;
use crate::validate::{ValidateOptions, run_rows, validate};

/// Codes the autofixer is allowed to repair. Extending this list is
/// configuration, not engine change: any code whose field carries a
/// remediation can be added.
pub const FIXABLE_CODES: &[&str] = &[
    "cle_interop.casse_invalide",
    "cle_interop.numero_prefixe_manquant",
    "date_der_maj.format_invalide",
    "position.enum_fuzzy",
    "cad_parcelles.casse_invalide",
    "long.separateur_virgule",
    "lat.separateur_virgule",
    "x.separateur_virgule",
    "y.separateur_virgule",
    "id_ban_commune.casse_invalide",
    "id_ban_toponyme.casse_invalide",
    "id_ban_adresse.casse_invalide",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutofixStatus {
    /// The repaired file passes the reference profile.
    Conformant,
    /// Strictly fewer unique errors than the input, still non-conformant.
    Improved,
    /// Nothing fixable; the input bytes are returned untouched.
    Unchanged,
}

#[derive(Debug, Clone)]
pub struct AutofixOutcome {
    pub bytes: Vec<u8>,
    pub status: AutofixStatus,
}

/// Profile used to judge repair success.
const REFERENCE_PROFILE: &str = "1.3";

/// Attempts to repair `bytes`. Fails fast with [`ValidatorError::NotRepairable`]
/// when the input cannot be parsed at all.
pub fn autofix(bytes: &[u8]) -> Result<AutofixOutcome> {
    let decoded = decode(bytes)
        .map_err(|err| ValidatorError::NotRepairable(err.to_string()))?;
    let table = parse_table(&decoded);
    if !table.parse_ok {
        let detail = table
            .parse_errors
            .first()
            .map(|e| e.message.clone())
            .unwrap_or_else(|| "structural parse failure".to_string());
        return Err(ValidatorError::NotRepairable(detail).into());
    }

    // Resolve against the widest format so every remediation is available.
    let resolution = resolve_fields(&table.headers, FormatVersion::V1_4);
    let validated = run_rows(&table, &resolution, None)?;

    // Column index -> fixed value, per row.
    let mut fixes_applied = 0usize;
    let mut fixed_rows: Vec<Vec<String>> = Vec::with_capacity(table.rows.len());
    for (raw, row) in table.rows.iter().zip(&validated) {
        let mut values = raw.values.clone();
        let fixable: BTreeMap<&str, &str> = row
            .errors
            .iter()
            .filter(|error| FIXABLE_CODES.contains(&error.code.as_str()))
            .filter_map(|error| {
                let name = error.schema_name.as_deref()?;
                let remedy = row.remediations.get(name)?;
                Some((name, remedy.as_str()))
            })
            .collect();
        for (name, remedy) in fixable {
            if let Some(index) = resolution.column_of(name)
                && let Some(slot) = values.get_mut(index)
            {
                *slot = remedy.to_string();
                fixes_applied += 1;
            }
        }
        fixed_rows.push(values);
    }

    if fixes_applied == 0 {
        debug!("No fixable error carries a remediation; leaving input untouched");
        return Ok(AutofixOutcome {
            bytes: bytes.to_vec(),
            status: AutofixStatus::Unchanged,
        });
    }

    let repaired = serialize(&table.headers, &fixed_rows, decoded.delimiter, decoded.linebreak)?;

    // Re-run the whole pipeline on the output to measure the effect.
    let options = ValidateOptions {
        profile: REFERENCE_PROFILE.to_string(),
        include_rows: false,
        concurrency: None,
    };
    let before = validate(bytes, &options)?;
    let after = validate(&repaired, &options)?;
    let status = if after.is_valid_for(REFERENCE_PROFILE) {
        AutofixStatus::Conformant
    } else if after.unique_errors.len() < before.unique_errors.len() {
        AutofixStatus::Improved
    } else {
        AutofixStatus::Unchanged
    };
    info!(
        "Applied {} fix(es): {} unique error(s) before, {} after",
        fixes_applied,
        before.unique_errors.len(),
        after.unique_errors.len()
    );
    Ok(AutofixOutcome {
        bytes: repaired,
        status,
    })
}

fn serialize(
    headers: &[String],
    rows: &[Vec<String>],
    delimiter: Option<u8>,
    linebreak: LineBreak,
) -> Result<Vec<u8>> {
    let terminator = match linebreak {
        LineBreak::CrLf => Terminator::CRLF,
        _ => Terminator::Any(b'\n'),
    };
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter.unwrap_or(b';'))
        .terminator(terminator)
        .double_quote(true)
        .from_writer(Vec::new());
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    Ok(writer.into_inner()?)
}
