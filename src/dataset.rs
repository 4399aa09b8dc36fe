//! Cross-row dataset invariants, evaluated once after every row result is
//! collected.
//!
//! BAN identifier adoption is all-or-nothing: either every row carries a
//! complete identifier chain (municipality + toponym + address id, the
//! toponym sentinel standing in for the address id), or none does. Partial
//! adoption is always an error, never a warning.

use crate::fields::FieldResolution;
use crate::rows::{ParsedValue, ValidatedRow};
use crate::schema::TOPONYM_NUMERO;

pub const EMPTY_FILE: &str = "rows.empty";
pub const INCONSISTENT_BAN_IDS: &str = "rows.every_line_required_id_ban";
pub const MULTIPLE_DISTRICTS: &str = "rows.multi_id_ban_commune";

/// Returns the dataset-level error codes for the whole table.
pub fn validate_dataset(rows: &[ValidatedRow], resolution: &FieldResolution) -> Vec<String> {
    let mut errors = Vec::new();
    if rows.is_empty() {
        errors.push(EMPTY_FILE.to_string());
        return errors;
    }

    let mut complete = 0usize;
    let mut districts: Vec<String> = Vec::new();
    for row in rows {
        let commune = non_empty(row, resolution, "id_ban_commune");
        let toponyme = non_empty(row, resolution, "id_ban_toponyme");
        let adresse = non_empty(row, resolution, "id_ban_adresse");
        let is_toponym = matches!(
            row.parsed_values.get("numero"),
            Some(ParsedValue::Integer(n)) if *n == TOPONYM_NUMERO
        );
        if let (Some(commune), Some(_)) = (commune, toponyme)
            && (adresse.is_some() || is_toponym)
        {
            complete += 1;
            if !districts.iter().any(|d| d == commune) {
                districts.push(commune.to_string());
            }
        }
    }

    if complete == rows.len() {
        if districts.len() > 1 {
            errors.push(MULTIPLE_DISTRICTS.to_string());
        }
    } else if complete > 0 {
        errors.push(INCONSISTENT_BAN_IDS.to_string());
    }
    errors
}

fn non_empty<'a>(
    row: &'a ValidatedRow,
    resolution: &FieldResolution,
    canonical: &str,
) -> Option<&'a str> {
    row.canonical_raw(resolution, canonical)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
