//! Per-row validation: typed parsing of every resolved field, cross-field
//! row rules, and advisory remediations.
//!
//! A field that fails to parse records an error scoped to that field and
//! leaves the typed value absent; the rest of the row keeps validating.
//! Remediations are best-effort corrected raw values stored alongside the
//! error, never applied here (the autofixer decides what to apply).

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::{Local, NaiveDate};
use regex::Regex;
use serde::Serialize;
use uuid::Uuid;

use crate::fields::FieldResolution;
use crate::parse::RawRow;
use crate::schema::{FieldType, MAX_NUMERO, POSITION_KINDS, TOPONYM_NUMERO};

fn insee_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{2}|2[AB])\d{3}$").unwrap())
}

fn parcel_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9A-Z]{14}$").unwrap())
}

/// Typed value of one parsed field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParsedValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    List(Vec<String>),
    Id(Uuid),
}

/// One error recorded against a row; severity is attached later by the
/// profile evaluator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub code: String,
    pub schema_name: Option<String>,
}

/// Validation result for one data row. Owned by the validator that created
/// it; read-only afterward.
#[derive(Debug, Clone)]
pub struct ValidatedRow {
    pub line: usize,
    pub raw_values: BTreeMap<String, String>,
    pub parsed_values: BTreeMap<String, ParsedValue>,
    pub remediations: BTreeMap<String, String>,
    pub additional_values: BTreeMap<String, String>,
    pub localized_values: BTreeMap<String, BTreeMap<String, String>>,
    pub errors: Vec<RowError>,
}

impl ValidatedRow {
    /// Raw value of the non-localized column resolved to `canonical`.
    pub fn canonical_raw<'a>(&'a self, resolution: &FieldResolution, canonical: &str) -> Option<&'a str> {
        resolution.column_of(canonical).and_then(|index| {
            resolution
                .fields
                .get(index)
                .and_then(|m| self.raw_values.get(&m.name))
                .map(String::as_str)
        })
    }
}

/// Validates one raw row against the resolved schema. Independent of every
/// other row; safe to fan out.
pub fn validate_row(raw: &RawRow, resolution: &FieldResolution) -> ValidatedRow {
    let mut row = ValidatedRow {
        line: raw.line,
        raw_values: BTreeMap::new(),
        parsed_values: BTreeMap::new(),
        remediations: BTreeMap::new(),
        additional_values: BTreeMap::new(),
        localized_values: BTreeMap::new(),
        errors: Vec::new(),
    };

    for field_match in &resolution.fields {
        let value = raw
            .values
            .get(field_match.index)
            .map(String::as_str)
            .unwrap_or("");
        row.raw_values
            .insert(field_match.name.clone(), value.to_string());

        let Some(schema_name) = field_match.schema_name.as_deref() else {
            row.additional_values
                .insert(field_match.name.clone(), value.to_string());
            continue;
        };

        if let Some(locale) = field_match.locale.as_deref() {
            if !value.trim().is_empty() {
                row.localized_values
                    .entry(schema_name.to_string())
                    .or_default()
                    .insert(locale.to_string(), value.trim().to_string());
            }
            continue;
        }

        let field = crate::schema::field_by_name(schema_name)
            .unwrap_or_else(|| unreachable!("resolved field '{schema_name}' is in the catalog"));
        let value = value.trim();

        if value.is_empty() {
            if field.required {
                row.push_error(schema_name, format!("{schema_name}.valeur_manquante"));
            }
            continue;
        }

        if let Some(parsed) = parse_field(field.data_type, schema_name, value, &mut row) {
            row.parsed_values.insert(schema_name.to_string(), parsed);
        }
    }

    apply_row_rules(&mut row, resolution);
    row
}

impl ValidatedRow {
    fn push_error(&mut self, schema_name: &str, code: String) {
        self.errors.push(RowError {
            code,
            schema_name: Some(schema_name.to_string()),
        });
    }

    fn push_row_error(&mut self, code: &str) {
        self.errors.push(RowError {
            code: code.to_string(),
            schema_name: None,
        });
    }
}

fn parse_field(
    data_type: FieldType,
    name: &str,
    value: &str,
    row: &mut ValidatedRow,
) -> Option<ParsedValue> {
    match data_type {
        FieldType::Text => Some(ParsedValue::Text(value.to_string())),
        FieldType::Numero => parse_numero(name, value, row),
        FieldType::Suffixe => parse_suffixe(name, value, row),
        FieldType::InseeCode => parse_insee(name, value, row),
        FieldType::PositionEnum => parse_position(name, value, row),
        FieldType::Float => parse_float(name, value, row, None),
        FieldType::Latitude => parse_float(name, value, row, Some((-90.0, 90.0))),
        FieldType::Longitude => parse_float(name, value, row, Some((-180.0, 180.0))),
        FieldType::Date => parse_date(name, value, row),
        FieldType::Bool => parse_bool(name, value, row),
        FieldType::ParcelList => parse_parcels(name, value, row),
        FieldType::InteropKey => parse_interop_key(name, value, row),
        FieldType::BanId => parse_ban_id(name, value, row),
    }
}

fn parse_numero(name: &str, value: &str, row: &mut ValidatedRow) -> Option<ParsedValue> {
    let Ok(numero) = value.parse::<i64>() else {
        row.push_error(name, format!("{name}.type_invalide"));
        return None;
    };
    if numero != TOPONYM_NUMERO && !(0..=MAX_NUMERO).contains(&numero) {
        row.push_error(name, format!("{name}.trop_grand"));
        return None;
    }
    Some(ParsedValue::Integer(numero))
}

fn parse_suffixe(name: &str, value: &str, row: &mut ValidatedRow) -> Option<ParsedValue> {
    if !value.chars().next().is_some_and(|c| c.is_ascii_alphanumeric()) {
        row.push_error(name, format!("{name}.debut_invalide"));
        return None;
    }
    if value.chars().count() > 9 {
        row.push_error(name, format!("{name}.trop_long"));
        return None;
    }
    Some(ParsedValue::Text(value.to_string()))
}

fn parse_insee(name: &str, value: &str, row: &mut ValidatedRow) -> Option<ParsedValue> {
    if !insee_re().is_match(value) {
        row.push_error(name, format!("{name}.valeur_invalide"));
        return None;
    }
    Some(ParsedValue::Text(value.to_string()))
}

fn parse_position(name: &str, value: &str, row: &mut ValidatedRow) -> Option<ParsedValue> {
    if POSITION_KINDS.contains(&value) {
        return Some(ParsedValue::Text(value.to_string()));
    }
    let lowered = value.to_lowercase();
    if let Some(canonical) = POSITION_KINDS.iter().find(|kind| **kind == lowered) {
        // Wrong casing only: keep the parsed value, suggest the canonical one.
        row.push_error(name, format!("{name}.enum_fuzzy"));
        row.remediations
            .insert(name.to_string(), canonical.to_string());
        return Some(ParsedValue::Text(canonical.to_string()));
    }
    row.push_error(name, format!("{name}.valeur_invalide"));
    None
}

fn parse_float(
    name: &str,
    value: &str,
    row: &mut ValidatedRow,
    range: Option<(f64, f64)>,
) -> Option<ParsedValue> {
    let (candidate, comma) = if value.contains(',') && !value.contains('.') {
        (value.replace(',', "."), true)
    } else {
        (value.to_string(), false)
    };
    let Ok(parsed) = candidate.parse::<f64>() else {
        row.push_error(name, format!("{name}.valeur_invalide"));
        return None;
    };
    if let Some((min, max)) = range
        && !(min..=max).contains(&parsed)
    {
        row.push_error(name, format!("{name}.valeur_invalide"));
        return None;
    }
    if comma {
        row.push_error(name, format!("{name}.separateur_virgule"));
        row.remediations.insert(name.to_string(), candidate);
    }
    Some(ParsedValue::Float(parsed))
}

const DATE_ALT_FORMATS: &[&str] = &["%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y"];

fn parse_date(name: &str, value: &str, row: &mut ValidatedRow) -> Option<ParsedValue> {
    let parsed = match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => {
            let alternate = DATE_ALT_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok());
            match alternate {
                Some(date) => {
                    row.push_error(name, format!("{name}.format_invalide"));
                    row.remediations
                        .insert(name.to_string(), date.format("%Y-%m-%d").to_string());
                    date
                }
                None => {
                    row.push_error(name, format!("{name}.date_invalide"));
                    return None;
                }
            }
        }
    };
    if parsed > Local::now().date_naive() {
        row.push_error(name, format!("{name}.date_future"));
    }
    Some(ParsedValue::Date(parsed))
}

fn parse_bool(name: &str, value: &str, row: &mut ValidatedRow) -> Option<ParsedValue> {
    let parsed = match value.to_lowercase().as_str() {
        "1" | "true" | "oui" => true,
        "0" | "false" | "non" => false,
        _ => {
            row.push_error(name, format!("{name}.valeur_invalide"));
            return None;
        }
    };
    Some(ParsedValue::Bool(parsed))
}

fn parse_parcels(name: &str, value: &str, row: &mut ValidatedRow) -> Option<ParsedValue> {
    let entries: Vec<&str> = value.split('|').map(str::trim).collect();
    let uppercased: Vec<String> = entries.iter().map(|e| e.to_uppercase()).collect();
    if uppercased.iter().any(|e| !parcel_re().is_match(e)) {
        row.push_error(name, format!("{name}.valeur_invalide"));
        return None;
    }
    if entries.iter().zip(&uppercased).any(|(raw, up)| *raw != up) {
        row.push_error(name, format!("{name}.casse_invalide"));
        row.remediations
            .insert(name.to_string(), uppercased.join("|"));
    }
    Some(ParsedValue::List(uppercased))
}

/// `cle_interop` shape: `<insee>_<code voie>_<numero>[_<suffixe>]`, all
/// lowercase, numero zero-padded to five digits.
fn parse_interop_key(name: &str, value: &str, row: &mut ValidatedRow) -> Option<ParsedValue> {
    let mut normalized = value.to_string();
    if normalized.chars().any(|c| c.is_ascii_uppercase()) {
        normalized = normalized.to_lowercase();
        row.push_error(name, format!("{name}.casse_invalide"));
        row.remediations.insert(name.to_string(), normalized.clone());
    }

    let parts: Vec<&str> = normalized.split('_').collect();
    if parts.len() < 3 {
        row.push_error(name, format!("{name}.structure_invalide"));
        return None;
    }
    let mut well_formed = true;
    if !insee_re().is_match(&parts[0].to_uppercase()) {
        row.push_error(name, format!("{name}.commune_invalide"));
        well_formed = false;
    }
    if parts[1].len() != 4 || !parts[1].chars().all(|c| c.is_ascii_alphanumeric()) {
        row.push_error(name, format!("{name}.voie_invalide"));
        well_formed = false;
    }
    if !parts[2].chars().all(|c| c.is_ascii_digit()) || parts[2].is_empty() {
        row.push_error(name, format!("{name}.numero_invalide"));
        well_formed = false;
    } else if parts[2].len() != 5 {
        let mut fixed: Vec<String> = parts.iter().map(|p| p.to_string()).collect();
        fixed[2] = format!("{:0>5}", parts[2]);
        normalized = fixed.join("_");
        row.push_error(name, format!("{name}.numero_prefixe_manquant"));
        row.remediations.insert(name.to_string(), normalized.clone());
    }
    if !well_formed {
        return None;
    }
    Some(ParsedValue::Text(normalized))
}

fn parse_ban_id(name: &str, value: &str, row: &mut ValidatedRow) -> Option<ParsedValue> {
    let Ok(id) = Uuid::parse_str(value) else {
        row.push_error(name, format!("{name}.type_invalide"));
        return None;
    };
    if value.chars().any(|c| c.is_ascii_uppercase()) {
        row.push_error(name, format!("{name}.casse_invalide"));
        row.remediations
            .insert(name.to_string(), value.to_lowercase());
    }
    Some(ParsedValue::Id(id))
}

/// Cross-field rules within one row.
fn apply_row_rules(row: &mut ValidatedRow, resolution: &FieldResolution) {
    let numero = match row.parsed_values.get("numero") {
        Some(ParsedValue::Integer(n)) => Some(*n),
        _ => None,
    };

    // An address must reference a street toponym unless it hangs directly
    // off a locality, which is what the numero sentinel expresses.
    if resolution.column_of("voie_nom").is_some() {
        let voie_empty = row
            .canonical_raw(resolution, "voie_nom")
            .is_none_or(|v| v.trim().is_empty());
        if voie_empty && numero != Some(TOPONYM_NUMERO) {
            row.push_row_error("row.adresse_incomplete");
        }
    }

    // A toponym row carries no address-level BAN id.
    if numero == Some(TOPONYM_NUMERO)
        && row
            .canonical_raw(resolution, "id_ban_adresse")
            .is_some_and(|v| !v.trim().is_empty())
    {
        row.push_row_error("row.incoherence_ban_adresse");
    }
}
