//! Serializable validation report, mirroring the shape the original BAL
//! validation API exposes (camelCase keys, `{value, isValid}` property
//! checks, per-profile validity map).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::fields::FieldMatch;
use crate::filecheck::{FileCheck, PropertyCheck};
use crate::parse::{ParseIssue, ParsedTable};
use crate::profiles::{ErrorLevel, ProfileDefinition, ProfileError, ProfileValidation};
use crate::rows::{ParsedValue, ValidatedRow};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotFoundField {
    pub schema_name: String,
    pub level: ErrorLevel,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowErrorDetail {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    pub level: ErrorLevel,
}

/// Per-row detail under the selected profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowReport {
    pub raw_values: BTreeMap<String, String>,
    pub parsed_values: BTreeMap<String, ParsedValue>,
    pub remediations: BTreeMap<String, String>,
    pub additional_values: BTreeMap<String, String>,
    pub localized_values: BTreeMap<String, BTreeMap<String, String>>,
    pub errors: Vec<RowErrorDetail>,
    pub is_valid: bool,
    pub line: usize,
}

impl RowReport {
    pub fn from_validated(row: &ValidatedRow, profile: &ProfileDefinition) -> Self {
        let errors: Vec<RowErrorDetail> = row
            .errors
            .iter()
            .map(|error| RowErrorDetail {
                code: error.code.clone(),
                schema_name: error.schema_name.clone(),
                level: profile.severity(&error.code),
            })
            .collect();
        let is_valid = !errors.iter().any(|e| e.level == ErrorLevel::Error);
        RowReport {
            raw_values: row.raw_values.clone(),
            parsed_values: row.parsed_values.clone(),
            remediations: row.remediations.clone(),
            additional_values: row.additional_values.clone(),
            localized_values: row.localized_values.clone(),
            errors,
            is_valid,
            line: row.line,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub encoding: PropertyCheck,
    pub delimiter: PropertyCheck,
    pub linebreak: PropertyCheck,
    pub original_fields: Vec<String>,
    pub parse_ok: bool,
    pub parse_errors: Vec<ParseIssue>,
    pub fields: Vec<FieldMatch>,
    pub not_found_fields: Vec<NotFoundField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<RowReport>>,
    pub profiles_validation: BTreeMap<String, ProfileValidation>,
    pub global_errors: Vec<String>,
    pub rows_errors: Vec<String>,
    pub unique_errors: Vec<String>,
    #[serde(rename = "profilErrors")]
    pub profil_errors: Vec<ProfileError>,
}

impl ValidationReport {
    /// Report for a structurally unparseable file: parse-level information
    /// only, no field or profile evaluation.
    pub fn parse_failed(filecheck: &FileCheck, table: &ParsedTable) -> Self {
        ValidationReport {
            encoding: filecheck.encoding.clone(),
            delimiter: filecheck.delimiter.clone(),
            linebreak: filecheck.linebreak.clone(),
            original_fields: table.headers.clone(),
            parse_ok: false,
            parse_errors: table.parse_errors.clone(),
            fields: Vec::new(),
            not_found_fields: Vec::new(),
            rows: None,
            profiles_validation: BTreeMap::new(),
            global_errors: Vec::new(),
            rows_errors: Vec::new(),
            unique_errors: Vec::new(),
            profil_errors: Vec::new(),
        }
    }

    /// Validity of the caller-selected profile.
    pub fn is_valid_for(&self, profile_code: &str) -> bool {
        self.profiles_validation
            .get(profile_code)
            .is_some_and(|p| p.is_valid)
    }
}
