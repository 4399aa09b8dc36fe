//! Profile catalog and severity evaluation.
//!
//! A profile is a (format version, error-code → severity) table plus a relax
//! flag. Severity is a total function: codes absent from every override list
//! are ERROR, so every code has a defined outcome under every profile. Relax
//! profiles downgrade a fixed subset of codes to WARNING and never change
//! which codes are present.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::schema::FormatVersion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorLevel {
    #[serde(rename = "E")]
    Error,
    #[serde(rename = "W")]
    Warning,
    #[serde(rename = "I")]
    Info,
}

impl fmt::Display for ErrorLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorLevel::Error => "E",
            ErrorLevel::Warning => "W",
            ErrorLevel::Info => "I",
        };
        write!(f, "{label}")
    }
}

/// Codes every profile treats as WARNING.
const BASE_WARNINGS: &[&str] = &[
    "date_der_maj.date_future",
    "position.enum_fuzzy",
    "cad_parcelles.casse_invalide",
    "long.separateur_virgule",
    "lat.separateur_virgule",
    "x.separateur_virgule",
    "y.separateur_virgule",
    "field.position.manquant",
    "field.long.manquant",
    "field.lat.manquant",
    "field.date_der_maj.manquant",
];

/// The fixed subset relax profiles downgrade from ERROR to WARNING.
pub const RELAXED_CODES: &[&str] = &[
    "file.encoding.non_standard",
    "file.delimiter.non_standard",
    "file.linebreak.non_standard",
    "cle_interop.casse_invalide",
    "cle_interop.numero_prefixe_manquant",
    "date_der_maj.format_invalide",
    "suffixe.debut_invalide",
    "certification_commune.valeur_invalide",
    "field.commune_nom.manquant",
];

#[derive(Debug, Clone, Copy)]
pub struct ProfileDefinition {
    pub code: &'static str,
    pub name: &'static str,
    pub version: FormatVersion,
    pub relax: bool,
    /// Open question resolved per profile: whether unmapped header columns
    /// are an error rather than tolerated extra data.
    pub forbid_unknown_columns: bool,
}

impl ProfileDefinition {
    /// Total severity function for this profile.
    pub fn severity(&self, code: &str) -> ErrorLevel {
        if BASE_WARNINGS.contains(&code) {
            return ErrorLevel::Warning;
        }
        if self.relax && RELAXED_CODES.contains(&code) {
            return ErrorLevel::Warning;
        }
        ErrorLevel::Error
    }
}

/// Built-in profile catalog. Adding a profile is a new entry here, no engine
/// change.
pub const PROFILES: &[ProfileDefinition] = &[
    ProfileDefinition {
        code: "1.3",
        name: "BAL 1.3",
        version: FormatVersion::V1_3,
        relax: false,
        forbid_unknown_columns: false,
    },
    ProfileDefinition {
        code: "1.3-relax",
        name: "BAL 1.3 (relâché)",
        version: FormatVersion::V1_3,
        relax: true,
        forbid_unknown_columns: false,
    },
    ProfileDefinition {
        code: "1.4",
        name: "BAL 1.4",
        version: FormatVersion::V1_4,
        relax: false,
        forbid_unknown_columns: false,
    },
    ProfileDefinition {
        code: "1.4-relax",
        name: "BAL 1.4 (relâché)",
        version: FormatVersion::V1_4,
        relax: true,
        forbid_unknown_columns: false,
    },
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileValidation {
    pub code: String,
    pub name: String,
    pub is_valid: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileError {
    pub code: String,
    pub level: ErrorLevel,
}

/// Explicit, immutable profile catalog handed to the pipeline; no hidden
/// process-wide registry.
#[derive(Debug, Clone, Copy)]
pub struct ProfileCatalog {
    profiles: &'static [ProfileDefinition],
}

impl Default for ProfileCatalog {
    fn default() -> Self {
        ProfileCatalog { profiles: PROFILES }
    }
}

impl ProfileCatalog {
    pub fn new(profiles: &'static [ProfileDefinition]) -> Self {
        ProfileCatalog { profiles }
    }

    pub fn get(&self, code: &str) -> Option<&'static ProfileDefinition> {
        self.profiles.iter().find(|profile| profile.code == code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static ProfileDefinition> {
        self.profiles.iter()
    }

    /// Pass/fail for every configured profile, as a pure function of the
    /// deduplicated error-code set.
    pub fn evaluate(&self, unique_errors: &[String]) -> BTreeMap<String, ProfileValidation> {
        self.profiles
            .iter()
            .map(|profile| {
                let is_valid = !unique_errors
                    .iter()
                    .any(|code| profile.severity(code) == ErrorLevel::Error);
                (
                    profile.code.to_string(),
                    ProfileValidation {
                        code: profile.code.to_string(),
                        name: profile.name.to_string(),
                        is_valid,
                    },
                )
            })
            .collect()
    }

    /// Severity-tagged detail for one profile, in first-seen order.
    pub fn profile_errors(
        &self,
        profile: &ProfileDefinition,
        unique_errors: &[String],
    ) -> Vec<ProfileError> {
        unique_errors
            .iter()
            .map(|code| ProfileError {
                code: code.clone(),
                level: profile.severity(code),
            })
            .collect()
    }
}
