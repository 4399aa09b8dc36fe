//! Canonical BAL field catalog.
//!
//! The catalog is configuration, not engine logic: each [`SchemaField`]
//! declares a canonical column name, its value type, accepted raw-header
//! aliases, whether localized `<name>_<lang>` variants exist, whether the
//! field is required, and the format version that introduced it. The
//! resolver and row validator consume this table without knowing any field
//! by name.

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::Serialize;

/// Sentinel for `numero` on rows describing a toponym (a street or locality
/// record with no house number of its own).
pub const TOPONYM_NUMERO: i64 = 99_999;

/// Largest real house number accepted by the format.
pub const MAX_NUMERO: i64 = 9_999;

/// Languages accepted as localized-header suffixes (`voie_nom_bre`, ...).
pub const LOCALES: &[&str] = &["bre", "eus", "cat", "cos", "oci", "gsw", "gcf"];

/// Accepted values for the `position` enum field, in canonical casing.
pub const POSITION_KINDS: &[&str] = &[
    "entrée",
    "délivrance postale",
    "bâtiment",
    "cage d'escalier",
    "logement",
    "parcelle",
    "segment",
    "service technique",
    "inconnue",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum FormatVersion {
    #[serde(rename = "1.3")]
    V1_3,
    #[serde(rename = "1.4")]
    V1_4,
}

impl FormatVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatVersion::V1_3 => "1.3",
            FormatVersion::V1_4 => "1.4",
        }
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FormatVersion {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "1.3" => Ok(FormatVersion::V1_3),
            "1.4" => Ok(FormatVersion::V1_4),
            other => Err(anyhow!("Unknown BAL format version '{other}'")),
        }
    }
}

/// Declared value type of a canonical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    /// One of [`POSITION_KINDS`].
    PositionEnum,
    /// House number, bounded by [`MAX_NUMERO`] plus the toponym sentinel.
    Numero,
    /// Suffix attached to a house number (`bis`, `ter`, `a`...).
    Suffixe,
    /// INSEE municipality code (`2A004`, `54084`...).
    InseeCode,
    Float,
    Latitude,
    Longitude,
    Date,
    Bool,
    /// Pipe-separated list of cadastral parcel identifiers.
    ParcelList,
    /// The `cle_interop` composite identifier.
    InteropKey,
    /// BAN identifier (UUID).
    BanId,
}

#[derive(Debug, Clone, Copy)]
pub struct SchemaField {
    pub name: &'static str,
    pub data_type: FieldType,
    pub aliases: &'static [&'static str],
    pub localizable: bool,
    pub required: bool,
    pub first_version: FormatVersion,
}

/// The full catalog across all known format versions. Use
/// [`fields_for_version`] to view it through one version's lens.
pub const SCHEMA_FIELDS: &[SchemaField] = &[
    SchemaField {
        name: "cle_interop",
        data_type: FieldType::InteropKey,
        aliases: &["cle_intero", "cle_interrop"],
        localizable: false,
        required: false,
        first_version: FormatVersion::V1_3,
    },
    SchemaField {
        name: "uid_adresse",
        data_type: FieldType::Text,
        aliases: &[],
        localizable: false,
        required: false,
        first_version: FormatVersion::V1_3,
    },
    SchemaField {
        name: "voie_nom",
        data_type: FieldType::Text,
        aliases: &["voie_name", "nom_voie"],
        localizable: true,
        required: true,
        first_version: FormatVersion::V1_3,
    },
    SchemaField {
        name: "lieudit_complement_nom",
        data_type: FieldType::Text,
        aliases: &["lieudit_complement_name"],
        localizable: true,
        required: false,
        first_version: FormatVersion::V1_3,
    },
    SchemaField {
        name: "numero",
        data_type: FieldType::Numero,
        aliases: &[],
        localizable: false,
        required: true,
        first_version: FormatVersion::V1_3,
    },
    SchemaField {
        name: "suffixe",
        data_type: FieldType::Suffixe,
        aliases: &[],
        localizable: false,
        required: false,
        first_version: FormatVersion::V1_3,
    },
    SchemaField {
        name: "commune_insee",
        data_type: FieldType::InseeCode,
        aliases: &["commune_code"],
        localizable: false,
        required: true,
        first_version: FormatVersion::V1_3,
    },
    SchemaField {
        name: "commune_nom",
        data_type: FieldType::Text,
        aliases: &["commune_name"],
        localizable: false,
        required: true,
        first_version: FormatVersion::V1_3,
    },
    SchemaField {
        name: "commune_deleguee_insee",
        data_type: FieldType::InseeCode,
        aliases: &[],
        localizable: false,
        required: false,
        first_version: FormatVersion::V1_3,
    },
    SchemaField {
        name: "commune_deleguee_nom",
        data_type: FieldType::Text,
        aliases: &[],
        localizable: false,
        required: false,
        first_version: FormatVersion::V1_3,
    },
    SchemaField {
        name: "position",
        data_type: FieldType::PositionEnum,
        aliases: &[],
        localizable: false,
        required: true,
        first_version: FormatVersion::V1_3,
    },
    SchemaField {
        name: "long",
        data_type: FieldType::Longitude,
        aliases: &["lon", "longitude"],
        localizable: false,
        required: true,
        first_version: FormatVersion::V1_3,
    },
    SchemaField {
        name: "lat",
        data_type: FieldType::Latitude,
        aliases: &["latitude"],
        localizable: false,
        required: true,
        first_version: FormatVersion::V1_3,
    },
    SchemaField {
        name: "x",
        data_type: FieldType::Float,
        aliases: &[],
        localizable: false,
        required: false,
        first_version: FormatVersion::V1_3,
    },
    SchemaField {
        name: "y",
        data_type: FieldType::Float,
        aliases: &[],
        localizable: false,
        required: false,
        first_version: FormatVersion::V1_3,
    },
    SchemaField {
        name: "cad_parcelles",
        data_type: FieldType::ParcelList,
        aliases: &["cad_parcelle"],
        localizable: false,
        required: false,
        first_version: FormatVersion::V1_3,
    },
    SchemaField {
        name: "source",
        data_type: FieldType::Text,
        aliases: &[],
        localizable: false,
        required: false,
        first_version: FormatVersion::V1_3,
    },
    SchemaField {
        name: "date_der_maj",
        data_type: FieldType::Date,
        aliases: &["dmaj"],
        localizable: false,
        required: true,
        first_version: FormatVersion::V1_3,
    },
    SchemaField {
        name: "certification_commune",
        data_type: FieldType::Bool,
        aliases: &[],
        localizable: false,
        required: false,
        first_version: FormatVersion::V1_3,
    },
    SchemaField {
        name: "id_ban_commune",
        data_type: FieldType::BanId,
        aliases: &[],
        localizable: false,
        required: false,
        first_version: FormatVersion::V1_4,
    },
    SchemaField {
        name: "id_ban_toponyme",
        data_type: FieldType::BanId,
        aliases: &[],
        localizable: false,
        required: false,
        first_version: FormatVersion::V1_4,
    },
    SchemaField {
        name: "id_ban_adresse",
        data_type: FieldType::BanId,
        aliases: &[],
        localizable: false,
        required: false,
        first_version: FormatVersion::V1_4,
    },
];

/// Catalog view for one format version, in declaration order.
pub fn fields_for_version(version: FormatVersion) -> impl Iterator<Item = &'static SchemaField> {
    SCHEMA_FIELDS
        .iter()
        .filter(move |field| field.first_version <= version)
}

pub fn field_by_name(name: &str) -> Option<&'static SchemaField> {
    SCHEMA_FIELDS.iter().find(|field| field.name == name)
}
