//! Raw-header resolution against the canonical field catalog.
//!
//! Headers are matched case-insensitively against canonical names, alias
//! sets, and (for localizable fields) `<name>_<lang>` variants. Unmatched
//! headers are tolerated and surface later under `additionalValues`;
//! canonical fields required by the target version with no matching header
//! become not-found fields.

use serde::Serialize;

use crate::schema::{self, FormatVersion, SchemaField, LOCALES};

/// One raw header and what it resolved to, in file order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMatch {
    /// Raw header exactly as spelled in the file.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub localized_schema_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip)]
    pub index: usize,
}

impl FieldMatch {
    pub fn is_resolved(&self) -> bool {
        self.schema_name.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct FieldResolution {
    pub version: FormatVersion,
    /// One entry per raw header, in file order.
    pub fields: Vec<FieldMatch>,
    /// Canonical names required by `version` with no matching header.
    pub not_found: Vec<&'static str>,
}

impl FieldResolution {
    /// Column index of the non-localized resolution of `canonical`, if any.
    pub fn column_of(&self, canonical: &str) -> Option<usize> {
        self.fields
            .iter()
            .find(|m| m.locale.is_none() && m.schema_name.as_deref() == Some(canonical))
            .map(|m| m.index)
    }

    /// Raw headers that resolved to nothing.
    pub fn unknown_headers(&self) -> impl Iterator<Item = &FieldMatch> {
        self.fields.iter().filter(|m| !m.is_resolved())
    }
}

/// Resolves `headers` against the catalog view for `version`.
pub fn resolve_fields(headers: &[String], version: FormatVersion) -> FieldResolution {
    let mut fields = Vec::with_capacity(headers.len());
    let mut seen: Vec<(&'static str, Option<String>)> = Vec::new();

    for (index, header) in headers.iter().enumerate() {
        let lowered = header.trim().to_lowercase();
        let matched = match_header(&lowered, version);
        let matched = match matched {
            // A canonical field (per locale) binds to its first header only;
            // duplicates fall through to additional values.
            Some((field, locale)) if !seen.contains(&(field.name, locale.clone())) => {
                seen.push((field.name, locale.clone()));
                Some((field, locale))
            }
            _ => None,
        };
        fields.push(match matched {
            Some((field, Some(locale))) => FieldMatch {
                name: header.clone(),
                schema_name: Some(field.name.to_string()),
                localized_schema_name: Some(format!("{}_{locale}", field.name)),
                locale: Some(locale),
                index,
            },
            Some((field, None)) => FieldMatch {
                name: header.clone(),
                schema_name: Some(field.name.to_string()),
                localized_schema_name: None,
                locale: None,
                index,
            },
            None => FieldMatch {
                name: header.clone(),
                schema_name: None,
                localized_schema_name: None,
                locale: None,
                index,
            },
        });
    }

    let not_found = schema::fields_for_version(version)
        .filter(|field| field.required)
        .filter(|field| !seen.iter().any(|(name, locale)| name == &field.name && locale.is_none()))
        .map(|field| field.name)
        .collect();

    FieldResolution {
        version,
        fields,
        not_found,
    }
}

fn match_header(
    lowered: &str,
    version: FormatVersion,
) -> Option<(&'static SchemaField, Option<String>)> {
    for field in schema::fields_for_version(version) {
        if lowered == field.name || field.aliases.iter().any(|alias| lowered == *alias) {
            return Some((field, None));
        }
        if field.localizable
            && let Some(suffix) = lowered.strip_prefix(field.name).and_then(|s| s.strip_prefix('_'))
            && LOCALES.contains(&suffix)
        {
            return Some((field, Some(suffix.to_string())));
        }
    }
    None
}
