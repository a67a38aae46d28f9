//! Geography endpoint: one row per FIPS geography level.

use serde::Serialize;
use serde_json::{Map, Value};

use super::{detail_field, entry_fields, take_labels, take_text};
use crate::catalog::CatalogError;

/// One geography level a dataset can be queried at.
///
/// Known fields are read leniently; a value with an unexpected shape is kept
/// under its own key in `extra` instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeographyRecord {
    pub name: String,
    #[serde(rename = "geoLevelDisplay", skip_serializing_if = "Option::is_none")]
    pub geo_level_display: Option<String>,
    #[serde(rename = "referenceDate", skip_serializing_if = "Option::is_none")]
    pub reference_date: Option<String>,
    /// Parent levels that must be given in the `in` clause.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
    /// Parent levels that accept a `*` wildcard.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub wildcard: Vec<String>,
    #[serde(rename = "optionalWithWCFor", skip_serializing_if = "Option::is_none")]
    pub optional_with_wc_for: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GeographyRecord {
    fn from_entry(raw: &Value) -> Self {
        let mut fields = entry_fields(raw);
        Self {
            name: take_text(&mut fields, "name").unwrap_or_default(),
            geo_level_display: take_text(&mut fields, "geoLevelDisplay"),
            reference_date: take_text(&mut fields, "referenceDate"),
            requires: take_labels(&mut fields, "requires"),
            wildcard: take_labels(&mut fields, "wildcard"),
            optional_with_wc_for: take_text(&mut fields, "optionalWithWCFor"),
            extra: fields,
        }
    }
}

/// Return the `fips` list as one record per entry.
pub fn build_geographies_table(detail: &Value) -> Result<Vec<GeographyRecord>, CatalogError> {
    let fips = detail_field(detail, "fips")?
        .as_array()
        .ok_or_else(|| CatalogError::Shape("'fips' is not a list".to_string()))?;

    Ok(fips.iter().map(GeographyRecord::from_entry).collect())
}
