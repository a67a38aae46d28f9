//! Variables endpoint: one row per variable name.

use serde::Serialize;
use serde_json::{Map, Value};

use super::detail_field;
use crate::catalog::CatalogError;
use crate::coerce::{coerce_flag, coerce_text, coerce_value_codes};

const KNOWN_FIELDS: &[&str] = &["label", "concept", "predicateType", "predicateOnly", "values"];

/// One variable of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableRecord {
    pub variable: String,
    pub label: Option<String>,
    pub concept: Option<String>,
    #[serde(rename = "predicateType")]
    pub predicate_type: Option<String>,
    /// False when the endpoint omits it.
    #[serde(rename = "predicateOnly")]
    pub predicate_only: bool,
    /// Allowed value codes; empty when the endpoint omits them.
    pub values: Map<String, Value>,
    /// Remaining attributes (group, limit, attributes, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VariableRecord {
    fn from_entry(name: &str, raw: &Value) -> Self {
        let extra = raw
            .as_object()
            .map(|obj| {
                obj.iter()
                    .filter(|(key, _)| !KNOWN_FIELDS.contains(&key.as_str()))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            variable: name.to_string(),
            label: coerce_text(raw.get("label")),
            concept: coerce_text(raw.get("concept")),
            predicate_type: coerce_text(raw.get("predicateType")),
            predicate_only: coerce_flag(raw.get("predicateOnly")),
            values: coerce_value_codes(raw.get("values")),
            extra,
        }
    }

    /// The variable's group, if it belongs to one.
    pub fn group(&self) -> Option<&str> {
        self.extra
            .get("group")
            .and_then(Value::as_str)
            .filter(|g| *g != "N/A")
    }
}

/// Expand the `variables` mapping into one record per variable, in document order.
pub fn build_variables_table(detail: &Value) -> Result<Vec<VariableRecord>, CatalogError> {
    let variables = detail_field(detail, "variables")?
        .as_object()
        .ok_or_else(|| CatalogError::Shape("'variables' is not a mapping".to_string()))?;

    Ok(variables
        .iter()
        .map(|(name, raw)| VariableRecord::from_entry(name, raw))
        .collect())
}
