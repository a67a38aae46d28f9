//! Groups endpoint: one row per variable group.

use serde::Serialize;
use serde_json::{Map, Value};

use super::{detail_field, entry_fields, take_text};
use crate::catalog::CatalogError;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupRecord {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// URL of the group's variable listing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub universe: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GroupRecord {
    fn from_entry(raw: &Value) -> Self {
        let mut fields = entry_fields(raw);
        let name = take_text(&mut fields, "name").unwrap_or_default();
        let description = take_text(&mut fields, "description");
        let variables = take_text(&mut fields, "variables");
        // The API spells this key with a trailing space; the plain key wins when both exist.
        let universe = take_text(&mut fields, "universe")
            .or_else(|| take_text(&mut fields, "universe "));
        Self {
            name,
            description,
            variables,
            universe,
            extra: fields,
        }
    }
}

/// Return the `groups` list as one record per entry.
pub fn build_groups_table(detail: &Value) -> Result<Vec<GroupRecord>, CatalogError> {
    let groups = detail_field(detail, "groups")?
        .as_array()
        .ok_or_else(|| CatalogError::Shape("'groups' is not a list".to_string()))?;

    Ok(groups.iter().map(GroupRecord::from_entry).collect())
}
