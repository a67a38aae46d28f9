//! Stable, externally-facing projection of the wide catalog table.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::catalog::{format_time_of_check, CatalogEntry, DatasetTable};
use crate::coerce::{coerce_labels, coerce_text};

/// Source column -> projected column, in output order.
/// Source names are the wide table's `@`-stripped names.
pub const PROJECTED_COLUMNS: &[(&str, &str)] = &[
    ("identifier", "identifier"),
    ("title", "title"),
    ("description", "description"),
    ("modified", "modified"),
    ("c_vintage", "vintage"),
    ("distribution_accessURL", "distribution_access_url"),
    ("c_geographyLink", "geography_link"),
    ("c_variablesLink", "variables_link"),
    ("c_tagsLink", "tags_link"),
    ("c_examplesLink", "examples_link"),
    ("c_groupsLink", "groups_link"),
    ("c_sorts_url", "sorts_url"),
    ("c_dataset", "dataset"),
    ("spatial", "spatial"),
    ("temporal", "temporal"),
    ("bureauCode", "bureauCode"),
    ("programCode", "programCode"),
    ("keyword", "keyword"),
    ("c_isMicrodata", "is_microdata"),
    ("c_isAggregate", "is_aggregate"),
    ("c_isCube", "is_cube"),
    ("c_isAvailable", "is_available"),
    ("c_isTimeseries", "is_timeseries"),
    ("accessLevel", "access_level"),
    ("license", "license"),
    ("type", "type"),
    ("publisher.name", "publisher_name"),
    ("publisher.type", "publisher_type"),
    ("contactPoint.fn", "contact_point_fn"),
    ("contactPoint.hasEmail", "contact_point_email"),
    ("distribution_type", "distribution_type"),
    ("distribution_mediaType", "distribution_media_type"),
    ("references", "references"),
    ("c_documentationLink", "documentation_link"),
];

/// One dataset in the projected schema. Field order matches [`PROJECTED_COLUMNS`],
/// followed by `time_of_check`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetMetadata {
    pub identifier: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub modified: Option<DateTime<Utc>>,
    /// Integer string, or `None` when the catalog has no vintage.
    pub vintage: Option<String>,
    pub distribution_access_url: Option<String>,
    pub geography_link: Option<String>,
    pub variables_link: Option<String>,
    pub tags_link: Option<String>,
    pub examples_link: Option<String>,
    pub groups_link: Option<String>,
    pub sorts_url: Option<String>,
    pub dataset: Vec<String>,
    pub spatial: Option<String>,
    pub temporal: Option<String>,
    #[serde(rename = "bureauCode")]
    pub bureau_code: Vec<String>,
    #[serde(rename = "programCode")]
    pub program_code: Vec<String>,
    pub keyword: Vec<String>,
    pub is_microdata: bool,
    pub is_aggregate: bool,
    pub is_cube: bool,
    pub is_available: bool,
    pub is_timeseries: bool,
    pub access_level: Option<String>,
    pub license: Option<String>,
    #[serde(rename = "type")]
    pub dataset_type: Option<String>,
    pub publisher_name: Option<String>,
    pub publisher_type: Option<String>,
    pub contact_point_fn: Option<String>,
    pub contact_point_email: Option<String>,
    pub distribution_type: Option<String>,
    pub distribution_media_type: Option<String>,
    pub references: Vec<String>,
    pub documentation_link: Option<String>,
    pub time_of_check: String,
}

/// Projects catalog rows, stamping each with one capture time.
#[derive(Debug, Clone)]
pub struct MetadataProjector {
    time_of_check: String,
}

impl MetadataProjector {
    pub fn new(time_of_check: DateTime<Utc>) -> Self {
        Self {
            time_of_check: format_time_of_check(&time_of_check),
        }
    }

    pub fn time_of_check(&self) -> &str {
        &self.time_of_check
    }

    pub fn project(&self, table: &DatasetTable) -> Vec<DatasetMetadata> {
        table
            .entries()
            .iter()
            .map(|entry| self.project_entry(entry))
            .collect()
    }

    pub fn project_entry(&self, entry: &CatalogEntry) -> DatasetMetadata {
        let text = |column: &str| coerce_text(entry.field(column));
        let labels = |column: &str| coerce_labels(entry.field(column));

        DatasetMetadata {
            identifier: entry.identifier.clone(),
            title: entry.title(),
            description: entry.description(),
            modified: entry.modified,
            vintage: entry.vintage(),
            distribution_access_url: entry.access_url().map(str::to_string),
            geography_link: text("c_geographyLink"),
            variables_link: text("c_variablesLink"),
            tags_link: text("c_tagsLink"),
            examples_link: text("c_examplesLink"),
            groups_link: text("c_groupsLink"),
            sorts_url: text("c_sorts_url"),
            dataset: labels("c_dataset"),
            spatial: text("spatial"),
            temporal: text("temporal"),
            bureau_code: labels("bureauCode"),
            program_code: labels("programCode"),
            keyword: labels("keyword"),
            is_microdata: entry.is_microdata(),
            is_aggregate: entry.is_aggregate(),
            is_cube: entry.is_cube(),
            is_available: entry.is_available(),
            is_timeseries: entry.is_timeseries(),
            access_level: text("accessLevel"),
            license: text("license"),
            dataset_type: text("type"),
            publisher_name: text("publisher.name"),
            publisher_type: text("publisher.type"),
            contact_point_fn: text("contactPoint.fn"),
            contact_point_email: text("contactPoint.hasEmail"),
            distribution_type: text("distribution_type"),
            distribution_media_type: text("distribution_mediaType"),
            references: labels("references"),
            documentation_link: text("c_documentationLink"),
            time_of_check: self.time_of_check.clone(),
        }
    }
}

/// Serialized form of a projected row, for callers that want plain JSON.
pub fn to_json_rows(rows: &[DatasetMetadata]) -> Result<Vec<Value>, serde_json::Error> {
    rows.iter().map(serde_json::to_value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_dataset_table;
    use crate::table::Table;
    use chrono::TimeZone;
    use serde_json::json;

    fn table() -> DatasetTable {
        build_dataset_table(&json!({"dataset": [
            {
                "@type": "dcat:Dataset",
                "identifier": "https://api.census.gov/data/id/ABSCS2017",
                "title": "Annual Business Survey",
                "modified": "2020-04-16 00:00:00.0",
                "c_vintage": 2017,
                "c_dataset": ["abscs"],
                "c_isAggregate": true,
                "c_isAvailable": true,
                "bureauCode": ["006:07"],
                "accessLevel": "public",
                "contactPoint": {"fn": "Business Help", "hasEmail": "mailto:erd.help@census.gov"},
                "publisher": {"@type": "org:Organization", "name": "U.S. Census Bureau"},
                "distribution": [{
                    "@type": "dcat:Distribution",
                    "accessURL": "http://api.census.gov/data/2017/abscs",
                    "mediaType": "application/json"
                }]
            },
            {
                "identifier": "https://api.census.gov/data/id/TIMESERIESEITS",
                "title": "Economic Indicators",
                "c_isTimeseries": true
            }
        ]}))
        .unwrap()
    }

    fn projector() -> MetadataProjector {
        MetadataProjector::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_projection_renames_and_coerces() {
        let rows = projector().project(&table());
        let abs = &rows[0];

        assert_eq!(abs.vintage.as_deref(), Some("2017"));
        assert_eq!(
            abs.distribution_access_url.as_deref(),
            Some("http://api.census.gov/data/2017/abscs")
        );
        assert_eq!(abs.dataset, vec!["abscs"]);
        assert!(abs.is_aggregate && abs.is_available);
        assert!(!abs.is_microdata && !abs.is_cube && !abs.is_timeseries);
        assert_eq!(abs.dataset_type.as_deref(), Some("dcat:Dataset"));
        assert_eq!(abs.publisher_type.as_deref(), Some("org:Organization"));
        assert_eq!(abs.contact_point_fn.as_deref(), Some("Business Help"));
        assert_eq!(abs.distribution_type.as_deref(), Some("dcat:Distribution"));
        assert_eq!(abs.distribution_media_type.as_deref(), Some("application/json"));
        assert_eq!(abs.bureau_code, vec!["006:07"]);
    }

    #[test]
    fn test_missing_vintage_and_facets() {
        let rows = projector().project(&table());
        let eits = &rows[1];

        assert_eq!(eits.vintage, None);
        assert!(eits.is_timeseries);
        assert!(!eits.is_aggregate);
        assert!(eits.distribution_access_url.is_none());
        assert!(eits.keyword.is_empty());
    }

    #[test]
    fn test_every_row_stamped() {
        let rows = projector().project(&table());
        assert!(rows
            .iter()
            .all(|r| r.time_of_check == "2024-05-01T12:00:00.000000Z"));
    }

    #[test]
    fn test_serialized_columns_match_projection() {
        let rows = projector().project(&table());
        let table = Table::from_records(&rows).unwrap();

        let mut expected: Vec<&str> = PROJECTED_COLUMNS.iter().map(|(_, to)| *to).collect();
        expected.push("time_of_check");
        assert_eq!(table.columns(), expected.as_slice());
        assert_eq!(table.get(1, "vintage"), Some(&Value::Null));
    }

    #[test]
    fn test_to_json_rows() {
        let rows = projector().project(&table());
        let json = to_json_rows(&rows).unwrap();
        assert_eq!(json[0]["modified"], "2020-04-16T00:00:00Z");
        assert_eq!(json[0]["is_cube"], false);
    }
}
