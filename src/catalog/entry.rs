//! Catalog rows and the wide dataset table.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::datetime::{format_modified, parse_modified};
use super::flatten::{flatten, flatten_first_distribution, strip_at};
use super::CatalogError;
use crate::coerce::{coerce_flag, coerce_text, coerce_vintage};
use crate::table::Table;

/// Column order of the wide table, before `@` is stripped.
/// Merged `distribution_*` columns follow these.
pub const CATALOG_COLUMNS: &[&str] = &[
    "title",
    "identifier",
    "modified",
    "temporal",
    "bureauCode",
    "programCode",
    "description",
    "keyword",
    "spatial",
    "c_vintage",
    "c_dataset",
    "c_geographyLink",
    "c_variablesLink",
    "c_tagsLink",
    "c_examplesLink",
    "c_groupsLink",
    "c_sorts_url",
    "c_documentationLink",
    "c_isAggregate",
    "c_isCube",
    "c_isAvailable",
    "c_isTimeseries",
    "c_isMicrodata",
    "@type",
    "accessLevel",
    "distribution",
    "license",
    "references",
    "contactPoint.fn",
    "contactPoint.hasEmail",
    "publisher.@type",
    "publisher.name",
    "publisher.subOrganizationOf.@type",
    "publisher.subOrganizationOf.name",
    "publisher.subOrganizationOf.subOrganizationOf.@type",
    "publisher.subOrganizationOf.subOrganizationOf.name",
];

/// Column holding a dataset's base access URL.
pub const ACCESS_URL_COLUMN: &str = "distribution_accessURL";

/// One dataset of the catalog, flattened.
///
/// Field names have `@` removed; the first distribution is merged in under
/// `distribution_*` names.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub identifier: String,
    pub modified: Option<DateTime<Utc>>,
    fields: Map<String, Value>,
    distribution: Map<String, Value>,
}

impl CatalogEntry {
    /// Flatten one raw dataset element. `index` is only used in error messages.
    pub fn from_raw(index: usize, raw: &Value) -> Result<Self, CatalogError> {
        if !raw.is_object() {
            return Err(CatalogError::Shape(format!(
                "dataset element {} is not an object",
                index
            )));
        }
        let identifier = raw
            .get("identifier")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                CatalogError::Shape(format!("dataset element {} has no identifier", index))
            })?
            .to_string();

        let fields: Map<String, Value> = flatten(raw, "")
            .into_iter()
            .map(|(key, value)| (strip_at(&key), value))
            .collect();
        let distribution = flatten_first_distribution(raw);

        let modified = match fields.get("modified").and_then(Value::as_str) {
            Some(text) => {
                let parsed = parse_modified(text);
                if parsed.is_none() {
                    debug!("Unparseable modified '{}' for {}", text, identifier);
                }
                parsed
            }
            None => None,
        };

        Ok(Self {
            identifier,
            modified,
            fields,
            distribution,
        })
    }

    /// Look up a column by its `@`-stripped name, including `distribution_*` columns.
    pub fn field(&self, column: &str) -> Option<&Value> {
        self.fields
            .get(column)
            .or_else(|| self.distribution.get(column))
    }

    pub fn title(&self) -> Option<String> {
        coerce_text(self.field("title"))
    }

    pub fn description(&self) -> Option<String> {
        coerce_text(self.field("description"))
    }

    pub fn vintage(&self) -> Option<String> {
        coerce_vintage(self.field("c_vintage"))
    }

    /// Base URL for this dataset's detail endpoints.
    pub fn access_url(&self) -> Option<&str> {
        self.field(ACCESS_URL_COLUMN)
            .and_then(Value::as_str)
            .filter(|url| !url.trim().is_empty())
    }

    pub fn is_microdata(&self) -> bool {
        coerce_flag(self.field("c_isMicrodata"))
    }

    pub fn is_aggregate(&self) -> bool {
        coerce_flag(self.field("c_isAggregate"))
    }

    pub fn is_cube(&self) -> bool {
        coerce_flag(self.field("c_isCube"))
    }

    pub fn is_timeseries(&self) -> bool {
        coerce_flag(self.field("c_isTimeseries"))
    }

    pub fn is_available(&self) -> bool {
        coerce_flag(self.field("c_isAvailable"))
    }

    /// Flattened first distribution, keyed by `distribution_*` names.
    pub fn distribution(&self) -> &Map<String, Value> {
        &self.distribution
    }

    /// Cell value for the wide table.
    fn cell(&self, column: &str) -> Value {
        if column == "modified" {
            return self
                .modified
                .as_ref()
                .map(|dt| Value::String(format_modified(dt)))
                .unwrap_or(Value::Null);
        }
        self.field(column).cloned().unwrap_or(Value::Null)
    }
}

/// All catalog rows of one fetch, newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetTable {
    entries: Vec<CatalogEntry>,
    distribution_columns: Vec<String>,
}

impl DatasetTable {
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Column names of the wide table, in output order.
    pub fn columns(&self) -> Vec<String> {
        CATALOG_COLUMNS
            .iter()
            .map(|c| strip_at(c))
            .chain(self.distribution_columns.iter().cloned())
            .collect()
    }

    /// All rows whose identifier matches.
    pub fn find(&self, identifier: &str) -> Vec<&CatalogEntry> {
        self.entries
            .iter()
            .filter(|e| e.identifier == identifier)
            .collect()
    }

    /// Base access URL of the dataset with this identifier.
    ///
    /// The first matching row wins; duplicates are logged.
    pub fn dataset_base_url(&self, identifier: &str) -> Result<String, CatalogError> {
        let matches = self.find(identifier);
        if matches.len() > 1 {
            warn!(
                "Identifier {} matches {} catalog rows; using the first",
                identifier,
                matches.len()
            );
        }
        let entry = matches
            .first()
            .ok_or_else(|| CatalogError::NotFound(identifier.to_string()))?;
        entry.access_url().map(str::to_string).ok_or_else(|| {
            CatalogError::NotFound(format!("{} (no distribution access URL)", identifier))
        })
    }

    /// Render as a column-ordered table.
    pub fn to_table(&self) -> Table {
        let columns = self.columns();
        let mut table = Table::new(columns.clone());
        for entry in &self.entries {
            table.push_row(columns.iter().map(|c| entry.cell(c)).collect());
        }
        table
    }
}

/// Return the `dataset` list of a raw catalog document.
pub fn dataset_list(raw_catalog: &Value) -> Result<&Vec<Value>, CatalogError> {
    match raw_catalog.get("dataset") {
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(CatalogError::Shape(
            "field 'dataset' is not a list".to_string(),
        )),
        None => Err(CatalogError::Shape(
            "field 'dataset' not found in data catalog response".to_string(),
        )),
    }
}

/// Flatten every dataset of a raw catalog into one table.
///
/// Rows are sorted by `modified`, newest first; rows without a usable
/// `modified` go last. The sort is stable.
pub fn build_dataset_table(raw_catalog: &Value) -> Result<DatasetTable, CatalogError> {
    let datasets = dataset_list(raw_catalog)?;
    debug!("Elements in Census data catalog datasets attr: {}", datasets.len());

    let mut entries = Vec::with_capacity(datasets.len());
    let mut distribution_columns: Vec<String> = Vec::new();

    for (index, raw) in datasets.iter().enumerate() {
        let entry = CatalogEntry::from_raw(index, raw)?;
        for key in entry.distribution.keys() {
            if !distribution_columns.contains(key) {
                distribution_columns.push(key.clone());
            }
        }
        entries.push(entry);
    }

    entries.sort_by(|a, b| match (&a.modified, &b.modified) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    debug!(
        "Built dataset table: {} rows, {} distribution columns",
        entries.len(),
        distribution_columns.len()
    );

    Ok(DatasetTable {
        entries,
        distribution_columns,
    })
}
