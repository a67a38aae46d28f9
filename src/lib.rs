//! census-catalog - Census Bureau data catalog client.
//!
//! Fetches the public catalog at `https://api.census.gov/data.json` and the
//! per-dataset detail endpoints, and reshapes the nested JSON into flat,
//! column-ordered tables.

pub mod catalog;
pub mod cli;
pub mod coerce;
pub mod config;
pub mod dataset;
pub mod http_client;
pub mod metadata;
pub mod table;

pub use catalog::{
    build_dataset_table, count_nested_labels, normalize_datetime, CatalogClient, CatalogEntry,
    CatalogError, CatalogSnapshot, DatasetTable,
};
pub use config::{load_settings, Config, LoadOptions, Settings};
pub use dataset::{
    build_geographies_table, build_groups_table, build_variables_table, DatasetSource,
    DetailFetchWarning, DetailKind, GeographyRecord, GroupRecord, VariableRecord,
};
pub use http_client::{Fetch, FetchError, HttpClient, HttpResponse};
pub use metadata::{DatasetMetadata, MetadataProjector};
pub use table::Table;
