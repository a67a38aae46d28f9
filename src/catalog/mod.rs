//! Census data catalog client.
//!
//! Fetches `data.json`, flattens every dataset record into a wide table and
//! answers lookups against it. A fetch either yields a complete
//! [`CatalogSnapshot`] or an error; there is no partial catalog.

mod datetime;
mod entry;
mod error;
mod flatten;
mod labels;

pub use datetime::{
    format_time_of_check, normalize_datetime, parse_modified, TimestampInput, CANONICAL_FORMAT,
};
pub use entry::{
    build_dataset_table, dataset_list, CatalogEntry, DatasetTable, ACCESS_URL_COLUMN,
    CATALOG_COLUMNS,
};
pub use error::CatalogError;
pub use flatten::{flatten, flatten_first_distribution, strip_at};
pub use labels::count_nested_labels;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::{Settings, DEFAULT_CATALOG_URL, DEFAULT_MEDIA_TYPE};
use crate::dataset::DatasetSource;
use crate::http_client::{Fetch, FetchError, HttpClient};
use crate::metadata::{DatasetMetadata, MetadataProjector};

/// Client for the top-level catalog document.
pub struct CatalogClient<F = HttpClient> {
    fetcher: F,
    catalog_url: String,
    media_type: String,
}

impl CatalogClient<HttpClient> {
    /// Create a client for the configured catalog using a reqwest transport.
    pub fn from_settings(settings: &Settings) -> Result<Self, FetchError> {
        let fetcher = HttpClient::from_settings(settings)?;
        Ok(Self::with_url(fetcher, &settings.catalog_url).with_media_type(&settings.media_type))
    }
}

impl<F: Fetch> CatalogClient<F> {
    /// Create a client for the public Census catalog.
    pub fn new(fetcher: F) -> Self {
        Self::with_url(fetcher, DEFAULT_CATALOG_URL)
    }

    /// Create a client for a catalog at a custom URL.
    pub fn with_url(fetcher: F, catalog_url: &str) -> Self {
        Self {
            fetcher,
            catalog_url: catalog_url.to_string(),
            media_type: DEFAULT_MEDIA_TYPE.to_string(),
        }
    }

    /// Set the default media type for dataset sources created by this client.
    pub fn with_media_type(mut self, media_type: &str) -> Self {
        self.media_type = media_type.to_string();
        self
    }

    pub fn catalog_url(&self) -> &str {
        &self.catalog_url
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetch and parse the raw catalog document.
    ///
    /// Fails with [`CatalogError::Fetch`] on any status other than 200 and
    /// with [`CatalogError::Shape`] when the document has no `dataset` list.
    pub async fn fetch_catalog(&self) -> Result<Value, CatalogError> {
        debug!("Fetching catalog from {}", self.catalog_url);
        let response = self.fetcher.get(&self.catalog_url).await?;

        if !response.is_ok() {
            return Err(CatalogError::Fetch {
                status: response.status.as_u16(),
            });
        }

        let raw = response.json()?;
        dataset_list(&raw)?;
        Ok(raw)
    }

    /// Fetch the catalog and build its table, stamped with the capture time.
    pub async fn snapshot(&self) -> Result<CatalogSnapshot, CatalogError> {
        let raw = self.fetch_catalog().await?;
        let table = build_dataset_table(&raw)?;
        info!("Catalog snapshot: {} datasets", table.len());
        Ok(CatalogSnapshot {
            raw,
            table,
            time_of_check: Utc::now(),
        })
    }
}

impl<F: Fetch + Clone> CatalogClient<F> {
    /// Create a [`DatasetSource`] for a dataset in `snapshot`.
    ///
    /// `media_type` defaults to the client's media type.
    pub fn dataset_source(
        &self,
        snapshot: &CatalogSnapshot,
        identifier: &str,
        media_type: Option<&str>,
    ) -> Result<DatasetSource<F>, CatalogError> {
        let base_url = snapshot.dataset_base_url(identifier)?;
        Ok(DatasetSource::with_media_type(
            &base_url,
            media_type.unwrap_or(&self.media_type),
            self.fetcher.clone(),
        ))
    }
}

/// The catalog as of one fetch. Immutable; refetch to refresh.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    raw: Value,
    table: DatasetTable,
    time_of_check: DateTime<Utc>,
}

impl CatalogSnapshot {
    /// Build a snapshot from an already-fetched catalog document.
    pub fn from_raw(raw: Value, time_of_check: DateTime<Utc>) -> Result<Self, CatalogError> {
        let table = build_dataset_table(&raw)?;
        Ok(Self {
            raw,
            table,
            time_of_check,
        })
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn table(&self) -> &DatasetTable {
        &self.table
    }

    pub fn time_of_check(&self) -> DateTime<Utc> {
        self.time_of_check
    }

    pub fn count_nested_labels(&self, key: &str) -> Result<Vec<(String, usize)>, CatalogError> {
        count_nested_labels(&self.raw, key)
    }

    pub fn dataset_base_url(&self, identifier: &str) -> Result<String, CatalogError> {
        self.table.dataset_base_url(identifier)
    }

    /// Project every row into the stable metadata schema.
    pub fn metadata(&self) -> Vec<DatasetMetadata> {
        MetadataProjector::new(self.time_of_check).project(&self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::stub::StubFetcher;
    use serde_json::json;
    use std::sync::Arc;

    const URL: &str = "https://api.census.gov/data.json";

    fn raw_catalog() -> Value {
        json!({
            "@context": "https://project-open-data.cio.gov/v1.1/schema/catalog.jsonld",
            "dataset": [
                {
                    "identifier": "https://api.census.gov/data/id/DECENNIALPL2020",
                    "title": "Decennial Census: Redistricting Data",
                    "modified": "2021-08-12 00:00:00.0",
                    "c_vintage": 2020,
                    "keyword": ["census"],
                    "distribution": [{"accessURL": "https://api.census.gov/data/2020/dec/pl"}]
                },
                {
                    "identifier": "https://api.census.gov/data/id/ACSDT1Y2019",
                    "title": "ACS 1-Year Detailed Tables",
                    "modified": "2020-09-17 00:00:00.0",
                    "distribution": [{"accessURL": "https://api.census.gov/data/2019/acs/acs1"}]
                }
            ]
        })
    }

    #[tokio::test]
    async fn test_fetch_catalog_ok() {
        let stub = StubFetcher::new().with_json(URL, raw_catalog());
        let client = CatalogClient::new(stub);
        let raw = client.fetch_catalog().await.unwrap();
        assert_eq!(raw["dataset"].as_array().unwrap().len(), 2);
        assert_eq!(client.fetcher().requests(), vec![URL.to_string()]);
    }

    #[tokio::test]
    async fn test_fetch_catalog_server_error() {
        let stub = StubFetcher::new().with_status(URL, 500, "boom");
        let client = CatalogClient::new(stub);
        let err = client.snapshot().await.unwrap_err();
        assert!(matches!(err, CatalogError::Fetch { status: 500 }));
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_fetch_catalog_missing_dataset() {
        let stub = StubFetcher::new().with_json(URL, json!({"conformsTo": "x"}));
        let err = CatalogClient::new(stub).fetch_catalog().await.unwrap_err();
        assert!(matches!(err, CatalogError::Shape(_)));
    }

    #[tokio::test]
    async fn test_fetch_catalog_transport_error() {
        let stub = StubFetcher::new().with_transport_error(URL, "connection refused");
        let err = CatalogClient::new(stub).fetch_catalog().await.unwrap_err();
        assert!(matches!(err, CatalogError::Transport(_)));
    }

    #[tokio::test]
    async fn test_snapshot_and_dataset_source() {
        let stub = Arc::new(StubFetcher::new().with_json(URL, raw_catalog()));
        let client = CatalogClient::new(stub);
        let snapshot = client.snapshot().await.unwrap();

        assert_eq!(snapshot.table().len(), 2);
        assert_eq!(
            snapshot.table().entries()[0].identifier,
            "https://api.census.gov/data/id/DECENNIALPL2020"
        );

        let source = client
            .dataset_source(&snapshot, "https://api.census.gov/data/id/ACSDT1Y2019", None)
            .unwrap();
        assert_eq!(source.base_url(), "https://api.census.gov/data/2019/acs/acs1");
        assert_eq!(source.media_type(), "json");

        assert!(matches!(
            client.dataset_source(&snapshot, "missing", Some("html")),
            Err(CatalogError::NotFound(_))
        ));
    }

    #[test]
    fn test_snapshot_from_raw_metadata() {
        let snapshot = CatalogSnapshot::from_raw(raw_catalog(), Utc::now()).unwrap();
        let metadata = snapshot.metadata();
        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata[0].vintage.as_deref(), Some("2020"));
        assert_eq!(metadata[1].vintage, None);

        let counts = snapshot.count_nested_labels("keyword").unwrap();
        assert_eq!(counts, vec![("census".to_string(), 1)]);
    }
}
