//! Per-dataset detail endpoints.
//!
//! A [`DatasetSource`] knows a dataset's base access URL and builds the
//! well-known detail URLs under it. Detail fetches are best-effort: a non-200
//! status is logged and yields `None` instead of an error, so one broken
//! endpoint never aborts a wider metadata run.

mod geography;
mod groups;
mod variables;

pub use geography::{build_geographies_table, GeographyRecord};
pub use groups::{build_groups_table, GroupRecord};
pub use variables::{build_variables_table, VariableRecord};

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::CatalogError;
use crate::coerce::{coerce_labels, coerce_text};
use crate::config::DEFAULT_MEDIA_TYPE;
use crate::http_client::{Fetch, HttpClient};

/// Detail endpoints exposed under a dataset's base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum DetailKind {
    Variables,
    Examples,
    Sorts,
    Geography,
    Tags,
    Groups,
}

impl DetailKind {
    pub const ALL: [DetailKind; 6] = [
        DetailKind::Variables,
        DetailKind::Examples,
        DetailKind::Sorts,
        DetailKind::Geography,
        DetailKind::Tags,
        DetailKind::Groups,
    ];

    /// Path segment used in the endpoint URL.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Variables => "variables",
            Self::Examples => "examples",
            Self::Sorts => "sorts",
            Self::Geography => "geography",
            Self::Tags => "tags",
            Self::Groups => "groups",
        }
    }
}

impl fmt::Display for DetailKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetailKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "variables" => Ok(Self::Variables),
            "examples" => Ok(Self::Examples),
            "sorts" => Ok(Self::Sorts),
            "geography" | "geographies" => Ok(Self::Geography),
            "tags" => Ok(Self::Tags),
            "groups" => Ok(Self::Groups),
            other => Err(format!("Unknown detail endpoint: {}", other)),
        }
    }
}

/// A detail endpoint answered with something other than 200.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to get a valid response from {url}; status code: {status}")]
pub struct DetailFetchWarning {
    pub url: String,
    pub status: u16,
}

/// Rewrite a trailing `.html` to `.json`; other URLs are returned unchanged.
pub fn normalize_detail_url(url: &str) -> String {
    match url.strip_suffix(".html") {
        Some(stem) => format!("{}.json", stem),
        None => url.to_string(),
    }
}

/// Detail endpoints of one dataset. Nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct DatasetSource<F = HttpClient> {
    base_url: String,
    media_type: String,
    fetcher: F,
}

impl<F: Fetch> DatasetSource<F> {
    /// Create a source that requests JSON.
    pub fn new(base_url: &str, fetcher: F) -> Self {
        Self::with_media_type(base_url, DEFAULT_MEDIA_TYPE, fetcher)
    }

    /// Create a source with an explicit media type (e.g. "html").
    pub fn with_media_type(base_url: &str, media_type: &str, fetcher: F) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            media_type: media_type.to_string(),
            fetcher,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// `{base_url}/{kind}.{media_type}`
    pub fn detail_url(&self, kind: DetailKind) -> String {
        format!("{}/{}.{}", self.base_url, kind.as_str(), self.media_type)
    }

    pub fn variables_url(&self) -> String {
        self.detail_url(DetailKind::Variables)
    }

    pub fn examples_url(&self) -> String {
        self.detail_url(DetailKind::Examples)
    }

    pub fn sorts_url(&self) -> String {
        self.detail_url(DetailKind::Sorts)
    }

    pub fn geographies_url(&self) -> String {
        self.detail_url(DetailKind::Geography)
    }

    pub fn tags_url(&self) -> String {
        self.detail_url(DetailKind::Tags)
    }

    pub fn groups_url(&self) -> String {
        self.detail_url(DetailKind::Groups)
    }

    /// GET a detail URL (`.html` is requested as `.json`).
    ///
    /// Returns `Ok(None)` and logs a [`DetailFetchWarning`] when the status is
    /// not 200. Transport failures and undecodable bodies are still errors.
    pub async fn fetch_detail(&self, url: &str) -> Result<Option<Value>, CatalogError> {
        let url = normalize_detail_url(url);
        let response = self.fetcher.get(&url).await?;

        if !response.is_ok() {
            let warning = DetailFetchWarning {
                url,
                status: response.status.as_u16(),
            };
            warn!("{}", warning);
            return Ok(None);
        }

        debug!(
            "Fetched detail {} ({})",
            url,
            response.content_type().unwrap_or("no content type")
        );
        let json = response.json()?;
        Ok(Some(json))
    }

    /// Raw document of one detail endpoint.
    pub async fn detail(&self, kind: DetailKind) -> Result<Option<Value>, CatalogError> {
        self.fetch_detail(&self.detail_url(kind)).await
    }

    /// Fetch and flatten the variables endpoint.
    pub async fn variables(&self) -> Result<Option<Vec<VariableRecord>>, CatalogError> {
        match self.detail(DetailKind::Variables).await? {
            Some(json) => build_variables_table(&json).map(Some),
            None => Ok(None),
        }
    }

    /// Fetch and flatten the geography endpoint.
    pub async fn geographies(&self) -> Result<Option<Vec<GeographyRecord>>, CatalogError> {
        match self.detail(DetailKind::Geography).await? {
            Some(json) => build_geographies_table(&json).map(Some),
            None => Ok(None),
        }
    }

    /// Fetch and flatten the groups endpoint.
    pub async fn groups(&self) -> Result<Option<Vec<GroupRecord>>, CatalogError> {
        match self.detail(DetailKind::Groups).await? {
            Some(json) => build_groups_table(&json).map(Some),
            None => Ok(None),
        }
    }
}

/// Pull a required top-level field out of a detail document.
pub(crate) fn detail_field<'a>(detail: &'a Value, field: &str) -> Result<&'a Value, CatalogError> {
    detail
        .get(field)
        .ok_or_else(|| CatalogError::Shape(format!("detail response has no '{}' field", field)))
}

/// One entry of a detail list as a mapping. A bare scalar lands under `value`.
pub(crate) fn entry_fields(raw: &Value) -> Map<String, Value> {
    match raw {
        Value::Object(map) => map.clone(),
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other.clone());
            map
        }
    }
}

/// Remove `key` and return its text form. A value with no text form stays in `fields`.
pub(crate) fn take_text(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    let value = fields.get(key)?;
    let text = coerce_text(Some(value));
    if text.is_some() || value.is_null() {
        fields.shift_remove(key);
    }
    text
}

/// Remove `key` and return it as a label list. Objects stay in `fields`.
pub(crate) fn take_labels(fields: &mut Map<String, Value>, key: &str) -> Vec<String> {
    match fields.get(key) {
        None | Some(Value::Object(_)) => Vec::new(),
        Some(value) => {
            let labels = coerce_labels(Some(value));
            fields.shift_remove(key);
            labels
        }
    }
}
