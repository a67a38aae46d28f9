//! Catalog and dataset error types.

use thiserror::Error;

use crate::http_client::FetchError;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to get a valid catalog response; status code: {status}")]
    Fetch { status: u16 },
    #[error("Unexpected catalog shape: {0}")]
    Shape(String),
    #[error("Cannot parse timestamp '{value}' (expected {expected})")]
    Format {
        value: String,
        expected: &'static str,
    },
    #[error("Dataset not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Transport(#[from] FetchError),
    #[error("Invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),
}

impl CatalogError {
    /// HTTP status carried by a catalog fetch failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            CatalogError::Fetch { status } => Some(*status),
            _ => None,
        }
    }
}
