//! HTTP collaborator used by the catalog and dataset clients.
//!
//! Everything above this module talks to the network through the [`Fetch`]
//! trait so that the catalog logic can be exercised without a live server.

mod response;
#[cfg(test)]
pub(crate) mod stub;
mod user_agent;

pub use response::HttpResponse;
pub use user_agent::{resolve_user_agent, USER_AGENT};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::config::Settings;

/// Errors raised by the transport itself (never by a non-200 status).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Issues a GET and hands back the full response, whatever its status.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError>;
}

#[async_trait]
impl<T: Fetch + ?Sized> Fetch for Arc<T> {
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        (**self).get(url).await
    }
}

/// reqwest-backed implementation of [`Fetch`].
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    user_agent: String,
    timeout: Option<Duration>,
}

impl HttpClient {
    /// Create a client with the default user agent.
    pub fn new(timeout: Option<Duration>) -> Result<Self, FetchError> {
        Self::with_user_agent(timeout, None)
    }

    /// Create a client with a custom user agent.
    /// - None: default census-catalog user agent
    /// - Some(custom): custom user agent string
    ///
    /// No timeout is applied unless one is given.
    pub fn with_user_agent(
        timeout: Option<Duration>,
        user_agent_config: Option<&str>,
    ) -> Result<Self, FetchError> {
        let user_agent = resolve_user_agent(user_agent_config);
        let mut builder = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .brotli(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            user_agent,
            timeout,
        })
    }

    /// Build a client from runtime settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, FetchError> {
        Self::with_user_agent(
            settings.request_timeout.map(Duration::from_secs),
            settings.user_agent.as_deref(),
        )
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[async_trait]
impl Fetch for HttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        debug!("GET {}", url);

        let start = Instant::now();
        let response = self.client.get(url).send().await?;
        let status = response.status();

        let mut headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(name.to_string(), v.to_string());
            }
        }

        let body = response.text().await?;
        debug!(
            "GET {} -> {} ({} bytes, {}ms)",
            url,
            status.as_u16(),
            body.len(),
            start.elapsed().as_millis()
        );

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
