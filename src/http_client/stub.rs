//! In-memory [`Fetch`] implementation for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use super::{Fetch, FetchError, HttpResponse};

/// Serves canned responses by exact URL; anything else is a 404.
#[derive(Default)]
pub struct StubFetcher {
    responses: Mutex<HashMap<String, Result<(u16, String), String>>>,
    requests: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(self, url: &str, body: Value) -> Self {
        self.with_status(url, 200, &body.to_string())
    }

    pub fn with_status(self, url: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Ok((status, body.to_string())));
        self
    }

    pub fn with_transport_error(self, url: &str, message: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Err(message.to_string()));
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetch for StubFetcher {
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        let canned = self.responses.lock().unwrap().get(url).cloned();
        match canned {
            Some(Ok((status, body))) => Ok(HttpResponse::new(
                StatusCode::from_u16(status).unwrap(),
                body,
            )),
            Some(Err(message)) => Err(FetchError::Transport(message)),
            None => Ok(HttpResponse::new(StatusCode::NOT_FOUND, "Not Found")),
        }
    }
}
