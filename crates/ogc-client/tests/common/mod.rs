//! Mock HTTP fetcher for client tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use ogc_client::{ClientOptions, HttpFetcher};
use ogc_common::{OgcError, OgcResult};

/// Answers GET requests from a route table and records every URL.
///
/// A route matches when its key is contained in the requested URL; the first
/// match wins. Unmatched URLs get a 404.
pub struct MockFetcher {
    routes: Vec<(String, OgcResult<Bytes>)>,
    requests: Mutex<Vec<String>>,
    delay: Duration,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            requests: Mutex::new(Vec::new()),
            delay: Duration::from_millis(10),
        }
    }

    pub fn route(mut self, key: &str, body: &str) -> Self {
        self.routes
            .push((key.to_string(), Ok(Bytes::from(body.to_string()))));
        self
    }

    pub fn route_bytes(mut self, key: &str, body: &'static [u8]) -> Self {
        self.routes.push((key.to_string(), Ok(Bytes::from_static(body))));
        self
    }

    pub fn fail(mut self, key: &str, err: OgcError) -> Self {
        self.routes.push((key.to_string(), Err(err)));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, key: &str) -> usize {
        self.requests().iter().filter(|url| url.contains(key)).count()
    }
}

#[async_trait]
impl HttpFetcher for MockFetcher {
    async fn get_text(&self, url: &str) -> OgcResult<String> {
        let body = self.get_bytes(url).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    async fn get_bytes(&self, url: &str) -> OgcResult<Bytes> {
        self.requests.lock().unwrap().push(url.to_string());
        tokio::time::sleep(self.delay).await;
        self.routes
            .iter()
            .find(|(key, _)| url.contains(key.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| {
                Err(OgcError::HttpStatus {
                    url: url.to_string(),
                    status: 404,
                })
            })
    }
}

pub fn options(fetcher: &Arc<MockFetcher>) -> ClientOptions {
    ClientOptions::new(fetcher.clone())
}
