//! HTTP seam used for capabilities, image and coverage fetches.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Response};
use tracing::{debug, instrument, warn};

use ogc_common::{OgcError, OgcResult};
use ogc_protocol::ows::find_exception;

use crate::config::ClientConfig;

/// Fetches documents and binary bodies over HTTP GET.
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// Fetch `url` and return the body as text.
    async fn get_text(&self, url: &str) -> OgcResult<String>;

    /// Fetch `url` and return the raw body.
    async fn get_bytes(&self, url: &str) -> OgcResult<Bytes>;
}

/// [`HttpFetcher`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    /// Build a client with the user agent and timeouts of `config`.
    ///
    /// Timeouts are only applied when configured.
    pub fn new(config: &ClientConfig) -> OgcResult<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| OgcError::Network {
            url: String::new(),
            message: format!("Failed to create HTTP client: {}", e),
        })?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn send(&self, url: &str) -> OgcResult<Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| network_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "Request failed");
            return Err(OgcError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

fn network_error(url: &str, e: reqwest::Error) -> OgcError {
    OgcError::Network {
        url: url.to_string(),
        message: e.to_string(),
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    #[instrument(skip(self))]
    async fn get_text(&self, url: &str) -> OgcResult<String> {
        let text = self
            .send(url)
            .await?
            .text()
            .await
            .map_err(|e| network_error(url, e))?;
        debug!(size = text.len(), "Fetched document");
        Ok(text)
    }

    #[instrument(skip(self))]
    async fn get_bytes(&self, url: &str) -> OgcResult<Bytes> {
        let bytes = self
            .send(url)
            .await?
            .bytes()
            .await
            .map_err(|e| network_error(url, e))?;
        debug!(size = bytes.len(), "Fetched body");
        Ok(bytes)
    }
}

/// Servers answer a failed GetMap or GetCoverage with status 200 and an
/// exception report; turn such a body into [`OgcError::ServiceException`].
pub fn reject_exception_body(body: Bytes) -> OgcResult<Bytes> {
    let head = &body[..body.len().min(512)];
    let looks_like_xml = head
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| *b == b'<');
    if !looks_like_xml {
        return Ok(body);
    }

    match std::str::from_utf8(&body).ok().and_then(find_exception) {
        Some(message) => Err(OgcError::ServiceException(message)),
        None => Ok(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_body_passes() {
        let png = Bytes::from_static(b"\x89PNG\r\n\x1a\n");
        assert_eq!(reject_exception_body(png.clone()).unwrap(), png);
    }

    #[test]
    fn test_exception_body_rejected() {
        let body = Bytes::from_static(
            b"  <ServiceExceptionReport><ServiceException>Bad layer</ServiceException></ServiceExceptionReport>",
        );
        assert_eq!(
            reject_exception_body(body),
            Err(OgcError::ServiceException("Bad layer".to_string()))
        );
    }

    #[test]
    fn test_xml_coverage_passes() {
        let body = Bytes::from_static(b"<gml:RectifiedGridCoverage/>");
        assert!(reject_exception_body(body).is_ok());
    }

    #[test]
    fn test_fetcher_from_config() {
        let config = ClientConfig::default()
            .with_connect_timeout(std::time::Duration::from_secs(5));
        assert!(ReqwestFetcher::new(&config).is_ok());
    }
}
