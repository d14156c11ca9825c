//! Client configuration.
//!
//! Environment variables read by [`ClientConfig::from_env`]:
//!
//! | Variable | Meaning |
//! |---|---|
//! | `OGC_SERVICE` | Force the service (`WMS` / `WCS`) instead of detecting it |
//! | `OGC_VERSION` | Force the protocol version instead of detecting it |
//! | `OGC_USER_AGENT` | `User-Agent` header of capabilities and image requests |
//! | `OGC_CONNECT_TIMEOUT_SECS` | TCP connect timeout (unset: none) |
//! | `OGC_REQUEST_TIMEOUT_SECS` | Whole-request timeout (unset: none) |

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use ogc_common::{OgcError, OgcResult};
use ogc_protocol::Service;

use crate::http::{HttpFetcher, ReqwestFetcher};

const DEFAULT_USER_AGENT: &str = concat!("ogc-client/", env!("CARGO_PKG_VERSION"));

/// Settings shared by every client built from them.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Service override; `None` detects it from the document
    pub service: Option<Service>,
    /// Version override; `None` detects it from the document
    pub version: Option<String>,
    pub user_agent: String,
    pub connect_timeout: Option<Duration>,
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            service: None,
            version: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout: None,
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`; unparseable values are logged
    /// and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(service) = non_empty("OGC_SERVICE") {
            match service.parse::<Service>() {
                Ok(service) => config.service = Some(service),
                Err(e) => warn!(value = %service, error = %e, "Ignoring OGC_SERVICE"),
            }
        }
        config.version = non_empty("OGC_VERSION").map(|v| v.trim().to_string());
        if let Some(user_agent) = non_empty("OGC_USER_AGENT") {
            config.user_agent = user_agent;
        }
        config.connect_timeout = seconds(non_empty("OGC_CONNECT_TIMEOUT_SECS"), "OGC_CONNECT_TIMEOUT_SECS");
        config.request_timeout = seconds(non_empty("OGC_REQUEST_TIMEOUT_SECS"), "OGC_REQUEST_TIMEOUT_SECS");
        config
    }

    pub fn with_service(mut self, service: Service) -> Self {
        self.service = Some(service);
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

fn seconds(value: Option<String>, key: &str) -> Option<Duration> {
    let value = value?;
    match value.trim().parse::<u64>() {
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(_) => {
            warn!(key = key, value = %value, "Ignoring non-numeric timeout");
            None
        }
    }
}

/// What a client is constructed with: the HTTP seam plus overrides.
#[derive(Clone)]
pub struct ClientOptions {
    pub http: Arc<dyn HttpFetcher>,
    pub service: Option<Service>,
    pub version: Option<String>,
}

impl ClientOptions {
    pub fn new(http: Arc<dyn HttpFetcher>) -> Self {
        Self {
            http,
            service: None,
            version: None,
        }
    }

    /// Options with a [`ReqwestFetcher`] built from `config`.
    pub fn from_config(config: &ClientConfig) -> OgcResult<Self> {
        Ok(Self {
            http: Arc::new(ReqwestFetcher::new(config)?),
            service: config.service,
            version: config.version.clone(),
        })
    }

    pub fn with_service(mut self, service: Service) -> Self {
        self.service = Some(service);
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Fail when the options force a service other than `expected`.
    pub(crate) fn check_service(&self, expected: Service) -> OgcResult<()> {
        match self.service {
            Some(service) if service != expected => Err(OgcError::UnsupportedService(format!(
                "{} client cannot read {} capabilities",
                expected, service
            ))),
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("service", &self.service)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}
