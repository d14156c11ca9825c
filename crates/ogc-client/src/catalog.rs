//! Capabilities source shared by the WMS and WCS facades.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use ogc_common::{LayerDescriptor, LayerId, OgcError, OgcResult};
use ogc_protocol::request::build_get_capabilities_url;
use ogc_protocol::{CapabilitiesDocument, Service};

use crate::cache::SingleFlight;
use crate::config::ClientOptions;
use crate::http::HttpFetcher;

/// A parsed document with its layers indexed once.
pub(crate) struct Catalog {
    pub document: CapabilitiesDocument,
    pub layers: Vec<LayerDescriptor>,
}

impl Catalog {
    pub fn new(document: CapabilitiesDocument) -> Self {
        let layers = document.layers();
        info!(
            service = %document.service(),
            version = document.version().as_str(),
            layers = layers.len(),
            "Loaded capabilities"
        );
        Self { document, layers }
    }

    /// Exact id first, then a bare short name against namespaced ids.
    pub fn find(&self, id: &str) -> Option<&LayerDescriptor> {
        self.layers.iter().find(|l| l.id == id).or_else(|| {
            self.layers
                .iter()
                .find(|l| LayerId::new(l.id.as_str()).matches(id, false))
        })
    }

    pub fn require(&self, id: &str) -> OgcResult<&LayerDescriptor> {
        self.find(id)
            .ok_or_else(|| OgcError::LayerNotFound(id.to_string()))
    }

    pub fn has_layer(&self, id: &str, strict: bool) -> bool {
        self.layers
            .iter()
            .any(|l| LayerId::new(l.id.as_str()).matches(id, strict))
    }

    pub fn layer_days(&self) -> BTreeMap<String, Vec<i64>> {
        self.layers
            .iter()
            .map(|l| (l.id.clone(), l.available_dates.clone()))
            .collect()
    }
}

/// Where a client's capabilities come from, and the cached result.
pub(crate) struct Source {
    service: Service,
    /// Endpoint the client was built from; used when the document does not
    /// advertise an operation URL.
    endpoint: Option<String>,
    capabilities_url: Option<String>,
    options: ClientOptions,
    catalog: SingleFlight<Catalog>,
}

impl Source {
    pub fn from_url(url: &str, options: ClientOptions, service: Service) -> OgcResult<Self> {
        options.check_service(service)?;
        let capabilities_url =
            build_get_capabilities_url(url, Some(service.as_str()), options.version.as_deref())?;
        debug!(url = %capabilities_url, "Capabilities request");
        Ok(Self {
            service,
            endpoint: Some(url.trim().to_string()),
            capabilities_url: Some(capabilities_url),
            options,
            catalog: SingleFlight::new(),
        })
    }

    pub fn from_document(xml: String, options: ClientOptions, service: Service) -> OgcResult<Self> {
        options.check_service(service)?;
        let document =
            CapabilitiesDocument::with_overrides(xml, Some(service), options.version.as_deref())?;
        Ok(Self {
            service,
            endpoint: None,
            capabilities_url: None,
            catalog: SingleFlight::ready(Catalog::new(document)),
            options,
        })
    }

    pub fn http(&self) -> Arc<dyn HttpFetcher> {
        Arc::clone(&self.options.http)
    }

    /// The catalog, fetching the document on first use.
    pub async fn catalog(&self) -> OgcResult<Arc<Catalog>> {
        let http = self.http();
        let url = self.capabilities_url.clone();
        let service = self.service;
        let version = self.options.version.clone();
        self.catalog
            .get_or_fetch(move || fetch_catalog(http, url, service, version))
            .await
    }

    /// Advertised URL of `operation`, else the endpoint the client was built from.
    pub fn operation_url(&self, catalog: &Catalog, operation: &str) -> Option<String> {
        catalog
            .document
            .operation_url(operation)
            .or_else(|| self.endpoint.clone())
    }
}

#[instrument(skip(http, version))]
async fn fetch_catalog(
    http: Arc<dyn HttpFetcher>,
    url: Option<String>,
    service: Service,
    version: Option<String>,
) -> OgcResult<Catalog> {
    let url = url.ok_or_else(|| {
        OgcError::MalformedCapabilities("client has neither a document nor an endpoint".to_string())
    })?;
    info!("Fetching capabilities");
    let xml = http.get_text(&url).await?;
    let document = CapabilitiesDocument::with_overrides(xml, Some(service), version.as_deref())?;
    Ok(Catalog::new(document))
}
