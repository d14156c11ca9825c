//! WMS client facade and layer handles.

use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, instrument, warn};

use ogc_common::time::{day_ranges, TimeRange};
use ogc_common::{BoundingBox, LayerDescriptor, OgcError, OgcResult};
use ogc_protocol::request::{
    build_get_legend_graphic_url, build_get_map_url, GetLegendGraphicOptions, GetMapOptions,
};
use ogc_protocol::{CapabilitiesDocument, Service, ServiceVersion, WmsVersion};

use crate::catalog::{Catalog, Source};
use crate::config::ClientOptions;
use crate::http::{reject_exception_body, HttpFetcher};

/// A WMS endpoint or document.
///
/// Cloning is cheap; clones share one capabilities fetch.
#[derive(Clone)]
pub struct WmsClient {
    source: Arc<Source>,
}

impl WmsClient {
    /// A client for the service at `url`; capabilities are fetched on first use.
    pub fn from_url(url: &str, options: ClientOptions) -> OgcResult<Self> {
        Ok(Self {
            source: Arc::new(Source::from_url(url, options, Service::Wms)?),
        })
    }

    /// A client over an already fetched capabilities document.
    pub fn from_document(xml: impl Into<String>, options: ClientOptions) -> OgcResult<Self> {
        Ok(Self {
            source: Arc::new(Source::from_document(xml.into(), options, Service::Wms)?),
        })
    }

    pub async fn capabilities(&self) -> OgcResult<CapabilitiesDocument> {
        Ok(self.source.catalog().await?.document.clone())
    }

    pub async fn version(&self) -> OgcResult<WmsVersion> {
        wms_version(&*self.source.catalog().await?)
    }

    pub async fn layer_ids(&self) -> OgcResult<Vec<String>> {
        let catalog = self.source.catalog().await?;
        Ok(catalog.layers.iter().map(|l| l.id.clone()).collect())
    }

    /// Cleaned layer titles, aligned with [`layer_ids`](Self::layer_ids).
    pub async fn layer_names(&self) -> OgcResult<Vec<String>> {
        let catalog = self.source.catalog().await?;
        Ok(catalog.layers.iter().map(|l| l.title.clone()).collect())
    }

    /// Noon-anchored days per layer id; layers without time map to `[]`.
    pub async fn layer_days(&self) -> OgcResult<BTreeMap<String, Vec<i64>>> {
        Ok(self.source.catalog().await?.layer_days())
    }

    pub async fn layers(&self) -> OgcResult<Vec<LayerDescriptor>> {
        Ok(self.source.catalog().await?.layers.clone())
    }

    pub async fn has_layer(&self, id: &str, strict: bool) -> OgcResult<bool> {
        Ok(self.source.catalog().await?.has_layer(id, strict))
    }

    #[instrument(skip(self))]
    pub async fn layer(&self, id: &str) -> OgcResult<WmsLayer> {
        let catalog = self.source.catalog().await?;
        let descriptor = catalog.require(id)?.clone();
        debug!(layer = %descriptor.id, "Resolved layer");
        Ok(WmsLayer {
            version: wms_version(&catalog)?,
            get_map_url: self.source.operation_url(&catalog, "GetMap"),
            http: self.source.http(),
            descriptor,
        })
    }
}

fn wms_version(catalog: &Catalog) -> OgcResult<WmsVersion> {
    match catalog.document.version() {
        ServiceVersion::Wms(version) => Ok(version),
        other => Err(OgcError::UnsupportedService(format!(
            "expected WMS capabilities, found {}",
            other
        ))),
    }
}

/// One WMS layer with the endpoint needed to request it.
#[derive(Clone)]
pub struct WmsLayer {
    descriptor: LayerDescriptor,
    version: WmsVersion,
    get_map_url: Option<String>,
    http: Arc<dyn HttpFetcher>,
}

impl WmsLayer {
    pub fn descriptor(&self) -> &LayerDescriptor {
        &self.descriptor
    }

    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    pub fn version(&self) -> WmsVersion {
        self.version
    }

    /// Geographic extent as lon/lat.
    pub fn extent(&self) -> OgcResult<BoundingBox> {
        self.descriptor
            .bbox
            .ok_or_else(|| OgcError::MissingExtent(self.descriptor.id.clone()))
    }

    /// Time fragments as written in the document.
    pub fn layer_dates(&self) -> &[String] {
        &self.descriptor.raw_dates
    }

    pub fn layer_days(&self) -> &[i64] {
        &self.descriptor.available_dates
    }

    /// Available days collapsed into runs at most `step_days` apart.
    pub fn day_ranges(&self, step_days: i64) -> Vec<TimeRange> {
        day_ranges(&self.descriptor.available_dates, step_days)
    }

    fn endpoint(&self) -> OgcResult<&str> {
        self.get_map_url
            .as_deref()
            .ok_or_else(|| OgcError::OperationNotFound("GetMap".to_string()))
    }

    pub fn image_url(&self, options: &GetMapOptions) -> OgcResult<String> {
        let advertised = &self.descriptor.crs_list;
        if !advertised.is_empty() && !self.descriptor.supports_crs(&options.srs) {
            warn!(layer = %self.descriptor.id, srs = %options.srs, "SRS not advertised for layer");
        }
        build_get_map_url(self.endpoint()?, &[self.id()], options, self.version)
    }

    #[instrument(skip(self, options), fields(layer = %self.descriptor.id))]
    pub async fn image(&self, options: &GetMapOptions) -> OgcResult<Bytes> {
        let url = self.image_url(options)?;
        reject_exception_body(self.http.get_bytes(&url).await?)
    }

    /// GetLegendGraphic against the GetMap endpoint.
    pub fn legend_url(&self, options: &GetLegendGraphicOptions) -> OgcResult<String> {
        let options = GetLegendGraphicOptions {
            path: None,
            ..options.clone()
        };
        build_get_legend_graphic_url(self.endpoint()?, self.id(), &options)
    }
}

impl std::fmt::Debug for WmsLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WmsLayer")
            .field("id", &self.descriptor.id)
            .field("version", &self.version)
            .field("get_map_url", &self.get_map_url)
            .finish_non_exhaustive()
    }
}
