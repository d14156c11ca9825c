//! WCS client facade and coverage handles.

use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, instrument};

use ogc_common::time::{day_ranges, TimeRange};
use ogc_common::{BoundingBox, LayerDescriptor, OgcError, OgcResult};
use ogc_protocol::ows::find_exception;
use ogc_protocol::request::{build_describe_coverage_url, build_get_coverage_url, GetCoverageOptions};
use ogc_protocol::{wcs, CapabilitiesDocument, Service, ServiceVersion, WcsVersion};

use crate::catalog::{Catalog, Source};
use crate::config::ClientOptions;
use crate::http::{reject_exception_body, HttpFetcher};

/// A WCS endpoint or document.
///
/// Cloning is cheap; clones share one capabilities fetch.
#[derive(Clone)]
pub struct WcsClient {
    source: Arc<Source>,
}

impl WcsClient {
    /// A client for the service at `url`; capabilities are fetched on first use.
    pub fn from_url(url: &str, options: ClientOptions) -> OgcResult<Self> {
        Ok(Self {
            source: Arc::new(Source::from_url(url, options, Service::Wcs)?),
        })
    }

    /// A client over an already fetched capabilities document.
    pub fn from_document(xml: impl Into<String>, options: ClientOptions) -> OgcResult<Self> {
        Ok(Self {
            source: Arc::new(Source::from_document(xml.into(), options, Service::Wcs)?),
        })
    }

    pub async fn capabilities(&self) -> OgcResult<CapabilitiesDocument> {
        Ok(self.source.catalog().await?.document.clone())
    }

    pub async fn version(&self) -> OgcResult<WcsVersion> {
        wcs_version(&*self.source.catalog().await?)
    }

    pub async fn layer_ids(&self) -> OgcResult<Vec<String>> {
        let catalog = self.source.catalog().await?;
        Ok(catalog.layers.iter().map(|l| l.id.clone()).collect())
    }

    pub async fn layer_names(&self) -> OgcResult<Vec<String>> {
        let catalog = self.source.catalog().await?;
        Ok(catalog.layers.iter().map(|l| l.title.clone()).collect())
    }

    /// Noon-anchored days per coverage id; time-invariant coverages map to `[]`.
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
    pub async fn layer(&self, id: &str) -> OgcResult<WcsLayer> {
        let catalog = self.source.catalog().await?;
        let descriptor = catalog.require(id)?.clone();
        debug!(coverage = %descriptor.id, "Resolved coverage");
        Ok(WcsLayer {
            version: wcs_version(&catalog)?,
            get_coverage_url: self.source.operation_url(&catalog, "GetCoverage"),
            describe_coverage_url: self.source.operation_url(&catalog, "DescribeCoverage"),
            http: self.source.http(),
            descriptor,
        })
    }
}

fn wcs_version(catalog: &Catalog) -> OgcResult<WcsVersion> {
    match catalog.document.version() {
        ServiceVersion::Wcs(version) => Ok(version),
        other => Err(OgcError::UnsupportedService(format!(
            "expected WCS capabilities, found {}",
            other
        ))),
    }
}

/// What a `DescribeCoverage` response adds to the capabilities summary.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageDescription {
    /// Time positions as written in the description
    pub dates: Vec<String>,
    /// Noon-anchored days, ascending and unique
    pub days: Vec<i64>,
    pub formats: Vec<String>,
}

/// One coverage with the endpoints needed to request it.
#[derive(Clone)]
pub struct WcsLayer {
    descriptor: LayerDescriptor,
    version: WcsVersion,
    get_coverage_url: Option<String>,
    describe_coverage_url: Option<String>,
    http: Arc<dyn HttpFetcher>,
}

impl WcsLayer {
    pub fn descriptor(&self) -> &LayerDescriptor {
        &self.descriptor
    }

    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    pub fn version(&self) -> WcsVersion {
        self.version
    }

    /// Geographic extent as lon/lat.
    pub fn extent(&self) -> OgcResult<BoundingBox> {
        self.descriptor
            .bbox
            .ok_or_else(|| OgcError::MissingExtent(self.descriptor.id.clone()))
    }

    pub fn layer_dates(&self) -> &[String] {
        &self.descriptor.raw_dates
    }

    pub fn layer_days(&self) -> &[i64] {
        &self.descriptor.available_dates
    }

    pub fn day_ranges(&self, step_days: i64) -> Vec<TimeRange> {
        day_ranges(&self.descriptor.available_dates, step_days)
    }

    /// GetCoverage URL; without a bbox in `options` the coverage extent is used.
    pub fn image_url(&self, options: &GetCoverageOptions) -> OgcResult<String> {
        let base = self
            .get_coverage_url
            .as_deref()
            .ok_or_else(|| OgcError::OperationNotFound("GetCoverage".to_string()))?;

        match options.bbox {
            Some(_) => build_get_coverage_url(base, self.id(), options),
            None => {
                let options = GetCoverageOptions {
                    bbox: Some(self.extent()?),
                    ..options.clone()
                };
                build_get_coverage_url(base, self.id(), &options)
            }
        }
    }

    #[instrument(skip(self, options), fields(coverage = %self.descriptor.id))]
    pub async fn image(&self, options: &GetCoverageOptions) -> OgcResult<Bytes> {
        let url = self.image_url(options)?;
        reject_exception_body(self.http.get_bytes(&url).await?)
    }

    pub fn describe_coverage_url(&self) -> OgcResult<String> {
        let base = self
            .describe_coverage_url
            .as_deref()
            .ok_or_else(|| OgcError::OperationNotFound("DescribeCoverage".to_string()))?;
        build_describe_coverage_url(base, self.id(), self.version)
    }

    /// Fetch and read the coverage's `DescribeCoverage` document.
    #[instrument(skip(self), fields(coverage = %self.descriptor.id))]
    pub async fn describe(&self) -> OgcResult<CoverageDescription> {
        let url = self.describe_coverage_url()?;
        let xml = self.http.get_text(&url).await?;
        if let Some(message) = find_exception(&xml) {
            return Err(OgcError::ServiceException(message));
        }

        let description = CoverageDescription {
            dates: wcs::parse_description_dates(&xml),
            days: wcs::parse_description_days(&xml),
            formats: wcs::parse_supported_formats(&xml),
        };
        info!(
            days = description.days.len(),
            formats = description.formats.len(),
            "Described coverage"
        );
        Ok(description)
    }
}

impl std::fmt::Debug for WcsLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WcsLayer")
            .field("id", &self.descriptor.id)
            .field("version", &self.version)
            .field("get_coverage_url", &self.get_coverage_url)
            .finish_non_exhaustive()
    }
}
