//! Capabilities documents: service and version detection, reader dispatch.
//!
//! Versions form a closed set per service. A document is classified once,
//! from its root element, and every later lookup dispatches on that
//! classification instead of sniffing tags again.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use ogc_common::{LayerDescriptor, OgcError, OgcResult};

use crate::xml::{get_attribute, local_name, root_element};
use crate::{ows, wcs, wms};

/// OGC service type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Service {
    Wms,
    Wcs,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Wms => "WMS",
            Service::Wcs => "WCS",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = OgcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "WMS" | "OGC:WMS" => Ok(Service::Wms),
            "WCS" | "OGC:WCS" => Ok(Service::Wcs),
            other => Err(OgcError::UnsupportedService(other.to_string())),
        }
    }
}

/// Supported WMS versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WmsVersion {
    #[serde(rename = "1.1.1")]
    V1_1_1,
    #[serde(rename = "1.3.0")]
    V1_3_0,
}

impl WmsVersion {
    pub fn parse(version: &str) -> OgcResult<Self> {
        match version.trim() {
            "1.1" | "1.1.0" | "1.1.1" => Ok(WmsVersion::V1_1_1),
            "1.3" | "1.3.0" => Ok(WmsVersion::V1_3_0),
            other => Err(OgcError::UnsupportedVersion {
                service: "WMS".to_string(),
                version: other.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WmsVersion::V1_1_1 => "1.1.1",
            WmsVersion::V1_3_0 => "1.3.0",
        }
    }
}

/// Supported WCS versions. 1.1.x and 2.0.x documents are read the same way
/// as 1.1.1 and 2.0.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WcsVersion {
    #[serde(rename = "1.0.0")]
    V1_0_0,
    #[serde(rename = "1.1.1")]
    V1_1_1,
    #[serde(rename = "2.0.1")]
    V2_0_1,
}

impl WcsVersion {
    pub fn parse(version: &str) -> OgcResult<Self> {
        match version.trim() {
            "1.0" | "1.0.0" => Ok(WcsVersion::V1_0_0),
            "1.1" | "1.1.0" | "1.1.1" | "1.1.2" => Ok(WcsVersion::V1_1_1),
            "2.0" | "2.0.0" | "2.0.1" => Ok(WcsVersion::V2_0_1),
            other => Err(OgcError::UnsupportedVersion {
                service: "WCS".to_string(),
                version: other.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WcsVersion::V1_0_0 => "1.0.0",
            WcsVersion::V1_1_1 => "1.1.1",
            WcsVersion::V2_0_1 => "2.0.1",
        }
    }
}

/// A service together with one of its versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "service", content = "version")]
pub enum ServiceVersion {
    #[serde(rename = "WMS")]
    Wms(WmsVersion),
    #[serde(rename = "WCS")]
    Wcs(WcsVersion),
}

impl ServiceVersion {
    pub fn parse(service: Service, version: &str) -> OgcResult<Self> {
        match service {
            Service::Wms => WmsVersion::parse(version).map(ServiceVersion::Wms),
            Service::Wcs => WcsVersion::parse(version).map(ServiceVersion::Wcs),
        }
    }

    pub fn service(&self) -> Service {
        match self {
            ServiceVersion::Wms(_) => Service::Wms,
            ServiceVersion::Wcs(_) => Service::Wcs,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceVersion::Wms(v) => v.as_str(),
            ServiceVersion::Wcs(v) => v.as_str(),
        }
    }
}

impl fmt::Display for ServiceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.service(), self.as_str())
    }
}

/// The service a document's root element belongs to, without reading its
/// version.
///
/// Exception reports become [`OgcError::ServiceException`]; a document with no
/// root element is malformed, and any other root is an unsupported service.
pub fn detect_service(xml: &str) -> OgcResult<Service> {
    let root = root_element(xml)
        .ok_or_else(|| OgcError::MalformedCapabilities("document has no root element".to_string()))?;
    match local_name(element_name(root)) {
        "ServiceExceptionReport" | "ExceptionReport" => {
            let message = ows::find_exception(xml).unwrap_or_else(|| "unknown error".to_string());
            Err(OgcError::ServiceException(message))
        }
        "WMS_Capabilities" | "WMT_MS_Capabilities" => Ok(Service::Wms),
        "WCS_Capabilities" => Ok(Service::Wcs),
        "Capabilities" if is_wcs_root(root) => Ok(Service::Wcs),
        other => Err(OgcError::UnsupportedService(format!(
            "unrecognized root element <{}>",
            other
        ))),
    }
}

/// Classify a document from its root element.
pub fn detect(xml: &str) -> OgcResult<ServiceVersion> {
    let service = detect_service(xml)?;
    let root = root_element(xml).unwrap_or_default();
    let version = get_attribute(root, "version");

    let detected = match (service, local_name(element_name(root))) {
        (Service::Wms, "WMT_MS_Capabilities") => {
            ServiceVersion::Wms(WmsVersion::parse(version.as_deref().unwrap_or("1.1.1"))?)
        }
        (Service::Wms, _) => {
            ServiceVersion::Wms(WmsVersion::parse(version.as_deref().unwrap_or("1.3.0"))?)
        }
        (Service::Wcs, "WCS_Capabilities") => {
            ServiceVersion::Wcs(WcsVersion::parse(version.as_deref().unwrap_or("1.0.0"))?)
        }
        (Service::Wcs, _) => {
            let version = version.unwrap_or_else(|| wcs_namespace_version(root).to_string());
            ServiceVersion::Wcs(WcsVersion::parse(&version)?)
        }
    };
    debug!(service = %detected.service(), version = detected.as_str(), "Detected capabilities");
    Ok(detected)
}

fn element_name(opening: &str) -> &str {
    let body = opening.trim_start_matches('<');
    let end = body
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .unwrap_or(body.len());
    &body[..end]
}

fn is_wcs_root(root: &str) -> bool {
    element_name(root).starts_with("wcs:")
        || get_attribute(root, "xmlns").is_some_and(|ns| ns.contains("/wcs"))
}

fn wcs_namespace_version(root: &str) -> &'static str {
    let namespace = get_attribute(root, "xmlns:wcs").or_else(|| get_attribute(root, "xmlns"));
    match namespace {
        Some(ns) if ns.trim_end_matches('/').ends_with("2.0") => "2.0.1",
        Some(ns) if ns.trim_end_matches('/').ends_with("1.1") => "1.1.1",
        _ => "1.1.1",
    }
}

/// An immutable capabilities document with its detected service and version.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilitiesDocument {
    raw: Arc<str>,
    version: ServiceVersion,
}

impl CapabilitiesDocument {
    /// Parse a document, detecting service and version from its root element.
    pub fn parse(raw: impl Into<String>) -> OgcResult<Self> {
        Self::with_overrides(raw, None, None)
    }

    /// Parse a document that must belong to `service` (when given), reading
    /// it as `version` (when given) instead of the version it declares.
    ///
    /// The root element always decides the service: a document of another
    /// service is [`OgcError::UnsupportedService`], and one that is no
    /// capabilities document at all fails as in [`detect`].
    pub fn with_overrides(
        raw: impl Into<String>,
        service: Option<Service>,
        version: Option<&str>,
    ) -> OgcResult<Self> {
        let raw: Arc<str> = Arc::from(raw.into());
        let detected = detect_service(&raw)?;
        if let Some(expected) = service.filter(|expected| *expected != detected) {
            return Err(OgcError::UnsupportedService(format!(
                "expected {} capabilities, got a {} document",
                expected, detected
            )));
        }
        let version = match version {
            Some(version) => ServiceVersion::parse(detected, version)?,
            None => detect(&raw)?,
        };
        Ok(Self { raw, version })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn service(&self) -> Service {
        self.version.service()
    }

    pub fn version(&self) -> ServiceVersion {
        self.version
    }

    /// All layers (WMS) or coverages (WCS), repeated ids merged.
    pub fn layers(&self) -> Vec<LayerDescriptor> {
        match self.version {
            ServiceVersion::Wms(v) => wms::parse_layers(&self.raw, v),
            ServiceVersion::Wcs(v) => wcs::parse_coverages(&self.raw, v),
        }
    }

    /// Normalized days per layer id.
    pub fn layer_days(&self) -> BTreeMap<String, Vec<i64>> {
        self.layers()
            .into_iter()
            .map(|layer| (layer.id, layer.available_dates))
            .collect()
    }

    /// Endpoint advertised for `operation`, e.g. `GetMap` or `GetCoverage`.
    pub fn operation_url(&self, operation: &str) -> Option<String> {
        match self.version {
            ServiceVersion::Wms(_) => wms::find_and_parse_capability_url(&self.raw, operation),
            ServiceVersion::Wcs(_) => wcs::find_coverage_op_url(&self.raw, operation),
        }
    }

    /// Like [`operation_url`](Self::operation_url) but missing is an error.
    pub fn require_operation_url(&self, operation: &str) -> OgcResult<String> {
        self.operation_url(operation)
            .ok_or_else(|| OgcError::OperationNotFound(operation.to_string()))
    }
}
