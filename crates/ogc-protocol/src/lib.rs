//! OGC capabilities readers and request builders.
//!
//! Supports:
//! - WMS 1.1.1 and 1.3.0 capabilities (layers, titles, time dimensions)
//! - WCS 1.0.0, 1.1.1 and 2.0.1 capabilities and DescribeCoverage
//! - OWS common elements (keywords, bounding boxes, operations, exceptions)
//! - GetMap, GetCoverage, DescribeCoverage, GetLegendGraphic and
//!   GetCapabilities URL construction

pub mod capabilities;
pub mod ows;
pub mod request;
pub mod wcs;
pub mod wms;
pub mod xml;

pub use capabilities::{detect, detect_service, CapabilitiesDocument, Service, ServiceVersion, WcsVersion, WmsVersion};
pub use ows::HttpMethod;
pub use request::{
    build_describe_coverage_url, build_get_capabilities_url, build_get_coverage_url,
    build_get_legend_graphic_url, build_get_map_url, format_url, GetCoverageOptions,
    GetLegendGraphicOptions, GetMapOptions, LegendOptions, RequestParams,
};
pub use xml::Tag;
