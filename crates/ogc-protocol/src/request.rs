//! Request URL construction for GetCapabilities, GetMap, GetCoverage,
//! DescribeCoverage and GetLegendGraphic.
//!
//! Every builder funnels through [`format_url`]: parameters already on the
//! base URL are kept unless the caller sets the same key (compared without
//! case), all keys are sorted, and values are form-encoded with one encoder.
//! The same logical request therefore always yields the same string.

use std::collections::BTreeMap;
use std::fmt;

use url::form_urlencoded;
use url::Url;

use ogc_common::crs::{native_axis_order, AxisOrder};
use ogc_common::{BoundingBox, OgcError, OgcResult};

use crate::capabilities::{WcsVersion, WmsVersion};

/// Service names recognised at the end of an endpoint path.
const SERVICE_PATH_SUFFIXES: &[&str] = &["wcs", "wfs", "wms", "wmts", "wps"];

/// GetCoverage is always issued as WCS 1.0.0; many servers only implement it there.
pub const GET_COVERAGE_VERSION: &str = "1.0.0";

/// Query parameters, kept sorted by key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestParams {
    params: BTreeMap<String, String>,
}

/// A single parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Str(s) => f.write_str(s),
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Str(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Str(s)
    }
}

impl From<&String> for ParamValue {
    fn from(s: &String) -> Self {
        ParamValue::Str(s.clone())
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`; an empty key is ignored.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        let key = key.into();
        if !key.is_empty() {
            self.params.insert(key, value.into().to_string());
        }
        self
    }

    /// Set `key` only when a value is present.
    pub fn set_opt<V: Into<ParamValue>>(&mut self, key: impl Into<String>, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.set(key, value);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    fn contains_ignore_case(&self, key: &str) -> bool {
        self.params.keys().any(|k| k.eq_ignore_ascii_case(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

fn parse_url(base: &str) -> OgcResult<Url> {
    Url::parse(base.trim()).map_err(|e| OgcError::InvalidUrl {
        url: base.to_string(),
        message: e.to_string(),
    })
}

/// Merge `params` into the query of `base` and serialize deterministically.
pub fn format_url(base: &str, params: &RequestParams) -> OgcResult<String> {
    let mut url = parse_url(base)?;
    let mut merged: BTreeMap<String, String> = url
        .query_pairs()
        .filter(|(k, _)| !k.is_empty() && !params.contains_ignore_case(k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    merged.extend(params.iter().map(|(k, v)| (k.to_string(), v.to_string())));

    if merged.is_empty() {
        url.set_query(None);
    } else {
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(merged.iter())
            .finish();
        url.set_query(Some(&query));
    }
    Ok(url.to_string())
}

/// The service named by a URL's `service` parameter or its last path segment.
pub fn service_from_url(base: &str) -> Option<String> {
    let url = parse_url(base).ok()?;
    if let Some((_, service)) = url
        .query_pairs()
        .find(|(k, v)| k.eq_ignore_ascii_case("service") && !v.is_empty())
    {
        return Some(service.to_uppercase());
    }
    let last = url.path().trim_end_matches('/').rsplit('/').next()?.to_ascii_lowercase();
    SERVICE_PATH_SUFFIXES
        .contains(&last.as_str())
        .then(|| last.to_uppercase())
}

// ============================================================================
// GetCapabilities
// ============================================================================

/// `GetCapabilities` URL; `service` falls back to [`service_from_url`].
pub fn build_get_capabilities_url(
    base: &str,
    service: Option<&str>,
    version: Option<&str>,
) -> OgcResult<String> {
    let service = service
        .map(str::to_uppercase)
        .or_else(|| service_from_url(base));

    let mut params = RequestParams::new();
    params
        .set("request", "GetCapabilities")
        .set_opt("service", service)
        .set_opt("version", version);
    format_url(base, &params)
}

// ============================================================================
// GetMap
// ============================================================================

/// Options for a WMS `GetMap` request.
#[derive(Debug, Clone, PartialEq)]
pub struct GetMapOptions {
    /// Lon/lat (or projected x/y) extent, never pre-flipped
    pub bbox: Option<BoundingBox>,
    pub bbox_digits: Option<usize>,
    /// EPSG code of the bbox, sent as `bboxsr`
    pub bbox_srs: Option<u32>,
    /// EPSG code of the output image, sent as `imagesr`
    pub image_srs: Option<u32>,
    pub format: String,
    pub height: u32,
    pub width: u32,
    pub time: Option<String>,
    pub srs: String,
    pub styles: Option<Vec<String>>,
    pub transparent: bool,
    pub exceptions: Option<String>,
    /// Custom dimension parameters (`elevation`, `dim_*`, ...)
    pub extra: BTreeMap<String, String>,
}

impl Default for GetMapOptions {
    fn default() -> Self {
        Self {
            bbox: None,
            bbox_digits: None,
            bbox_srs: None,
            image_srs: None,
            format: "image/png".to_string(),
            height: 256,
            width: 256,
            time: None,
            srs: "EPSG:4326".to_string(),
            styles: None,
            transparent: true,
            exceptions: None,
            extra: BTreeMap::new(),
        }
    }
}

/// The bbox as it has to appear on the wire for `version` and `srs`.
///
/// WMS 1.3.0 uses the CRS's native axis order, so lat/lon CRSs are flipped;
/// WMS 1.1.1 is always x/y.
pub fn wire_bbox(bbox: &BoundingBox, srs: &str, version: WmsVersion) -> BoundingBox {
    match (version, native_axis_order(srs)) {
        (WmsVersion::V1_3_0, AxisOrder::LatLon) => bbox.flipped(),
        _ => *bbox,
    }
}

pub fn build_get_map_url<S: AsRef<str>>(
    base: &str,
    layer_ids: &[S],
    options: &GetMapOptions,
    version: WmsVersion,
) -> OgcResult<String> {
    let layers = layer_ids
        .iter()
        .map(|id| id.as_ref())
        .collect::<Vec<_>>()
        .join(",");

    let mut params = RequestParams::new();
    for (key, value) in &options.extra {
        params.set(key.as_str(), value);
    }
    params
        .set_opt(
            "bbox",
            options
                .bbox
                .map(|b| wire_bbox(&b, &options.srs, version).to_param_string(options.bbox_digits)),
        )
        .set_opt("bboxsr", options.bbox_srs)
        .set_opt("imagesr", options.image_srs)
        .set_opt("exceptions", options.exceptions.as_ref())
        .set("format", options.format.as_str())
        .set("height", options.height)
        .set("layers", layers)
        .set("request", "GetMap")
        .set("service", "WMS")
        .set("srs", options.srs.as_str())
        .set_opt("styles", options.styles.as_ref().map(|s| s.join(",")))
        .set_opt("time", options.time.as_ref())
        .set("transparent", options.transparent)
        .set("version", version.as_str())
        .set("width", options.width);
    if version == WmsVersion::V1_3_0 {
        params.set("crs", options.srs.as_str());
    }
    format_url(base, &params)
}

// ============================================================================
// GetCoverage / DescribeCoverage
// ============================================================================

/// Options for a WCS `GetCoverage` request.
#[derive(Debug, Clone, PartialEq)]
pub struct GetCoverageOptions {
    pub bbox: Option<BoundingBox>,
    pub bbox_digits: Option<usize>,
    /// Reject inverted or wrapping extents before building the URL
    pub check_extent: bool,
    pub crs: String,
    pub format: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
    /// Upper bound on either image side
    pub max_pixels: u32,
    /// Pixels per degree when the size is derived from the extent
    pub resolution: u32,
    pub time: Option<String>,
}

impl Default for GetCoverageOptions {
    fn default() -> Self {
        Self {
            bbox: None,
            bbox_digits: None,
            check_extent: true,
            crs: "EPSG:4326".to_string(),
            format: "GeoTIFF".to_string(),
            height: None,
            width: None,
            max_pixels: 5096,
            resolution: 256,
            time: None,
        }
    }
}

pub fn build_get_coverage_url(
    base: &str,
    coverage_id: &str,
    options: &GetCoverageOptions,
) -> OgcResult<String> {
    let bbox = options
        .bbox
        .ok_or_else(|| OgcError::MissingExtent(coverage_id.to_string()))?;
    if options.check_extent {
        bbox.check_extent()?;
    }

    let (mut width, mut height) = (options.width, options.height);
    let oversized = |v: Option<u32>| v.is_some_and(|v| v > options.max_pixels);
    if (width.is_none() && height.is_none()) || oversized(width) || oversized(height) {
        let size = bbox.scale_image(options.max_pixels, options.resolution);
        width = Some(size.width);
        height = Some(size.height);
    }

    let mut params = RequestParams::new();
    params
        .set("bbox", bbox.to_param_string(options.bbox_digits))
        .set("coverage", coverage_id)
        .set("crs", options.crs.as_str())
        .set("format", options.format.as_str())
        .set_opt("height", height)
        .set("request", "GetCoverage")
        .set("service", "WCS")
        .set_opt("time", options.time.as_ref())
        .set("version", GET_COVERAGE_VERSION)
        .set_opt("width", width);
    format_url(base, &params)
}

/// `DescribeCoverage` URL with the id parameter each version expects.
pub fn build_describe_coverage_url(
    base: &str,
    coverage_id: &str,
    version: WcsVersion,
) -> OgcResult<String> {
    let mut params = RequestParams::new();
    match version {
        WcsVersion::V1_0_0 => params.set("coverage", coverage_id),
        WcsVersion::V1_1_1 => params.set("identifiers", coverage_id),
        WcsVersion::V2_0_1 => params.set("coverageId", coverage_id.replacen(':', "__", 1)),
    };
    params
        .set("request", "DescribeCoverage")
        .set("service", "WCS")
        .set("version", version.as_str());
    format_url(base, &params)
}

// ============================================================================
// GetLegendGraphic
// ============================================================================

/// The `legend_options` string of a GetLegendGraphic request.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendOptions {
    pub font_anti_aliasing: bool,
    pub font_color: String,
    pub font_name: String,
    pub font_size: u32,
    pub force_labels: bool,
    pub force_titles: bool,
    pub group_layout: String,
    pub hide_empty_rules: bool,
    pub layout: String,
    pub wrap: bool,
    /// Additional or overriding `key:value` entries
    pub extra: BTreeMap<String, String>,
}

impl Default for LegendOptions {
    fn default() -> Self {
        Self {
            font_anti_aliasing: true,
            font_color: "0x2D3436".to_string(),
            font_name: "Roboto Light".to_string(),
            font_size: 13,
            force_labels: true,
            force_titles: true,
            group_layout: "vertical".to_string(),
            hide_empty_rules: false,
            layout: "vertical".to_string(),
            wrap: false,
            extra: BTreeMap::new(),
        }
    }
}

impl LegendOptions {
    /// `key:value` pairs sorted by key and joined with `;`.
    pub fn to_param_string(&self) -> String {
        let on_off = |v: bool| if v { "on" } else { "off" };
        let mut entries: BTreeMap<String, String> = [
            ("fontAntiAliasing", self.font_anti_aliasing.to_string()),
            ("fontColor", self.font_color.clone()),
            ("fontName", self.font_name.clone()),
            ("fontSize", self.font_size.to_string()),
            ("forceLabels", on_off(self.force_labels).to_string()),
            ("forceTitles", on_off(self.force_titles).to_string()),
            ("groupLayout", self.group_layout.clone()),
            ("hideEmptyRules", self.hide_empty_rules.to_string()),
            ("layout", self.layout.clone()),
            ("wrap", self.wrap.to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        entries.extend(self.extra.clone());

        entries
            .iter()
            .map(|(k, v)| format!("{}:{}", k, v))
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Options for a WMS `GetLegendGraphic` request.
#[derive(Debug, Clone, PartialEq)]
pub struct GetLegendGraphicOptions {
    pub format: String,
    pub legend_options: LegendOptions,
    pub style: Option<String>,
    pub rule: Option<String>,
    pub scale: Option<f64>,
    pub sld: Option<String>,
    pub sld_body: Option<String>,
    pub language: Option<String>,
    pub exceptions: Option<String>,
    /// Path appended to the base URL; `None` keeps the base as is
    pub path: Option<String>,
}

impl Default for GetLegendGraphicOptions {
    fn default() -> Self {
        Self {
            format: "image/png".to_string(),
            legend_options: LegendOptions::default(),
            style: None,
            rule: None,
            scale: None,
            sld: None,
            sld_body: None,
            language: None,
            exceptions: None,
            path: Some("/wms".to_string()),
        }
    }
}

pub fn build_get_legend_graphic_url(
    base: &str,
    layer: &str,
    options: &GetLegendGraphicOptions,
) -> OgcResult<String> {
    let mut url = parse_url(base)?;
    if let Some(suffix) = options.path.as_deref().filter(|p| !p.is_empty()) {
        let path = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            suffix.trim_start_matches('/')
        );
        url.set_path(&path);
    }

    let mut params = RequestParams::new();
    params
        .set_opt("exceptions", options.exceptions.as_ref())
        .set("format", options.format.as_str())
        .set_opt("language", options.language.as_ref())
        .set("layer", layer)
        .set("legend_options", options.legend_options.to_param_string())
        .set("request", "GetLegendGraphic")
        .set_opt("rule", options.rule.as_ref())
        .set_opt("scale", options.scale)
        .set("service", "WMS")
        .set_opt("sld", options.sld.as_ref())
        .set_opt("sld_body", options.sld_body.as_ref())
        .set_opt("style", options.style.as_ref());
    format_url(url.as_str(), &params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_url_merges_and_sorts() {
        let mut params = RequestParams::new();
        params.set("b", "2").set("A", "x y").set("", "dropped");
        let url = format_url("https://example.org/ows?c=3&a=1", &params).unwrap();
        assert_eq!(url, "https://example.org/ows?A=x+y&b=2&c=3");
    }

    #[test]
    fn test_format_url_root_path() {
        let mut params = RequestParams::new();
        params.set("service", "WMS");
        assert_eq!(
            format_url("https://example.org", &params).unwrap(),
            "https://example.org/?service=WMS"
        );
    }

    #[test]
    fn test_format_url_encoding() {
        let mut params = RequestParams::new();
        params.set("v", "a:b,c/d;e f");
        assert_eq!(
            format_url("https://example.org/", &params).unwrap(),
            "https://example.org/?v=a%3Ab%2Cc%2Fd%3Be+f"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = format_url("not a url", &RequestParams::new()).unwrap_err();
        assert!(matches!(err, OgcError::InvalidUrl { .. }));
    }

    #[test]
    fn test_service_from_url() {
        assert_eq!(service_from_url("https://a.org/geoserver/wfs").as_deref(), Some("WFS"));
        assert_eq!(service_from_url("https://a.org/ows/?service=wcs").as_deref(), Some("WCS"));
        assert_eq!(service_from_url("https://a.org/ows"), None);
    }

    #[test]
    fn test_wire_bbox() {
        let bbox = BoundingBox::new(-10.0, 40.0, 10.0, 50.0);
        assert_eq!(wire_bbox(&bbox, "EPSG:4326", WmsVersion::V1_3_0), bbox.flipped());
        assert_eq!(wire_bbox(&bbox, "EPSG:4326", WmsVersion::V1_1_1), bbox);
        assert_eq!(wire_bbox(&bbox, "CRS:84", WmsVersion::V1_3_0), bbox);
        assert_eq!(wire_bbox(&bbox, "EPSG:3857", WmsVersion::V1_3_0), bbox);
    }

    #[test]
    fn test_legend_options_default() {
        assert_eq!(
            LegendOptions::default().to_param_string(),
            "fontAntiAliasing:true;fontColor:0x2D3436;fontName:Roboto Light;fontSize:13;forceLabels:on;forceTitles:on;groupLayout:vertical;hideEmptyRules:false;layout:vertical;wrap:false"
        );
    }
}
