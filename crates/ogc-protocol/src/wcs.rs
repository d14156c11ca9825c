//! WCS 1.0.0 / 1.1.1 / 2.0.1 capabilities reader.
//!
//! Coverage discovery works from `GetCapabilities` alone. `DescribeCoverage`
//! documents are only needed for the optional helpers at the bottom of this
//! module.

use std::borrow::Cow;
use std::collections::BTreeMap;

use ogc_common::crs::is_geographic;
use ogc_common::time::parse_layer_days;
use ogc_common::{BoundingBox, LayerDescriptor};

use crate::capabilities::WcsVersion;
use crate::ows::{
    collapse_trailing_question_marks, find_and_parse_keywords, find_and_parse_operation_url,
    find_and_parse_wgs84_bounding_box, parse_bounding_box_tag, parse_corner, HttpMethod,
};
use crate::wms::find_and_parse_capability_url;
use crate::xml::{
    find_tag, find_tag_text, find_tag_texts, find_tags, find_tags_by_path, without_tags, Tag,
};

/// Coverage summaries of a capabilities document.
///
/// 1.1.x summaries may nest; every level is returned, depth first in
/// document order.
pub fn find_coverages(xml: &str, version: WcsVersion) -> Vec<Tag<'_>> {
    let top = match version {
        WcsVersion::V1_0_0 => {
            return find_tags_by_path(xml, &["ContentMetadata", "CoverageOfferingBrief"])
        }
        WcsVersion::V1_1_1 | WcsVersion::V2_0_1 => {
            find_tags_by_path(xml, &["Contents", "CoverageSummary"])
        }
    };

    let mut summaries = Vec::new();
    let mut stack: Vec<Tag<'_>> = top.into_iter().rev().collect();
    while let Some(summary) = stack.pop() {
        stack.extend(find_tags(summary.inner, "CoverageSummary").into_iter().rev());
        summaries.push(summary);
    }
    summaries
}

/// Summary body without nested `CoverageSummary` elements.
fn own_content<'a>(coverage: &Tag<'a>) -> Cow<'a, str> {
    without_tags(coverage.inner, "CoverageSummary")
}

/// WCS 2.0 ids use `__` where the workspace separator `:` would be.
pub fn normalize_coverage_id(id: &str) -> String {
    id.replacen("__", ":", 1)
}

/// Coverage id: `CoverageId` (2.0.x, normalized), `Identifier` (1.1.x) or `name` (1.0.0).
pub fn find_coverage_id(coverage_xml: &str) -> Option<String> {
    if let Some(id) = find_tag_text(coverage_xml, "wcs:CoverageId") {
        return Some(normalize_coverage_id(&id));
    }
    find_tag_text(coverage_xml, "wcs:Identifier").or_else(|| find_tag_text(coverage_xml, "wcs:name"))
}

/// `ows:Title` (1.1.1/2.0.1) or `label` (1.0.0).
pub fn find_coverage_display_name(coverage_xml: &str) -> Option<String> {
    find_tag_text(coverage_xml, "ows:Title").or_else(|| find_tag_text(coverage_xml, "wcs:label"))
}

/// `ows:Abstract` or `description`.
pub fn find_coverage_description(coverage_xml: &str) -> Option<String> {
    find_tag_text(coverage_xml, "ows:Abstract")
        .or_else(|| find_tag_text(coverage_xml, "wcs:description"))
}

/// The two `gml:pos` corners of a 1.0.0 `lonLatEnvelope`.
pub fn find_and_parse_lon_lat_envelope(xml: &str) -> Option<BoundingBox> {
    let envelope = find_tag(xml, "lonLatEnvelope")?;
    let positions = find_tags(envelope.inner, "gml:pos");
    let lower = parse_corner(&positions.first()?.text()?)?;
    let upper = parse_corner(&positions.get(1)?.text()?)?;
    BoundingBox::from_corners(lower, upper).validated()
}

/// `WGS84BoundingBox`, else `lonLatEnvelope`, else a geographic `ows:BoundingBox`.
fn find_coverage_bbox(coverage_xml: &str) -> Option<BoundingBox> {
    find_and_parse_wgs84_bounding_box(coverage_xml)
        .or_else(|| find_and_parse_lon_lat_envelope(coverage_xml))
        .or_else(|| {
            find_tags(coverage_xml, "ows:BoundingBox")
                .iter()
                .filter(|tag| tag.attribute("crs").is_some_and(|crs| is_geographic(&crs)))
                .find_map(parse_bounding_box_tag)
        })
}

/// Raw temporal fragments of a 1.0.0 coverage.
///
/// `temporalDomain` may list `timePosition`s and `timePeriod`s; periods are
/// rewritten as `begin/end/resolution` intervals. Without a temporal domain
/// the `timePosition`s of `lonLatEnvelope` are used.
pub fn parse_temporal_domain(coverage_xml: &str) -> Vec<String> {
    if let Some(domain) = find_tag(coverage_xml, "temporalDomain") {
        let mut fragments = find_tag_texts(domain.inner, "gml:timePosition");
        for period in find_tags(domain.inner, "gml:timePeriod") {
            let begin = find_tag_text(period.inner, "gml:beginPosition");
            let end = find_tag_text(period.inner, "gml:endPosition");
            let resolution = find_tag_text(period.inner, "gml:timeResolution");
            match (begin, end, resolution) {
                (Some(b), Some(e), Some(r)) => fragments.push(format!("{}/{}/{}", b, e, r)),
                (Some(b), Some(e), None) => fragments.push(format!("{}/{}", b, e)),
                (Some(b), None, _) => fragments.push(b),
                _ => {}
            }
        }
        if !fragments.is_empty() {
            return fragments;
        }
    }

    find_tag(coverage_xml, "lonLatEnvelope")
        .map(|envelope| find_tag_texts(envelope.inner, "gml:timePosition"))
        .unwrap_or_default()
}

/// Parse one coverage summary; `None` when it has no id.
pub fn parse_coverage(coverage_xml: &str, version: WcsVersion) -> Option<LayerDescriptor> {
    let id = find_coverage_id(coverage_xml)?;
    let title = find_coverage_display_name(coverage_xml).unwrap_or_else(|| id.clone());

    let mut layer = LayerDescriptor::new(id, title);
    layer.description = find_coverage_description(coverage_xml);
    layer.bbox = find_coverage_bbox(coverage_xml);
    layer.crs_list = find_tag_texts(coverage_xml, "wcs:SupportedCRS");

    match version {
        WcsVersion::V1_0_0 => {
            layer.keywords = find_tags_by_path(coverage_xml, &["keywords", "keyword"])
                .iter()
                .filter_map(|k| k.text())
                .collect();
            layer.raw_dates = parse_temporal_domain(coverage_xml);
        }
        // time-invariant unless a DescribeCoverage says otherwise
        WcsVersion::V1_1_1 | WcsVersion::V2_0_1 => {
            layer.keywords = find_and_parse_keywords(coverage_xml);
        }
    }
    layer.available_dates = parse_layer_days(&layer.raw_dates);
    Some(layer)
}

/// Every coverage in the document, repeated ids merged.
pub fn parse_coverages(xml: &str, version: WcsVersion) -> Vec<LayerDescriptor> {
    let mut layers: Vec<LayerDescriptor> = Vec::new();
    for coverage in find_coverages(xml, version) {
        let Some(layer) = parse_coverage(&own_content(&coverage), version) else {
            continue;
        };
        match layers.iter_mut().find(|l| l.id == layer.id) {
            Some(existing) => existing.merge(layer),
            None => layers.push(layer),
        }
    }
    layers
}

pub fn get_layer_ids(xml: &str, version: WcsVersion) -> Vec<String> {
    parse_coverages(xml, version).into_iter().map(|l| l.id).collect()
}

pub fn get_layer_names(xml: &str, version: WcsVersion) -> Vec<String> {
    parse_coverages(xml, version)
        .into_iter()
        .map(|l| l.title)
        .collect()
}

pub fn get_layer(xml: &str, version: WcsVersion, id: &str) -> Option<LayerDescriptor> {
    parse_coverages(xml, version).into_iter().find(|l| l.id == id)
}

/// Normalized days per coverage; time-invariant coverages map to `[]`.
pub fn get_all_layer_days(xml: &str, version: WcsVersion) -> BTreeMap<String, Vec<i64>> {
    parse_coverages(xml, version)
        .into_iter()
        .map(|layer| (layer.id, layer.available_dates))
        .collect()
}

/// Endpoint of a WCS operation: 1.0.0 `Capability/Request` first, then OWS `Operation`.
pub fn find_coverage_op_url(xml: &str, operation: &str) -> Option<String> {
    find_and_parse_capability_url(xml, operation)
        .map(|url| collapse_trailing_question_marks(&url))
        .or_else(|| find_and_parse_operation_url(xml, operation, HttpMethod::Get))
}

pub fn find_get_coverage_url(xml: &str) -> Option<String> {
    find_coverage_op_url(xml, "GetCoverage")
}

pub fn find_describe_coverage_url(xml: &str) -> Option<String> {
    find_coverage_op_url(xml, "DescribeCoverage")
}

// ============================================================================
// DescribeCoverage helpers
// ============================================================================

/// `domainSet/temporalDomain/timePosition` values of a coverage description.
pub fn parse_description_dates(description: &str) -> Vec<String> {
    find_tags_by_path(description, &["domainSet", "temporalDomain", "gml:timePosition"])
        .iter()
        .filter_map(|tag| tag.text())
        .collect()
}

/// Normalized days of a coverage description.
pub fn parse_description_days(description: &str) -> Vec<i64> {
    parse_layer_days(&parse_description_dates(description))
}

/// `supportedFormats/formats` values of a coverage description.
pub fn parse_supported_formats(description: &str) -> Vec<String> {
    find_tags_by_path(description, &["supportedFormats", "formats"])
        .iter()
        .filter_map(|tag| tag.text())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_coverage_id() {
        assert_eq!(normalize_coverage_id("prism__rainfall"), "prism:rainfall");
        assert_eq!(normalize_coverage_id("a__b__c"), "a:b__c");
        assert_eq!(normalize_coverage_id("plain"), "plain");
    }

    #[test]
    fn test_temporal_period() {
        let xml = r#"<wcs:CoverageOfferingBrief><wcs:name>x</wcs:name>
          <wcs:temporalDomain><gml:timePeriod>
            <gml:beginPosition>2020-01-01</gml:beginPosition>
            <gml:endPosition>2020-01-21</gml:endPosition>
            <gml:timeResolution>P10D</gml:timeResolution>
          </gml:timePeriod></wcs:temporalDomain></wcs:CoverageOfferingBrief>"#;
        assert_eq!(parse_temporal_domain(xml), vec!["2020-01-01/2020-01-21/P10D"]);
        let layer = parse_coverage(xml, WcsVersion::V1_0_0).unwrap();
        assert_eq!(layer.available_dates.len(), 3);
        assert_eq!(layer.title, "x");
    }

    #[test]
    fn test_nested_coverage_summaries() {
        let xml = r#"<wcs:Capabilities version="1.1.1"><wcs:Contents>
          <wcs:CoverageSummary>
            <ows:Title>Rainfall group</ows:Title>
            <wcs:CoverageSummary>
              <ows:Title>Dekad</ows:Title><wcs:Identifier>rain:dekad</wcs:Identifier>
            </wcs:CoverageSummary>
            <wcs:CoverageSummary>
              <ows:Title>Month</ows:Title><wcs:Identifier>rain:month</wcs:Identifier>
              <wcs:CoverageSummary>
                <ows:Title>Anomaly</ows:Title><wcs:Identifier>rain:month_anomaly</wcs:Identifier>
              </wcs:CoverageSummary>
            </wcs:CoverageSummary>
          </wcs:CoverageSummary>
          <wcs:CoverageSummary>
            <ows:Title>Elevation</ows:Title><wcs:Identifier>dem</wcs:Identifier>
          </wcs:CoverageSummary>
        </wcs:Contents></wcs:Capabilities>"#;

        assert_eq!(find_coverages(xml, WcsVersion::V1_1_1).len(), 5);
        let parsed = parse_coverages(xml, WcsVersion::V1_1_1);
        let ids: Vec<_> = parsed.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["rain:dekad", "rain:month", "rain:month_anomaly", "dem"]);
        let titles: Vec<_> = parsed.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["Dekad", "Month", "Anomaly", "Elevation"]);
    }

    #[test]
    fn test_coverage_without_id_is_skipped() {
        let xml = "<wcs:CoverageSummary><ows:Title>t</ows:Title></wcs:CoverageSummary>";
        assert!(parse_coverage(xml, WcsVersion::V1_1_1).is_none());
    }

    #[test]
    fn test_projected_bounding_box_not_used_as_extent() {
        let xml = r#"<wcs:CoverageSummary><wcs:CoverageId>a__b</wcs:CoverageId>
          <ows:BoundingBox crs="EPSG:3857"><ows:LowerCorner>0 0</ows:LowerCorner><ows:UpperCorner>10 10</ows:UpperCorner></ows:BoundingBox>
        </wcs:CoverageSummary>"#;
        let layer = parse_coverage(xml, WcsVersion::V2_0_1).unwrap();
        assert_eq!(layer.id, "a:b");
        assert!(layer.bbox.is_none());
    }
}
