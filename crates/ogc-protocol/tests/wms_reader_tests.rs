//! WMS capabilities reader tests against the 1.1.1 and 1.3.0 documents.

use ogc_common::time::format_day;
use ogc_common::OgcError;
use ogc_protocol::capabilities::{CapabilitiesDocument, ServiceVersion, WmsVersion};
use ogc_protocol::wms;
use test_utils::{capabilities, layers};

fn days(ms: &[i64]) -> Vec<String> {
    ms.iter().filter_map(|d| format_day(*d)).collect()
}

// ============================================================================
// Layer discovery
// ============================================================================

#[test]
fn test_layer_ids_in_document_order() {
    for (version, xml) in capabilities::WMS_ALL {
        assert_eq!(wms::get_layer_ids(xml), layers::WMS_IDS, "WMS {}", version);
    }
}

#[test]
fn test_group_layers_without_name_are_skipped() {
    let titles = wms::get_layer_names(capabilities::WMS_1_3_0, true);
    assert!(!titles.iter().any(|t| t == "Hazards"));
    assert!(!titles.iter().any(|t| t == "PRISM Web Map Service"));
}

#[test]
fn test_layer_names_raw_and_cleaned() {
    assert_eq!(
        wms::get_layer_names(capabilities::WMS_1_3_0, false),
        vec!["Rainfall (dekad)", "  GDACS buffers  ", "Admin boundaries"]
    );
    for (version, xml) in capabilities::WMS_ALL {
        assert_eq!(wms::get_layer_names(xml, true), layers::WMS_TITLES, "WMS {}", version);
    }
}

#[test]
fn test_find_layer_returns_first_occurrence() {
    let layer = wms::find_layer(capabilities::WMS_1_3_0, layers::RAINFALL).unwrap();
    assert!(layer.outer.contains("P10D"));
    assert!(wms::find_layer(capabilities::WMS_1_3_0, "prism:missing").is_none());
}

// ============================================================================
// Time dimensions
// ============================================================================

#[test]
fn test_explicit_dates_are_noon_anchored() {
    for (version, xml) in capabilities::WMS_ALL {
        let all = wms::get_all_layer_days(xml);
        assert_eq!(
            all[layers::GDACS_BUFFERS],
            layers::GDACS_BUFFERS_DAYS,
            "WMS {}",
            version
        );
    }
}

#[test]
fn test_interval_and_duplicate_layer_are_unioned() {
    let all = wms::get_all_layer_days(capabilities::WMS_1_3_0);
    let rainfall = days(&all[layers::RAINFALL]);

    // 29 instants from the interval plus one from the nested duplicate
    assert_eq!(rainfall.len(), 30);
    assert_eq!(rainfall[0], "2019-05-21");
    assert_eq!(rainfall[1], "2019-05-31");
    assert_eq!(rainfall[28], "2020-02-25");
    assert_eq!(rainfall[29], "2020-03-06");
}

#[test]
fn test_layer_without_time_maps_to_empty() {
    let all = wms::get_all_layer_days(capabilities::WMS_1_3_0);
    assert_eq!(all.len(), 3);
    assert!(all[layers::ADMIN_BOUNDARIES].is_empty());
}

#[test]
fn test_versions_agree_on_days() {
    assert_eq!(
        wms::get_all_layer_days(capabilities::WMS_1_1_1),
        wms::get_all_layer_days(capabilities::WMS_1_3_0)
    );
}

#[test]
fn test_all_layer_days_use_the_document_version() {
    assert_eq!(wms::document_version(capabilities::WMS_1_1_1), WmsVersion::V1_1_1);
    assert_eq!(wms::document_version(capabilities::WMS_1_3_0), WmsVersion::V1_3_0);
    assert_eq!(wms::document_version("<Layer><Name>a</Name></Layer>"), WmsVersion::V1_3_0);

    for (version, xml) in capabilities::WMS_ALL {
        let expected: std::collections::BTreeMap<_, _> =
            wms::parse_layers(xml, WmsVersion::parse(version).unwrap())
                .into_iter()
                .map(|layer| (layer.id, layer.available_dates))
                .collect();
        assert_eq!(wms::get_all_layer_days(xml), expected, "WMS {}", version);
    }
}

#[test]
fn test_get_layer_dates_raw_fragments() {
    assert_eq!(
        wms::get_layer_dates(capabilities::WMS_1_1_1, layers::RAINFALL).unwrap(),
        vec!["2019-05-21T00:00:00.000Z/2020-02-25T00:00:00.000Z/P10D", "2020-03-06"]
    );
    assert_eq!(
        wms::get_layer_dates(capabilities::WMS_1_3_0, layers::ADMIN_BOUNDARIES).unwrap(),
        Vec::<String>::new()
    );
    assert_eq!(
        wms::get_layer_dates(capabilities::WMS_1_3_0, "prism:missing"),
        Err(OgcError::LayerNotFound("prism:missing".to_string()))
    );
}

#[test]
fn test_empty_dimension_falls_back_to_extent() {
    let layer = wms::find_layer(capabilities::WMS_1_1_1, layers::GDACS_BUFFERS).unwrap();
    let dates = wms::parse_layer_dates(layer.outer);
    assert_eq!(dates.len(), 8);
    assert_eq!(dates[0], "2012-10-31");
}

// ============================================================================
// Descriptors
// ============================================================================

#[test]
fn test_parse_layers_descriptor_fields() {
    let parsed = wms::parse_layers(capabilities::WMS_1_3_0, WmsVersion::V1_3_0);
    assert_eq!(parsed.len(), 3);

    let rainfall = &parsed[0];
    assert_eq!(rainfall.id, layers::RAINFALL);
    assert_eq!(rainfall.namespace.as_deref(), Some("prism"));
    assert_eq!(rainfall.short_name, "rainfall_dekad");
    assert_eq!(rainfall.description.as_deref(), Some("Ten-day rainfall totals"));
    assert_eq!(rainfall.keywords, vec!["rainfall", "chirps"]);
    assert_eq!(rainfall.crs_list, vec!["EPSG:4326", "EPSG:3857"]);
    assert_eq!(rainfall.styles, vec!["rainfall", "rainfall_anomaly"]);
    assert_eq!(rainfall.default_style(), Some("rainfall"));
    assert_eq!(
        rainfall.legend_url.as_deref(),
        Some("https://prism.example.org/geoserver/ows?service=WMS&request=GetLegendGraphic&format=image%2Fpng&width=20&height=20&layer=prism%3Arainfall_dekad")
    );
    assert_eq!(rainfall.raw_dates.len(), 2);
    assert!(rainfall.is_temporal());

    let gdacs = &parsed[1];
    assert_eq!(gdacs.title, "GDACS buffers");
    assert_eq!(gdacs.bbox.unwrap().to_array(), [79.5, 5.9, 81.9, 9.9]);
    assert!(!parsed[2].is_temporal());
}

#[test]
fn test_bbox_is_lon_lat_in_both_versions() {
    let v111 = wms::parse_layers(capabilities::WMS_1_1_1, WmsVersion::V1_1_1);
    let v130 = wms::parse_layers(capabilities::WMS_1_3_0, WmsVersion::V1_3_0);
    for (a, b) in v111.iter().zip(v130.iter()) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.bbox, b.bbox, "{}", a.id);
    }
    assert_eq!(v130[0].bbox.unwrap().to_array(), test_utils::bbox::RAINFALL);
}

#[test]
fn test_get_map_url_from_capability() {
    for (version, xml) in capabilities::WMS_ALL {
        assert_eq!(
            wms::find_and_parse_capability_url(xml, "GetMap").as_deref(),
            Some("https://prism.example.org/geoserver/ows?SERVICE=WMS&"),
            "WMS {}",
            version
        );
    }
}

// ============================================================================
// Document classification
// ============================================================================

#[test]
fn test_document_detects_version() {
    let doc = CapabilitiesDocument::parse(capabilities::WMS_1_1_1).unwrap();
    assert_eq!(doc.version(), ServiceVersion::Wms(WmsVersion::V1_1_1));
    assert_eq!(doc.layers().len(), 3);

    let doc = CapabilitiesDocument::parse(capabilities::WMS_1_3_0).unwrap();
    assert_eq!(doc.version(), ServiceVersion::Wms(WmsVersion::V1_3_0));
    assert_eq!(doc.layer_days(), wms::get_all_layer_days(capabilities::WMS_1_3_0));
    assert!(doc.require_operation_url("GetMap").is_ok());
    assert_eq!(
        doc.require_operation_url("GetStyles"),
        Err(OgcError::OperationNotFound("GetStyles".to_string()))
    );
}

#[test]
fn test_exception_report_is_an_error() {
    let err = CapabilitiesDocument::parse(capabilities::SERVICE_EXCEPTION).unwrap_err();
    assert_eq!(
        err,
        OgcError::ServiceException("Could not find layer prism:missing".to_string())
    );
}
