//! Comprehensive tests for BoundingBox operations.

use ogc_common::bbox::{format_coordinate, BboxParseError, BoundingBox, ImageSize};

// ============================================================================
// Constructor tests
// ============================================================================

#[test]
fn test_bbox_new() {
    let bbox = BoundingBox::new(-180.0, -90.0, 180.0, 90.0);
    assert_eq!(bbox.min_x, -180.0);
    assert_eq!(bbox.min_y, -90.0);
    assert_eq!(bbox.max_x, 180.0);
    assert_eq!(bbox.max_y, 90.0);
}

#[test]
fn test_bbox_from_array() {
    let bbox = BoundingBox::from([-180.0625, -81.0625, 179.9375, 81.0625]);
    assert_eq!(bbox.to_array(), [-180.0625, -81.0625, 179.9375, 81.0625]);
}

#[test]
fn test_bbox_from_corners() {
    let bbox = BoundingBox::from_corners((1.0, 2.0), (3.0, 4.0));
    assert_eq!(bbox, BoundingBox::new(1.0, 2.0, 3.0, 4.0));
}

// ============================================================================
// from_wms_string tests
// ============================================================================

#[test]
fn test_parse_wms_bbox_integer() {
    let bbox = BoundingBox::from_wms_string("0,0,100,100").unwrap();
    assert_eq!(bbox, BoundingBox::new(0.0, 0.0, 100.0, 100.0));
}

#[test]
fn test_parse_wms_bbox_web_mercator() {
    let bbox = BoundingBox::from_wms_string(
        "11897270.578531113,6261721.357121639,12523442.714243278,6887893.492833804",
    )
    .unwrap();
    assert_eq!(bbox.min_x, 11897270.578531113);
    assert_eq!(bbox.max_y, 6887893.492833804);
}

#[test]
fn test_parse_wms_bbox_whitespace_is_tolerated() {
    let bbox = BoundingBox::from_wms_string(" 0, 0, 100, 100 ").unwrap();
    assert_eq!(bbox, BoundingBox::new(0.0, 0.0, 100.0, 100.0));
}

#[test]
fn test_parse_wms_bbox_invalid_format_too_few() {
    let result = BoundingBox::from_wms_string("0,0,100");
    assert!(matches!(result, Err(BboxParseError::InvalidFormat(_))));
}

#[test]
fn test_parse_wms_bbox_invalid_number() {
    let result = BoundingBox::from_wms_string("abc,0,100,100");
    assert!(matches!(result, Err(BboxParseError::InvalidNumber(_))));
}

// ============================================================================
// Validation tests
// ============================================================================

#[test]
fn test_bbox_inverted_is_invalid() {
    let bbox = BoundingBox::new(10.0, 10.0, 0.0, 0.0);
    assert!(!bbox.is_valid());
    assert!(bbox.check_extent().is_err());
}

#[test]
fn test_bbox_degenerate_point_is_valid() {
    let bbox = BoundingBox::new(5.0, 5.0, 5.0, 5.0);
    assert!(bbox.is_valid());
    assert_eq!(bbox.width(), 0.0);
}

#[test]
fn test_bbox_infinite_is_invalid() {
    let bbox = BoundingBox::new(f64::NEG_INFINITY, 0.0, 1.0, 1.0);
    assert!(bbox.validated().is_none());
}

#[test]
fn test_flipped() {
    let bbox = BoundingBox::new(-10.0, 40.0, 10.0, 50.0);
    assert_eq!(bbox.flipped(), BoundingBox::new(40.0, -10.0, 50.0, 10.0));
    assert_eq!(bbox.flipped().flipped(), bbox);
}

// ============================================================================
// Formatting tests
// ============================================================================

#[test]
fn test_format_coordinate_shortest_round_trip() {
    assert_eq!(format_coordinate(100.0, None), "100");
    assert_eq!(format_coordinate(-0.5, None), "-0.5");
    assert_eq!(format_coordinate(11897270.578531113, None), "11897270.578531113");
}

#[test]
fn test_format_coordinate_fixed_digits() {
    assert_eq!(format_coordinate(86.7469655846003, Some(1)), "86.7");
    assert_eq!(format_coordinate(41.4606540712216, Some(1)), "41.5");
    assert_eq!(format_coordinate(100.0, Some(3)), "100.000");
}

#[test]
fn test_param_string_parses_back() {
    let bbox = BoundingBox::new(-52.12430934201362, -42.939883795000185, 72.12135334770016, 58.488784885698735);
    let parsed = BoundingBox::from_wms_string(&bbox.to_param_string(None)).unwrap();
    assert_eq!(parsed, bbox);
}

// ============================================================================
// Image scaling tests
// ============================================================================

#[test]
fn test_scale_image_caps_at_max_pixels() {
    let bbox = BoundingBox::new(-180.0, -90.0, 180.0, 90.0);
    assert_eq!(bbox.scale_image(100, 256), ImageSize::new(100, 50));
}

#[test]
fn test_scale_image_degenerate_extent() {
    let bbox = BoundingBox::new(5.0, 5.0, 5.0, 5.0);
    assert_eq!(bbox.scale_image(5096, 256), ImageSize::new(256, 256));
}
