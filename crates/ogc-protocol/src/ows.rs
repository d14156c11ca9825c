//! OWS Common elements shared by WCS 1.1.1/2.0.1 (and partly by WMS).

use ogc_common::bbox::format_coordinate;
use ogc_common::crs::{native_axis_order, AxisOrder};
use ogc_common::BoundingBox;

use crate::xml::{find_tag, find_tag_by_path, find_tags, get_attribute, Tag};

/// All `Keyword` values of the first `Keywords` block, in document order.
pub fn find_and_parse_keywords(xml: &str) -> Vec<String> {
    find_tag(xml, "ows:Keywords")
        .map(|keywords| {
            find_tags(keywords.inner, "ows:Keyword")
                .iter()
                .filter_map(|k| k.text())
                .collect()
        })
        .unwrap_or_default()
}

/// First `ows:BoundingBox`, converted to lon/lat using its `crs` axis order.
pub fn find_and_parse_bounding_box(xml: &str) -> Option<BoundingBox> {
    find_tag(xml, "ows:BoundingBox").and_then(|tag| parse_bounding_box_tag(&tag))
}

/// First `ows:WGS84BoundingBox`; always lon/lat.
pub fn find_and_parse_wgs84_bounding_box(xml: &str) -> Option<BoundingBox> {
    find_tag(xml, "ows:WGS84BoundingBox").and_then(|tag| parse_bounding_box_tag(&tag))
}

/// Whichever of `ows:BoundingBox` or `ows:WGS84BoundingBox` comes first.
pub fn parse_bounding_box(xml: &str) -> Option<BoundingBox> {
    let first = [
        find_tag(xml, "ows:BoundingBox"),
        find_tag(xml, "ows:WGS84BoundingBox"),
    ]
    .into_iter()
    .flatten()
    .min_by_key(|tag| tag.start)?;
    parse_bounding_box_tag(&first)
}

/// Parse a `BoundingBox` or `WGS84BoundingBox` element.
///
/// Corners are read in the axis order of the element's `crs` attribute and
/// returned as lon/lat. `WGS84BoundingBox` and boxes without a `crs` are x/y.
pub fn parse_bounding_box_tag(tag: &Tag<'_>) -> Option<BoundingBox> {
    let lower = parse_corner(&find_tag(tag.inner, "ows:LowerCorner")?.text()?)?;
    let upper = parse_corner(&find_tag(tag.inner, "ows:UpperCorner")?.text()?)?;

    let wgs84 = tag.opening().contains("WGS84BoundingBox");
    let order = match tag.attribute("crs") {
        Some(crs) if !wgs84 => native_axis_order(&crs),
        _ => AxisOrder::XY,
    };

    let bbox = match order {
        AxisOrder::XY => BoundingBox::from_corners(lower, upper),
        AxisOrder::LatLon => BoundingBox::from_corners((lower.1, lower.0), (upper.1, upper.0)),
    };
    bbox.validated()
}

/// Parse an `"x y"` corner; extra dimensions are ignored.
pub fn parse_corner(s: &str) -> Option<(f64, f64)> {
    let mut parts = s.split_whitespace().map(str::parse::<f64>);
    let x = parts.next()?.ok()?;
    let y = parts.next()?.ok()?;
    Some((x, y))
}

/// Serialize a lon/lat box as an `ows:WGS84BoundingBox` element.
///
/// With `digits`, coordinates are written with that many decimals; parsing
/// the result gives back the box up to that precision.
pub fn format_bounding_box(bbox: &BoundingBox, digits: Option<usize>) -> String {
    let corner = |x: f64, y: f64| {
        format!(
            "{} {}",
            format_coordinate(x, digits),
            format_coordinate(y, digits)
        )
    };
    format!(
        "<ows:WGS84BoundingBox><ows:LowerCorner>{}</ows:LowerCorner><ows:UpperCorner>{}</ows:UpperCorner></ows:WGS84BoundingBox>",
        corner(bbox.min_x, bbox.min_y),
        corner(bbox.max_x, bbox.max_y)
    )
}

/// The `ows:Operation` element whose `name` is `name`.
pub fn find_operation<'a>(xml: &'a str, name: &str) -> Option<Tag<'a>> {
    find_tags(xml, "ows:Operation")
        .into_iter()
        .find(|op| op.attribute("name").as_deref() == Some(name))
}

/// HTTP method of an operation endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    fn tag_name(self) -> &'static str {
        match self {
            HttpMethod::Get => "ows:Get",
            HttpMethod::Post => "ows:Post",
        }
    }
}

/// The decoded `href` of `Operation[name]/DCP/HTTP/<method>`.
///
/// A run of trailing `?` is collapsed to one, so a caller can append a query
/// string to whatever the server advertised.
pub fn find_and_parse_operation_url(xml: &str, name: &str, method: HttpMethod) -> Option<String> {
    let operation = find_operation(xml, name)?;
    let endpoint = find_tag_by_path(operation.inner, &["ows:DCP", "ows:HTTP", method.tag_name()])?;
    get_attribute(endpoint.opening(), "xlink:href").map(|href| collapse_trailing_question_marks(&href))
}

pub(crate) fn collapse_trailing_question_marks(href: &str) -> String {
    let trimmed = href.trim();
    let base = trimmed.trim_end_matches('?');
    if base.len() < trimmed.len() {
        format!("{}?", base)
    } else {
        base.to_string()
    }
}

/// Text of a `ServiceException` or `ows:ExceptionText`, if `xml` is an
/// exception report.
pub fn find_exception(xml: &str) -> Option<String> {
    find_tag(xml, "ServiceException")
        .or_else(|| find_tag(xml, "ows:ExceptionText"))
        .and_then(|tag| tag.text())
}
