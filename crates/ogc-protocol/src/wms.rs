//! WMS 1.1.1 / 1.3.0 capabilities reader.

use std::borrow::Cow;
use std::collections::BTreeMap;

use ogc_common::time::parse_layer_days;
use ogc_common::{BoundingBox, LayerDescriptor, OgcError, OgcResult};

use crate::capabilities::{detect, ServiceVersion, WmsVersion};
use crate::xml::{
    find_tag, find_tag_by_path, find_tag_text, find_tags, find_tags_by_path, get_attribute,
    without_tags, Tag,
};

/// Title boilerplate removed by `get_layer_names(xml, true)`.
const TITLE_PREFIXES: &[&str] = &["Layer:", "WMS:"];
const TITLE_SUFFIXES: &[&str] = &["(WMS)", "(layer)"];

/// Every `Layer` below the root layer, depth first in document order.
pub fn find_layers(xml: &str) -> Vec<Tag<'_>> {
    let Some(root) = find_tag_by_path(xml, &["Capability", "Layer"]).or_else(|| find_tag(xml, "Layer"))
    else {
        return Vec::new();
    };

    let mut layers = Vec::new();
    let mut stack: Vec<Tag<'_>> = find_tags(root.inner, "Layer").into_iter().rev().collect();
    while let Some(layer) = stack.pop() {
        stack.extend(find_tags(layer.inner, "Layer").into_iter().rev());
        layers.push(layer);
    }
    layers
}

/// Layer body without nested `Layer` elements.
fn own_content<'a>(layer: &Tag<'a>) -> Cow<'a, str> {
    without_tags(layer.inner, "Layer")
}

/// Own content of a layer given as XML text (its outer element or a fragment).
fn layer_own_content(layer_xml: &str) -> Cow<'_, str> {
    match find_tag(layer_xml, "Layer") {
        Some(tag) if layer_xml[..tag.start].trim().is_empty() => own_content(&tag),
        _ => without_tags(layer_xml, "Layer"),
    }
}

fn layer_name(layer: &Tag<'_>) -> Option<String> {
    find_tag_text(&own_content(layer), "Name")
}

/// `Name` of every named layer, first occurrence of each id only.
pub fn get_layer_ids(xml: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for id in find_layers(xml).iter().filter_map(layer_name) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// `Title` of every named layer, aligned with [`get_layer_ids`].
///
/// Without `clean` titles are returned as written; `clean` trims them,
/// collapses whitespace and strips boilerplate prefixes and suffixes.
pub fn get_layer_names(xml: &str, clean: bool) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut names = Vec::new();
    for layer in find_layers(xml) {
        let own = own_content(&layer);
        let Some(id) = find_tag_text(&own, "Name") else {
            continue;
        };
        if seen.contains(&id) {
            continue;
        }
        let title = find_tag(&own, "Title")
            .map(|t| t.inner.to_string())
            .unwrap_or_else(|| id.clone());
        names.push(if clean { clean_title(&title) } else { title });
        seen.push(id);
    }
    names
}

/// Trim, collapse whitespace and drop title boilerplate.
pub fn clean_title(title: &str) -> String {
    let decoded = crate::xml::decode_entities(title);
    let mut s = decoded.split_whitespace().collect::<Vec<_>>().join(" ");
    for prefix in TITLE_PREFIXES {
        if let Some(rest) = s.strip_prefix(prefix) {
            s = rest.trim_start().to_string();
        }
    }
    for suffix in TITLE_SUFFIXES {
        if let Some(rest) = s.strip_suffix(suffix) {
            s = rest.trim_end().to_string();
        }
    }
    s
}

/// First layer whose `Name` is `id`.
pub fn find_layer<'a>(xml: &'a str, id: &str) -> Option<Tag<'a>> {
    find_layers(xml)
        .into_iter()
        .find(|layer| layer_name(layer).as_deref() == Some(id))
}

/// Raw time fragments of a layer.
///
/// WMS 1.3.0 uses `<Dimension name="time">`, 1.1.1 `<Extent name="time">`
/// (and sometimes an empty `Dimension` next to it). The first non-empty body
/// wins, split on commas and trimmed.
pub fn parse_layer_dates(layer_xml: &str) -> Vec<String> {
    let own = layer_own_content(layer_xml);
    ["Dimension", "Extent"]
        .iter()
        .find_map(|tag| time_dimension_body(&own, tag))
        .map(|body| {
            body.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn time_dimension_body(xml: &str, tag_name: &str) -> Option<String> {
    find_tags(xml, tag_name)
        .into_iter()
        .filter(|tag| {
            tag.attribute("name")
                .is_some_and(|name| name.eq_ignore_ascii_case("time"))
        })
        .find_map(|tag| tag.text())
}

/// Raw time fragments of layer `id`, unioned over every occurrence.
pub fn get_layer_dates(xml: &str, id: &str) -> OgcResult<Vec<String>> {
    let layers: Vec<_> = find_layers(xml)
        .into_iter()
        .filter(|layer| layer_name(layer).as_deref() == Some(id))
        .collect();
    if layers.is_empty() {
        return Err(OgcError::LayerNotFound(id.to_string()));
    }

    let mut dates: Vec<String> = Vec::new();
    for layer in layers {
        for date in parse_layer_dates(layer.outer) {
            if !dates.contains(&date) {
                dates.push(date);
            }
        }
    }
    Ok(dates)
}

/// The WMS version a document declares; fragments without a recognizable
/// capabilities root are read as 1.3.0.
pub fn document_version(xml: &str) -> WmsVersion {
    match detect(xml) {
        Ok(ServiceVersion::Wms(version)) => version,
        _ => WmsVersion::V1_3_0,
    }
}

/// Normalized days of every named layer, read with the document's version.
pub fn get_all_layer_days(xml: &str) -> BTreeMap<String, Vec<i64>> {
    parse_layers(xml, document_version(xml))
        .into_iter()
        .map(|layer| (layer.id, layer.available_dates))
        .collect()
}

/// Parse one `Layer` element; `None` when it has no `Name`.
pub fn parse_layer(layer_xml: &str) -> Option<LayerDescriptor> {
    parse_layer_content(&layer_own_content(layer_xml), WmsVersion::V1_3_0)
}

fn parse_layer_content(own: &str, version: WmsVersion) -> Option<LayerDescriptor> {
    let id = find_tag_text(own, "Name")?;
    let title = find_tag(own, "Title")
        .map(|t| clean_title(t.inner))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| id.clone());

    let mut layer = LayerDescriptor::new(id, title);
    layer.description = find_tag_text(own, "Abstract");
    layer.keywords = find_tags_by_path(own, &["KeywordList", "Keyword"])
        .iter()
        .filter_map(|k| k.text())
        .collect();
    layer.bbox = parse_geographic_bbox(own, version);
    layer.crs_list = ["CRS", "SRS"]
        .iter()
        .flat_map(|name| find_tags(own, name))
        .filter_map(|tag| tag.text())
        .flat_map(|text| text.split_whitespace().map(str::to_string).collect::<Vec<_>>())
        .collect();

    let styles = find_tags(own, "Style");
    layer.styles = styles
        .iter()
        .filter_map(|style| find_tag_text(style.inner, "Name"))
        .collect();
    layer.legend_url = styles.first().and_then(|style| {
        let resource = find_tag_by_path(style.inner, &["LegendURL", "OnlineResource"])?;
        resource.attribute("xlink:href")
    });

    layer.raw_dates = parse_layer_dates(own);
    layer.available_dates = parse_layer_days(&layer.raw_dates);
    Some(layer)
}

/// Geographic extent of a layer as lon/lat.
///
/// 1.3.0 documents carry `EX_GeographicBoundingBox`, 1.1.1 documents
/// `LatLonBoundingBox`; the version decides which one is tried first.
fn parse_geographic_bbox(own: &str, version: WmsVersion) -> Option<BoundingBox> {
    let bbox = match version {
        WmsVersion::V1_3_0 => parse_ex_geographic(own).or_else(|| parse_lat_lon(own)),
        WmsVersion::V1_1_1 => parse_lat_lon(own).or_else(|| parse_ex_geographic(own)),
    };
    bbox.and_then(BoundingBox::validated)
}

fn parse_ex_geographic(own: &str) -> Option<BoundingBox> {
    let tag = find_tag(own, "EX_GeographicBoundingBox")?;
    let value = |name: &str| find_tag_text(tag.inner, name)?.parse::<f64>().ok();
    Some(BoundingBox::new(
        value("westBoundLongitude")?,
        value("southBoundLatitude")?,
        value("eastBoundLongitude")?,
        value("northBoundLatitude")?,
    ))
}

fn parse_lat_lon(own: &str) -> Option<BoundingBox> {
    let tag = find_tag(own, "LatLonBoundingBox")?;
    let value = |name: &str| tag.attribute(name)?.trim().parse::<f64>().ok();
    Some(BoundingBox::new(
        value("minx")?,
        value("miny")?,
        value("maxx")?,
        value("maxy")?,
    ))
}

/// Every named layer, with repeated ids merged (dates unioned).
pub fn parse_layers(xml: &str, version: WmsVersion) -> Vec<LayerDescriptor> {
    let mut layers: Vec<LayerDescriptor> = Vec::new();
    for tag in find_layers(xml) {
        let Some(layer) = parse_layer_content(&own_content(&tag), version) else {
            continue;
        };
        match layers.iter_mut().find(|l| l.id == layer.id) {
            Some(existing) => existing.merge(layer),
            None => layers.push(layer),
        }
    }
    layers
}

/// Decoded `OnlineResource` href of `Capability/Request/<request>`.
///
/// The `DCPType/HTTP/Get` resource is preferred over any other.
pub fn find_and_parse_capability_url(xml: &str, request: &str) -> Option<String> {
    let operation = find_tag_by_path(xml, &["Capability", "Request", request])?;
    let resource = find_tag_by_path(operation.inner, &["DCPType", "HTTP", "Get", "OnlineResource"])
        .or_else(|| find_tag(operation.inner, "OnlineResource"))?;
    get_attribute(resource.opening(), "xlink:href")
}
