//! Layer descriptors shared by the WMS and WCS readers.

use serde::{Deserialize, Serialize};

use crate::time::{day_range, union_days, TimeRange};
use crate::BoundingBox;

/// Identifier helpers for layer and coverage ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerId(pub String);

impl LayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Split a compound layer id like "geonode:rivers" into namespace and short name.
    ///
    /// The split happens on the first `:`. Legacy WCS ids use `__` as the
    /// separator ("geonode__rivers") and are split there when no colon exists.
    pub fn parse(s: &str) -> (Option<&str>, &str) {
        if let Some((namespace, short)) = s.split_once(':') {
            return (Some(namespace), short);
        }
        match s.split_once("__") {
            Some((namespace, short)) if !namespace.is_empty() => (Some(namespace), short),
            _ => (None, s),
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        Self::parse(&self.0).0
    }

    pub fn short_name(&self) -> &str {
        Self::parse(&self.0).1
    }

    /// Whether `wanted` names this layer.
    ///
    /// Exact matches always count. Unless `strict`, a bare short name also
    /// matches a namespaced id ("rivers" matches "geonode:rivers"), but a
    /// different namespace never does.
    pub fn matches(&self, wanted: &str, strict: bool) -> bool {
        if self.0 == wanted {
            return true;
        }
        if strict {
            return false;
        }
        match Self::parse(wanted) {
            (None, short) => self.short_name() == short,
            (Some(_), _) => false,
        }
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// True if any of `ids` names the wanted layer (see [`LayerId::matches`]).
pub fn has_layer_id<S: AsRef<str>>(ids: &[S], wanted: &str, strict: bool) -> bool {
    ids.iter()
        .any(|id| LayerId::new(id.as_ref()).matches(wanted, strict))
}

/// Everything a consumer needs to know about one layer or coverage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDescriptor {
    /// Unique layer identifier ("namespace:shortName" or "shortName")
    pub id: String,

    pub namespace: Option<String>,

    pub short_name: String,

    /// Human-readable title
    pub title: String,

    #[serde(rename = "abstract")]
    pub description: Option<String>,

    pub keywords: Vec<String>,

    /// Geographic extent, always lon/lat
    pub bbox: Option<BoundingBox>,

    /// Advertised CRS/SRS identifiers, in document order
    pub crs_list: Vec<String>,

    /// Style names, in document order
    pub styles: Vec<String>,

    /// Noon-anchored epoch ms, ascending and unique
    pub available_dates: Vec<i64>,

    /// Date fragments exactly as they appear in the document
    pub raw_dates: Vec<String>,

    pub legend_url: Option<String>,
}

impl LayerDescriptor {
    /// A descriptor with only identity fields set.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let id = id.into();
        let layer_id = LayerId::new(id.clone());
        Self {
            namespace: layer_id.namespace().map(str::to_string),
            short_name: layer_id.short_name().to_string(),
            id,
            title: title.into(),
            description: None,
            keywords: Vec::new(),
            bbox: None,
            crs_list: Vec::new(),
            styles: Vec::new(),
            available_dates: Vec::new(),
            raw_dates: Vec::new(),
            legend_url: None,
        }
    }

    /// Fold a second descriptor for the same id into this one.
    ///
    /// Dates are unioned; every other field keeps the first occurrence and
    /// only fills gaps from `other`.
    pub fn merge(&mut self, other: LayerDescriptor) {
        self.available_dates = union_days(&self.available_dates, &other.available_dates);
        for raw in other.raw_dates {
            if !self.raw_dates.contains(&raw) {
                self.raw_dates.push(raw);
            }
        }
        if self.bbox.is_none() {
            self.bbox = other.bbox;
        }
        if self.description.is_none() {
            self.description = other.description;
        }
        if self.legend_url.is_none() {
            self.legend_url = other.legend_url;
        }
    }

    /// Whether the layer has a time dimension.
    pub fn is_temporal(&self) -> bool {
        !self.available_dates.is_empty()
    }

    /// First and last available day.
    pub fn date_range(&self) -> Option<TimeRange> {
        day_range(&self.available_dates)
    }

    /// Check if this layer advertises a given CRS identifier.
    pub fn supports_crs(&self, crs: &str) -> bool {
        self.crs_list.iter().any(|c| c.eq_ignore_ascii_case(crs))
    }

    /// Get the default style for this layer.
    pub fn default_style(&self) -> Option<&str> {
        self.styles.first().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_layer_id() {
        assert_eq!(
            LayerId::parse("geonode:col_second_level_admin_boundaries"),
            (Some("geonode"), "col_second_level_admin_boundaries")
        );
        assert_eq!(
            LayerId::parse("col_second_level_admin_boundaries"),
            (None, "col_second_level_admin_boundaries")
        );
        assert_eq!(
            LayerId::parse("geonode__col_second_level_admin_boundaries"),
            (Some("geonode"), "col_second_level_admin_boundaries")
        );
        // only the first colon splits
        assert_eq!(LayerId::parse("a:b:c"), (Some("a"), "b:c"));
    }

    #[test]
    fn test_has_layer_id() {
        let ids = ["ns1:name"];
        assert!(!has_layer_id(&ids, "ns2:name", false));
        assert!(has_layer_id(&ids, "ns1:name", false));
        assert!(has_layer_id(&ids, "name", false));
        assert!(!has_layer_id(&ids, "name", true));
        assert!(has_layer_id(&ids, "ns1:name", true));
        assert!(!has_layer_id(&ids, "ns2:name", true));
    }

    #[test]
    fn test_merge_unions_dates() {
        let mut a = LayerDescriptor::new("prism:floods", "Floods");
        a.available_dates = vec![1, 3];
        let mut b = LayerDescriptor::new("prism:floods", "Floods (copy)");
        b.available_dates = vec![2, 3];
        b.description = Some("second".into());

        a.merge(b);
        assert_eq!(a.available_dates, vec![1, 2, 3]);
        assert_eq!(a.title, "Floods");
        assert_eq!(a.description.as_deref(), Some("second"));
    }

    #[test]
    fn test_new_splits_namespace() {
        let layer = LayerDescriptor::new("prism:lka_gdacs_buffers", "Buffers");
        assert_eq!(layer.namespace.as_deref(), Some("prism"));
        assert_eq!(layer.short_name, "lka_gdacs_buffers");
        assert!(!layer.is_temporal());
    }
}
