//! JSON shapes printed by the probe.

use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use serde::Serialize;

use ogc_common::time::format_day;
use ogc_common::LayerDescriptor;

#[derive(Debug, Serialize, PartialEq)]
pub struct LayerSummary {
    pub id: String,
    pub title: String,
    pub bbox: Option<[f64; 4]>,
    pub style: Option<String>,
    pub temporal: bool,
    pub days: usize,
    pub first_day: Option<String>,
    pub last_day: Option<String>,
}

impl LayerSummary {
    pub fn from_descriptor(layer: &LayerDescriptor) -> Self {
        let range = layer.date_range();
        let day = |at: Option<i64>| at.and_then(format_day);
        Self {
            id: layer.id.clone(),
            title: layer.title.clone(),
            bbox: layer.bbox.map(|b| b.to_array()),
            style: layer.default_style().map(str::to_string),
            temporal: layer.is_temporal(),
            days: layer.available_dates.len(),
            first_day: day(range.map(|r| r.start.timestamp_millis())),
            last_day: day(range.map(|r| r.end.timestamp_millis())),
        }
    }

    pub fn list(layers: &[LayerDescriptor]) -> Vec<Self> {
        layers.iter().map(Self::from_descriptor).collect()
    }
}

/// Days as `YYYY-MM-DD` per layer id.
#[derive(Debug, Serialize, PartialEq)]
#[serde(transparent)]
pub struct DaysOutput(pub BTreeMap<String, Vec<String>>);

impl DaysOutput {
    pub fn select(days: BTreeMap<String, Vec<i64>>, layer: Option<&str>) -> Result<Self> {
        let formatted = |ms: &[i64]| ms.iter().filter_map(|d| format_day(*d)).collect::<Vec<_>>();
        let map = match layer {
            Some(id) => {
                let ms = days
                    .get(id)
                    .ok_or_else(|| anyhow!("layer \"{}\" does not exist", id))?;
                BTreeMap::from([(id.to_string(), formatted(ms.as_slice()))])
            }
            None => days
                .iter()
                .map(|(id, ms)| (id.clone(), formatted(ms.as_slice())))
                .collect(),
        };
        Ok(Self(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ogc_protocol::wms::parse_layers;
    use ogc_protocol::WmsVersion;
    use test_utils::{capabilities, layers};

    #[test]
    fn test_layer_summary() {
        let parsed = parse_layers(capabilities::WMS_1_3_0, WmsVersion::V1_3_0);
        let summary = LayerSummary::list(&parsed);
        assert_eq!(summary.len(), 3);
        assert_eq!(summary[1].id, layers::GDACS_BUFFERS);
        assert_eq!(summary[1].days, 8);
        assert_eq!(summary[1].first_day.as_deref(), Some("2012-10-31"));
        assert_eq!(summary[1].last_day.as_deref(), Some("2020-12-04"));
        assert!(summary[1].temporal);
        assert_eq!(summary[0].style.as_deref(), Some("rainfall"));
        assert_eq!(summary[2].days, 0);
        assert!(!summary[2].temporal);
        assert_eq!(summary[2].first_day, None);
    }

    #[test]
    fn test_days_select() {
        let mut days = BTreeMap::new();
        days.insert("a".to_string(), vec![1351684800000]);
        days.insert("b".to_string(), vec![]);

        let all = DaysOutput::select(days.clone(), None).unwrap();
        assert_eq!(all.0.len(), 2);
        assert_eq!(
            serde_json::to_string(&all).unwrap(),
            r#"{"a":["2012-10-31"],"b":[]}"#
        );

        let one = DaysOutput::select(days.clone(), Some("a")).unwrap();
        assert_eq!(one.0.len(), 1);
        assert!(DaysOutput::select(days, Some("c")).is_err());
    }
}
