//! Common types and utilities shared by the OGC protocol readers and clients.

pub mod bbox;
pub mod crs;
pub mod error;
pub mod layer;
pub mod time;

pub use bbox::{BoundingBox, ImageSize};
pub use crs::{AxisOrder, CrsCode};
pub use error::{OgcError, OgcResult};
pub use layer::{has_layer_id, LayerDescriptor, LayerId};
pub use time::{parse_temporal_extent, DateParseError, TemporalExtent, TimeRange};
