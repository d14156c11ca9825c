//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

use crate::error::{OgcError, OgcResult};

/// A geographic or projected bounding box.
///
/// Layer extents are always stored in WGS84 lon/lat order
/// (`min_x` = west, `min_y` = south, `max_x` = east, `max_y` = north).
/// Request bboxes may be in any CRS; the request builder decides whether the
/// axes have to be flipped on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Build a bbox from a lower and an upper corner, both `(x, y)`.
    pub fn from_corners(lower: (f64, f64), upper: (f64, f64)) -> Self {
        Self::new(lower.0, lower.1, upper.0, upper.1)
    }

    /// Parse a WMS BBOX parameter string: "minx,miny,maxx,maxy"
    pub fn from_wms_string(s: &str) -> Result<Self, BboxParseError> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(BboxParseError::InvalidFormat(s.to_string()));
        }

        let parse = |part: &str| {
            part.parse::<f64>()
                .map_err(|_| BboxParseError::InvalidNumber(part.to_string()))
        };

        Ok(Self {
            min_x: parse(parts[0])?,
            min_y: parse(parts[1])?,
            max_x: parse(parts[2])?,
            max_y: parse(parts[3])?,
        })
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// `[min_x, min_y, max_x, max_y]`
    pub fn to_array(&self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }

    /// Swap the x and y axes (lon/lat <-> lat/lon).
    pub fn flipped(&self) -> Self {
        Self::new(self.min_y, self.min_x, self.max_y, self.max_x)
    }

    /// True when all four values are finite and `min <= max` on both axes.
    pub fn is_valid(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
            && self.min_x <= self.max_x
            && self.min_y <= self.max_y
    }

    /// Returns the bbox only if it passes [`BoundingBox::is_valid`].
    pub fn validated(self) -> Option<Self> {
        self.is_valid().then_some(self)
    }

    /// Reject malformed extents, including ones that wrap the antimeridian.
    pub fn check_extent(&self) -> OgcResult<()> {
        if self.is_valid() {
            return Ok(());
        }
        Err(OgcError::InvalidBbox(format!(
            "the extent {} seems malformed or else may contain \"wrapping\" which is not supported",
            self.to_param_string(None)
        )))
    }

    /// Format as a request parameter: "minx,miny,maxx,maxy".
    ///
    /// With `digits`, every coordinate is rounded to that many decimals so
    /// generated URLs stay short and stable.
    pub fn to_param_string(&self, digits: Option<usize>) -> String {
        self.to_array()
            .iter()
            .map(|v| format_coordinate(*v, digits))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Derive an output image size for this extent.
    ///
    /// The longer side gets `resolution` pixels per unit of the shorter side's
    /// extent, the other side keeps the aspect ratio. Results larger than
    /// `max_pixels` on either side are scaled down so the longer side is
    /// exactly `max_pixels`.
    pub fn scale_image(&self, max_pixels: u32, resolution: u32) -> ImageSize {
        let (w, h) = (self.width(), self.height());
        if !(w > 0.0 && h > 0.0) {
            return ImageSize::new(resolution.min(max_pixels), resolution.min(max_pixels));
        }

        let resolution = resolution as f64;
        let mut width = (resolution * h).ceil();
        let mut height = (resolution * h * h / w).ceil();

        let largest = width.max(height);
        let max_pixels = max_pixels as f64;
        if largest > max_pixels {
            if width >= height {
                height = (height * max_pixels / width).round();
                width = max_pixels;
            } else {
                width = (width * max_pixels / height).round();
                height = max_pixels;
            }
        }

        ImageSize::new(width.max(1.0) as u32, height.max(1.0) as u32)
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(v: [f64; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

/// Format one coordinate the way request parameters expect it.
///
/// Without `digits` the shortest round-trip representation is used, so
/// `100.0` becomes `"100"` and `103.09704125797317` is kept verbatim.
pub fn format_coordinate(value: f64, digits: Option<usize>) -> String {
    match digits {
        Some(d) => format!("{:.*}", d, value),
        None => format!("{}", value),
    }
}

/// Pixel dimensions of a requested image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid BBOX format: {0}. Expected 'minx,miny,maxx,maxy'")]
    InvalidFormat(String),

    #[error("Invalid number in BBOX: {0}")]
    InvalidNumber(String),
}
