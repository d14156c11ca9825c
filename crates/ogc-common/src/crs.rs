//! Coordinate Reference System identifiers and axis order.
//!
//! Capabilities documents spell the same CRS many ways (`EPSG:4326`,
//! `urn:ogc:def:crs:EPSG::4326`, `http://www.opengis.net/def/crs/EPSG/0/4326`,
//! ...). Everything here works on the normalized [`CrsCode`]; CRSs that are not
//! in the table fall back to x/y axis order. Adding a CRS with a different
//! native order means adding a variant and its `axis_order` arm.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Well-known CRS codes with a known axis order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsCode {
    /// WGS84 Geographic, native axis order lat/lon
    Epsg4326,
    /// WGS84 Geographic with lon/lat axis order (OGC CRS84)
    Crs84,
    /// Web Mercator (meters)
    Epsg3857,
    /// NAD83 Geographic
    Epsg4269,
    /// Lambert Conformal Conic (CONUS)
    Epsg5070,
    /// Polar Stereographic North
    Epsg3413,
    /// Polar Stereographic South
    Epsg3031,
}

impl CrsCode {
    /// Parse a CRS identifier in any of the common OGC spellings.
    ///
    /// Accepts formats like:
    /// - "EPSG:4326", "epsg:4326"
    /// - "CRS:84", "OGC:CRS84", "urn:ogc:def:crs:OGC:1.3:CRS84"
    /// - "urn:ogc:def:crs:EPSG::4326", "urn:ogc:def:crs:EPSG:6.6:4326"
    /// - "http://www.opengis.net/def/crs/EPSG/0/4326"
    /// - "http://www.opengis.net/gml/srs/epsg.xml#4326"
    pub fn from_identifier(s: &str) -> Option<Self> {
        let normalized = s.trim().to_uppercase();

        if normalized == "CRS:84" || normalized.ends_with("CRS84") {
            return Some(CrsCode::Crs84);
        }

        if !normalized.contains("EPSG") {
            return None;
        }

        let code = normalized
            .rsplit(|c| c == ':' || c == '/' || c == '#')
            .next()?;

        match code {
            "4326" => Some(CrsCode::Epsg4326),
            "3857" | "900913" => Some(CrsCode::Epsg3857),
            "4269" => Some(CrsCode::Epsg4269),
            "5070" => Some(CrsCode::Epsg5070),
            "3413" => Some(CrsCode::Epsg3413),
            "3031" => Some(CrsCode::Epsg3031),
            _ => None,
        }
    }

    /// The CRS's native axis order, as used by WMS 1.3.0 and `ows:BoundingBox`:
    /// - Geographic EPSG CRS: lat, lon (y, x)
    /// - CRS84 and projected CRS: easting, northing (x, y)
    pub fn axis_order(&self) -> AxisOrder {
        match self {
            CrsCode::Epsg4326 | CrsCode::Epsg4269 => AxisOrder::LatLon,
            _ => AxisOrder::XY,
        }
    }

    /// Check if this is a geographic (lat/lon) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(
            self,
            CrsCode::Epsg4326 | CrsCode::Crs84 | CrsCode::Epsg4269
        )
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            CrsCode::Epsg4326 => "EPSG:4326",
            CrsCode::Crs84 => "CRS:84",
            CrsCode::Epsg3857 => "EPSG:3857",
            CrsCode::Epsg4269 => "EPSG:4269",
            CrsCode::Epsg5070 => "EPSG:5070",
            CrsCode::Epsg3413 => "EPSG:3413",
            CrsCode::Epsg3031 => "EPSG:3031",
        };
        write!(f, "{}", code)
    }
}

/// Axis order for coordinate interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisOrder {
    /// X (longitude/easting), Y (latitude/northing)
    XY,
    /// Y (latitude/northing), X (longitude/easting)
    LatLon,
}

/// Native axis order of an arbitrary CRS identifier; unknown CRSs are x/y.
pub fn native_axis_order(identifier: &str) -> AxisOrder {
    CrsCode::from_identifier(identifier)
        .map(|code| code.axis_order())
        .unwrap_or(AxisOrder::XY)
}

/// True if the identifier names a geographic CRS from the table.
pub fn is_geographic(identifier: &str) -> bool {
    CrsCode::from_identifier(identifier).is_some_and(|code| code.is_geographic())
}
