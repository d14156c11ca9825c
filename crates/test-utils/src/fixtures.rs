//! Capabilities documents and constants for one synthetic dataset.
//!
//! The same three layers are served as WMS 1.1.1 and 1.3.0, and the same
//! three coverages as WCS 1.0.0, 1.1.1 and 2.0.1, so cross-version tests can
//! compare readers directly.

/// Raw capabilities documents, compiled into the test binaries.
pub mod capabilities {
    pub const WMS_1_1_1: &str = include_str!("../testdata/wms-1.1.1.xml");
    pub const WMS_1_3_0: &str = include_str!("../testdata/wms-1.3.0.xml");
    pub const WCS_1_0_0: &str = include_str!("../testdata/wcs-1.0.0.xml");
    pub const WCS_1_1_1: &str = include_str!("../testdata/wcs-1.1.1.xml");
    pub const WCS_2_0_1: &str = include_str!("../testdata/wcs-2.0.1.xml");

    /// `DescribeCoverage` response for `prism:rainfall_dekad`.
    pub const DESCRIBE_COVERAGE_1_0_0: &str = include_str!("../testdata/describe-coverage-1.0.0.xml");

    /// WMS 1.1.1 `ServiceExceptionReport`.
    pub const SERVICE_EXCEPTION: &str = include_str!("../testdata/service-exception.xml");

    /// OWS 2.0 `ExceptionReport`.
    pub const OWS_EXCEPTION: &str = include_str!("../testdata/ows-exception.xml");

    /// Every WMS document with its version string.
    pub const WMS_ALL: [(&str, &str); 2] = [("1.1.1", WMS_1_1_1), ("1.3.0", WMS_1_3_0)];

    /// Every WCS document with its version string.
    pub const WCS_ALL: [(&str, &str); 3] = [
        ("1.0.0", WCS_1_0_0),
        ("1.1.1", WCS_1_1_1),
        ("2.0.1", WCS_2_0_1),
    ];
}

/// Endpoint URLs of the synthetic deployment.
pub mod urls {
    pub const BASE: &str = "https://prism.example.org/geoserver";
    pub const WMS: &str = "https://prism.example.org/geoserver/wms";
    pub const WCS: &str = "https://prism.example.org/geoserver/wcs";

    /// Operation URL advertised by the WCS documents.
    pub const WCS_OPERATION: &str = "https://prism.example.org/geoserver/wcs?";
}

/// Layer and coverage identifiers.
pub mod layers {
    /// Dekad rainfall, interval time dimension (listed twice in the WMS documents)
    pub const RAINFALL: &str = "prism:rainfall_dekad";

    /// Explicit list of eight dates
    pub const GDACS_BUFFERS: &str = "prism:lka_gdacs_buffers";

    /// No time dimension
    pub const ADMIN_BOUNDARIES: &str = "prism:admin_boundaries";

    /// Time-invariant coverage
    pub const ELEVATION: &str = "prism:elevation";

    /// Monthly coverage (temporalDomain period in WCS 1.0.0)
    pub const LST_MONTHLY: &str = "prism:lst_monthly";

    pub const WMS_IDS: [&str; 3] = [RAINFALL, GDACS_BUFFERS, ADMIN_BOUNDARIES];
    pub const WMS_TITLES: [&str; 3] = ["Rainfall (dekad)", "GDACS buffers", "Admin boundaries"];

    pub const WCS_IDS: [&str; 3] = [RAINFALL, ELEVATION, LST_MONTHLY];
    pub const WCS_TITLES: [&str; 3] = [
        "Rainfall (dekad)",
        "Elevation",
        "Land surface temperature (monthly)",
    ];

    /// Noon-anchored days of `prism:lka_gdacs_buffers`.
    pub const GDACS_BUFFERS_DAYS: [i64; 8] = [
        1351684800000,
        1388923200000,
        1480593600000,
        1512475200000,
        1542542400000,
        1545048000000,
        1606392000000,
        1607083200000,
    ];
}

/// Common bounding boxes as `[min_x, min_y, max_x, max_y]`.
pub mod bbox {
    /// Global bounding box (-180 to 180, -90 to 90)
    pub const GLOBAL: [f64; 4] = [-180.0, -90.0, 180.0, 90.0];

    /// Extent of `prism:rainfall_dekad`
    pub const RAINFALL: [f64; 4] = [-20.0, -35.0, 55.0, 38.0];

    /// Extent of `prism:elevation`
    pub const ELEVATION: [f64; 4] = [-180.0625, -81.0625, 179.9375, 81.0625];

    /// Extent of `prism:lst_monthly`
    pub const LST_MONTHLY: [f64; 4] = [87.7, 41.6, 119.9, 52.1];

    /// One web mercator tile over Mongolia
    pub const MERCATOR_TILE: [f64; 4] = [
        11897270.578531113,
        6261721.357121639,
        12523442.714243278,
        6887893.492833804,
    ];

    /// Crosses antimeridian (Pacific-centric)
    pub const PACIFIC: [f64; 4] = [160.0, -50.0, -140.0, 50.0];
}

/// Common CRS identifiers.
pub mod crs {
    /// WGS84 geographic
    pub const EPSG_4326: &str = "EPSG:4326";

    /// Web Mercator
    pub const EPSG_3857: &str = "EPSG:3857";

    /// WGS84 with lon/lat order
    pub const CRS_84: &str = "CRS:84";
}
