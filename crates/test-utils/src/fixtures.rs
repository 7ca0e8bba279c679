//! Common GeoJSON fixtures for thumbnail tests.
//!
//! Each constant is a complete GeoJSON document. Extents are noted so tests
//! can assert against them without re-deriving.

/// Single point at the origin. Extent: (0, 0, 0, 0).
pub const POINT_ORIGIN: &str = r#"{"type":"Point","coordinates":[0.0,0.0]}"#;

/// Short line in central Berlin. Extent: (13.37, 52.51, 13.38, 52.52).
pub const SHORT_LINE: &str = r#"{
    "type": "Feature",
    "properties": {"name": "short"},
    "geometry": {
        "type": "LineString",
        "coordinates": [[13.37, 52.51], [13.38, 52.52]]
    }
}"#;

/// Rectangle feature. Extent: (0, 0, 2, 1).
pub const POLYGON_FEATURE: &str = r#"{
    "type": "Feature",
    "properties": {},
    "geometry": {
        "type": "Polygon",
        "coordinates": [[[0.0, 0.0], [2.0, 0.0], [2.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
    }
}"#;

/// San Francisco point and polygon. Extent: (-122.5, 37.7, -122.3, 37.85).
pub const FEATURE_COLLECTION: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {
            "type": "Feature",
            "properties": {"kind": "marker"},
            "geometry": {"type": "Point", "coordinates": [-122.4, 37.8]}
        },
        {
            "type": "Feature",
            "properties": {"kind": "area"},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [-122.5, 37.7], [-122.3, 37.7], [-122.3, 37.85],
                    [-122.5, 37.85], [-122.5, 37.7]
                ]]
            }
        }
    ]
}"#;

/// Continental-scale polygon. Extent: (-125, 25, -65, 50).
pub const CONUS_POLYGON: &str = r#"{
    "type": "Polygon",
    "coordinates": [[[-125.0, 25.0], [-65.0, 25.0], [-65.0, 50.0], [-125.0, 50.0], [-125.0, 25.0]]]
}"#;

/// Common extents as (west, south, east, north).
pub mod bbox {
    /// Global bounding box
    pub const GLOBAL: (f64, f64, f64, f64) = (-180.0, -85.0, 180.0, 85.0);

    /// A city-sized area (roughly zoom 11-12)
    pub const CITY: (f64, f64, f64, f64) = (-122.5, 37.7, -122.3, 37.85);

    /// Single point (degenerate bbox)
    pub const POINT: (f64, f64, f64, f64) = (0.0, 0.0, 0.0, 0.0);
}
