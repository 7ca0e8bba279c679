//! GeoJSON parsing and extent tests.

use serde_json::json;
use test_utils::fixtures;
use thumbnail_common::error::InputError;
use thumbnail_common::geometry::{Geometry, Shape};

// ============================================================================
// Accepted inputs
// ============================================================================

#[test]
fn test_feature_collection_extent() {
    let geometry = Geometry::from_geojson(fixtures::FEATURE_COLLECTION).unwrap();
    let bbox = geometry.bbox();
    assert_eq!(bbox.min_x, -122.5);
    assert_eq!(bbox.min_y, 37.7);
    assert_eq!(bbox.max_x, -122.3);
    assert_eq!(bbox.max_y, 37.85);
}

#[test]
fn test_polygon_feature() {
    let geometry = Geometry::from_geojson(fixtures::POLYGON_FEATURE).unwrap();
    assert_eq!(geometry.shapes().len(), 1);
    assert!(matches!(geometry.shapes()[0], Shape::Polygon(_)));
    assert_eq!(geometry.bbox().to_array(), [0.0, 0.0, 2.0, 1.0]);
}

#[test]
fn test_geometry_collection_flattens() {
    let geometry = Geometry::from_value(json!({
        "type": "GeometryCollection",
        "geometries": [
            { "type": "Point", "coordinates": [5.0, 5.0] },
            { "type": "MultiPoint", "coordinates": [[-5.0, 1.0], [3.0, -2.0]] }
        ]
    }))
    .unwrap();
    assert_eq!(geometry.shapes().len(), 2);
    assert_eq!(geometry.coordinate_count(), 3);
    assert_eq!(geometry.bbox().to_array(), [-5.0, -2.0, 5.0, 5.0]);
}

#[test]
fn test_multipolygon_extent() {
    let geometry = Geometry::from_value(json!({
        "type": "MultiPolygon",
        "coordinates": [
            [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
            [[[10.0, 10.0], [11.0, 10.0], [11.0, 12.0], [10.0, 10.0]]]
        ]
    }))
    .unwrap();
    assert_eq!(geometry.bbox().to_array(), [0.0, 0.0, 11.0, 12.0]);
}

#[test]
fn test_feature_with_null_geometry_is_skipped() {
    let geometry = Geometry::from_value(json!({
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature", "geometry": null, "properties": {} },
            { "type": "Feature", "geometry": { "type": "Point", "coordinates": [1.0, 2.0] } }
        ]
    }))
    .unwrap();
    assert_eq!(geometry.coordinate_count(), 1);
}

// ============================================================================
// Rejected inputs
// ============================================================================

#[test]
fn test_empty_feature_collection_rejected() {
    let result = Geometry::from_value(json!({ "type": "FeatureCollection", "features": [] }));
    assert_eq!(result, Err(InputError::EmptyGeometry));
}

#[test]
fn test_unknown_type_rejected() {
    let result = Geometry::from_value(json!({ "type": "Circle", "radius": 3 }));
    assert!(matches!(result, Err(InputError::MalformedGeometry(_))));
}

#[test]
fn test_non_object_rejected() {
    let result = Geometry::from_value(json!([1.0, 2.0]));
    assert!(matches!(result, Err(InputError::MalformedGeometry(_))));
}

#[test]
fn test_invalid_json_rejected() {
    let result = Geometry::from_geojson("{ \"type\": ");
    assert!(matches!(result, Err(InputError::MalformedGeometry(_))));
}

#[test]
fn test_feature_collection_with_bare_geometry_rejected() {
    let result = Geometry::from_value(json!({
        "type": "FeatureCollection",
        "features": [{ "type": "Point", "coordinates": [0.0, 0.0] }]
    }));
    assert!(matches!(result, Err(InputError::MalformedGeometry(_))));
}
