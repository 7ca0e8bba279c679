//! GeoJSON input geometry.
//!
//! Accepts any GeoJSON object (bare geometry, `Feature` or
//! `FeatureCollection`) and flattens it into a list of [`Shape`]s. Features
//! with a `null` geometry contribute nothing; the whole input must still carry
//! at least one coordinate.

use serde::Deserialize;
use serde_json::Value;

use crate::bbox::BoundingBox;
use crate::error::InputError;

/// `[longitude, latitude]` in degrees.
pub type Position = [f64; 2];

/// One primitive geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Point(Position),
    MultiPoint(Vec<Position>),
    LineString(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    /// Rings; the first is the exterior.
    Polygon(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

impl Shape {
    fn for_each_position(&self, f: &mut impl FnMut(&Position)) {
        match self {
            Shape::Point(p) => f(p),
            Shape::MultiPoint(points) | Shape::LineString(points) => points.iter().for_each(f),
            Shape::MultiLineString(lines) | Shape::Polygon(lines) => {
                lines.iter().flatten().for_each(f)
            }
            Shape::MultiPolygon(polygons) => polygons.iter().flatten().flatten().for_each(f),
        }
    }
}

/// An immutable, validated input geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    shapes: Vec<Shape>,
}

impl Geometry {
    /// Parse a GeoJSON document.
    pub fn from_geojson(text: &str) -> Result<Self, InputError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Build from an already-parsed GeoJSON value.
    pub fn from_value(value: Value) -> Result<Self, InputError> {
        if value.is_null() {
            return Err(InputError::MissingGeometry);
        }
        if !value.is_object() {
            return Err(InputError::MalformedGeometry(format!(
                "expected a GeoJSON object, got {}",
                json_type_name(&value)
            )));
        }

        let raw: RawGeoJson = serde_json::from_value(value)?;
        let mut shapes = Vec::new();
        raw.flatten_into(&mut shapes)?;
        Self::from_shapes(shapes)
    }

    /// Build from shapes directly.
    pub fn from_shapes(shapes: Vec<Shape>) -> Result<Self, InputError> {
        let geometry = Self { shapes };
        if geometry.coordinate_count() == 0 {
            return Err(InputError::EmptyGeometry);
        }
        Ok(geometry)
    }

    /// Convenience constructor for a single point.
    pub fn point(lon: f64, lat: f64) -> Self {
        Self {
            shapes: vec![Shape::Point([lon, lat])],
        }
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Visit every coordinate in document order.
    pub fn for_each_position(&self, mut f: impl FnMut(&Position)) {
        for shape in &self.shapes {
            shape.for_each_position(&mut f);
        }
    }

    pub fn coordinate_count(&self) -> usize {
        let mut count = 0;
        self.for_each_position(|_| count += 1);
        count
    }

    /// Extent of all coordinates as (west, south, east, north).
    pub fn bbox(&self) -> BoundingBox {
        let mut bbox: Option<BoundingBox> = None;
        self.for_each_position(|p| {
            bbox.get_or_insert_with(|| BoundingBox::from_point(p[0], p[1]))
                .extend(p[0], p[1]);
        });
        // Construction guarantees at least one coordinate.
        bbox.unwrap_or_else(|| BoundingBox::from_point(0.0, 0.0))
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Wire form of a GeoJSON object before validation.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum RawGeoJson {
    Point {
        coordinates: Vec<f64>,
    },
    MultiPoint {
        coordinates: Vec<Vec<f64>>,
    },
    LineString {
        coordinates: Vec<Vec<f64>>,
    },
    MultiLineString {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    Polygon {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Vec<f64>>>>,
    },
    GeometryCollection {
        geometries: Vec<RawGeoJson>,
    },
    Feature {
        geometry: Option<Box<RawGeoJson>>,
    },
    FeatureCollection {
        features: Vec<RawGeoJson>,
    },
}

impl RawGeoJson {
    fn flatten_into(self, shapes: &mut Vec<Shape>) -> Result<(), InputError> {
        match self {
            RawGeoJson::Point { coordinates } => shapes.push(Shape::Point(position(coordinates)?)),
            RawGeoJson::MultiPoint { coordinates } => {
                shapes.push(Shape::MultiPoint(positions(coordinates)?))
            }
            RawGeoJson::LineString { coordinates } => {
                shapes.push(Shape::LineString(positions(coordinates)?))
            }
            RawGeoJson::MultiLineString { coordinates } => shapes.push(Shape::MultiLineString(
                coordinates
                    .into_iter()
                    .map(positions)
                    .collect::<Result<_, _>>()?,
            )),
            RawGeoJson::Polygon { coordinates } => shapes.push(Shape::Polygon(
                coordinates
                    .into_iter()
                    .map(positions)
                    .collect::<Result<_, _>>()?,
            )),
            RawGeoJson::MultiPolygon { coordinates } => shapes.push(Shape::MultiPolygon(
                coordinates
                    .into_iter()
                    .map(|rings| rings.into_iter().map(positions).collect())
                    .collect::<Result<_, _>>()?,
            )),
            RawGeoJson::GeometryCollection { geometries } => {
                for geometry in geometries {
                    geometry.flatten_into(shapes)?;
                }
            }
            RawGeoJson::Feature { geometry } => {
                if let Some(geometry) = geometry {
                    geometry.flatten_into(shapes)?;
                }
            }
            RawGeoJson::FeatureCollection { features } => {
                for feature in features {
                    match feature {
                        RawGeoJson::Feature { .. } => feature.flatten_into(shapes)?,
                        _ => {
                            return Err(InputError::MalformedGeometry(
                                "FeatureCollection members must be Features".to_string(),
                            ))
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

fn position(values: Vec<f64>) -> Result<Position, InputError> {
    if values.len() < 2 {
        return Err(InputError::MalformedGeometry(format!(
            "position needs at least two numbers, got {}",
            values.len()
        )));
    }
    let (lon, lat) = (values[0], values[1]);
    if !lon.is_finite() || !lat.is_finite() {
        return Err(InputError::MalformedGeometry(
            "position contains a non-finite number".to_string(),
        ));
    }
    Ok([lon, lat])
}

fn positions(values: Vec<Vec<f64>>) -> Result<Vec<Position>, InputError> {
    values.into_iter().map(position).collect()
}
