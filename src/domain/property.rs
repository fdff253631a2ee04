// src/domain/property.rs

use crate::errors::GeometryError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A WGS84 position. On the wire it is a GeoJSON position: `[lon, lat]`,
/// optionally followed by altitude, which is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 2]")]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl TryFrom<Vec<f64>> for Coordinate {
    type Error = String;

    fn try_from(position: Vec<f64>) -> Result<Self, Self::Error> {
        match position.as_slice() {
            [lon, lat, ..] => Ok(Self::new(*lon, *lat)),
            _ => Err(format!(
                "position needs at least 2 elements, got {}",
                position.len()
            )),
        }
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.lon, c.lat]
    }
}

/// The subset of GeoJSON geometries the map and the drawing tool deal in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Coordinate },
    LineString { coordinates: Vec<Coordinate> },
    Polygon { coordinates: Vec<Vec<Coordinate>> },
}

pub type GeometryCollection = Vec<Geometry>;

/// A property as the backend reported it, normalized out of the wire shape.
/// Never patched: a fetch replaces the whole dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRecord {
    pub id: String,
    pub title: String,
    pub price: Option<f64>,
    pub location: Coordinate,
}

/// Snapshot of the outer ring the user drew. Read once per search, never retained.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnPolygon {
    pub ring: Vec<Coordinate>,
}

impl DrawnPolygon {
    pub fn new(ring: Vec<Coordinate>) -> Self {
        Self { ring }
    }

    /// Picks the first polygon out of whatever the drawing tool holds.
    /// Other geometry types are ignored.
    pub fn from_geometries(geometries: &[Geometry]) -> Result<Self, GeometryError> {
        geometries
            .iter()
            .find_map(|g| match g {
                Geometry::Polygon { coordinates } => coordinates.first().cloned(),
                _ => None,
            })
            .map(Self::new)
            .ok_or(GeometryError::NoPolygon)
    }

    /// A usable ring is closed, has at least 4 points and 3 distinct vertices.
    pub fn validate(&self) -> Result<(), GeometryError> {
        let ring = &self.ring;
        if ring.len() < 4 {
            return Err(GeometryError::TooFewPoints(ring.len()));
        }
        if ring.first() != ring.last() {
            return Err(GeometryError::Unclosed);
        }

        let distinct = ring[..ring.len() - 1]
            .iter()
            .map(|c| (vertex_bits(c.lon), vertex_bits(c.lat)))
            .collect::<HashSet<_>>()
            .len();
        if distinct < 3 {
            return Err(GeometryError::Degenerate(distinct));
        }

        Ok(())
    }

    pub fn to_geometry(&self) -> Geometry {
        Geometry::Polygon {
            coordinates: vec![self.ring.clone()],
        }
    }
}

// -0.0 and 0.0 are the same vertex
fn vertex_bits(v: f64) -> u64 {
    if v == 0.0 {
        0.0f64.to_bits()
    } else {
        v.to_bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(points: &[(f64, f64)]) -> DrawnPolygon {
        DrawnPolygon::new(points.iter().map(|&(lon, lat)| Coordinate::new(lon, lat)).collect())
    }

    #[test]
    fn closed_triangle_is_valid() {
        let polygon = ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        assert_eq!(polygon.validate(), Ok(()));
    }

    #[test]
    fn open_ring_is_rejected() {
        let polygon = ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        assert_eq!(polygon.validate(), Err(GeometryError::Unclosed));
    }

    #[test]
    fn short_ring_is_rejected() {
        let polygon = ring(&[(0.0, 0.0), (1.0, 0.0), (0.0, 0.0)]);
        assert_eq!(polygon.validate(), Err(GeometryError::TooFewPoints(3)));
    }

    #[test]
    fn repeated_vertices_are_degenerate() {
        let polygon = ring(&[(0.0, 0.0), (1.0, 1.0), (1.0, 1.0), (0.0, 0.0)]);
        assert_eq!(polygon.validate(), Err(GeometryError::Degenerate(2)));
    }

    #[test]
    fn signed_zero_is_one_vertex() {
        let polygon = ring(&[(0.0, 0.0), (-0.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        assert_eq!(polygon.validate(), Err(GeometryError::Degenerate(2)));
    }

    #[test]
    fn position_altitude_is_dropped() {
        let c: Coordinate = serde_json::from_str("[1.0, 2.0, 30.0]").unwrap();
        assert_eq!(c, Coordinate::new(1.0, 2.0));
        assert!(serde_json::from_str::<Coordinate>("[1.0]").is_err());
    }

    #[test]
    fn first_polygon_wins_and_other_shapes_are_skipped() {
        let square = vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(2.0, 0.0),
            Coordinate::new(2.0, 2.0),
            Coordinate::new(0.0, 0.0),
        ];
        let geometries = vec![
            Geometry::LineString {
                coordinates: vec![Coordinate::new(5.0, 5.0), Coordinate::new(6.0, 6.0)],
            },
            Geometry::Polygon {
                coordinates: vec![square.clone()],
            },
        ];

        let polygon = DrawnPolygon::from_geometries(&geometries).unwrap();
        assert_eq!(polygon.ring, square);
    }

    #[test]
    fn no_polygon_among_geometries() {
        let geometries = vec![Geometry::Point {
            coordinates: Coordinate::new(1.0, 1.0),
        }];
        assert_eq!(
            DrawnPolygon::from_geometries(&geometries),
            Err(GeometryError::NoPolygon)
        );
        assert_eq!(DrawnPolygon::from_geometries(&[]), Err(GeometryError::NoPolygon));
    }

    #[test]
    fn geometry_uses_geojson_shape() {
        let json = serde_json::to_value(Geometry::Point {
            coordinates: Coordinate::new(-111.9, 40.7),
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "Point", "coordinates": [-111.9, 40.7] })
        );
    }
}
