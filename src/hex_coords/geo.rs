/// Geographic points, bounds and the flat-earth projection
///
/// The projection treats one degree of latitude as a fixed number of metres
/// and scales longitude by the cosine of the reference latitude. That is only
/// accurate over regional areas (tens of kilometres); it is a known
/// limitation, not something to correct silently.

use glam::DVec2;
use h3o::LatLng;
use serde::{Deserialize, Serialize};

use crate::constants::{
    HEX_EDGE_COUNT, HEX_VERTEX_ANGLE_OFFSET_DEG, HEX_VERTEX_ANGLE_STEP_DEG, METERS_PER_DEGREE_LAT,
};

/// Latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Degree-space vector, `x` = longitude and `y` = latitude.
    pub fn to_dvec2(self) -> DVec2 {
        DVec2::new(self.lng, self.lat)
    }

    pub fn from_dvec2(v: DVec2) -> Self {
        Self { lat: v.y, lng: v.x }
    }

    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        geo_distance(*self, *other)
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

/// Axis-aligned lat/lng rectangle, as reported by a map view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
}

impl GeoBounds {
    pub fn new(south_west: GeoPoint, north_east: GeoPoint) -> Self {
        Self { south_west, north_east }
    }

    /// Smallest bounds containing every point; `None` for an empty slice.
    pub fn from_points(points: &[GeoPoint]) -> Option<Self> {
        let first = points.first()?;
        let mut bounds = GeoBounds::new(*first, *first);
        for p in &points[1..] {
            bounds.south_west.lat = bounds.south_west.lat.min(p.lat);
            bounds.south_west.lng = bounds.south_west.lng.min(p.lng);
            bounds.north_east.lat = bounds.north_east.lat.max(p.lat);
            bounds.north_east.lng = bounds.north_east.lng.max(p.lng);
        }
        Some(bounds)
    }

    /// Inclusive on every side.
    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }

    /// Grow each side by `ratio` times the span on that axis.
    pub fn pad(&self, ratio: f64) -> Self {
        let lat_buffer = (self.north_east.lat - self.south_west.lat).abs() * ratio;
        let lng_buffer = (self.north_east.lng - self.south_west.lng).abs() * ratio;
        Self {
            south_west: GeoPoint::new(self.south_west.lat - lat_buffer, self.south_west.lng - lng_buffer),
            north_east: GeoPoint::new(self.north_east.lat + lat_buffer, self.north_east.lng + lng_buffer),
        }
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }
}

/// Project a planar offset in metres around `center` to a geographic point.
pub fn planar_to_geo(x: f64, y: f64, center: GeoPoint) -> GeoPoint {
    let lat = center.lat + y / METERS_PER_DEGREE_LAT;
    let lng = center.lng + x / (METERS_PER_DEGREE_LAT * center.lat.to_radians().cos());
    GeoPoint { lat, lng }
}

/// The six corners of a pointy-top hexagon.
///
/// Vertex `i` sits at `i * 60° + 30°`, so edge `i` (vertex `i` to vertex
/// `(i + 1) % 6`) faces the same direction on every hexagon of a grid.
pub fn hexagon_vertices(center: GeoPoint, radius_m: f64) -> [GeoPoint; HEX_EDGE_COUNT] {
    std::array::from_fn(|i| {
        let angle = (HEX_VERTEX_ANGLE_STEP_DEG * i as f64 + HEX_VERTEX_ANGLE_OFFSET_DEG).to_radians();
        planar_to_geo(radius_m * angle.cos(), radius_m * angle.sin(), center)
    })
}

/// Great-circle distance in metres.
///
/// Invalid coordinates yield `NaN`, so any `<=` comparison against the result
/// fails instead of passing.
pub fn geo_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    match (LatLng::new(a.lat, a.lng), LatLng::new(b.lat, b.lng)) {
        (Ok(a), Ok(b)) => a.distance_m(b),
        _ => f64::NAN,
    }
}
