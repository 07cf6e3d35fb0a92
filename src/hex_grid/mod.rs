//! Hexagon records produced by the grid generator
//!
//! A `Hexagon` owns its geometry, the per-edge merge bookkeeping and the
//! handles of whatever the renderer drew for it. Edge `i` always runs from
//! `vertices[i]` to `vertices[(i + 1) % 6]`.

pub mod generator;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::constants::HEX_EDGE_COUNT;
use crate::hex_coords::{AxialCoord, GeoPoint};
use crate::math_utils::{mean, midpoint};
use crate::render::RenderHandles;

pub use generator::{GeneratedGrid, GridGenerator};

/// Merge bookkeeping for one edge.
///
/// `visible` is consumed internally; what actually gets drawn is decided by
/// the renderer from `neighbor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeState {
    pub visible: bool,
    pub neighbor: Option<AxialCoord>,
}

impl Default for EdgeState {
    fn default() -> Self {
        Self {
            visible: true,
            neighbor: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Hexagon {
    pub coord: AxialCoord,
    pub center: GeoPoint,
    pub radius_m: f64,
    pub vertices: [GeoPoint; HEX_EDGE_COUNT],
    pub edge_info: [EdgeState; HEX_EDGE_COUNT],
    pub handles: RenderHandles,
}

impl Hexagon {
    pub fn id(&self) -> String {
        self.coord.internal_id()
    }

    pub fn display_id(&self) -> String {
        self.coord.display_id()
    }

    /// Mean of the six vertices, recomputed from the live geometry.
    pub fn centroid(&self) -> GeoPoint {
        let points = self.vertices.map(GeoPoint::to_dvec2);
        // six vertices, never empty
        GeoPoint::from_dvec2(mean(&points).unwrap_or(DVec2::new(self.center.lng, self.center.lat)))
    }

    pub fn edge_endpoints(&self, edge: usize) -> Option<(GeoPoint, GeoPoint)> {
        if edge >= HEX_EDGE_COUNT {
            return None;
        }
        Some((self.vertices[edge], self.vertices[(edge + 1) % HEX_EDGE_COUNT]))
    }

    pub fn edge_midpoint(&self, edge: usize) -> Option<GeoPoint> {
        self.edge_endpoints(edge)
            .map(|(a, b)| GeoPoint::from_dvec2(midpoint(a.to_dvec2(), b.to_dvec2())))
    }

    pub fn has_any_neighbor(&self) -> bool {
        self.edge_info.iter().any(|e| e.neighbor.is_some())
    }

    pub fn neighbor_count(&self) -> usize {
        self.edge_info.iter().filter(|e| e.neighbor.is_some()).count()
    }

    /// Back to all-visible, no neighbours.
    pub fn reset_edges(&mut self) {
        self.edge_info = [EdgeState::default(); HEX_EDGE_COUNT];
    }
}
