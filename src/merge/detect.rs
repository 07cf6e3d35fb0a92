/// Shared-edge detection between two hexagons
///
/// For each hexagon, an edge is a candidate when its midpoint lies strictly
/// within `search_radius` metres of both centroids. Among the candidates the
/// one whose midpoint is closest to the centroid-to-centroid line wins. The
/// line distance is measured in degree space (`x` = lng, `y` = lat); only the
/// ranking matters, so the unit is irrelevant.

use tracing::debug;

use crate::constants::HEX_EDGE_COUNT;
use crate::hex_coords::{geo_distance, GeoPoint};
use crate::hex_grid::Hexagon;
use crate::math_utils::perpendicular_distance;

/// Edge indices of the shared boundary, one per hexagon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjacentEdges {
    pub edge_a: usize,
    pub edge_b: usize,
}

/// The edge of `hexagon` that best matches the boundary between `own` and
/// `other` centroids, with its line distance.
pub fn closest_shared_edge(
    hexagon: &Hexagon,
    own: GeoPoint,
    other: GeoPoint,
    search_radius_m: f64,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;

    for edge in 0..HEX_EDGE_COUNT {
        let Some(mid) = hexagon.edge_midpoint(edge) else {
            continue;
        };
        // NaN distances fail both comparisons
        let near_own = geo_distance(mid, own) < search_radius_m;
        let near_other = geo_distance(mid, other) < search_radius_m;
        if !(near_own && near_other) {
            continue;
        }

        let Some(line_distance) = perpendicular_distance(mid.to_dvec2(), own.to_dvec2(), other.to_dvec2()) else {
            continue;
        };
        debug!(hexagon = %hexagon.coord, edge, line_distance, "shared edge candidate");

        if best.is_none_or(|(_, d)| line_distance < d) {
            best = Some((edge, line_distance));
        }
    }
    best
}

/// Find the shared edge on both sides, or `None` when the hexagons are not
/// adjacent at this radius.
pub fn detect_adjacent_edges(a: &Hexagon, b: &Hexagon, search_radius_m: f64) -> Option<AdjacentEdges> {
    let centroid_a = a.centroid();
    let centroid_b = b.centroid();

    let (edge_a, distance_a) = closest_shared_edge(a, centroid_a, centroid_b, search_radius_m)?;
    let (edge_b, distance_b) = closest_shared_edge(b, centroid_b, centroid_a, search_radius_m)?;

    debug!(
        a = %a.coord,
        b = %b.coord,
        edge_a,
        edge_b,
        distance_a,
        distance_b,
        "adjacent edges found"
    );
    Some(AdjacentEdges { edge_a, edge_b })
}
