/// Grid generation over a circular-ish area
///
/// Cells are enumerated in axial coordinates over a hexagon-shaped region of
/// axial radius `N = ceil(area / min(width, height))`, so the cell count is
/// `3N² + 3N + 1`.

use std::collections::HashMap;
use std::time::Instant;

use tracing::info;

use crate::constants::DEFAULT_MAX_HEXAGONS;
use crate::error::GridError;
use crate::hex_coords::{hexagon_vertices, planar_to_geo, AxialCoord, GeoPoint};
use crate::hex_grid::Hexagon;
use crate::render::{HexagonRenderer, LayerGroup};

/// Output of one generation pass.
#[derive(Debug, Default)]
pub struct GeneratedGrid {
    pub hexagons: Vec<Hexagon>,
    /// Position of each cell in `hexagons`
    pub index: HashMap<AxialCoord, usize>,
}

impl GeneratedGrid {
    pub fn get(&self, coord: &AxialCoord) -> Option<&Hexagon> {
        self.index.get(coord).and_then(|&i| self.hexagons.get(i))
    }

    pub fn len(&self) -> usize {
        self.hexagons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hexagons.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct GridGenerator {
    pub max_hexagons: usize,
}

impl Default for GridGenerator {
    fn default() -> Self {
        Self {
            max_hexagons: DEFAULT_MAX_HEXAGONS,
        }
    }
}

impl GridGenerator {
    pub fn new(max_hexagons: usize) -> Self {
        Self { max_hexagons }
    }

    /// Pointy-top hexagon width (`R·√3`) and height (`2R`) in metres.
    pub fn cell_size(hex_radius_m: f64) -> (f64, f64) {
        (hex_radius_m * 3f64.sqrt(), hex_radius_m * 2.0)
    }

    /// `ceil(area / min(width, height))`, saturating at `u32::MAX` for
    /// areas no grid could cover.
    pub fn axial_radius(hex_radius_m: f64, area_radius_m: f64) -> u32 {
        let (width, height) = Self::cell_size(hex_radius_m);
        (area_radius_m / width.min(height)).ceil().max(0.0) as u32
    }

    /// `3N² + 3N + 1`, saturating at `usize::MAX`.
    pub fn cell_count(axial_radius: u32) -> usize {
        let n = u64::from(axial_radius);
        n.checked_mul(n)
            .and_then(|sq| sq.checked_mul(3))
            .and_then(|c| c.checked_add(3 * n + 1))
            .and_then(|c| usize::try_from(c).ok())
            .unwrap_or(usize::MAX)
    }

    /// Every coordinate within `n` steps of the origin, `q` ascending then `r`.
    pub fn cells(n: u32) -> impl Iterator<Item = AxialCoord> {
        let n = n as i32;
        (-n..=n).flat_map(move |q| {
            let r_min = (-n).max(-q - n);
            let r_max = n.min(-q + n);
            (r_min..=r_max).map(move |r| AxialCoord::new(q, r))
        })
    }

    /// Planar offset of a cell center from the grid center, in metres.
    pub fn cell_offset(coord: AxialCoord, hex_radius_m: f64) -> (f64, f64) {
        let (width, height) = Self::cell_size(hex_radius_m);
        let x = (coord.q as f64 + coord.r as f64 / 2.0) * width;
        let y = coord.r as f64 * (height * 3.0 / 4.0);
        (x, y)
    }

    pub fn validate(&self, center: GeoPoint, hex_radius_m: f64, area_radius_m: f64) -> Result<u32, GridError> {
        if !hex_radius_m.is_finite() || hex_radius_m <= 0.0 {
            return Err(GridError::InvalidRadius {
                what: "hexagon",
                value: hex_radius_m,
            });
        }
        if !area_radius_m.is_finite() || area_radius_m < 0.0 {
            return Err(GridError::InvalidRadius {
                what: "area",
                value: area_radius_m,
            });
        }
        // cos(lat) reaches zero at the poles and the projection blows up
        if !center.is_finite() || center.lat.abs() >= 90.0 {
            return Err(GridError::InvalidCenter {
                lat: center.lat,
                lng: center.lng,
            });
        }

        let n = Self::axial_radius(hex_radius_m, area_radius_m);
        let count = Self::cell_count(n);
        // cells() walks -n..=n as i32
        if count > self.max_hexagons || i32::try_from(n).is_err() {
            return Err(GridError::TooManyHexagons {
                count,
                limit: self.max_hexagons,
            });
        }
        Ok(n)
    }

    /// Build every hexagon of the grid and register it with the renderer.
    ///
    /// Edges are not drawn here; the caller initializes them once merge state
    /// is known.
    pub fn generate(
        &self,
        center: GeoPoint,
        hex_radius_m: f64,
        area_radius_m: f64,
        renderer: &HexagonRenderer,
        layer: &mut LayerGroup,
    ) -> Result<GeneratedGrid, GridError> {
        let start = Instant::now();
        let n = self.validate(center, hex_radius_m, area_radius_m)?;

        let mut grid = GeneratedGrid {
            hexagons: Vec::with_capacity(Self::cell_count(n)),
            index: HashMap::with_capacity(Self::cell_count(n)),
        };
        for coord in Self::cells(n) {
            let (x, y) = Self::cell_offset(coord, hex_radius_m);
            let cell_center = planar_to_geo(x, y, center);
            let vertices = hexagon_vertices(cell_center, hex_radius_m);
            let hexagon = renderer.add_hexagon(layer, coord, cell_center, hex_radius_m, vertices);
            grid.index.insert(coord, grid.hexagons.len());
            grid.hexagons.push(hexagon);
        }

        info!(
            hexagons = grid.hexagons.len(),
            axial_radius = n,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "generated hexagon grid at {:.4},{:.4}",
            center.lat,
            center.lng
        );
        Ok(grid)
    }
}
