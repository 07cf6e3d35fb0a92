/// Viewport culling
///
/// Hexagons whose center falls outside the padded view bounds are detached
/// from the layer; they keep their primitives so they can be re-attached
/// instantly when the view comes back.

use std::collections::HashSet;
use std::time::Instant;

use tracing::info;

use crate::constants::DEFAULT_VIEWPORT_MARGIN;
use crate::hex_coords::{AxialCoord, GeoBounds};
use crate::hex_grid::Hexagon;
use crate::render::LayerGroup;

/// Outcome of one culling pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CullStats {
    pub visible: usize,
    pub attached: usize,
    pub detached: usize,
}

#[derive(Debug, Clone)]
pub struct ViewportManager {
    enabled: bool,
    /// View bounds are grown by `margin - 1` of their span on every side
    margin: f64,
    visible: HashSet<AxialCoord>,
}

impl Default for ViewportManager {
    fn default() -> Self {
        Self {
            enabled: true,
            margin: DEFAULT_VIEWPORT_MARGIN,
            visible: HashSet::new(),
        }
    }
}

impl ViewportManager {
    pub fn new(margin: f64) -> Self {
        Self {
            margin,
            ..Self::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn margin(&self) -> f64 {
        self.margin
    }

    /// Only flips the flag; the grid layer decides what to redo.
    pub fn set_viewport_rendering(&mut self, enabled: bool) -> bool {
        self.enabled = enabled;
        self.enabled
    }

    pub fn expanded_bounds(&self, view: GeoBounds) -> GeoBounds {
        view.pad(self.margin - 1.0)
    }

    /// Attach hexagons whose center is inside the padded view, detach the
    /// rest.
    pub fn update_visible_hexagons(
        &mut self,
        view: GeoBounds,
        hexagons: &[Hexagon],
        layer: &mut LayerGroup,
    ) -> CullStats {
        let start = Instant::now();
        let bounds = self.expanded_bounds(view);
        let mut stats = CullStats::default();
        let mut visible = HashSet::with_capacity(self.visible.len());

        for hex in hexagons {
            if bounds.contains(hex.center) {
                visible.insert(hex.coord);
                if hex.handles.attach(layer) {
                    stats.attached += 1;
                }
            } else if hex.handles.is_attached(layer) {
                hex.handles.detach(layer);
                stats.detached += 1;
            }
        }

        self.visible = visible;
        stats.visible = self.visible.len();
        info!(
            visible = stats.visible,
            total = hexagons.len(),
            attached = stats.attached,
            detached = stats.detached,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "updated visible hexagons"
        );
        stats
    }

    /// Attach every hexagon, used when culling is switched off.
    pub fn show_all(&mut self, hexagons: &[Hexagon], layer: &mut LayerGroup) -> CullStats {
        let mut stats = CullStats::default();
        for hex in hexagons {
            if hex.handles.attach(layer) {
                stats.attached += 1;
            }
        }
        self.visible = hexagons.iter().map(|h| h.coord).collect();
        stats.visible = self.visible.len();
        stats
    }

    pub fn is_visible(&self, coord: &AxialCoord) -> bool {
        self.visible.contains(coord)
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    pub fn visible_hexagons(&self) -> &HashSet<AxialCoord> {
        &self.visible
    }

    pub fn clear_visible_hexagons(&mut self) {
        self.visible.clear();
    }
}
