/// The hexagon grid overlay
///
/// `GridLayer` owns the grid parameters and merge config, and sequences a
/// show: generate hexagons, draw default edges, apply merges, cull to the
/// view. Hiding drops every drawn primitive and all derived state. Any
/// parameter change while shown rebuilds from scratch; a rebuild that fails
/// leaves the shown grid and its parameters untouched.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::constants::{DEFAULT_AREA_RADIUS_M, DEFAULT_GRID_CENTER, DEFAULT_HEX_RADIUS_M};
use crate::error::GridError;
use crate::grid_config::GridConfig;
use crate::hex_coords::{AxialCoord, GeoBounds, GeoPoint};
use crate::hex_grid::{Hexagon, GridGenerator};
use crate::merge::{MergeInfo, MergeManager};
use crate::render::{HexagonRenderer, LayerGroup, RenderStyle};
use crate::viewport::{CullStats, ViewportManager};

/// What the grid needs from the map it is drawn on.
pub trait MapView {
    fn bounds(&self) -> GeoBounds;
    fn center(&self) -> GeoPoint;
}

/// A map view that never moves unless told to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticView {
    pub bounds: GeoBounds,
}

impl StaticView {
    pub fn new(bounds: GeoBounds) -> Self {
        Self { bounds }
    }

    /// View of `half_span_deg` degrees on each side of `center`.
    pub fn around(center: GeoPoint, half_span_deg: f64) -> Self {
        Self::new(GeoBounds::new(
            GeoPoint::new(center.lat - half_span_deg, center.lng - half_span_deg),
            GeoPoint::new(center.lat + half_span_deg, center.lng + half_span_deg),
        ))
    }
}

impl MapView for StaticView {
    fn bounds(&self) -> GeoBounds {
        self.bounds
    }

    fn center(&self) -> GeoPoint {
        self.bounds.center()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapEvent {
    MoveEnd,
    ZoomEnd,
}

/// Partial update of the grid parameters; `None` keeps the current value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GridOptions {
    pub hex_radius_m: Option<f64>,
    pub area_radius_m: Option<f64>,
    pub center: Option<GeoPoint>,
}

impl GridOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hex_radius(mut self, meters: f64) -> Self {
        self.hex_radius_m = Some(meters);
        self
    }

    pub fn area_radius(mut self, meters: f64) -> Self {
        self.area_radius_m = Some(meters);
        self
    }

    pub fn center(mut self, center: GeoPoint) -> Self {
        self.center = Some(center);
        self
    }
}

/// Parameters for [`GridLayer::create_hexagon_grid`]; unset fields fall
/// back to the defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridSpec {
    pub name: String,
    pub center: Option<GeoPoint>,
    pub area_radius_m: Option<f64>,
    pub hex_radius_m: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSummary {
    pub center: GeoPoint,
    pub area_radius_m: f64,
    pub hex_radius_m: f64,
    pub hexagon_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridState {
    #[default]
    Hidden,
    Shown,
}

/// The parameters a rebuild may change, kept to roll back a failed one.
#[derive(Debug, Clone)]
struct GridParams {
    name: String,
    center: Option<GeoPoint>,
    hex_radius_m: f64,
    area_radius_m: f64,
    merge_config: Vec<Vec<String>>,
}

#[derive(Debug)]
pub struct GridLayer {
    name: String,
    center: Option<GeoPoint>,
    hex_radius_m: f64,
    area_radius_m: f64,
    state: GridState,
    layer: Option<LayerGroup>,
    hexagons: Vec<Hexagon>,
    index: HashMap<AxialCoord, usize>,
    merge_info: MergeInfo,
    renderer: HexagonRenderer,
    generator: GridGenerator,
    merge: MergeManager,
    viewport: ViewportManager,
}

impl Default for GridLayer {
    fn default() -> Self {
        Self {
            name: String::new(),
            center: None,
            hex_radius_m: DEFAULT_HEX_RADIUS_M,
            area_radius_m: DEFAULT_AREA_RADIUS_M,
            state: GridState::Hidden,
            layer: None,
            hexagons: Vec::new(),
            index: HashMap::new(),
            merge_info: MergeInfo::new(),
            renderer: HexagonRenderer::default(),
            generator: GridGenerator::default(),
            merge: MergeManager::default(),
            viewport: ViewportManager::default(),
        }
    }
}

impl GridLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(mut self, style: RenderStyle) -> Self {
        self.renderer = HexagonRenderer::new(style);
        self
    }

    pub fn with_max_hexagons(mut self, max_hexagons: usize) -> Self {
        self.generator = GridGenerator::new(max_hexagons);
        self
    }

    pub fn with_viewport_margin(mut self, margin: f64) -> Self {
        self.viewport = ViewportManager::new(margin);
        self
    }

    pub fn with_merge_search_factor(mut self, factor: f64) -> Self {
        self.merge = self.merge.with_search_radius_factor(factor);
        self
    }

    /// Build and draw the grid.
    ///
    /// Without an explicit center the map's current center is used and kept.
    /// Showing an already shown grid rebuilds it. Generation runs before the
    /// old grid is dropped, so on error whatever was shown stays shown.
    pub fn show_grid(&mut self, view: &dyn MapView) -> Result<GridSummary, GridError> {
        let center = *self.center.get_or_insert_with(|| view.center());

        let mut layer = LayerGroup::new();
        let mut grid = self.generator.generate(
            center,
            self.hex_radius_m,
            self.area_radius_m,
            &self.renderer,
            &mut layer,
        )?;

        for hexagon in grid.hexagons.iter_mut() {
            self.renderer.initialize_hexagon_edges(hexagon, &mut layer);
        }

        let merge_info = self.merge.preprocess_merge_relations(&grid.hexagons, self.hex_radius_m);
        let mut merged = 0;
        for hexagon in grid.hexagons.iter_mut() {
            // failures are logged inside and only affect that hexagon
            if let Ok(true) = self.merge.apply_merge_info(hexagon, &merge_info, &self.renderer, &mut layer) {
                merged += 1;
            }
        }

        if self.is_shown() {
            self.hide_grid();
        }
        self.hexagons = grid.hexagons;
        self.index = grid.index;
        self.merge_info = merge_info;
        self.layer = Some(layer);
        self.state = GridState::Shown;

        if self.viewport.is_enabled() {
            self.cull(view.bounds());
        }

        info!(
            name = %self.name,
            hexagons = self.hexagons.len(),
            merged,
            "grid shown"
        );
        Ok(self.summary())
    }

    /// Drop the drawn grid and everything derived from it. Returns whether
    /// the grid was shown.
    pub fn hide_grid(&mut self) -> bool {
        if self.state == GridState::Hidden {
            return false;
        }
        self.layer = None;
        self.hexagons.clear();
        self.index.clear();
        self.merge_info = MergeInfo::new();
        self.viewport.clear_visible_hexagons();
        self.state = GridState::Hidden;
        info!(name = %self.name, "grid hidden");
        true
    }

    /// Returns whether the grid is shown afterwards.
    pub fn toggle_grid(&mut self, view: &dyn MapView) -> Result<bool, GridError> {
        if self.is_shown() {
            self.hide_grid();
        } else {
            self.show_grid(view)?;
        }
        Ok(self.is_shown())
    }

    /// Update parameters, rebuilding when shown. Non-positive or non-finite
    /// radii are ignored. A failed rebuild restores the previous parameters.
    pub fn set_grid_options(&mut self, options: GridOptions, view: &dyn MapView) -> Result<(), GridError> {
        let previous = self.params();
        if let Some(r) = options.hex_radius_m {
            if r.is_finite() && r > 0.0 {
                self.hex_radius_m = r;
            } else {
                warn!(value = r, "ignoring invalid hexagon radius");
            }
        }
        if let Some(r) = options.area_radius_m {
            if r.is_finite() && r > 0.0 {
                self.area_radius_m = r;
            } else {
                warn!(value = r, "ignoring invalid area radius");
            }
        }
        if let Some(center) = options.center {
            self.center = Some(center);
        }

        if self.is_shown() {
            self.show_or_restore(previous, view)?;
        }
        Ok(())
    }

    /// Replace the merge config; takes effect now when shown, otherwise on
    /// the next show.
    pub fn merge_adjacent_hexagons(&mut self, groups: Vec<Vec<String>>, view: &dyn MapView) -> Result<(), GridError> {
        let previous = self.params();
        self.merge.set_merge_config(groups);
        if self.is_shown() {
            self.show_or_restore(previous, view)?;
        }
        Ok(())
    }

    /// Set every parameter at once and show.
    pub fn create_hexagon_grid(&mut self, spec: GridSpec, view: &dyn MapView) -> Result<GridSummary, GridError> {
        let previous = self.params();
        let (lat, lng) = DEFAULT_GRID_CENTER;
        self.center = Some(spec.center.unwrap_or(GeoPoint::new(lat, lng)));
        self.area_radius_m = spec.area_radius_m.unwrap_or(DEFAULT_AREA_RADIUS_M);
        self.hex_radius_m = spec.hex_radius_m.unwrap_or(DEFAULT_HEX_RADIUS_M);
        self.name = spec.name;
        self.show_or_restore(previous, view)
    }

    /// Show the grid a persisted record describes, replacing whatever is
    /// shown. A record that cannot be generated leaves the current grid.
    pub fn apply_config(&mut self, config: &GridConfig, view: &dyn MapView) -> Result<GridSummary, GridError> {
        let previous = self.params();
        self.name = config.name.clone();
        self.center = Some(config.center());
        self.hex_radius_m = config.grid_radius;
        self.area_radius_m = config.area_radius;
        self.merge.set_merge_config(config.merge_areas.clone());
        self.show_or_restore(previous, view)
    }

    fn params(&self) -> GridParams {
        GridParams {
            name: self.name.clone(),
            center: self.center,
            hex_radius_m: self.hex_radius_m,
            area_radius_m: self.area_radius_m,
            merge_config: self.merge.merge_config().to_vec(),
        }
    }

    fn show_or_restore(&mut self, previous: GridParams, view: &dyn MapView) -> Result<GridSummary, GridError> {
        let result = self.show_grid(view);
        if let Err(e) = &result {
            warn!(name = %self.name, error = %e, "rebuild failed, keeping previous grid");
            self.name = previous.name;
            self.center = previous.center;
            self.hex_radius_m = previous.hex_radius_m;
            self.area_radius_m = previous.area_radius_m;
            self.merge.set_merge_config(previous.merge_config);
        }
        result
    }

    pub fn clear_all_grids(&mut self) {
        self.hide_grid();
    }

    /// Re-cull after the map moved. Returns `None` when nothing ran.
    pub fn handle_map_event(&mut self, event: MapEvent, view: &dyn MapView) -> Option<CullStats> {
        if !self.is_shown() || !self.viewport.is_enabled() {
            return None;
        }
        tracing::debug!(?event, "map event");
        self.cull(view.bounds())
    }

    /// Switch culling on or off. Switching off attaches every hexagon.
    pub fn set_viewport_rendering(&mut self, enabled: bool, view: &dyn MapView) -> bool {
        self.viewport.set_viewport_rendering(enabled);
        if let (GridState::Shown, Some(layer)) = (self.state, self.layer.as_mut()) {
            if enabled {
                self.viewport.update_visible_hexagons(view.bounds(), &self.hexagons, layer);
            } else {
                self.viewport.show_all(&self.hexagons, layer);
            }
        }
        self.viewport.is_enabled()
    }

    fn cull(&mut self, bounds: GeoBounds) -> Option<CullStats> {
        let layer = self.layer.as_mut()?;
        Some(self.viewport.update_visible_hexagons(bounds, &self.hexagons, layer))
    }

    pub fn pointer_enter(&mut self, coord: &AxialCoord) -> bool {
        let (Some(layer), Some(&i)) = (self.layer.as_mut(), self.index.get(coord)) else {
            return false;
        };
        self.renderer.pointer_enter(&self.hexagons[i], layer);
        true
    }

    pub fn pointer_leave(&mut self, coord: &AxialCoord) -> bool {
        let (Some(layer), Some(&i)) = (self.layer.as_mut(), self.index.get(coord)) else {
            return false;
        };
        self.renderer.pointer_leave(&self.hexagons[i], layer);
        true
    }

    pub fn find_hexagon(&self, coord: &AxialCoord) -> Option<&Hexagon> {
        self.index.get(coord).and_then(|&i| self.hexagons.get(i))
    }

    /// Look up by either id encoding.
    pub fn find_hexagon_by_id(&self, id: &str) -> Option<&Hexagon> {
        AxialCoord::parse(id).ok().and_then(|c| self.find_hexagon(&c))
    }

    /// Internal id of the cell at `(q, r)` if it is part of the grid.
    pub fn hexagon_id_by_coords(&self, q: i32, r: i32) -> Option<String> {
        self.find_hexagon(&AxialCoord::new(q, r)).map(Hexagon::id)
    }

    pub fn hexagons(&self) -> &[Hexagon] {
        &self.hexagons
    }

    /// Hexagons currently kept by culling, or all of them when culling is off.
    pub fn visible_hexagons(&self) -> impl Iterator<Item = &Hexagon> + '_ {
        let culling = self.viewport.is_enabled();
        self.hexagons
            .iter()
            .filter(move |h| !culling || self.viewport.is_visible(&h.coord))
    }

    pub fn summary(&self) -> GridSummary {
        let (lat, lng) = DEFAULT_GRID_CENTER;
        GridSummary {
            center: self.center.unwrap_or(GeoPoint::new(lat, lng)),
            area_radius_m: self.area_radius_m,
            hex_radius_m: self.hex_radius_m,
            hexagon_count: self.hexagons.len(),
        }
    }

    pub fn merge_info(&self) -> &MergeInfo {
        &self.merge_info
    }

    pub fn merge_config(&self) -> &[Vec<String>] {
        self.merge.merge_config()
    }

    pub fn layer(&self) -> Option<&LayerGroup> {
        self.layer.as_ref()
    }

    pub fn state(&self) -> GridState {
        self.state
    }

    pub fn is_shown(&self) -> bool {
        self.state == GridState::Shown
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn center(&self) -> Option<GeoPoint> {
        self.center
    }

    pub fn hex_radius_m(&self) -> f64 {
        self.hex_radius_m
    }

    pub fn area_radius_m(&self) -> f64 {
        self.area_radius_m
    }

    pub fn viewport(&self) -> &ViewportManager {
        &self.viewport
    }
}
