//! Merging of adjacent hexagons into visually seamless regions
//!
//! A merge config is a list of groups of hexagon ids (either textual
//! encoding). Every ordered pair inside a group is checked geometrically; the
//! shared edges that are found are recorded in a [`MergeInfo`] and later
//! applied to the hexagons, which makes the renderer fade those edges out.
//!
//! Bad ids, missing hexagons and non-adjacent pairs are logged and skipped.

pub mod detect;

use std::collections::HashMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::constants::{HEX_EDGE_COUNT, MERGE_SEARCH_RADIUS_FACTOR};
use crate::error::MergeError;
use crate::hex_coords::AxialCoord;
use crate::hex_grid::{EdgeState, Hexagon};
use crate::render::{HexagonRenderer, LayerGroup};

pub use detect::{closest_shared_edge, detect_adjacent_edges, AdjacentEdges};

/// One suppressed edge of a hexagon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeEdge {
    pub edge: usize,
    pub neighbor: AxialCoord,
}

/// Per-hexagon list of suppressed edges, rebuilt on every (re)apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeInfo(HashMap<AxialCoord, Vec<MergeEdge>>);

impl MergeInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an entry. Returns false when the exact entry already exists,
    /// which happens because both orderings of a pair are checked.
    pub fn record(&mut self, hexagon: AxialCoord, entry: MergeEdge) -> bool {
        let entries = self.0.entry(hexagon).or_default();
        if entries.contains(&entry) {
            return false;
        }
        entries.push(entry);
        true
    }

    pub fn get(&self, hexagon: &AxialCoord) -> Option<&[MergeEdge]> {
        self.0.get(hexagon).map(Vec::as_slice)
    }

    /// Whether `hexagon` has a recorded entry naming `neighbor`.
    pub fn has_neighbor(&self, hexagon: &AxialCoord, neighbor: &AxialCoord) -> bool {
        self.get(hexagon)
            .is_some_and(|entries| entries.iter().any(|e| e.neighbor == *neighbor))
    }

    /// Number of hexagons with at least one entry.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total_entries(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn hexagons(&self) -> impl Iterator<Item = &AxialCoord> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AxialCoord, &[MergeEdge])> {
        self.0.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Insert entries without dedup or validation. Used when restoring state
    /// and by tests that need deliberately bad input.
    pub fn insert_raw(&mut self, hexagon: AxialCoord, entries: Vec<MergeEdge>) {
        self.0.insert(hexagon, entries);
    }
}

#[derive(Debug, Clone)]
pub struct MergeManager {
    groups: Vec<Vec<String>>,
    search_radius_factor: f64,
}

impl Default for MergeManager {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            search_radius_factor: MERGE_SEARCH_RADIUS_FACTOR,
        }
    }
}

impl MergeManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_radius_factor(mut self, factor: f64) -> Self {
        self.search_radius_factor = factor;
        self
    }

    pub fn set_merge_config(&mut self, groups: Vec<Vec<String>>) {
        if groups.is_empty() {
            debug!("merge config cleared");
        } else {
            info!(groups = groups.len(), "merge config set");
        }
        self.groups = groups;
    }

    pub fn merge_config(&self) -> &[Vec<String>] {
        &self.groups
    }

    pub fn has_config(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Check every ordered pair of every group and collect the shared edges.
    pub fn preprocess_merge_relations(&self, hexagons: &[Hexagon], hex_radius_m: f64) -> MergeInfo {
        let mut info = MergeInfo::new();
        if self.groups.is_empty() {
            return info;
        }

        let start = Instant::now();
        let search_radius_m = hex_radius_m * self.search_radius_factor;
        let by_coord: HashMap<AxialCoord, &Hexagon> = hexagons.iter().map(|h| (h.coord, h)).collect();

        for (group_index, group) in self.groups.iter().enumerate() {
            if group.len() < 2 {
                debug!(group = group_index, "group has fewer than two members, nothing to merge");
                continue;
            }
            for (i, raw_a) in group.iter().enumerate() {
                for (j, raw_b) in group.iter().enumerate() {
                    if i == j {
                        continue;
                    }
                    self.check_pair(&by_coord, raw_a, raw_b, search_radius_m, &mut info);
                }
            }
        }

        info!(
            hexagons = info.len(),
            entries = info.total_entries(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "merge relations preprocessed"
        );
        info
    }

    fn check_pair(
        &self,
        by_coord: &HashMap<AxialCoord, &Hexagon>,
        raw_a: &str,
        raw_b: &str,
        search_radius_m: f64,
        info: &mut MergeInfo,
    ) {
        let (a, b) = match (AxialCoord::parse(raw_a), AxialCoord::parse(raw_b)) {
            (Ok(a), Ok(b)) => (a, b),
            (Err(e), _) | (_, Err(e)) => {
                warn!("skipping merge pair [{raw_a}, {raw_b}]: {e}");
                return;
            }
        };
        if a == b {
            warn!("skipping merge pair [{raw_a}, {raw_b}]: both name hexagon {a}");
            return;
        }

        let (Some(hex_a), Some(hex_b)) = (by_coord.get(&a), by_coord.get(&b)) else {
            let missing = if by_coord.contains_key(&a) { b } else { a };
            warn!("skipping merge pair [{raw_a}, {raw_b}]: hexagon {missing} is not in the grid");
            return;
        };

        match detect_adjacent_edges(hex_a, hex_b, search_radius_m) {
            Some(AdjacentEdges { edge_a, edge_b }) => {
                info.record(a, MergeEdge { edge: edge_a, neighbor: b });
                info.record(b, MergeEdge { edge: edge_b, neighbor: a });
            }
            None => {
                warn!("no shared edge between hexagons {a} and {b}, pair skipped");
            }
        }
    }

    /// Mark the recorded edges of `hexagon` and redraw it.
    ///
    /// All entries are validated before anything is changed, so a corrupt
    /// entry leaves the hexagon untouched. Returns `Ok(false)` when there was
    /// nothing to apply.
    pub fn apply_merge_info(
        &self,
        hexagon: &mut Hexagon,
        info: &MergeInfo,
        renderer: &HexagonRenderer,
        layer: &mut LayerGroup,
    ) -> Result<bool, MergeError> {
        let entries = match info.get(&hexagon.coord) {
            Some(entries) if !entries.is_empty() => entries,
            _ => return Ok(false),
        };

        if let Some(bad) = entries.iter().find(|e| e.edge >= HEX_EDGE_COUNT) {
            let err = MergeError::EdgeIndexOutOfRange {
                hexagon: hexagon.coord,
                edge: bad.edge,
            };
            error!("{err}");
            return Err(err);
        }

        for entry in entries {
            hexagon.edge_info[entry.edge] = EdgeState {
                visible: false,
                neighbor: Some(entry.neighbor),
            };
        }
        renderer.recreate_hexagon_with_visible_edges(hexagon, layer);
        Ok(true)
    }
}
