/// Hexagon drawing and per-hexagon edge redraw
///
/// A hexagon is drawn as a stroke-less fill polygon, a hover label and six
/// separate edge polylines. The edge polylines are the only part that ever
/// changes after creation; they are thrown away and redrawn whenever the
/// hexagon's merge bookkeeping changes.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{
    HEX_COLOR, HEX_EDGE_COUNT, HEX_FILL_OPACITY, HEX_HOVER_FILL_OPACITY, INNER_EDGE_OPACITY,
    INNER_EDGE_WEIGHT, OUTER_EDGE_OPACITY, OUTER_EDGE_WEIGHT, REGULAR_EDGE_OPACITY,
    REGULAR_EDGE_WEIGHT,
};
use crate::hex_coords::{AxialCoord, GeoPoint};
use crate::hex_grid::{EdgeState, Hexagon};
use crate::render::layer::{FillStyle, LayerGroup, Primitive, PrimitiveId, StrokeStyle};

/// How a single edge is stroked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Hexagon takes part in no merge at all
    Regular,
    /// Boundary of a merged region
    Outer,
    /// Shared with a merged neighbour; near invisible
    Inner,
}

/// Stroke kind for each edge.
///
/// A hexagon with no neighbour on any edge gets the uniform regular look.
/// Otherwise every edge is outer or inner depending on whether that edge has
/// a neighbour.
pub fn edge_kinds(edge_info: &[EdgeState; HEX_EDGE_COUNT]) -> [EdgeKind; HEX_EDGE_COUNT] {
    let has_any_neighbor = edge_info.iter().any(|e| e.neighbor.is_some());
    (*edge_info).map(|e| match (has_any_neighbor, e.neighbor) {
        (false, _) => EdgeKind::Regular,
        (true, None) => EdgeKind::Outer,
        (true, Some(_)) => EdgeKind::Inner,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderStyle {
    pub color: String,
    pub fill_opacity: f64,
    pub hover_fill_opacity: f64,
    pub regular_edge: StrokeStyle,
    pub outer_edge: StrokeStyle,
    pub inner_edge: StrokeStyle,
}

impl Default for RenderStyle {
    fn default() -> Self {
        let stroke = |weight, opacity| StrokeStyle {
            color: HEX_COLOR.to_string(),
            weight,
            opacity,
        };
        Self {
            color: HEX_COLOR.to_string(),
            fill_opacity: HEX_FILL_OPACITY,
            hover_fill_opacity: HEX_HOVER_FILL_OPACITY,
            regular_edge: stroke(REGULAR_EDGE_WEIGHT, REGULAR_EDGE_OPACITY),
            outer_edge: stroke(OUTER_EDGE_WEIGHT, OUTER_EDGE_OPACITY),
            inner_edge: stroke(INNER_EDGE_WEIGHT, INNER_EDGE_OPACITY),
        }
    }
}

impl RenderStyle {
    pub fn stroke(&self, kind: EdgeKind) -> &StrokeStyle {
        match kind {
            EdgeKind::Regular => &self.regular_edge,
            EdgeKind::Outer => &self.outer_edge,
            EdgeKind::Inner => &self.inner_edge,
        }
    }

    fn fill(&self, fill_opacity: f64) -> FillStyle {
        FillStyle {
            color: self.color.clone(),
            fill_opacity,
        }
    }
}

/// Everything drawn for one hexagon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderHandles {
    pub polygon: PrimitiveId,
    pub label: PrimitiveId,
    pub edges: Vec<PrimitiveId>,
}

impl RenderHandles {
    pub fn ids(&self) -> impl Iterator<Item = PrimitiveId> + '_ {
        [self.polygon, self.label].into_iter().chain(self.edges.iter().copied())
    }

    /// Attach polygon, label and edges. Returns true if anything changed.
    pub fn attach(&self, layer: &mut LayerGroup) -> bool {
        self.ids().fold(false, |changed, id| layer.attach(id) | changed)
    }

    /// Detach polygon, label and edges without destroying them.
    pub fn detach(&self, layer: &mut LayerGroup) -> bool {
        self.ids().fold(false, |changed, id| layer.detach(id) | changed)
    }

    /// A hexagon counts as attached when its polygon is.
    pub fn is_attached(&self, layer: &LayerGroup) -> bool {
        layer.is_attached(self.polygon)
    }
}

#[derive(Debug, Clone, Default)]
pub struct HexagonRenderer {
    style: RenderStyle,
}

impl HexagonRenderer {
    pub fn new(style: RenderStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    /// Create the fill polygon and the hidden label for a hexagon.
    ///
    /// No edges are drawn yet; that happens in
    /// [`HexagonRenderer::initialize_hexagon_edges`] once merge state is known.
    pub fn add_hexagon(
        &self,
        layer: &mut LayerGroup,
        coord: AxialCoord,
        center: GeoPoint,
        radius_m: f64,
        vertices: [GeoPoint; HEX_EDGE_COUNT],
    ) -> Hexagon {
        let polygon = layer.insert(
            Primitive::Polygon {
                vertices: vertices.to_vec(),
                style: self.style.fill(self.style.fill_opacity),
            },
            true,
        );
        let label = layer.insert(
            Primitive::Label {
                position: center,
                text: coord.display_id(),
                visible: false,
            },
            true,
        );

        Hexagon {
            coord,
            center,
            radius_m,
            vertices,
            edge_info: [EdgeState::default(); HEX_EDGE_COUNT],
            handles: RenderHandles {
                polygon,
                label,
                edges: Vec::with_capacity(HEX_EDGE_COUNT),
            },
        }
    }

    /// Draw the default edges for a freshly generated hexagon.
    pub fn initialize_hexagon_edges(&self, hexagon: &mut Hexagon, layer: &mut LayerGroup) -> usize {
        self.clear_edges(hexagon, layer);
        self.recreate_hexagon_with_visible_edges(hexagon, layer)
    }

    /// Throw away the hexagon's edge polylines and draw them again from its
    /// current edge bookkeeping. Returns the number of edges drawn.
    ///
    /// New edges take the attachment state of the polygon, so a hexagon that
    /// is currently culled stays culled.
    pub fn recreate_hexagon_with_visible_edges(&self, hexagon: &mut Hexagon, layer: &mut LayerGroup) -> usize {
        self.clear_edges(hexagon, layer);

        let attached = hexagon.handles.is_attached(layer);
        let kinds = edge_kinds(&hexagon.edge_info);
        for (i, kind) in kinds.iter().enumerate() {
            let start = hexagon.vertices[i];
            let end = hexagon.vertices[(i + 1) % HEX_EDGE_COUNT];
            let id = layer.insert(
                Primitive::Polyline {
                    points: vec![start, end],
                    style: self.style.stroke(*kind).clone(),
                },
                attached,
            );
            hexagon.handles.edges.push(id);
        }

        debug!(
            hexagon = %hexagon.coord,
            merged = hexagon.has_any_neighbor(),
            "redrew {} edges",
            hexagon.handles.edges.len()
        );
        hexagon.handles.edges.len()
    }

    /// Show the label and highlight the fill.
    pub fn pointer_enter(&self, hexagon: &Hexagon, layer: &mut LayerGroup) {
        self.set_hover(hexagon, layer, true);
    }

    /// Hide the label and restore the fill.
    pub fn pointer_leave(&self, hexagon: &Hexagon, layer: &mut LayerGroup) {
        self.set_hover(hexagon, layer, false);
    }

    /// Destroy every primitive drawn for the hexagon.
    pub fn remove_hexagon(&self, hexagon: &mut Hexagon, layer: &mut LayerGroup) {
        self.clear_edges(hexagon, layer);
        layer.remove(hexagon.handles.polygon);
        layer.remove(hexagon.handles.label);
    }

    fn clear_edges(&self, hexagon: &mut Hexagon, layer: &mut LayerGroup) {
        for id in hexagon.handles.edges.drain(..) {
            layer.remove(id);
        }
    }

    fn set_hover(&self, hexagon: &Hexagon, layer: &mut LayerGroup, hovered: bool) {
        if let Some(Primitive::Label { visible, .. }) = layer.get_mut(hexagon.handles.label) {
            *visible = hovered;
        }
        if let Some(Primitive::Polygon { style, .. }) = layer.get_mut(hexagon.handles.polygon) {
            style.fill_opacity = if hovered {
                self.style.hover_fill_opacity
            } else {
                self.style.fill_opacity
            };
        }
    }
}
