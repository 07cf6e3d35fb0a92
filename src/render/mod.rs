pub mod layer;
pub mod renderer;

pub use layer::{FillStyle, LayerGroup, Primitive, PrimitiveId, PrimitiveKind, StrokeStyle};
pub use renderer::{edge_kinds, EdgeKind, HexagonRenderer, RenderHandles, RenderStyle};
