/// Retained-mode drawable layer
///
/// Stands in for the map's layer group: primitives are created once, then
/// attached to or detached from the visible layer without being destroyed.
/// Removing a primitive destroys it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::hex_coords::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PrimitiveId(u64);

impl PrimitiveId {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: String,
    pub weight: f64,
    pub opacity: f64,
}

/// Fill-only polygon style; hexagon outlines are drawn as separate polylines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillStyle {
    pub color: String,
    pub fill_opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Primitive {
    Polygon { vertices: Vec<GeoPoint>, style: FillStyle },
    Polyline { points: Vec<GeoPoint>, style: StrokeStyle },
    Label { position: GeoPoint, text: String, visible: bool },
}

impl Primitive {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Polygon { .. } => PrimitiveKind::Polygon,
            Primitive::Polyline { .. } => PrimitiveKind::Polyline,
            Primitive::Label { .. } => PrimitiveKind::Label,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Polygon,
    Polyline,
    Label,
}

#[derive(Debug, Clone)]
struct Slot {
    primitive: Primitive,
    attached: bool,
}

#[derive(Debug, Default)]
pub struct LayerGroup {
    next_id: u64,
    slots: HashMap<PrimitiveId, Slot>,
}

impl LayerGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, primitive: Primitive, attached: bool) -> PrimitiveId {
        let id = PrimitiveId(self.next_id);
        self.next_id += 1;
        self.slots.insert(id, Slot { primitive, attached });
        id
    }

    /// Destroy a primitive. Returns it if it existed.
    pub fn remove(&mut self, id: PrimitiveId) -> Option<Primitive> {
        self.slots.remove(&id).map(|slot| slot.primitive)
    }

    /// Returns true if the primitive was detached before.
    pub fn attach(&mut self, id: PrimitiveId) -> bool {
        match self.slots.get_mut(&id) {
            Some(slot) if !slot.attached => {
                slot.attached = true;
                true
            }
            _ => false,
        }
    }

    /// Returns true if the primitive was attached before.
    pub fn detach(&mut self, id: PrimitiveId) -> bool {
        match self.slots.get_mut(&id) {
            Some(slot) if slot.attached => {
                slot.attached = false;
                true
            }
            _ => false,
        }
    }

    pub fn is_attached(&self, id: PrimitiveId) -> bool {
        self.slots.get(&id).is_some_and(|slot| slot.attached)
    }

    pub fn contains(&self, id: PrimitiveId) -> bool {
        self.slots.contains_key(&id)
    }

    pub fn get(&self, id: PrimitiveId) -> Option<&Primitive> {
        self.slots.get(&id).map(|slot| &slot.primitive)
    }

    pub fn get_mut(&mut self, id: PrimitiveId) -> Option<&mut Primitive> {
        self.slots.get_mut(&id).map(|slot| &mut slot.primitive)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn attached_count(&self) -> usize {
        self.slots.values().filter(|slot| slot.attached).count()
    }

    pub fn count_kind(&self, kind: PrimitiveKind) -> usize {
        self.slots.values().filter(|slot| slot.primitive.kind() == kind).count()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}
