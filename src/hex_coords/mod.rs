pub mod axial;
pub mod geo;

pub use axial::{
    display_id_from_internal, id_from_axial, internal_id_from_display, AxialCoord, HexIdFormat,
};
pub use geo::{geo_distance, hexagon_vertices, planar_to_geo, GeoBounds, GeoPoint};
