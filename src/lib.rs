pub mod constants;
pub mod error;
pub mod math_utils;
pub mod hex_coords;
pub mod hex_grid;
pub mod render;
pub mod merge;
pub mod viewport;
pub mod grid_layer;
pub mod json_parser;
pub mod grid_config;
pub mod grid_catalog;
pub mod locations;
pub mod store;
pub mod geolocation;
