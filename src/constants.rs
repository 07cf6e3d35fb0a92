// Flat-earth projection: metres per degree of latitude. Longitude is scaled
// by cos(latitude) on top of this. Only valid over regional areas.
pub const METERS_PER_DEGREE_LAT: f64 = 111_111.0;

pub const HEX_EDGE_COUNT: usize = 6;
pub const HEX_VERTEX_ANGLE_STEP_DEG: f64 = 60.0;
pub const HEX_VERTEX_ANGLE_OFFSET_DEG: f64 = 30.0; // pointy-top

// Grid defaults (metres)
pub const DEFAULT_HEX_RADIUS_M: f64 = 500.0;
pub const DEFAULT_AREA_RADIUS_M: f64 = 5000.0;
pub const DEFAULT_MAX_HEXAGONS: usize = 20_000;

// Fallback centers used when nothing else is known
pub const DEFAULT_GRID_CENTER: (f64, f64) = (37.7749, -122.4194);
pub const DEFAULT_NEW_GRID_CENTER: (f64, f64) = (39.9042, 116.4074);

// Merge detection: an edge midpoint must lie within this fraction of the
// hex radius from both centroids to be a shared-edge candidate.
pub const MERGE_SEARCH_RADIUS_FACTOR: f64 = 0.9;

// Viewport culling: bounds are expanded by (margin - 1) on every side.
pub const DEFAULT_VIEWPORT_MARGIN: f64 = 1.2;

// Styling
pub const HEX_COLOR: &str = "#3388ff";
pub const HEX_FILL_OPACITY: f64 = 0.2;
pub const HEX_HOVER_FILL_OPACITY: f64 = 0.4;
pub const REGULAR_EDGE_WEIGHT: f64 = 0.6;
pub const REGULAR_EDGE_OPACITY: f64 = 0.6;
pub const OUTER_EDGE_WEIGHT: f64 = 0.6;
pub const OUTER_EDGE_OPACITY: f64 = 0.8;
pub const INNER_EDGE_WEIGHT: f64 = 0.06;
pub const INNER_EDGE_OPACITY: f64 = 0.1;

// Geolocation override
pub const DEFAULT_MOCK_ACCURACY_M: f64 = 10.0;

// Storage keys
pub const GRIDS_STORAGE_KEY: &str = "hexagonGrids";
pub const LOCATIONS_STORAGE_KEY: &str = "savedLocations";
pub const MOCK_POSITION_STORAGE_KEY: &str = "mockGeolocation";
