/// Persisted grid records and their JSON import/export
///
/// Records are stored and exchanged as a JSON array with camelCase keys.
/// Imports are checked element by element; elements without a string `name`
/// and numeric `latitude`, `longitude`, `areaRadius` and `gridRadius` are
/// dropped instead of failing the whole file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::constants::{DEFAULT_AREA_RADIUS_M, DEFAULT_HEX_RADIUS_M};
use crate::error::ImportError;
use crate::hex_coords::GeoPoint;
use crate::json_parser::JsonParser;

const REQUIRED_NUMBERS: [&str; 4] = ["latitude", "longitude", "areaRadius", "gridRadius"];

fn enabled_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub area_radius: f64,
    pub grid_radius: f64,
    #[serde(default)]
    pub merge_areas: Vec<Vec<String>>,
    #[serde(default = "enabled_default")]
    pub enabled: bool,
}

impl GridConfig {
    /// New enabled record with default radii and no merges.
    pub fn new(name: impl Into<String>, center: GeoPoint) -> Self {
        Self {
            name: name.into(),
            latitude: center.lat,
            longitude: center.lng,
            area_radius: DEFAULT_AREA_RADIUS_M,
            grid_radius: DEFAULT_HEX_RADIUS_M,
            merge_areas: Vec::new(),
            enabled: true,
        }
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Accept an imported element if its required fields have the right
    /// JSON types. Merge groups keep only their string members; a missing
    /// `enabled` means enabled.
    pub fn from_import_value(value: &Value) -> Option<Self> {
        let name = JsonParser::text(value, "name")?;
        if !JsonParser::all_numbers(value, &REQUIRED_NUMBERS) {
            return None;
        }

        let merge_areas = JsonParser::list(value, "mergeAreas")
            .map(|groups| {
                groups
                    .iter()
                    .filter_map(Value::as_array)
                    .map(|group| group.iter().filter_map(|id| id.as_str().map(str::to_string)).collect())
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            name: name.to_string(),
            latitude: JsonParser::number(value, "latitude")?,
            longitude: JsonParser::number(value, "longitude")?,
            area_radius: JsonParser::number(value, "areaRadius")?,
            grid_radius: JsonParser::number(value, "gridRadius")?,
            merge_areas,
            enabled: JsonParser::flag(value, "enabled").unwrap_or(true),
        })
    }
}

/// Result of validating an import file.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    pub accepted: Vec<GridConfig>,
    pub rejected: usize,
}

/// Parse and validate an exported grid file.
///
/// Fails if the text is not JSON, not an array, or holds no valid element.
pub fn import_grid_records(json_str: &str) -> Result<ImportReport, ImportError> {
    let items = JsonParser::parse_array(json_str)?;
    let total = items.len();

    let mut accepted = Vec::with_capacity(total);
    for (i, item) in items.iter().enumerate() {
        match GridConfig::from_import_value(item) {
            Some(config) => accepted.push(config),
            None => warn!(element = i, "dropping invalid grid record"),
        }
    }

    if accepted.is_empty() {
        return Err(ImportError::NoValidRecords);
    }
    let rejected = total - accepted.len();
    Ok(ImportReport { accepted, rejected })
}

/// Read and validate an exported grid file from disk.
pub fn load_grid_file<P: AsRef<Path>>(path: P) -> Result<ImportReport, ImportError> {
    let text = fs::read_to_string(path.as_ref())?;
    import_grid_records(&text)
}

/// Pretty-printed JSON array.
pub fn export_grid_records(records: &[GridConfig]) -> Result<String, ImportError> {
    Ok(serde_json::to_string_pretty(records)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_field_names() {
        let config = GridConfig::new("Grid 1", GeoPoint::new(39.9042, 116.4074));
        let value = serde_json::to_value(&config).unwrap();
        for key in ["name", "latitude", "longitude", "areaRadius", "gridRadius", "mergeAreas", "enabled"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["areaRadius"], 5000.0);
        assert_eq!(value["gridRadius"], 500.0);
        assert_eq!(value["enabled"], true);
    }

    #[test]
    fn test_import_filters_invalid_elements() {
        let json = r#"[
            {"name": "ok", "latitude": 1, "longitude": 2.5, "areaRadius": 1000, "gridRadius": 100,
             "mergeAreas": [["0,0", "1,-1"], ["p0p0", 7, "n1p0"], "junk"], "enabled": false},
            {"name": "no radius", "latitude": 1, "longitude": 2},
            {"name": 5, "latitude": 1, "longitude": 2, "areaRadius": 1, "gridRadius": 1},
            {"name": "string lat", "latitude": "1", "longitude": 2, "areaRadius": 1, "gridRadius": 1},
            null,
            {"name": "minimal", "latitude": 0, "longitude": 0, "areaRadius": 10, "gridRadius": 5}
        ]"#;
        let report = import_grid_records(json).unwrap();
        assert_eq!(report.rejected, 4);
        assert_eq!(report.accepted.len(), 2);

        let ok = &report.accepted[0];
        assert_eq!(ok.name, "ok");
        assert_eq!(ok.longitude, 2.5);
        assert!(!ok.enabled);
        assert_eq!(ok.merge_areas, vec![vec!["0,0", "1,-1"], vec!["p0p0", "n1p0"]]);

        let minimal = &report.accepted[1];
        assert!(minimal.enabled);
        assert!(minimal.merge_areas.is_empty());
    }

    #[test]
    fn test_import_errors() {
        assert!(matches!(import_grid_records("{}"), Err(ImportError::NotAnArray)));
        assert!(matches!(import_grid_records("not json"), Err(ImportError::Json(_))));
        assert!(matches!(import_grid_records("[]"), Err(ImportError::NoValidRecords)));
        assert!(matches!(import_grid_records(r#"[{"name": "x"}]"#), Err(ImportError::NoValidRecords)));
        assert!(matches!(load_grid_file("/no/such/grids.json"), Err(ImportError::Io(_))));
    }

    #[test]
    fn test_export_is_pretty_and_reimportable() {
        let mut config = GridConfig::new("Grid 1", GeoPoint::new(1.0, 2.0));
        config.merge_areas = vec![vec!["0,0".into(), "1,0".into()]];
        let text = export_grid_records(&[config.clone()]).unwrap();
        assert!(text.contains("\n  {"));
        assert!(text.contains("\"mergeAreas\""));

        let report = import_grid_records(&text).unwrap();
        assert_eq!(report.accepted, vec![config]);
    }
}
