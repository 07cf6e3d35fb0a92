use serde_json::{self, Value};

use crate::error::ImportError;

/// Field access for loosely typed import records
///
/// Imported grid and location files are user-edited, so they are read as raw
/// `Value`s first and checked field by field before anything is accepted.
/// Every getter returns `None` for a missing key or a value of the wrong type.
pub struct JsonParser;

impl JsonParser {
    /// Parse a file body that must hold a top-level array of records
    pub fn parse_array(json_str: &str) -> Result<Vec<Value>, ImportError> {
        match serde_json::from_str(json_str)? {
            Value::Array(items) => Ok(items),
            _ => Err(ImportError::NotAnArray),
        }
    }

    pub fn number(record: &Value, key: &str) -> Option<f64> {
        record.get(key)?.as_f64()
    }

    pub fn text<'a>(record: &'a Value, key: &str) -> Option<&'a str> {
        record.get(key)?.as_str()
    }

    pub fn flag(record: &Value, key: &str) -> Option<bool> {
        record.get(key)?.as_bool()
    }

    pub fn list<'a>(record: &'a Value, key: &str) -> Option<&'a [Value]> {
        record.get(key)?.as_array().map(Vec::as_slice)
    }

    /// True when every key holds a JSON number
    pub fn all_numbers(record: &Value, keys: &[&str]) -> bool {
        keys.iter().all(|key| record.get(key).is_some_and(Value::is_number))
    }

    /// True when every key holds a JSON string
    pub fn all_strings(record: &Value, keys: &[&str]) -> bool {
        keys.iter().all(|key| record.get(key).is_some_and(Value::is_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_getters() {
        let record = json!({
            "name": "Harbour",
            "latitude": 22.28,
            "gridRadius": 500,
            "enabled": false,
            "mergeAreas": [["0,0", "1,0"]]
        });

        assert_eq!(JsonParser::text(&record, "name"), Some("Harbour"));
        assert_eq!(JsonParser::number(&record, "latitude"), Some(22.28));
        assert_eq!(JsonParser::number(&record, "gridRadius"), Some(500.0));
        assert_eq!(JsonParser::flag(&record, "enabled"), Some(false));
        assert_eq!(JsonParser::list(&record, "mergeAreas").map(<[Value]>::len), Some(1));

        // wrong type or missing key
        assert_eq!(JsonParser::number(&record, "name"), None);
        assert_eq!(JsonParser::text(&record, "longitude"), None);
        assert_eq!(JsonParser::flag(&record, "gridRadius"), None);
        assert_eq!(JsonParser::list(&json!(7), "mergeAreas"), None);
    }

    #[test]
    fn test_type_checks() {
        let record = json!({"latitude": 1, "longitude": 2.5, "name": "x", "areaRadius": "1"});
        assert!(JsonParser::all_numbers(&record, &["latitude", "longitude"]));
        assert!(!JsonParser::all_numbers(&record, &["latitude", "areaRadius"]));
        assert!(!JsonParser::all_numbers(&record, &["latitude", "gridRadius"]));
        assert!(JsonParser::all_strings(&record, &["name", "areaRadius"]));
        assert!(JsonParser::all_numbers(&record, &[]));
    }

    #[test]
    fn test_parse_array() {
        assert_eq!(JsonParser::parse_array("[{}, {}]").unwrap().len(), 2);
        assert!(matches!(JsonParser::parse_array("{}"), Err(ImportError::NotAnArray)));
        assert!(matches!(JsonParser::parse_array(r#"[{"name": "x""#), Err(ImportError::Json(_))));
    }
}
