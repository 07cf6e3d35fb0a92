/// Saved locations: named points the user can jump back to
///
/// Stored under `savedLocations` as a JSON array of
/// `{name, latitude, longitude, timestamp}`. Import validates element by
/// element like grid records do, and either appends to or replaces the list.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::constants::LOCATIONS_STORAGE_KEY;
use crate::error::{ImportError, LocationError, StoreError};
use crate::hex_coords::GeoPoint;
use crate::json_parser::JsonParser;
use crate::store::{self, KeyValueStore};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
}

impl SavedLocation {
    pub fn new(name: &str, position: GeoPoint) -> Result<Self, LocationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LocationError::EmptyName);
        }
        Ok(Self {
            name: name.to_string(),
            latitude: position.lat,
            longitude: position.lng,
            timestamp: Utc::now(),
        })
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Imported elements need a string name and numeric coordinates. A
    /// missing or unparseable timestamp is replaced with the import time.
    fn from_import_value(value: &Value) -> Option<Self> {
        let name = JsonParser::text(value, "name")?;
        let timestamp = JsonParser::text(value, "timestamp")
            .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        Some(Self {
            name: name.to_string(),
            latitude: JsonParser::number(value, "latitude")?,
            longitude: JsonParser::number(value, "longitude")?,
            timestamp,
        })
    }
}

/// How imported locations combine with the existing list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    Merge,
    Replace,
}

#[derive(Debug)]
pub struct LocationBook<S: KeyValueStore> {
    store: Arc<S>,
    locations: Vec<SavedLocation>,
}

impl<S: KeyValueStore> LocationBook<S> {
    pub async fn load(store: Arc<S>) -> Result<Self, StoreError> {
        let locations = match store::load::<Vec<SavedLocation>, _>(store.as_ref(), LOCATIONS_STORAGE_KEY).await {
            Ok(locations) => locations.unwrap_or_default(),
            Err(StoreError::Serde(e)) => {
                warn!("saved locations are unreadable, starting empty: {e}");
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        Ok(Self { store, locations })
    }

    /// Persist `locations` and adopt them once the store accepted them.
    async fn commit(&mut self, locations: Vec<SavedLocation>, action: &str) -> Result<(), StoreError> {
        store::save(self.store.as_ref(), LOCATIONS_STORAGE_KEY, &locations).await?;
        self.locations = locations;
        info!(count = self.locations.len(), "locations {action}");
        Ok(())
    }

    pub fn locations(&self) -> &[SavedLocation] {
        &self.locations
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SavedLocation> {
        self.locations.get(index)
    }

    pub async fn save_current_location(&mut self, name: &str, position: GeoPoint) -> Result<&SavedLocation, LocationError> {
        let mut locations = self.locations.clone();
        locations.push(SavedLocation::new(name, position)?);
        self.commit(locations, "saved").await?;
        let last = self.locations.len() - 1;
        Ok(&self.locations[last])
    }

    /// Replace name and position; the timestamp is refreshed.
    pub async fn edit_location(&mut self, index: usize, name: &str, position: GeoPoint) -> Result<(), LocationError> {
        if index >= self.locations.len() {
            return Err(LocationError::IndexOutOfRange(index));
        }
        let mut locations = self.locations.clone();
        locations[index] = SavedLocation::new(name, position)?;
        self.commit(locations, "updated").await?;
        Ok(())
    }

    pub async fn delete_location(&mut self, index: usize) -> Result<SavedLocation, LocationError> {
        if index >= self.locations.len() {
            return Err(LocationError::IndexOutOfRange(index));
        }
        let mut locations = self.locations.clone();
        let removed = locations.remove(index);
        self.commit(locations, "deleted").await?;
        Ok(removed)
    }

    pub fn use_location(&self, index: usize) -> Option<GeoPoint> {
        self.get(index).map(SavedLocation::position)
    }

    pub fn export_locations(&self) -> Result<String, ImportError> {
        Ok(serde_json::to_string_pretty(&self.locations)?)
    }

    /// Returns the number of valid locations taken from `json`.
    pub async fn import_locations(&mut self, json: &str, mode: ImportMode) -> Result<usize, LocationError> {
        let items = JsonParser::parse_array(json)?;
        let valid: Vec<SavedLocation> = items.iter().filter_map(SavedLocation::from_import_value).collect();
        if valid.is_empty() {
            return Err(ImportError::NoValidRecords.into());
        }
        if valid.len() < items.len() {
            warn!(dropped = items.len() - valid.len(), "dropping invalid imported locations");
        }

        let added = valid.len();
        let locations = match mode {
            ImportMode::Merge => self.locations.iter().cloned().chain(valid).collect(),
            ImportMode::Replace => valid,
        };
        self.commit(locations, "imported").await?;
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    async fn book() -> (LocationBook<MemoryStore>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (LocationBook::load(store.clone()).await.unwrap(), store)
    }

    #[tokio::test]
    async fn test_save_trims_and_rejects_blank_names() {
        let (mut book, store) = book().await;
        let saved = book
            .save_current_location("  Office  ", GeoPoint::new(31.2304, 121.4737))
            .await
            .unwrap();
        assert_eq!(saved.name, "Office");

        assert!(matches!(
            book.save_current_location("   ", GeoPoint::new(0.0, 0.0)).await,
            Err(LocationError::EmptyName)
        ));
        assert_eq!(book.len(), 1);

        let stored = store.snapshot(LOCATIONS_STORAGE_KEY).unwrap();
        assert_eq!(stored[0]["name"], "Office");
        assert!(stored[0]["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_edit_delete_and_use() {
        let (mut book, _) = book().await;
        book.save_current_location("a", GeoPoint::new(1.0, 2.0)).await.unwrap();
        book.save_current_location("b", GeoPoint::new(3.0, 4.0)).await.unwrap();

        book.edit_location(0, "A", GeoPoint::new(5.0, 6.0)).await.unwrap();
        assert_eq!(book.use_location(0), Some(GeoPoint::new(5.0, 6.0)));
        assert_eq!(book.get(0).unwrap().name, "A");
        assert!(matches!(
            book.edit_location(9, "x", GeoPoint::new(0.0, 0.0)).await,
            Err(LocationError::IndexOutOfRange(9))
        ));

        let removed = book.delete_location(1).await.unwrap();
        assert_eq!(removed.name, "b");
        assert_eq!(book.use_location(1), None);
    }

    #[tokio::test]
    async fn test_failed_writes_leave_the_book_alone() {
        let (mut book, store) = book().await;
        book.save_current_location("home", GeoPoint::new(1.0, 1.0)).await.unwrap();
        let before = book.locations().to_vec();

        store.set_read_only(true);
        assert!(matches!(
            book.save_current_location("work", GeoPoint::new(2.0, 2.0)).await,
            Err(LocationError::Store(_))
        ));
        assert!(matches!(
            book.edit_location(0, "renamed", GeoPoint::new(3.0, 3.0)).await,
            Err(LocationError::Store(_))
        ));
        assert!(matches!(book.delete_location(0).await, Err(LocationError::Store(_))));
        let json = json!([{"name": "x", "latitude": 10, "longitude": 20}]).to_string();
        assert!(matches!(
            book.import_locations(&json, ImportMode::Replace).await,
            Err(LocationError::Store(_))
        ));

        assert_eq!(book.locations(), before.as_slice());
        assert_eq!(store.snapshot(LOCATIONS_STORAGE_KEY).unwrap()[0]["name"], "home");
    }

    #[tokio::test]
    async fn test_import_merge_and_replace() {
        let (mut book, _) = book().await;
        book.save_current_location("home", GeoPoint::new(1.0, 1.0)).await.unwrap();

        let json = json!([
            {"name": "x", "latitude": 10, "longitude": 20, "timestamp": "2024-05-01T08:00:00Z"},
            {"name": "y", "latitude": "10", "longitude": 20},
            {"name": "z", "latitude": 30, "longitude": 40}
        ])
        .to_string();

        assert_eq!(book.import_locations(&json, ImportMode::Merge).await.unwrap(), 2);
        let names: Vec<_> = book.locations().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["home", "x", "z"]);
        assert_eq!(book.get(1).unwrap().timestamp.to_rfc3339(), "2024-05-01T08:00:00+00:00");

        book.import_locations(&json, ImportMode::Replace).await.unwrap();
        assert_eq!(book.len(), 2);

        assert!(matches!(
            book.import_locations("[{}]", ImportMode::Replace).await,
            Err(LocationError::Import(ImportError::NoValidRecords))
        ));
        assert!(matches!(
            book.import_locations("{}", ImportMode::Merge).await,
            Err(LocationError::Import(ImportError::NotAnArray))
        ));
        assert_eq!(book.len(), 2);
    }

    #[tokio::test]
    async fn test_export_reloads() {
        let (mut book, store) = book().await;
        book.save_current_location("p", GeoPoint::new(-33.8688, 151.2093)).await.unwrap();
        let text = book.export_locations().unwrap();
        assert!(text.contains("\"latitude\": -33.8688"));

        let reloaded = LocationBook::load(store).await.unwrap();
        assert_eq!(reloaded.locations(), book.locations());
    }
}
