//! The list of saved grid records and the operations a user performs on it.
//!
//! Every change is written back to the store under `hexagonGrids`, and the
//! in-memory list only changes once that write succeeded. Operations that
//! change what is on the map take the live [`GridLayer`] explicitly.

use std::sync::Arc;

use tracing::{info, warn};

use crate::constants::{DEFAULT_NEW_GRID_CENTER, GRIDS_STORAGE_KEY};
use crate::error::{CatalogError, StoreError};
use crate::grid_config::{export_grid_records, import_grid_records, GridConfig};
use crate::grid_layer::{GridLayer, GridSummary, MapView};
use crate::hex_coords::GeoPoint;
use crate::store::{self, KeyValueStore};

#[derive(Debug)]
pub struct GridCatalog<S: KeyValueStore> {
    store: Arc<S>,
    grids: Vec<GridConfig>,
}

impl<S: KeyValueStore> GridCatalog<S> {
    /// Read the saved records. Unreadable data starts an empty catalog.
    pub async fn load(store: Arc<S>) -> Result<Self, StoreError> {
        let grids = match store::load::<Vec<GridConfig>, _>(store.as_ref(), GRIDS_STORAGE_KEY).await {
            Ok(grids) => grids.unwrap_or_default(),
            Err(StoreError::Serde(e)) => {
                warn!("saved grid records are unreadable, starting empty: {e}");
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        info!(grids = grids.len(), "grid catalog loaded");
        Ok(Self { store, grids })
    }

    pub async fn save(&self) -> Result<(), StoreError> {
        store::save(self.store.as_ref(), GRIDS_STORAGE_KEY, &self.grids).await
    }

    /// Persist `grids` and adopt them once the store accepted them.
    async fn commit(&mut self, grids: Vec<GridConfig>) -> Result<(), StoreError> {
        store::save(self.store.as_ref(), GRIDS_STORAGE_KEY, &grids).await?;
        self.grids = grids;
        Ok(())
    }

    pub fn grids(&self) -> &[GridConfig] {
        &self.grids
    }

    pub fn get(&self, index: usize) -> Option<&GridConfig> {
        self.grids.get(index)
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    fn check_index(&self, index: usize) -> Result<(), CatalogError> {
        if index < self.grids.len() {
            Ok(())
        } else {
            Err(CatalogError::IndexOutOfRange(index))
        }
    }

    /// Add a default record at the front and show it.
    ///
    /// The record is named after the new catalog size and centred on
    /// `center`, or on the fallback center when none is known.
    pub async fn create_new_grid(
        &mut self,
        center: Option<GeoPoint>,
        layer: &mut GridLayer,
        view: &dyn MapView,
    ) -> Result<GridSummary, CatalogError> {
        let (lat, lng) = DEFAULT_NEW_GRID_CENTER;
        let center = center.unwrap_or(GeoPoint::new(lat, lng));
        let config = GridConfig::new(format!("Grid {}", self.grids.len() + 1), center);

        info!(name = %config.name, "creating grid record");
        let mut grids = Vec::with_capacity(self.grids.len() + 1);
        grids.push(config);
        grids.extend(self.grids.iter().cloned());
        self.commit(grids).await?;
        self.apply_grid(0, layer, view)
    }

    /// Remove the record and hide the live grid.
    pub async fn delete_grid(&mut self, index: usize, layer: &mut GridLayer) -> Result<GridConfig, CatalogError> {
        self.check_index(index)?;
        let mut grids = self.grids.clone();
        let removed = grids.remove(index);
        self.commit(grids).await?;
        layer.hide_grid();
        info!(name = %removed.name, remaining = self.grids.len(), "grid record deleted");
        Ok(removed)
    }

    /// Show the record on the map, replacing the current grid.
    pub fn apply_grid(&self, index: usize, layer: &mut GridLayer, view: &dyn MapView) -> Result<GridSummary, CatalogError> {
        let config = self.get(index).ok_or(CatalogError::IndexOutOfRange(index))?;
        let summary = layer.apply_config(config, view)?;
        info!(name = %config.name, hexagons = summary.hexagon_count, "grid record applied");
        Ok(summary)
    }

    /// Persist the flag; enabling shows the grid, disabling hides it.
    pub async fn set_enabled(
        &mut self,
        index: usize,
        enabled: bool,
        layer: &mut GridLayer,
        view: &dyn MapView,
    ) -> Result<Option<GridSummary>, CatalogError> {
        self.check_index(index)?;
        let mut grids = self.grids.clone();
        grids[index].enabled = enabled;
        self.commit(grids).await?;

        if enabled {
            self.apply_grid(index, layer, view).map(Some)
        } else {
            layer.hide_grid();
            Ok(None)
        }
    }

    /// Replace a record with edited JSON. Invalid JSON leaves it unchanged.
    pub async fn update_grid(&mut self, index: usize, json: &str) -> Result<(), CatalogError> {
        self.check_index(index)?;
        let updated: GridConfig = serde_json::from_str(json).map_err(crate::error::ImportError::from)?;
        let mut grids = self.grids.clone();
        grids[index] = updated;
        self.commit(grids).await?;
        Ok(())
    }

    /// Validate an import file and put its valid records in front of the
    /// existing ones. Returns how many were added.
    pub async fn import_grids(&mut self, json: &str) -> Result<usize, CatalogError> {
        let report = import_grid_records(json)?;
        let added = report.accepted.len();
        if report.rejected > 0 {
            warn!(rejected = report.rejected, "some imported grid records were invalid");
        }

        let mut grids = report.accepted;
        grids.extend(self.grids.iter().cloned());
        self.commit(grids).await?;
        info!(added, total = self.grids.len(), "grid records imported");
        Ok(added)
    }

    pub fn export_grids(&self) -> Result<String, CatalogError> {
        if self.grids.is_empty() {
            return Err(CatalogError::NothingToExport);
        }
        Ok(export_grid_records(&self.grids)?)
    }
}
