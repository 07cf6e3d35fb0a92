//! Error types for grid construction, record import and the override service.
//!
//! None of these are fatal to a shown grid: merge and ID problems are logged
//! and skipped by the callers, the rest surface to whoever triggered the
//! operation.

use thiserror::Error;

use crate::hex_coords::AxialCoord;

/// A hexagon identifier that is neither `q,r` nor `p3n2` shaped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    #[error("malformed hexagon id {0:?}")]
    Malformed(String),

    #[error("hexagon id {0:?} is out of range")]
    OutOfRange(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("invalid {what} radius: {value} m")]
    InvalidRadius { what: &'static str, value: f64 },

    #[error("grid would contain {count} hexagons, limit is {limit}")]
    TooManyHexagons { count: usize, limit: usize },

    #[error("invalid grid center: {lat}, {lng}")]
    InvalidCenter { lat: f64, lng: f64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    #[error("edge index {edge} out of range for hexagon {hexagon}")]
    EdgeIndexOutOfRange { hexagon: AxialCoord, edge: usize },
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not read import file: {0}")]
    Io(#[from] std::io::Error),

    #[error("imported data is not a JSON array")]
    NotAnArray,

    #[error("imported data contains no valid records")]
    NoValidRecords,
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("no grid record at index {0}")]
    IndexOutOfRange(usize),

    #[error("there are no grid records to export")]
    NothingToExport,

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum LocationError {
    #[error("location name must not be empty")]
    EmptyName,

    #[error("no saved location at index {0}")]
    IndexOutOfRange(usize),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("stored value could not be (de)serialized: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Failures reported by the debugger-side override channel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("debugger is not attached to session {0}")]
    NotAttached(u32),

    #[error("cannot access session {0}")]
    Unavailable(u32),

    #[error("channel transport error: {0}")]
    Transport(String),
}

impl ChannelError {
    /// Errors after which a detach + re-attach is worth one retry.
    pub fn is_reconnectable(&self) -> bool {
        matches!(self, ChannelError::NotAttached(_) | ChannelError::Unavailable(_))
    }
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error("invalid position: {latitude}, {longitude}")]
    InvalidPosition { latitude: f64, longitude: f64 },
}
