//! Position override for attached browsing sessions.
//!
//! One [`GeolocationService`] owns the current mock position and the set of
//! sessions it has attached to. Position changes are persisted and then
//! pushed to every attached session concurrently.

pub mod channel;
pub mod service;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_GRID_CENTER, DEFAULT_MOCK_ACCURACY_M};
use crate::hex_coords::GeoPoint;

pub use channel::{ChannelCall, MemoryChannel, OverrideChannel, SessionId};
pub use service::{AttachOutcome, BroadcastReport, GeolocationService, PushOutcome};

fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// The position reported to attached sessions. Persisted under
/// `mockGeolocation` with a millisecond epoch timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockPosition {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64,
    #[serde(with = "chrono::serde::ts_milliseconds", default = "now_millis")]
    pub timestamp: DateTime<Utc>,
}

impl Default for MockPosition {
    fn default() -> Self {
        let (latitude, longitude) = DEFAULT_GRID_CENTER;
        Self::at(GeoPoint::new(latitude, longitude))
    }
}

impl MockPosition {
    /// Default accuracy, stamped now.
    pub fn at(point: GeoPoint) -> Self {
        Self {
            latitude: point.lat,
            longitude: point.lng,
            accuracy: DEFAULT_MOCK_ACCURACY_M,
            timestamp: now_millis(),
        }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}
