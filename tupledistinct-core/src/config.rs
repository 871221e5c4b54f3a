// tupledistinct-core/src/config.rs
// Progress-interval settings: one process-wide default, per-entry-point overrides

use crate::error::{DistinctError, Result};
use lazy_static::lazy_static;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Default progress interval (10 seconds)
pub const DEFAULT_STATUS_INTERVAL_MS: i64 = 10_000;

/// Which public entry point a setting applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    Collection,
    Cursor,
}

/// Settings for distinct-tuple calls.
///
/// Intervals are in milliseconds; zero or negative disables progress output.
/// The per-entry-point values fall back to `status_interval_ms` when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistinctSettings {
    pub status_interval_ms: i64,
    pub collection_interval_ms: Option<i64>,
    pub cursor_interval_ms: Option<i64>,
}

impl Default for DistinctSettings {
    fn default() -> Self {
        DistinctSettings {
            status_interval_ms: DEFAULT_STATUS_INTERVAL_MS,
            collection_interval_ms: None,
            cursor_interval_ms: None,
        }
    }
}

impl DistinctSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status_interval(mut self, interval_ms: i64) -> Self {
        self.status_interval_ms = interval_ms;
        self
    }

    pub fn with_collection_interval(mut self, interval_ms: i64) -> Self {
        self.collection_interval_ms = Some(interval_ms);
        self
    }

    pub fn with_cursor_interval(mut self, interval_ms: i64) -> Self {
        self.cursor_interval_ms = Some(interval_ms);
        self
    }

    /// Effective interval for an entry point
    pub fn interval_for(&self, entry: EntryPoint) -> i64 {
        let specific = match entry {
            EntryPoint::Collection => self.collection_interval_ms,
            EntryPoint::Cursor => self.cursor_interval_ms,
        };
        specific.unwrap_or(self.status_interval_ms)
    }

    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| DistinctError::Config(e.to_string()))
    }
}

lazy_static! {
    static ref GLOBAL_SETTINGS: RwLock<DistinctSettings> = RwLock::new(DistinctSettings::default());
}

/// Snapshot of the process-wide settings.
///
/// Entry points take a snapshot when they are constructed, so later changes
/// only affect entry points created afterwards.
pub fn settings() -> DistinctSettings {
    GLOBAL_SETTINGS.read().clone()
}

/// Set the shared default interval used by both entry points
pub fn set_status_interval(interval_ms: i64) {
    GLOBAL_SETTINGS.write().status_interval_ms = interval_ms;
}

pub fn set_collection_status_interval(interval_ms: Option<i64>) {
    GLOBAL_SETTINGS.write().collection_interval_ms = interval_ms;
}

pub fn set_cursor_status_interval(interval_ms: Option<i64>) {
    GLOBAL_SETTINGS.write().cursor_interval_ms = interval_ms;
}

pub fn replace_settings(new_settings: DistinctSettings) {
    *GLOBAL_SETTINGS.write() = new_settings;
}

pub fn reset_settings() {
    replace_settings(DistinctSettings::default());
}
