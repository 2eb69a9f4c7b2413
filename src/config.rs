//! Repository configuration.

use std::path::Path;

use config::{Config, File};
use serde::{Deserialize, Serialize};

use calbridge_core::error::{CalBridgeError, CalBridgeResult};

static DEFAULT_CALENDAR_ID: &str = "1";

fn default_calendar_id() -> String {
    DEFAULT_CALENDAR_ID.to_string()
}

/// Configuration for an [`EventRepository`](crate::repository::EventRepository).
///
/// Constructing with `Default` is the common path; `load` layers an
/// optional TOML file on top of the defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Calendar that event creation falls back to when the draft names no
    /// calendar and none can be resolved. `"1"` is the host stores'
    /// long-standing well-known default.
    pub default_calendar_id: String,

    /// IANA zone written to new event records when the draft sets none.
    /// Defaults to the system zone.
    pub time_zone: Option<String>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            default_calendar_id: default_calendar_id(),
            time_zone: None,
        }
    }
}

impl RepositoryConfig {
    /// Load configuration from a TOML file, falling back to defaults for
    /// anything the file does not set (or when it does not exist).
    pub fn load(path: &Path) -> CalBridgeResult<Self> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .build()
            .map_err(|e| CalBridgeError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalBridgeError::Config(e.to_string()))
    }
}
