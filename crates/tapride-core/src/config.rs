//! Application configuration models.
//!
//! Loaded from `config.toml` by the infrastructure layer. Every section and
//! field has a default, so a partial (or missing) file is valid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::place::Point;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub map: MapConfig,
    pub storage: StorageConfig,
    pub geolocation: GeolocationConfig,
}

/// Initial view and background layer of the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Container the view is mounted into.
    pub container: String,
    pub center_lat: f64,
    pub center_lng: f64,
    pub zoom: u8,
    /// Zoom used after recentering on the device location.
    pub recenter_zoom: u8,
    pub tile_url_template: String,
    pub attribution: String,
    /// Whether the renderer shows its own zoom buttons.
    pub zoom_control: bool,
}

impl MapConfig {
    pub fn center(&self) -> Point {
        Point::new(self.center_lat, self.center_lng)
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            container: "map".to_string(),
            center_lat: 39.7036,
            center_lng: 141.1527,
            zoom: 12,
            recenter_zoom: 13,
            tile_url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "&copy; OpenStreetMap contributors".to_string(),
            zoom_control: false,
        }
    }
}

/// Where persisted rider data lives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides the platform data directory when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

/// Device location lookup used to recenter the map on startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeolocationConfig {
    pub enabled: bool,
    /// Fixed position reported by terminal front ends that have no GPS.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub timeout_ms: u64,
}

impl GeolocationConfig {
    pub fn fixed_position(&self) -> Option<Point> {
        self.latitude
            .zip(self.longitude)
            .map(|(lat, lng)| Point::new(lat, lng))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            latitude: None,
            longitude: None,
            timeout_ms: 10_000,
        }
    }
}
