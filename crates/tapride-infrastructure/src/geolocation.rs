//! Geolocation providers for hosts without a device location API.

use async_trait::async_trait;

use tapride_core::config::GeolocationConfig;
use tapride_core::error::{Result, TaprideError};
use tapride_core::map::Geolocator;
use tapride_core::place::Point;

/// Reports a position taken from configuration.
#[derive(Debug, Clone)]
pub struct FixedGeolocator {
    position: Option<Point>,
}

impl FixedGeolocator {
    pub fn new(position: Option<Point>) -> Self {
        Self { position }
    }

    /// Builds a provider from configuration, or `None` when geolocation is
    /// disabled.
    pub fn from_config(config: &GeolocationConfig) -> Option<Self> {
        config
            .enabled
            .then(|| Self::new(config.fixed_position()))
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn request_current_position(&self) -> Result<Point> {
        self.position
            .ok_or_else(|| TaprideError::capability("No position configured"))
    }
}
