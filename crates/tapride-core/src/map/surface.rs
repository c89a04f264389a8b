//! Map surface: one marker, tap-to-pick, best-effort recentering.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::capability::{Geolocator, MapRenderer, ViewHandle, ViewOptions};
use crate::config::MapConfig;
use crate::error::Result;
use crate::place::Point;

/// Callback invoked once per tap, after the marker has been placed.
pub type PickPointCallback = Arc<dyn Fn(Point) + Send + Sync>;

/// Wraps a [`MapRenderer`] and reports picked points upward.
///
/// At most one marker is ever shown: the first tap creates it, later taps
/// move it.
pub struct MapSurface {
    renderer: Arc<dyn MapRenderer>,
    geolocator: Option<Arc<dyn Geolocator>>,
    geolocation_timeout: Duration,
    config: MapConfig,
    marker: Arc<Mutex<Option<Point>>>,
    on_pick_point: PickPointCallback,
    view: Option<ViewHandle>,
    tile_layer_added: bool,
    tap_listener_registered: bool,
}

impl MapSurface {
    pub fn new(
        renderer: Arc<dyn MapRenderer>,
        config: MapConfig,
        on_pick_point: PickPointCallback,
    ) -> Self {
        Self {
            renderer,
            geolocator: None,
            geolocation_timeout: Duration::from_secs(10),
            config,
            marker: Arc::new(Mutex::new(None)),
            on_pick_point,
            view: None,
            tile_layer_added: false,
            tap_listener_registered: false,
        }
    }

    /// Attaches a location provider used by
    /// [`MapSurface::try_recenter_on_current_location`].
    pub fn with_geolocator(mut self, geolocator: Arc<dyn Geolocator>, timeout: Duration) -> Self {
        self.geolocator = Some(geolocator);
        self.geolocation_timeout = timeout;
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.view.is_some() && self.tile_layer_added && self.tap_listener_registered
    }

    pub fn view(&self) -> Option<&ViewHandle> {
        self.view.as_ref()
    }

    /// Current marker position, if any tap has happened.
    pub fn marker(&self) -> Option<Point> {
        *self.marker.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Creates the view, the tile layer and the tap listener.
    ///
    /// Calling this again on an initialized surface does nothing, so a
    /// re-rendering front end can call it unconditionally. After a failed
    /// attempt a retry only performs the steps that did not complete; the
    /// view is never created twice.
    pub fn initialize(&mut self, container: &str, center: Point, zoom: u8) -> Result<()> {
        if self.is_initialized() {
            tracing::debug!(container, "Map surface already initialized, skipping");
            return Ok(());
        }

        if self.view.is_none() {
            let options = ViewOptions {
                zoom_control: self.config.zoom_control,
            };
            let view = self.renderer.create_view(container, center, zoom, &options)?;
            self.view = Some(view);
        }

        if !self.tile_layer_added {
            self.renderer
                .add_tile_layer(&self.config.tile_url_template, &self.config.attribution)?;
            self.tile_layer_added = true;
        }

        if !self.tap_listener_registered {
            let renderer = self.renderer.clone();
            let marker = self.marker.clone();
            let on_pick_point = self.on_pick_point.clone();
            self.renderer.on_tap(Box::new(move |point| {
                Self::handle_tap(renderer.as_ref(), &marker, &on_pick_point, point);
            }));
            self.tap_listener_registered = true;
        }

        tracing::info!(container, %center, zoom, "Map surface initialized");
        Ok(())
    }

    /// Initializes with the configured container, center and zoom.
    pub fn initialize_from_config(&mut self) -> Result<()> {
        let container = self.config.container.clone();
        let center = self.config.center();
        let zoom = self.config.zoom;
        self.initialize(&container, center, zoom)
    }

    /// Handles a tap at `point` as if it came from the renderer.
    pub fn on_tap(&self, point: Point) {
        Self::handle_tap(self.renderer.as_ref(), &self.marker, &self.on_pick_point, point);
    }

    fn handle_tap(
        renderer: &dyn MapRenderer,
        marker: &Mutex<Option<Point>>,
        on_pick_point: &PickPointCallback,
        point: Point,
    ) {
        {
            let mut marker = marker.lock().unwrap_or_else(|e| e.into_inner());
            if marker.is_none() {
                tracing::debug!(%point, "Placing marker");
            } else {
                tracing::debug!(%point, "Moving marker");
            }
            renderer.place_or_move_marker(point);
            *marker = Some(point);
        }
        // Lock released: the callback may read the marker.
        on_pick_point(point);
    }

    /// Asks the geolocator for the device position and recenters on success.
    ///
    /// Runs in the background and never reports failure: no provider, no
    /// runtime, denial and timeout all leave the current view unchanged.
    /// The returned handle lets callers wait for the attempt to finish.
    pub fn try_recenter_on_current_location(&self) -> Option<JoinHandle<()>> {
        let Some(geolocator) = self.geolocator.clone() else {
            tracing::debug!("No geolocation capability, keeping initial view");
            return None;
        };
        let Ok(runtime) = Handle::try_current() else {
            tracing::debug!("No async runtime, skipping geolocation");
            return None;
        };

        let renderer = self.renderer.clone();
        let zoom = self.config.recenter_zoom;
        let timeout = self.geolocation_timeout;

        Some(runtime.spawn(async move {
            match tokio::time::timeout(timeout, geolocator.request_current_position()).await {
                Ok(Ok(point)) => {
                    tracing::info!(%point, zoom, "Recentering on current location");
                    renderer.recenter(point, zoom);
                }
                Ok(Err(e)) => {
                    tracing::debug!(error = %e, "Geolocation unavailable, keeping initial view");
                }
                Err(_) => {
                    tracing::debug!(?timeout, "Geolocation timed out, keeping initial view");
                }
            }
        }))
    }
}
