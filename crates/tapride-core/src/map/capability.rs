//! Capability traits for the map renderer and device geolocation.
//!
//! The rendering engine (tiles, pan/zoom, marker drawing) and the location
//! provider are external. The surface only talks to them through these
//! traits.

use async_trait::async_trait;

use crate::error::Result;
use crate::place::Point;

/// Handler the renderer invokes with the coordinate of each tap.
pub type TapHandler = Box<dyn Fn(Point) + Send + Sync>;

/// Options applied when a view is created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewOptions {
    pub zoom_control: bool,
}

/// A view created by a [`MapRenderer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewHandle {
    container: String,
}

impl ViewHandle {
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
        }
    }

    pub fn container(&self) -> &str {
        &self.container
    }
}

/// A map rendering engine.
///
/// Methods take `&self`; implementations keep their own view state behind
/// interior mutability so the renderer can be shared with tap handlers and
/// background recentering.
pub trait MapRenderer: Send + Sync {
    /// Mounts a view into `container` at `center`/`zoom`.
    fn create_view(
        &self,
        container: &str,
        center: Point,
        zoom: u8,
        options: &ViewOptions,
    ) -> Result<ViewHandle>;

    /// Adds a background tile layer.
    fn add_tile_layer(&self, url_template: &str, attribution: &str) -> Result<()>;

    /// Registers the tap listener.
    fn on_tap(&self, handler: TapHandler);

    /// Shows the single marker at `point`, creating it on first use.
    fn place_or_move_marker(&self, point: Point);

    /// Moves the camera.
    fn recenter(&self, point: Point, zoom: u8);
}

/// Device location provider.
///
/// Denial, unavailability and timeouts are reported as errors; callers
/// treat them all the same way.
#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn request_current_position(&self) -> Result<Point>;
}
