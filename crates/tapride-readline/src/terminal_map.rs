//! Map renderer for the terminal front end.
//!
//! There is nothing to draw, so the renderer only keeps the view state the
//! surface asks for and lets the REPL deliver taps through the registered
//! handler, as a real map widget would.

use std::sync::Mutex;

use tapride_core::error::Result;
use tapride_core::map::{MapRenderer, TapHandler, ViewHandle, ViewOptions};
use tapride_core::place::Point;

/// What the map would currently show.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub container: Option<String>,
    pub center: Option<Point>,
    pub zoom: u8,
    pub zoom_control: bool,
    pub tile_layer: Option<TileLayer>,
    pub marker: Option<Point>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLayer {
    pub url_template: String,
    pub attribution: String,
}

#[derive(Default)]
pub struct TerminalMapRenderer {
    state: Mutex<ViewState>,
    tap_handler: Mutex<Option<TapHandler>>,
}

impl TerminalMapRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ViewState {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Delivers a tap to the registered handler.
    ///
    /// Returns `false` when no handler is registered yet.
    pub fn simulate_tap(&self, point: Point) -> bool {
        let handler = self.tap_handler.lock().unwrap_or_else(|e| e.into_inner());
        match handler.as_ref() {
            Some(handler) => {
                handler(point);
                true
            }
            None => false,
        }
    }

    fn update(&self, f: impl FnOnce(&mut ViewState)) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut state);
    }
}

impl MapRenderer for TerminalMapRenderer {
    fn create_view(
        &self,
        container: &str,
        center: Point,
        zoom: u8,
        options: &ViewOptions,
    ) -> Result<ViewHandle> {
        self.update(|state| {
            state.container = Some(container.to_string());
            state.center = Some(center);
            state.zoom = zoom;
            state.zoom_control = options.zoom_control;
        });
        Ok(ViewHandle::new(container))
    }

    fn add_tile_layer(&self, url_template: &str, attribution: &str) -> Result<()> {
        self.update(|state| {
            state.tile_layer = Some(TileLayer {
                url_template: url_template.to_string(),
                attribution: attribution.to_string(),
            });
        });
        Ok(())
    }

    fn on_tap(&self, handler: TapHandler) {
        *self.tap_handler.lock().unwrap_or_else(|e| e.into_inner()) = Some(handler);
    }

    fn place_or_move_marker(&self, point: Point) {
        self.update(|state| state.marker = Some(point));
    }

    fn recenter(&self, point: Point, zoom: u8) {
        self.update(|state| {
            state.center = Some(point);
            state.zoom = zoom;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_tap_without_handler() {
        let renderer = TerminalMapRenderer::new();
        assert!(!renderer.simulate_tap(Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_tap_reaches_handler() {
        let renderer = TerminalMapRenderer::new();
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        renderer.on_tap(Box::new(move |point: Point| {
            *sink.lock().unwrap() = Some(point);
        }));

        assert!(renderer.simulate_tap(Point::new(1.0, 2.0)));
        assert_eq!(*seen.lock().unwrap(), Some(Point::new(1.0, 2.0)));
    }

    #[test]
    fn test_view_state_tracks_calls() {
        let renderer = TerminalMapRenderer::new();
        renderer
            .create_view("map", Point::new(1.0, 1.0), 12, &ViewOptions::default())
            .unwrap();
        renderer.place_or_move_marker(Point::new(2.0, 2.0));
        renderer.recenter(Point::new(3.0, 3.0), 13);

        let state = renderer.snapshot();
        assert_eq!(state.container.as_deref(), Some("map"));
        assert_eq!(state.center, Some(Point::new(3.0, 3.0)));
        assert_eq!(state.zoom, 13);
        assert_eq!(state.marker, Some(Point::new(2.0, 2.0)));
    }
}
