//! Interactive map surface and the capabilities it is built on.

mod capability;
mod surface;

pub use capability::{Geolocator, MapRenderer, TapHandler, ViewHandle, ViewOptions};
pub use surface::{MapSurface, PickPointCallback};
