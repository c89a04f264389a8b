//! Core domain for the tapride reservation demo.
//!
//! - [`place`]: points, home and favorites
//! - [`reservation`]: the pickup/drop-off draft and the store that owns it
//! - [`map`]: the map surface and its renderer/geolocation capabilities
//! - [`storage`]: the key-value capability everything is persisted through

pub mod config;
pub mod error;
pub mod map;
pub mod payment;
pub mod place;
pub mod reservation;
pub mod storage;

// Re-export common error type
pub use error::TaprideError;
