//! Place domain models.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of favorite places kept.
pub const FAVORITES_CAPACITY: usize = 5;

/// Label used when a home is registered without an explicit name.
pub const DEFAULT_HOME_NAME: &str = "Home";

/// A geographic coordinate in degrees.
///
/// Points are plain values: two points are the same place when both
/// coordinates are equal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl Point {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lng)
    }
}

/// A labeled point, used for the home address and for favorites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedPlace {
    pub name: String,
    pub point: Point,
}

impl NamedPlace {
    pub fn new(name: impl Into<String>, point: Point) -> Self {
        Self {
            name: name.into(),
            point,
        }
    }
}

impl fmt::Display for NamedPlace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.name, self.point)
    }
}

/// Inserts `item` at the front of `list` and drops entries past `capacity`.
///
/// Shared by favorites and reservation history: newest first, oldest
/// evicted from the tail.
pub fn push_newest_first<T>(list: &mut Vec<T>, item: T, capacity: usize) {
    list.insert(0, item);
    list.truncate(capacity);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_value_equality() {
        assert_eq!(Point::new(35.0, 139.0), Point::new(35.0, 139.0));
        assert_ne!(Point::new(35.0, 139.0), Point::new(35.0, 139.5));
    }

    #[test]
    fn test_point_display_uses_five_decimals() {
        let point = Point::new(39.7036, 141.1527);
        assert_eq!(point.to_string(), "39.70360, 141.15270");
    }

    #[test]
    fn test_named_place_json_shape() {
        let place = NamedPlace::new("Home", Point::new(1.5, 2.5));
        let json = serde_json::to_value(&place).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "name": "Home", "point": { "lat": 1.5, "lng": 2.5 } })
        );
    }

    #[test]
    fn test_push_newest_first_evicts_tail() {
        let mut list = vec![1, 2, 3, 4, 5];
        push_newest_first(&mut list, 6, 5);
        assert_eq!(list, vec![6, 1, 2, 3, 4]);
    }

    #[test]
    fn test_push_newest_first_below_capacity() {
        let mut list = Vec::new();
        push_newest_first(&mut list, "a", 5);
        push_newest_first(&mut list, "b", 5);
        assert_eq!(list, vec!["b", "a"]);
    }
}
