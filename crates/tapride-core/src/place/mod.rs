//! Geographic points and the named places (home, favorites) built on them.

mod model;

pub use model::{DEFAULT_HOME_NAME, FAVORITES_CAPACITY, NamedPlace, Point, push_newest_first};
