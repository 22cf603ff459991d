//! Shared behaviour of cached entities

mod model;

pub use model::{ClearMarkers, Model, RawObject};
