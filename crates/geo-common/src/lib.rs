//! Common types and utilities shared across the resource FLH workspace.

pub mod error;
pub mod grid;
pub mod hours;
pub mod technology;
pub mod window;

pub use error::{ResourceError, Result};
pub use grid::{HourlyField, Raster, Resolution};
pub use hours::{day_of_year, hour_of_day, HourSpan, HOURS_PER_DAY, HOURS_PER_YEAR};
pub use technology::Technology;
pub use window::{GeoPoint, GeoWindow};
