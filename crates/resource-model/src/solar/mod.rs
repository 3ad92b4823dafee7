//! Solar resource models.

pub mod capacity;
pub mod geometry;
pub mod irradiance;
mod trig;

pub use capacity::{csp_capacity_factor, pv_capacity_factor, SolarPixelInputs};
pub use geometry::{optimal_tilt, PixelGeometry, SolarDay, SolarGeometry, SolarGeometryRequest};
