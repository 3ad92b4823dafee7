//! Physical models turning weather into hourly capacity factors.
//!
//! - [`solar`]: sun position, irradiance decomposition on tilted surfaces,
//!   cell-temperature losses and PV/CSP capacity factors.
//! - [`wind`]: hub-height correction rasters and the turbine power curve.
//! - [`landuse`]: per-class coefficient tables and the class remap.
//!
//! Every function here is pure. Numeric edge cases (night, polar days,
//! non-finite inputs) are clamped or zeroed locally and never surface as
//! errors.

pub mod landuse;
pub mod params;
pub mod solar;
pub mod wind;

pub use landuse::{remap, LanduseCoefficient, LanduseTable};
pub use params::{CspParams, PvParams, Tracking, TurbineParams};
pub use solar::{
    csp_capacity_factor, pv_capacity_factor, PixelGeometry, SolarGeometry, SolarGeometryRequest,
    SolarPixelInputs,
};
pub use wind::{hub_height_correction, PowerCurve, TopoFit, TopoWeight};
