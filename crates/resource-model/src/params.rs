//! Technology parameter sets.
//!
//! Built once per run from configuration and passed by reference into the
//! models; nothing here is mutated after construction.

use serde::{Deserialize, Serialize};

use crate::wind::TopoWeight;

/// Mechanical tracking of a solar collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Tracking {
    /// Fixed tilt and orientation.
    #[default]
    Fixed,
    /// Tilt follows the sun's elevation.
    OneAxis,
    /// Tilt and orientation follow the sun.
    TwoAxis,
}

impl Tracking {
    /// Parse from string (case-insensitive). Accepts the axis count too.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fixed" | "none" | "0" => Some(Self::Fixed),
            "one_axis" | "1" => Some(Self::OneAxis),
            "two_axis" | "2" => Some(Self::TwoAxis),
            _ => None,
        }
    }

    /// Get the tracking mode as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::OneAxis => "one_axis",
            Self::TwoAxis => "two_axis",
        }
    }
}

impl std::fmt::Display for Tracking {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Photovoltaic technology parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PvParams {
    /// Rated cell temperature at standard test conditions (°C).
    pub rated_temperature: f64,
    /// Power loss per degree above the rated temperature (%/°C).
    pub loss_coefficient: f64,
    /// Tracking mode.
    pub tracking: Tracking,
    /// Fixed panel orientation in degrees from due south (west positive).
    /// When unset, panels face the equator. Ignored under two-axis tracking.
    pub orientation: Option<f64>,
    /// Fraction of direct irradiance lost to shading (0 disables).
    pub shading: f64,
    /// Scalar applied to the clearness index before use.
    pub clearness_correction: f64,
}

impl Default for PvParams {
    fn default() -> Self {
        Self {
            rated_temperature: 25.0,
            loss_coefficient: 0.37,
            tracking: Tracking::Fixed,
            orientation: None,
            shading: 0.0,
            clearness_correction: 1.0,
        }
    }
}

impl PvParams {
    /// Validate the parameter set.
    pub fn validate(&self) -> Result<(), String> {
        if !self.rated_temperature.is_finite() {
            return Err("pv.rated_temperature must be finite".to_string());
        }
        if !(self.loss_coefficient >= 0.0) {
            return Err("pv.loss_coefficient must be >= 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.shading) {
            return Err("pv.shading must be in [0, 1]".to_string());
        }
        if !(self.clearness_correction > 0.0) {
            return Err("pv.clearness_correction must be > 0".to_string());
        }
        if let Some(o) = self.orientation {
            if !o.is_finite() {
                return Err("pv.orientation must be finite".to_string());
            }
        }
        Ok(())
    }
}

/// Concentrated solar power parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CspParams {
    /// Fraction of direct irradiance lost to shading (0 disables).
    pub shading: f64,
    /// Scalar applied to the clearness index before use.
    pub clearness_correction: f64,
}

impl Default for CspParams {
    fn default() -> Self {
        Self {
            shading: 0.0,
            clearness_correction: 1.0,
        }
    }
}

impl CspParams {
    /// Validate the parameter set.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.shading) {
            return Err("csp.shading must be in [0, 1]".to_string());
        }
        if !(self.clearness_correction > 0.0) {
            return Err("csp.clearness_correction must be > 0".to_string());
        }
        Ok(())
    }
}

/// Wind turbine parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurbineParams {
    /// Cut-in wind speed (m/s).
    pub cut_in: f64,
    /// Rated wind speed (m/s).
    pub rated: f64,
    /// Cut-off wind speed (m/s).
    pub cut_off: f64,
    /// Rated power (MW).
    pub rated_power: f64,
    /// Hub height (m).
    pub hub_height: f64,
    /// Redistribute wind speed within each weather pixel when building the
    /// correction raster.
    pub resolution_correction: bool,
    /// Scale by the fitted elevation correction. Onshore only.
    pub topo_correction: bool,
    /// Country weighting used when fitting the elevation correction.
    pub topo_weight: TopoWeight,
}

impl Default for TurbineParams {
    fn default() -> Self {
        Self::onshore()
    }
}

impl TurbineParams {
    /// Default onshore turbine.
    pub fn onshore() -> Self {
        Self {
            cut_in: 4.0,
            rated: 13.0,
            cut_off: 25.0,
            rated_power: 3.0,
            hub_height: 80.0,
            resolution_correction: true,
            topo_correction: false,
            topo_weight: TopoWeight::Capacity,
        }
    }

    /// Default offshore turbine.
    pub fn offshore() -> Self {
        Self {
            cut_in: 3.0,
            rated: 16.5,
            cut_off: 34.0,
            rated_power: 7.58,
            hub_height: 120.0,
            resolution_correction: true,
            topo_correction: false,
            topo_weight: TopoWeight::Capacity,
        }
    }

    /// Validate the parameter set.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.cut_in >= 0.0 && self.cut_in < self.rated && self.rated <= self.cut_off) {
            return Err(format!(
                "turbine speeds must satisfy 0 <= cut_in < rated <= cut_off, got {}/{}/{}",
                self.cut_in, self.rated, self.cut_off
            ));
        }
        if !(self.hub_height > 0.0) {
            return Err("turbine.hub_height must be > 0".to_string());
        }
        Ok(())
    }
}
