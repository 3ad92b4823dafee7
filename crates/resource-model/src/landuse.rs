//! Land-use classes and their per-class coefficients.

use std::collections::HashMap;

use geo_common::{Raster, ResourceError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which coefficient to look up for a land-use class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanduseCoefficient {
    /// Ross coefficient for cell temperature (K m²/W).
    Ross,
    /// Ground albedo (0-1).
    Albedo,
    /// Hellmann shear exponent.
    Hellmann,
    /// Gradient height for the wind profile (m).
    GradientHeight,
}

impl LanduseCoefficient {
    /// Get the coefficient name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ross => "ross",
            Self::Albedo => "albedo",
            Self::Hellmann => "hellmann",
            Self::GradientHeight => "gradient_height",
        }
    }
}

/// Coefficient table indexed by land-use class code.
///
/// All vectors are parallel to `classes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanduseTable {
    pub classes: Vec<i32>,
    pub ross: Vec<f64>,
    pub albedo: Vec<f64>,
    pub hellmann: Vec<f64>,
    pub gradient_height: Vec<f64>,
}

impl Default for LanduseTable {
    /// Seventeen IGBP classes: water, five forest types, shrublands,
    /// savannas, grassland, wetlands, croplands, urban, mosaic, snow and
    /// barren.
    fn default() -> Self {
        let classes: Vec<i32> = (0..17).collect();
        let albedo = classes
            .iter()
            .map(|&c| if matches!(c, 0 | 11 | 15) { 0.0 } else { 0.2 })
            .collect();
        Self {
            ross: vec![0.0208; classes.len()],
            albedo,
            hellmann: vec![
                0.10, 0.25, 0.25, 0.25, 0.25, 0.25, 0.20, 0.20, 0.25, 0.25, 0.15, 0.15, 0.20, 0.40,
                0.20, 0.15, 0.15,
            ],
            gradient_height: vec![
                213.0, 366.0, 366.0, 366.0, 366.0, 366.0, 320.0, 320.0, 366.0, 366.0, 274.0, 274.0,
                320.0, 457.0, 320.0, 274.0, 274.0,
            ],
            classes,
        }
    }
}

impl LanduseTable {
    /// Validate that every coefficient vector matches the class list.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let n = self.classes.len();
        if n == 0 {
            return Err("landuse.classes must not be empty".to_string());
        }
        for (name, len) in [
            ("ross", self.ross.len()),
            ("albedo", self.albedo.len()),
            ("hellmann", self.hellmann.len()),
            ("gradient_height", self.gradient_height.len()),
        ] {
            if len != n {
                return Err(format!(
                    "landuse.{} has {} values for {} classes",
                    name, len, n
                ));
            }
        }
        let mut seen = std::collections::HashSet::new();
        if let Some(dup) = self.classes.iter().find(|c| !seen.insert(**c)) {
            return Err(format!("landuse class {} listed twice", dup));
        }
        if self.gradient_height.iter().any(|&h| !(h > 0.0)) {
            return Err("landuse.gradient_height values must be > 0".to_string());
        }
        Ok(())
    }

    /// Values of one coefficient, parallel to `classes`.
    pub fn values(&self, which: LanduseCoefficient) -> &[f64] {
        match which {
            LanduseCoefficient::Ross => &self.ross,
            LanduseCoefficient::Albedo => &self.albedo,
            LanduseCoefficient::Hellmann => &self.hellmann,
            LanduseCoefficient::GradientHeight => &self.gradient_height,
        }
    }

    /// Coefficient for a single class code.
    pub fn coefficient(&self, class: i32, which: LanduseCoefficient) -> Option<f64> {
        let i = self.classes.iter().position(|&c| c == class)?;
        self.values(which).get(i).copied()
    }

    /// Map a class-code raster to one coefficient.
    pub fn remap(&self, class_grid: &Raster<f32>, which: LanduseCoefficient) -> Result<Raster<f32>> {
        debug!(
            coefficient = which.as_str(),
            rows = class_grid.rows(),
            cols = class_grid.cols(),
            "Remapping land use"
        );
        remap(class_grid, self.values(which), &self.classes)
    }
}

/// Replace each class code in `class_grid` with its value.
///
/// Codes not listed in `classes` (and non-finite cells) map to 0.
///
/// # Arguments
/// * `class_grid` - Raster of integer class codes stored as floats
/// * `values` - Value per class, parallel to `classes`
/// * `classes` - Class codes
pub fn remap(class_grid: &Raster<f32>, values: &[f64], classes: &[i32]) -> Result<Raster<f32>> {
    if values.len() != classes.len() {
        return Err(ResourceError::config(format!(
            "{} values given for {} classes",
            values.len(),
            classes.len()
        )));
    }
    let lookup: HashMap<i32, f32> = classes
        .iter()
        .zip(values.iter())
        .map(|(&c, &v)| (c, v as f32))
        .collect();

    Ok(class_grid.map(|code| {
        if code.is_finite() {
            lookup.get(&(code.round() as i32)).copied().unwrap_or(0.0)
        } else {
            0.0
        }
    }))
}
