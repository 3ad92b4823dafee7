//! Hub-height wind speed correction rasters.
//!
//! Weather data gives wind speed at 50 m on a coarse grid. The correction
//! raster scales it to hub height with a Hellmann power law and, when
//! resolution correction is on, redistributes it within each weather pixel
//! according to the surface roughness of the finer land-use grid.

use geo_common::{Raster, ResourceError, Result};
use grid_index::ResampleMap;
use tracing::{debug, warn};

use crate::landuse::{LanduseCoefficient, LanduseTable};
use crate::params::TurbineParams;

/// Height of the weather wind speed (m).
pub const REFERENCE_HEIGHT: f64 = 50.0;

/// Build the multiplier from 50 m wind speed to hub-height wind speed.
///
/// # Arguments
/// * `landuse` - Land-use class codes at output resolution
/// * `table` - Per-class Hellmann exponents and gradient heights
/// * `turbine` - Turbine parameters; `resolution_correction` selects the
///   redistributing variant
/// * `resample` - Mapping from the land-use grid to the weather grid,
///   required for resolution correction
pub fn hub_height_correction(
    landuse: &Raster<f32>,
    table: &LanduseTable,
    turbine: &TurbineParams,
    resample: Option<&ResampleMap>,
) -> Result<Raster<f32>> {
    turbine.validate().map_err(ResourceError::config)?;
    let hellmann = table.remap(landuse, LanduseCoefficient::Hellmann)?;
    let hub = turbine.hub_height;
    let plain = hellmann.map(|h| (hub / REFERENCE_HEIGHT).powf(h as f64) as f32);

    if !turbine.resolution_correction {
        debug!(hub_height = hub, "Built plain hub-height correction");
        return Ok(plain);
    }
    let map = resample.ok_or_else(|| {
        ResourceError::config("resolution correction needs the weather grid mapping")
    })?;
    let (rows, cols) = map.fine_shape();
    landuse.ensure_shape(rows, cols, "land-use raster")?;

    let gradient = table.remap(landuse, LanduseCoefficient::GradientHeight)?;

    // Roughness profile at 50 m, averaged per weather pixel.
    let profile = Raster::from_fn(rows, cols, |r, c| {
        let g = gradient.data()[r * cols + c] as f64;
        let h = hellmann.data()[r * cols + c] as f64;
        if g > 0.0 {
            (REFERENCE_HEIGHT / g).powf(h) as f32
        } else {
            f32::NAN
        }
    });
    let sigma = map.upsample(&map.block_mean(&profile)?)?;

    let mut fallback = 0usize;
    let corrected = Raster::from_fn(rows, cols, |r, c| {
        let i = r * cols + c;
        let g = gradient.data()[i] as f64;
        let h = hellmann.data()[i] as f64;
        let s = sigma.data()[i] as f64;
        let value = ((hub / REFERENCE_HEIGHT) * hub / g).powf(h) / s;
        if g > 0.0 && s.is_finite() && s > 0.0 && value.is_finite() {
            value as f32
        } else {
            fallback += 1;
            plain.data()[i]
        }
    });

    if fallback > 0 {
        warn!(
            pixels = fallback,
            "Resolution correction undefined, using plain hub-height correction"
        );
    }
    debug!(hub_height = hub, rows, cols, "Built resolution-corrected hub-height correction");
    Ok(corrected)
}

/// Multiply a correction raster by a 0/1 mask. Non-finite mask cells count
/// as 0.
pub fn apply_mask(correction: &Raster<f32>, mask: &Raster<f32>) -> Result<Raster<f32>> {
    mask.ensure_shape(correction.rows(), correction.cols(), "mask")?;
    let data = correction
        .data()
        .iter()
        .zip(mask.data())
        .map(|(&c, &m)| if m.is_finite() { c * m } else { 0.0 })
        .collect();
    Raster::new(correction.rows(), correction.cols(), data)
}
