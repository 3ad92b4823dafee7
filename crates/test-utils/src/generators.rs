//! Test data generators for synthetic weather fields and rasters.
//!
//! These generators create predictable, verifiable test data patterns
//! that can be used across the test suite.

use geo_common::{HourlyField, Raster, HOURS_PER_DAY, HOURS_PER_YEAR};

/// Creates a raster with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify that data is being read/written correctly
/// by checking that raster[row][col] == col * 1000 + row.
///
/// # Example
///
/// ```
/// use test_utils::indexed_raster;
///
/// let r = indexed_raster(5, 10);
/// assert_eq!(r.len(), 50);
/// assert_eq!(r.get(0, 1), Some(1000.0));
/// assert_eq!(r.get(1, 0), Some(1.0));
/// ```
pub fn indexed_raster(rows: usize, cols: usize) -> Raster<f32> {
    Raster::from_fn(rows, cols, |r, c| (c * 1000 + r) as f32)
}

/// A year-long field with the same value everywhere.
pub fn constant_field(rows: usize, cols: usize, value: f32) -> HourlyField {
    HourlyField::from_fn(rows, cols, HOURS_PER_YEAR, |_, _, _| value)
}

/// Clearness index that is `value` during local daytime and 0 at night.
///
/// # Arguments
///
/// * `rows` - Number of rows
/// * `cols` - Number of columns
/// * `value` - Daytime clearness index
/// * `utc_offset` - Local solar time minus UTC, in hours (longitude / 15)
///
/// # Returns
///
/// An `HourlyField` where local hours 6 to 17 carry `value`.
pub fn diurnal_clearness(rows: usize, cols: usize, value: f32, utc_offset: f64) -> HourlyField {
    HourlyField::from_fn(rows, cols, HOURS_PER_YEAR, |_, _, h| {
        let local = ((h % HOURS_PER_DAY) as f64 + 0.5 + utc_offset).rem_euclid(24.0);
        if (6.0..18.0).contains(&local) {
            value
        } else {
            0.0
        }
    })
}

/// Temperature in Kelvin with a daily cycle of `amplitude` around `mean_k`.
pub fn temperature_field(rows: usize, cols: usize, mean_k: f32, amplitude: f32) -> HourlyField {
    HourlyField::from_fn(rows, cols, HOURS_PER_YEAR, |_, _, h| {
        let phase = (h % HOURS_PER_DAY) as f32 / HOURS_PER_DAY as f32 * std::f32::consts::TAU;
        mean_k + amplitude * phase.sin()
    })
}

/// Wind speed cycling through 0..`period` m/s, offset by column.
///
/// Hour `h` at column `c` has speed `(h + c) % period`, covering every
/// branch of a power curve.
pub fn cycling_wind(rows: usize, cols: usize, period: usize) -> HourlyField {
    let period = period.max(1);
    HourlyField::from_fn(rows, cols, HOURS_PER_YEAR, move |_, c, h| ((h + c) % period) as f32)
}

/// A raster holding one land-use class everywhere.
pub fn uniform_landuse(rows: usize, cols: usize, class: i32) -> Raster<f32> {
    Raster::filled(rows, cols, class as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexed_raster() {
        let r = indexed_raster(5, 10);
        assert_eq!(r.shape(), (5, 10));
        assert_eq!(r.get(4, 9), Some(9004.0));
    }

    #[test]
    fn test_diurnal_clearness_half_day() {
        let k = diurnal_clearness(1, 1, 0.6, 0.0);
        let lit = (0..24).filter(|&h| k.value(0, 0, h) == Some(0.6)).count();
        assert_eq!(lit, 12);
        assert_eq!(k.value(0, 0, 0), Some(0.0));
        assert_eq!(k.value(0, 0, 12), Some(0.6));

        // Seven hours ahead of UTC, UTC midnight is local morning.
        let k = diurnal_clearness(1, 1, 0.6, 7.0);
        assert_eq!(k.value(0, 0, 0), Some(0.6));
    }

    #[test]
    fn test_temperature_field_range() {
        let t = temperature_field(2, 2, 300.0, 5.0);
        assert_eq!(t.hours(), HOURS_PER_YEAR);
        for h in 0..24 {
            let v = t.value(1, 1, h).unwrap();
            assert!((295.0..=305.0).contains(&v));
        }
    }

    #[test]
    fn test_cycling_wind() {
        let w = cycling_wind(1, 2, 30);
        assert_eq!(w.value(0, 0, 29), Some(29.0));
        assert_eq!(w.value(0, 1, 29), Some(0.0));
    }
}
