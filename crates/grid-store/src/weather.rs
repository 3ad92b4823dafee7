//! Preparation of raw reanalysis fields into model inputs.
//!
//! Raw fields are read from the `raw` group, derived quantities computed,
//! February 29th removed, and the results written to the `weather` group so
//! that every prepared field spans exactly 8760 hours.

use geo_common::hours::{leap_day_hours, raw_hours_in_year};
use geo_common::{HourlyField, ResourceError, Result, HOURS_PER_YEAR};
use tracing::{debug, info};

use crate::store::{WeatherField, ZarrStore, RAW_GROUP};

/// Raw surface shortwave flux, downward.
pub const SWGDN: &str = "SWGDN";
/// Raw top-of-atmosphere shortwave flux, downward.
pub const SWTDN: &str = "SWTDN";
/// Raw 2 m air temperature.
pub const T2M: &str = "T2M";
/// Raw 50 m eastward wind.
pub const U50M: &str = "U50M";
/// Raw 50 m northward wind.
pub const V50M: &str = "V50M";

/// Ratio of ground to top-of-atmosphere shortwave; 0 where the latter is 0.
pub fn clearness_index(swgdn: &HourlyField, swtdn: &HourlyField) -> Result<HourlyField> {
    swgdn.zip_with(swtdn, |g, t| if t != 0.0 { g / t } else { 0.0 })
}

/// Wind speed magnitude from its components.
pub fn wind_speed(u: &HourlyField, v: &HourlyField) -> Result<HourlyField> {
    u.zip_with(v, f32::hypot)
}

/// Bring a field of one calendar year to 8760 hours.
///
/// Fields already at 8760 hours pass through. Leap-year fields lose the 24
/// hours of February 29th.
pub fn drop_leap_day(field: HourlyField, year: i32) -> Result<HourlyField> {
    if field.hours() == HOURS_PER_YEAR {
        return Ok(field);
    }
    let expected = raw_hours_in_year(year);
    let leap = match leap_day_hours(year) {
        Some(range) if field.hours() == expected => range,
        _ => {
            return Err(ResourceError::missing_data(format!(
                "field has {} hours, expected {} or {} for {}",
                field.hours(),
                HOURS_PER_YEAR,
                expected,
                year
            )))
        }
    };

    let (rows, cols) = (field.rows(), field.cols());
    let mut data = Vec::with_capacity(rows * cols * HOURS_PER_YEAR);
    for hour in (0..field.hours()).filter(|h| !leap.contains(h)) {
        data.extend_from_slice(field.hour(hour));
    }
    debug!(year, dropped = ?leap, "Dropped leap-day hours");
    HourlyField::from_hour_major(rows, cols, HOURS_PER_YEAR, data)
}

/// Derive the prepared weather fields from the raw group of `store`.
pub fn prepare_weather(store: &ZarrStore, year: i32) -> Result<()> {
    let grid = store.grid_of(RAW_GROUP, SWGDN)?;
    info!(year, root = %store.root().display(), "Preparing weather fields");

    let swgdn = store.read_hourly(RAW_GROUP, SWGDN, None)?;
    let swtdn = store.read_hourly(RAW_GROUP, SWTDN, None)?;
    let clearness = drop_leap_day(clearness_index(&swgdn, &swtdn)?, year)?;
    drop((swgdn, swtdn));
    store.write_field(WeatherField::Clearness, &clearness, &grid)?;

    let t2m = drop_leap_day(store.read_hourly(RAW_GROUP, T2M, None)?, year)?;
    store.write_field(WeatherField::Temperature, &t2m, &grid)?;

    let u = store.read_hourly(RAW_GROUP, U50M, None)?;
    let v = store.read_hourly(RAW_GROUP, V50M, None)?;
    let w50m = drop_leap_day(wind_speed(&u, &v)?, year)?;
    store.write_field(WeatherField::WindSpeed, &w50m, &grid)?;

    info!(year, "Weather fields prepared");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clearness_zero_where_toa_is_zero() {
        let g = HourlyField::from_hour_major(1, 2, 1, vec![300.0, 0.0]).unwrap();
        let t = HourlyField::from_hour_major(1, 2, 1, vec![600.0, 0.0]).unwrap();
        let k = clearness_index(&g, &t).unwrap();
        assert_eq!(k.hour(0), &[0.5, 0.0]);
    }

    #[test]
    fn test_wind_speed_magnitude() {
        let u = HourlyField::from_hour_major(1, 1, 1, vec![3.0]).unwrap();
        let v = HourlyField::from_hour_major(1, 1, 1, vec![-4.0]).unwrap();
        assert_eq!(wind_speed(&u, &v).unwrap().hour(0), &[5.0]);
    }

    #[test]
    fn test_drop_leap_day() {
        let field = HourlyField::from_fn(1, 1, 8784, |_, _, h| h as f32);
        let out = drop_leap_day(field, 2016).unwrap();
        assert_eq!(out.hours(), HOURS_PER_YEAR);
        // Hour 1416 (Feb 29 00:00) is gone; Mar 1 00:00 follows Feb 28 23:00.
        assert_eq!(out.value(0, 0, 1415), Some(1415.0));
        assert_eq!(out.value(0, 0, 1416), Some(1440.0));
    }

    #[test]
    fn test_non_leap_passes_through_and_bad_length_fails() {
        let field = HourlyField::from_fn(1, 1, HOURS_PER_YEAR, |_, _, h| h as f32);
        assert_eq!(drop_leap_day(field.clone(), 2015).unwrap(), field);

        let short = HourlyField::from_fn(1, 1, 100, |_, _, _| 0.0);
        assert!(drop_leap_day(short, 2015).is_err());
    }
}
