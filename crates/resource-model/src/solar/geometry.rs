//! Sun position and collector geometry for one hour of the year.
//!
//! Angles are in degrees. Azimuths (solar and collector) are measured from
//! due south, positive toward west, so that a collector facing the sun has
//! the sun's azimuth as its orientation.

use std::f64::consts::PI;

use geo_common::{day_of_year, hour_of_day, GeoPoint, GeoWindow, ResourceError, Resolution, Result};

use super::trig::{acosd, asind, clamp_unit, cosd, sind, tand};

/// Tilts below this are treated as flat.
const FLAT_TILT: f64 = 1e-9;

/// Pixels for which to evaluate the geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum SolarGeometryRequest {
    /// Pixel centres of `window` at `res`, row-major from the north-west.
    Window { window: GeoWindow, res: Resolution },
    /// Explicit coordinates.
    Points(Vec<GeoPoint>),
}

impl SolarGeometryRequest {
    /// Output shape (rows, cols). Point requests are a single column.
    pub fn shape(&self) -> (usize, usize) {
        match self {
            Self::Window { window, res } => window.pixel_shape(res),
            Self::Points(points) => (points.len(), 1),
        }
    }

    fn coordinates(&self) -> Result<Vec<(f64, f64)>> {
        match self {
            Self::Window { window, res } => {
                window.validate()?;
                res.validate()?;
                let (rows, cols) = window.pixel_shape(res);
                // Spreading the extent over the pixel count yields exact
                // centres on aligned windows and the midpoint of a
                // zero-extent axis.
                let dlat = window.height() / rows as f64;
                let dlon = window.width() / cols as f64;
                let mut coords = Vec::with_capacity(rows * cols);
                for i in 0..rows {
                    let lat = window.north - (i as f64 + 0.5) * dlat;
                    for j in 0..cols {
                        coords.push((lat, window.west + (j as f64 + 0.5) * dlon));
                    }
                }
                Ok(coords)
            }
            Self::Points(points) => points
                .iter()
                .map(|p| {
                    if p.lat.is_finite() && p.lon.is_finite() && p.lat.abs() <= 90.0 {
                        Ok((p.lat, p.lon))
                    } else {
                        Err(ResourceError::invalid_window(format!(
                            "invalid point ({}, {})",
                            p.lat, p.lon
                        )))
                    }
                })
                .collect(),
        }
    }
}

/// Geometry of one pixel at one hour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelGeometry {
    pub latitude: f64,
    pub longitude: f64,
    /// Day of the year, 1-based.
    pub day_of_year: usize,
    /// Mid-point of the hour in UTC hours.
    pub hour_of_day: f64,
    /// Solar hour angle; negative before solar noon.
    pub hour_angle: f64,
    /// Declination, mirrored for southern latitudes.
    pub declination: f64,
    /// Sun elevation above the horizon.
    pub elevation: f64,
    /// Sun azimuth from due south, west positive.
    pub azimuth: f64,
    /// Optimal fixed tilt for the location.
    pub tilt: f64,
    /// Collector orientation: 0 (south) in the northern hemisphere, 180 in
    /// the southern.
    pub orientation: f64,
    /// Sunrise on the collector in UTC hours; may be negative.
    pub sunrise: f64,
    /// Sunset on the collector in UTC hours; may exceed 24.
    pub sunset: f64,
}

impl PixelGeometry {
    /// True while the sun is above the horizon.
    pub fn is_daylight(&self) -> bool {
        self.elevation > 0.0
    }
}

/// Quantities shared by every pixel for one hour of the year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarDay {
    pub hour: usize,
    pub day_of_year: usize,
    pub hour_of_day: f64,
    /// Equation of time in hours.
    pub equation_of_time: f64,
    /// Northern-hemisphere declination in degrees.
    pub declination: f64,
}

impl SolarDay {
    /// Constants for 0-based hour-of-year `hour`.
    pub fn new(hour: usize) -> Self {
        let day = day_of_year(hour);
        let n = day as f64;
        let equation_of_time = -0.128 * sind(n * 360.0 / 365.25 - 2.80)
            - 0.165 * sind(2.0 * n * 360.0 / 365.25 + 19.7);
        let x = n * 2.0 * PI / 365.25;
        let declination = (0.3978 * (x - 1.400 + 0.0355 * (x - 0.0489).sin()).sin())
            .asin()
            .to_degrees();
        Self {
            hour,
            day_of_year: day,
            hour_of_day: hour_of_day(hour),
            equation_of_time,
            declination,
        }
    }

    /// Geometry at one coordinate.
    pub fn at(&self, lat: f64, lon: f64) -> PixelGeometry {
        let time_correction = self.equation_of_time + lon / 15.0;
        let omega = 15.0 * (self.hour_of_day + time_correction - 12.0);
        let delta = if lat < 0.0 { -self.declination } else { self.declination };

        let elevation = asind(sind(delta) * sind(lat) + cosd(delta) * cosd(lat) * cosd(omega));
        let azimuth = solar_azimuth(lat, delta, omega, elevation);
        let tilt = optimal_tilt(lat, lon);
        let orientation = if lat >= 0.0 { 0.0 } else { 180.0 };

        let flat_half_day = acosd(-tand(lat) * tand(delta)) / 15.0;
        let mut sunrise = 12.0 - flat_half_day;
        let mut sunset = 12.0 + flat_half_day;
        if let Some(half_day) = tilted_half_day(lat, delta, tilt, orientation) {
            sunrise = sunrise.max(12.0 - half_day);
            sunset = sunset.min(12.0 + half_day);
        }

        PixelGeometry {
            latitude: lat,
            longitude: lon,
            day_of_year: self.day_of_year,
            hour_of_day: self.hour_of_day,
            hour_angle: omega,
            declination: delta,
            elevation,
            azimuth,
            tilt,
            orientation,
            sunrise: sunrise - time_correction,
            sunset: sunset - time_correction,
        }
    }
}

/// Sun azimuth from due south, west positive.
fn solar_azimuth(lat: f64, delta: f64, omega: f64, elevation: f64) -> f64 {
    let cos_elevation = cosd(elevation);
    if cos_elevation.abs() < 1e-12 {
        return 0.0;
    }
    // Angle from north, mirrored into the afternoon.
    let from_north = acosd(
        (sind(delta) * cosd(lat) - cosd(delta) * sind(lat) * cosd(omega)) / cos_elevation,
    );
    if omega < 0.0 {
        from_north - 180.0
    } else {
        180.0 - from_north
    }
}

/// Half-day length in hours on a tilted collector, if defined.
fn tilted_half_day(lat: f64, delta: f64, tilt: f64, orientation: f64) -> Option<f64> {
    if tilt.abs() < FLAT_TILT {
        return None;
    }
    let a = cosd(lat) / tand(tilt) + sind(lat);
    let b = tand(delta) * (cosd(lat) * cosd(orientation) - sind(lat) / tand(tilt));
    let s = sind(orientation);
    let denom = a * a + s * s;
    if denom < 1e-12 {
        return None;
    }
    let root = (a * a - b * b + s * s).max(0.0).sqrt();
    let aux = clamp_unit((a * b - s * root) / denom);
    if aux.is_finite() {
        Some(acosd(aux) / 15.0)
    } else {
        None
    }
}

/// Optimal fixed tilt for a location.
///
/// Starts from the absolute latitude capped at 55 degrees, flattened above
/// 35 degrees, with regional adjustments for Europe and East Asia.
pub fn optimal_tilt(lat: f64, lon: f64) -> f64 {
    let abs_lat = lat.abs();
    let mut tilt = abs_lat.min(55.0);
    if (35.0..65.0).contains(&abs_lat) {
        tilt = (tilt - 35.0) / 65.0 * 55.0 + 35.0;
    }
    if (35.0..65.0).contains(&lat) && (-20.0..30.0).contains(&lon) {
        tilt = (tilt - 35.0) / 65.0 * 45.0 + 35.0;
    }
    if (20.0..65.0).contains(&lat) && (75.0..140.0).contains(&lon) {
        tilt = (tilt - 20.0) / 65.0 * 60.0 + 20.0;
    }
    tilt
}

/// Geometry for every pixel of a request at one hour.
#[derive(Debug, Clone, PartialEq)]
pub struct SolarGeometry {
    pub day: SolarDay,
    shape: (usize, usize),
    pixels: Vec<PixelGeometry>,
}

impl SolarGeometry {
    /// Evaluate the geometry at 0-based hour-of-year `hour`.
    ///
    /// # Returns
    /// Row-major pixel geometry shaped like the request.
    pub fn compute(hour: usize, request: &SolarGeometryRequest) -> Result<Self> {
        let day = SolarDay::new(hour);
        let pixels = request
            .coordinates()?
            .into_iter()
            .map(|(lat, lon)| day.at(lat, lon))
            .collect();
        Ok(Self {
            day,
            shape: request.shape(),
            pixels,
        })
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Geometry of the pixel at row-major index `i`.
    pub fn pixel(&self, i: usize) -> Option<&PixelGeometry> {
        self.pixels.get(i)
    }

    pub fn pixels(&self) -> &[PixelGeometry] {
        &self.pixels
    }
}
