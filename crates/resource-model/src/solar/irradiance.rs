//! Irradiance decomposition and transposition onto tilted surfaces.
//!
//! The diffuse fraction follows the Erbs correlation and the tilted-surface
//! gains follow the HDKR (Hay, Davies, Klucher, Reindl) sky model.

use std::f64::consts::PI;

use super::trig::{acosd, clamp_unit, cosd, sind};

/// Solar constant (W/m²).
pub const SOLAR_CONSTANT: f64 = 1367.0;

/// Cosine of the incidence angle between the sun and a collector normal.
///
/// # Arguments
/// * `lat` - Latitude
/// * `declination` - Declination (hemisphere-mirrored)
/// * `hour_angle` - Solar hour angle
/// * `tilt` - Collector tilt from horizontal
/// * `orientation` - Collector azimuth from due south, west positive
pub fn incidence_cosine(lat: f64, declination: f64, hour_angle: f64, tilt: f64, orientation: f64) -> f64 {
    let (sd, cd) = (sind(declination), cosd(declination));
    let (sp, cp) = (sind(lat), cosd(lat));
    let (sb, cb) = (sind(tilt), cosd(tilt));
    let (sg, cg) = (sind(orientation), cosd(orientation));
    let (sw, cw) = (sind(hour_angle), cosd(hour_angle));
    clamp_unit(
        sd * sp * cb - sd * cp * sb * cg + cd * cp * cb * cw + cd * sp * sb * cg * cw + cd * sb * sg * sw,
    )
}

/// Incidence angle in degrees.
pub fn incidence_angle(lat: f64, declination: f64, hour_angle: f64, tilt: f64, orientation: f64) -> f64 {
    acosd(incidence_cosine(lat, declination, hour_angle, tilt, orientation))
}

/// Top-of-atmosphere irradiance on a horizontal surface (W/m²).
///
/// Negative when the sun is below the horizon.
pub fn toa_irradiance(day_of_year: usize, elevation: f64) -> f64 {
    let n = day_of_year as f64;
    SOLAR_CONSTANT * (1.0 + 0.03344 * (n * 2.0 * PI / 365.25 - 0.048869).cos()) * sind(elevation)
}

/// Diffuse share of global horizontal irradiance for clearness index `k`.
pub fn diffuse_ratio(k: f64) -> f64 {
    let ratio = if k <= 0.22 {
        1.0 - 0.09 * k
    } else if k <= 0.8 {
        0.9511 - 0.1604 * k + 4.388 * k.powi(2) - 16.638 * k.powi(3) + 12.336 * k.powi(4)
    } else {
        0.165
    };
    ratio.clamp(0.0, 1.0)
}

/// Ratio of beam irradiance on the collector to beam on the horizontal.
///
/// Zero when the sun is at or below the horizon.
pub fn beam_ratio(cos_incidence: f64, elevation: f64) -> f64 {
    let sin_elevation = sind(elevation);
    if sin_elevation <= 0.0 {
        0.0
    } else {
        cos_incidence / sin_elevation
    }
}

/// Fraction of the hour ending at `hour_of_day + 0.5` during which the sun
/// is up on the collector.
///
/// `sunrise` and `sunset` are UTC hours and may fall outside [0, 24] when
/// the local day straddles midnight UTC.
pub fn sunlit_fraction(hour_of_day: f64, sunrise: f64, sunset: f64) -> f64 {
    let h = hour_of_day;
    let mut duration = 1.0;

    if sunrise > 0.0 && sunset < 24.0 {
        if h < sunrise {
            duration = 0.0;
        }
        if h - 1.0 < sunrise && h > sunrise {
            duration = h - sunrise;
        }
        if h - 1.0 < sunset && h > sunset {
            duration = sunset - h + 1.0;
        }
        if h - 1.0 > sunset {
            duration = 0.0;
        }
    } else if sunrise < 0.0 && sunset < 24.0 {
        let next_sunrise = sunrise + 24.0;
        if h - 1.0 < sunset && h > sunset {
            duration = sunset - h + 1.0;
        }
        if h - 1.0 > sunset && h < next_sunrise {
            duration = 0.0;
        }
        if h - 1.0 < next_sunrise && h > next_sunrise {
            duration = h - next_sunrise;
        }
    } else if sunrise > 0.0 && sunset > 24.0 {
        let prev_sunset = sunset - 24.0;
        if h - 1.0 < prev_sunset && h > prev_sunset {
            duration = prev_sunset - h + 1.0;
        }
        if h - 1.0 > prev_sunset && h < sunrise {
            duration = 0.0;
        }
        if h - 1.0 < sunrise && h > sunrise {
            duration = h - sunrise;
        }
    }
    duration
}

/// Gains of each irradiance component on a tilted collector, relative to
/// global horizontal irradiance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transposition {
    pub direct: f64,
    pub diffuse: f64,
    pub reflected: f64,
}

impl Transposition {
    /// HDKR transposition factors.
    ///
    /// # Arguments
    /// * `tilt` - Collector tilt in degrees
    /// * `ratio` - Diffuse share of global irradiance
    /// * `beam_ratio` - Tilted-to-horizontal beam ratio
    /// * `clearness` - Clearness index
    /// * `duration` - Sunlit fraction of the hour
    pub fn hdkr(tilt: f64, ratio: f64, beam_ratio: f64, clearness: f64, duration: f64) -> Self {
        let anisotropy = (1.0 - ratio) * clearness;
        let horizon = (1.0 - ratio).max(0.0).sqrt();

        let direct = (duration * (1.0 - ratio + ratio * anisotropy) * beam_ratio).max(0.0);
        let diffuse = ratio
            * (1.0 - anisotropy)
            * (1.0 + cosd(tilt))
            / 2.0
            * (1.0 + horizon * sind(tilt / 2.0).powi(3));
        let reflected = (1.0 - cosd(tilt)) / 2.0;

        Self {
            direct,
            diffuse,
            reflected,
        }
    }
}

/// Fractional power loss from cell heating.
///
/// Cell temperature is ambient plus `ross * irradiance`; every degree
/// above `rated_temperature` costs `loss_coefficient` percent.
///
/// # Arguments
/// * `ambient_c` - Ambient air temperature (°C)
/// * `ross` - Ross coefficient (K m²/W)
/// * `irradiance` - Irradiance on the collector (W/m²)
/// * `rated_temperature` - Rated cell temperature (°C)
/// * `loss_coefficient` - Loss per degree (%/°C)
pub fn temperature_loss(
    ambient_c: f64,
    ross: f64,
    irradiance: f64,
    rated_temperature: f64,
    loss_coefficient: f64,
) -> f64 {
    let cell = ambient_c + ross * irradiance;
    (cell - rated_temperature).max(0.0) * loss_coefficient / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diffuse_ratio_branches() {
        assert!((diffuse_ratio(0.0) - 1.0).abs() < 1e-12);
        assert!((diffuse_ratio(0.2) - 0.982).abs() < 1e-12);
        assert!((diffuse_ratio(0.9) - 0.165).abs() < 1e-12);
        // The polynomial meets the constant branch at 0.8.
        assert!((diffuse_ratio(0.8) - 0.165).abs() < 1e-3);
    }

    #[test]
    fn test_diffuse_ratio_is_bounded() {
        for i in -100..=300 {
            let r = diffuse_ratio(i as f64 / 100.0);
            assert!((0.0..=1.0).contains(&r), "k {} ratio {}", i, r);
        }
    }

    #[test]
    fn test_incidence_on_flat_surface_is_zenith() {
        let (lat, decl, omega) = (40.0, 10.0, -30.0);
        let cos_zenith = sind(decl) * sind(lat) + cosd(decl) * cosd(lat) * cosd(omega);
        assert!((incidence_cosine(lat, decl, omega, 0.0, 0.0) - cos_zenith).abs() < 1e-12);
    }

    #[test]
    fn test_incidence_is_clamped() {
        for tilt in [0.0, 30.0, 60.0, 90.0] {
            for omega in [-180.0, -90.0, 0.0, 90.0, 180.0] {
                let c = incidence_cosine(60.0, 23.4, omega, tilt, 45.0);
                assert!((-1.0..=1.0).contains(&c));
            }
        }
    }

    #[test]
    fn test_toa_sign_follows_elevation() {
        assert!(toa_irradiance(1, 30.0) > 0.0);
        assert!(toa_irradiance(1, -5.0) < 0.0);
        // Perihelion in early January.
        assert!(toa_irradiance(3, 90.0) > toa_irradiance(185, 90.0));
    }

    #[test]
    fn test_sunlit_fraction_same_day() {
        assert_eq!(sunlit_fraction(5.5, 6.2, 18.4), 0.0);
        assert!((sunlit_fraction(6.5, 6.2, 18.4) - 0.3).abs() < 1e-12);
        assert_eq!(sunlit_fraction(12.5, 6.2, 18.4), 1.0);
        assert!((sunlit_fraction(18.5, 6.2, 18.4) - 0.9).abs() < 1e-12);
        assert_eq!(sunlit_fraction(20.5, 6.2, 18.4), 0.0);
    }

    #[test]
    fn test_sunlit_fraction_across_midnight() {
        // Sun rises at 22:00 UTC the previous day and sets at 10:00.
        assert_eq!(sunlit_fraction(3.5, -2.0, 10.0), 1.0);
        assert!((sunlit_fraction(10.5, -2.0, 10.0) - 0.5).abs() < 1e-12);
        assert_eq!(sunlit_fraction(15.5, -2.0, 10.0), 0.0);
        assert!((sunlit_fraction(22.5, -2.0, 10.0) - 0.5).abs() < 1e-12);

        // Sun rises at 14:00 UTC and sets at 02:00 the next day.
        assert!((sunlit_fraction(1.5, 14.0, 26.0) - 1.0).abs() < 1e-12);
        assert!((sunlit_fraction(2.5, 14.0, 26.0) - 0.5).abs() < 1e-12);
        assert_eq!(sunlit_fraction(8.5, 14.0, 26.0), 0.0);
        assert!((sunlit_fraction(14.5, 14.0, 26.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_hdkr_flat_surface() {
        let t = Transposition::hdkr(0.0, 0.4, 1.0, 0.6, 1.0);
        assert!(t.reflected.abs() < 1e-12);
        let ai = 0.6 * 0.6;
        assert!((t.direct - (0.6 + 0.4 * ai)).abs() < 1e-12);
        assert!((t.diffuse - 0.4 * (1.0 - ai)).abs() < 1e-12);
    }

    #[test]
    fn test_hdkr_direct_never_negative() {
        let t = Transposition::hdkr(30.0, 0.3, -0.5, 0.7, 1.0);
        assert_eq!(t.direct, 0.0);
    }

    #[test]
    fn test_temperature_loss() {
        assert_eq!(temperature_loss(20.0, 0.0, 800.0, 25.0, 0.37), 0.0);
        let loss = temperature_loss(30.0, 0.0208, 500.0, 25.0, 0.37);
        assert!((loss - (30.0 + 10.4 - 25.0) * 0.0037).abs() < 1e-12);
    }
}
