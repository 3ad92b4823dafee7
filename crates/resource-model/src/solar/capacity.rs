//! Hourly capacity factors for photovoltaic and concentrated solar power.

use crate::params::{CspParams, PvParams, Tracking};

use super::geometry::PixelGeometry;
use super::irradiance::{
    beam_ratio, diffuse_ratio, incidence_cosine, sunlit_fraction, temperature_loss, toa_irradiance,
    Transposition,
};

/// Irradiance at standard test conditions (W/m²).
const STC_IRRADIANCE: f64 = 1000.0;

const KELVIN: f64 = 273.15;

/// Weather and land-use values at one pixel and hour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarPixelInputs {
    /// Clearness index, before any correction.
    pub clearness: f64,
    /// Air temperature at 2 m (K).
    pub temperature_k: f64,
    /// Ross coefficient (K m²/W).
    pub ross: f64,
    /// Ground albedo.
    pub albedo: f64,
}

impl SolarPixelInputs {
    fn is_finite(&self) -> bool {
        self.clearness.is_finite()
            && self.temperature_k.is_finite()
            && self.ross.is_finite()
            && self.albedo.is_finite()
    }
}

/// Collector tilt and orientation after tracking.
///
/// A fixed orientation override replaces the hemisphere default unless the
/// collector tracks on two axes.
pub fn collector_attitude(geom: &PixelGeometry, tracking: Tracking, orientation: Option<f64>) -> (f64, f64) {
    let fixed_orientation = orientation.unwrap_or(geom.orientation);
    match tracking {
        Tracking::Fixed => (geom.tilt, fixed_orientation),
        Tracking::OneAxis => (90.0 - geom.elevation, fixed_orientation),
        Tracking::TwoAxis => (90.0 - geom.elevation, geom.azimuth),
    }
}

/// Sky state shared by the PV and CSP models.
struct Sky {
    clearness: f64,
    ratio: f64,
    global_horizontal: f64,
    duration: f64,
}

impl Sky {
    fn new(geom: &PixelGeometry, clearness: f64) -> Self {
        let toa = toa_irradiance(geom.day_of_year, geom.elevation);
        let ghi = toa * clearness;
        Self {
            clearness,
            ratio: diffuse_ratio(clearness),
            global_horizontal: if ghi.is_finite() { ghi.max(0.0) } else { 0.0 },
            duration: sunlit_fraction(geom.hour_of_day, geom.sunrise, geom.sunset),
        }
    }

    fn transposition(&self, geom: &PixelGeometry, tilt: f64, orientation: f64) -> Transposition {
        let cos_incidence =
            incidence_cosine(geom.latitude, geom.declination, geom.hour_angle, tilt, orientation);
        Transposition::hdkr(
            tilt,
            self.ratio,
            beam_ratio(cos_incidence, geom.elevation),
            self.clearness,
            self.duration,
        )
    }
}

fn unit_interval(x: f64) -> f64 {
    if x.is_finite() {
        x.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Photovoltaic capacity factor for one pixel and hour.
///
/// # Returns
/// A value in [0, 1]; exactly 0 while the sun is below the horizon or when
/// any input is non-finite.
pub fn pv_capacity_factor(geom: &PixelGeometry, inputs: &SolarPixelInputs, params: &PvParams) -> f64 {
    if !geom.is_daylight() || !inputs.is_finite() {
        return 0.0;
    }
    let sky = Sky::new(geom, inputs.clearness * params.clearness_correction);
    let (tilt, orientation) = collector_attitude(geom, params.tracking, params.orientation);
    let t = sky.transposition(geom, tilt, orientation);

    let gain = (t.diffuse + t.direct * (1.0 - params.shading) + t.reflected * inputs.albedo).min(1.0);
    let tilted = sky.global_horizontal * gain;
    let loss = temperature_loss(
        inputs.temperature_k - KELVIN,
        inputs.ross,
        tilted,
        params.rated_temperature,
        params.loss_coefficient,
    );
    unit_interval(tilted / STC_IRRADIANCE * (1.0 - loss))
}

/// Concentrated solar power capacity factor for one pixel and hour.
///
/// The collector tracks on one axis with the pixel's default orientation
/// (the PV orientation override does not apply) and only the direct
/// component counts. Like PV the result is normalised by 1000 W/m².
pub fn csp_capacity_factor(geom: &PixelGeometry, clearness: f64, params: &CspParams) -> f64 {
    if !geom.is_daylight() || !clearness.is_finite() {
        return 0.0;
    }
    let sky = Sky::new(geom, clearness * params.clearness_correction);
    let (tilt, orientation) = collector_attitude(geom, Tracking::OneAxis, None);
    let t = sky.transposition(geom, tilt, orientation);
    unit_interval(sky.global_horizontal * t.direct * (1.0 - params.shading) / STC_IRRADIANCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solar::geometry::SolarDay;

    fn inputs(clearness: f64) -> SolarPixelInputs {
        SolarPixelInputs {
            clearness,
            temperature_k: 300.0,
            ross: 0.0208,
            albedo: 0.2,
        }
    }

    #[test]
    fn test_night_is_exactly_zero() {
        // Singapore at 00:00 UTC is 08:00 local, low sun; 15:00 UTC is night.
        let night = SolarDay::new(15).at(1.35, 103.8);
        assert!(!night.is_daylight());
        assert_eq!(pv_capacity_factor(&night, &inputs(0.6), &PvParams::default()), 0.0);
        assert_eq!(csp_capacity_factor(&night, 0.6, &CspParams::default()), 0.0);
    }

    #[test]
    fn test_noon_output_is_bounded_and_positive() {
        let noon = SolarDay::new(4).at(1.35, 103.8);
        assert!(noon.is_daylight());
        let cf = pv_capacity_factor(&noon, &inputs(0.6), &PvParams::default());
        assert!(cf > 0.3 && cf <= 1.0, "cf {}", cf);
        let csp = csp_capacity_factor(&noon, 0.6, &CspParams::default());
        assert!(csp > 0.0 && csp <= 1.0, "csp {}", csp);
    }

    #[test]
    fn test_extreme_inputs_stay_in_unit_interval() {
        let noon = SolarDay::new(4).at(1.35, 103.8);
        for k in [-1.0, 0.0, 0.5, 1.0, 3.0, 50.0] {
            for tracking in [Tracking::Fixed, Tracking::OneAxis, Tracking::TwoAxis] {
                let params = PvParams {
                    tracking,
                    ..PvParams::default()
                };
                let cf = pv_capacity_factor(&noon, &inputs(k), &params);
                assert!((0.0..=1.0).contains(&cf), "k {} tracking {} cf {}", k, tracking, cf);
            }
            let csp = csp_capacity_factor(&noon, k, &CspParams::default());
            assert!((0.0..=1.0).contains(&csp));
        }
    }

    #[test]
    fn test_non_finite_inputs_yield_zero() {
        let noon = SolarDay::new(4).at(1.35, 103.8);
        let mut bad = inputs(0.6);
        bad.temperature_k = f64::NAN;
        assert_eq!(pv_capacity_factor(&noon, &bad, &PvParams::default()), 0.0);
        assert_eq!(csp_capacity_factor(&noon, f64::INFINITY, &CspParams::default()), 0.0);
    }

    #[test]
    fn test_two_axis_tracking_faces_the_sun() {
        let g = SolarDay::new(100 * 24 + 9).at(45.0, 0.0);
        let (tilt, orientation) = collector_attitude(&g, Tracking::TwoAxis, None);
        let c = incidence_cosine(g.latitude, g.declination, g.hour_angle, tilt, orientation);
        assert!((c - 1.0).abs() < 1e-9, "cos incidence {}", c);
    }

    #[test]
    fn test_tracking_does_not_lose_output() {
        let g = SolarDay::new(100 * 24 + 9).at(45.0, 0.0);
        let fixed = pv_capacity_factor(&g, &inputs(0.7), &PvParams::default());
        let tracked = pv_capacity_factor(
            &g,
            &inputs(0.7),
            &PvParams {
                tracking: Tracking::TwoAxis,
                ..PvParams::default()
            },
        );
        assert!(tracked >= fixed - 1e-12);
    }

    #[test]
    fn test_orientation_override_applies_to_fixed_panels() {
        let g = SolarDay::new(100 * 24 + 9).at(45.0, 0.0);
        let (_, o) = collector_attitude(&g, Tracking::Fixed, Some(-90.0));
        assert_eq!(o, -90.0);
        let (_, o) = collector_attitude(&g, Tracking::TwoAxis, Some(-90.0));
        assert_eq!(o, g.azimuth);
    }

    #[test]
    fn test_shading_reduces_csp() {
        let noon = SolarDay::new(4).at(1.35, 103.8);
        let clear = csp_capacity_factor(&noon, 0.7, &CspParams::default());
        let shaded = csp_capacity_factor(
            &noon,
            0.7,
            &CspParams {
                shading: 0.5,
                ..CspParams::default()
            },
        );
        assert!((shaded - clear * 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_csp_follows_default_orientation() {
        // Mid-morning at 45 N: the collector faces the equator, not the sun.
        let g = SolarDay::new(100 * 24 + 9).at(45.0, 0.0);
        let cf = csp_capacity_factor(&g, 0.7, &CspParams::default());
        assert!(cf > 0.0 && cf < 1.0, "cf {}", cf);

        let turned = PixelGeometry {
            orientation: g.orientation + 90.0,
            ..g
        };
        assert!((csp_capacity_factor(&turned, 0.7, &CspParams::default()) - cf).abs() > 1e-6);
    }

    #[test]
    fn test_csp_normalised_by_standard_irradiance() {
        // Near noon the direct beam is a few hundred W/m2 and stays below
        // the 1000 W/m2 reference.
        let noon = SolarDay::new(4).at(1.35, 103.8);
        let cf = csp_capacity_factor(&noon, 0.6, &CspParams::default());
        assert!(cf > 0.2 && cf < 0.9, "cf {}", cf);
    }
}
