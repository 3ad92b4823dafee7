//! Idealised turbine power curve.

use geo_common::{ResourceError, Result};

use crate::params::TurbineParams;

/// Cubic power curve between cut-in and rated speed, flat to cut-off.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerCurve {
    cut_in: f64,
    rated: f64,
    cut_off: f64,
    a: f64,
    b: f64,
}

impl PowerCurve {
    /// Build the curve for a turbine.
    ///
    /// Fails with [`ResourceError::NumericDegeneracy`] when the cubes of the
    /// cut-in and rated speeds cannot be told apart in `f64`.
    pub fn new(turbine: &TurbineParams) -> Result<Self> {
        turbine.validate().map_err(ResourceError::config)?;
        let (in3, rated3) = (turbine.cut_in.powi(3), turbine.rated.powi(3));
        let span = rated3 - in3;
        if !(span > 0.0 && span.is_finite()) {
            return Err(ResourceError::numeric_degeneracy(format!(
                "cubic segment {}..{} m/s has span {}",
                turbine.cut_in, turbine.rated, span
            )));
        }
        Ok(Self {
            cut_in: turbine.cut_in,
            rated: turbine.rated,
            cut_off: turbine.cut_off,
            a: -in3 / span,
            b: 1.0 / span,
        })
    }

    /// Capacity factor at hub-height wind speed `speed` (m/s).
    ///
    /// Zero at or below cut-in and above cut-off; exactly 1 from rated to
    /// cut-off inclusive. Non-finite speeds produce zero.
    pub fn capacity_factor(&self, speed: f64) -> f64 {
        if !speed.is_finite() {
            0.0
        } else if speed > self.cut_in && speed < self.rated {
            (self.a + self.b * speed.powi(3)).clamp(0.0, 1.0)
        } else if speed >= self.rated && speed <= self.cut_off {
            1.0
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_onshore_curve_breakpoints() {
        let curve = PowerCurve::new(&TurbineParams::onshore()).unwrap();
        assert_eq!(curve.capacity_factor(0.0), 0.0);
        assert_eq!(curve.capacity_factor(4.0), 0.0);
        assert_eq!(curve.capacity_factor(13.0), 1.0);
        assert_eq!(curve.capacity_factor(25.0), 1.0);
        assert_eq!(curve.capacity_factor(26.0), 0.0);
        assert_eq!(curve.capacity_factor(f64::NAN), 0.0);
    }

    #[test]
    fn test_cubic_segment_is_monotonic() {
        let curve = PowerCurve::new(&TurbineParams::offshore()).unwrap();
        let mut last = 0.0;
        for i in 31..165 {
            let cf = curve.capacity_factor(i as f64 / 10.0);
            assert!(cf >= last && cf < 1.0, "speed {} cf {}", i, cf);
            last = cf;
        }
        // Continuous at rated speed.
        assert!((curve.capacity_factor(16.5 - 1e-9) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_overflowing_cubic_segment_is_degenerate() {
        let t = TurbineParams {
            cut_in: 3.0,
            rated: 1e103,
            cut_off: 1e104,
            ..TurbineParams::onshore()
        };
        let err = PowerCurve::new(&t).unwrap_err();
        assert!(matches!(err, ResourceError::NumericDegeneracy(_)), "{}", err);
        assert_eq!(err.kind(), "numeric_degeneracy");
    }

    #[test]
    fn test_invalid_turbine_rejected() {
        let t = TurbineParams {
            cut_in: 10.0,
            rated: 5.0,
            ..TurbineParams::onshore()
        };
        assert!(PowerCurve::new(&t).is_err());
    }
}
