//! Degree-based trigonometry.

pub(crate) fn sind(deg: f64) -> f64 {
    deg.to_radians().sin()
}

pub(crate) fn cosd(deg: f64) -> f64 {
    deg.to_radians().cos()
}

pub(crate) fn tand(deg: f64) -> f64 {
    deg.to_radians().tan()
}

/// Arcsine in degrees; the argument is clamped to [-1, 1].
pub(crate) fn asind(x: f64) -> f64 {
    clamp_unit(x).asin().to_degrees()
}

/// Arccosine in degrees; the argument is clamped to [-1, 1].
pub(crate) fn acosd(x: f64) -> f64 {
    clamp_unit(x).acos().to_degrees()
}

/// Clamp to [-1, 1]. NaN stays NaN.
pub(crate) fn clamp_unit(x: f64) -> f64 {
    x.clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_functions_clamp() {
        assert_eq!(acosd(1.0 + 1e-12), 0.0);
        assert!((acosd(-1.5) - 180.0).abs() < 1e-12);
        assert!((asind(2.0) - 90.0).abs() < 1e-12);
        assert!(acosd(f64::NAN).is_nan());
    }

    #[test]
    fn test_degrees() {
        assert!((sind(30.0) - 0.5).abs() < 1e-12);
        assert!((cosd(60.0) - 0.5).abs() < 1e-12);
        assert!((tand(45.0) - 1.0).abs() < 1e-12);
    }
}
