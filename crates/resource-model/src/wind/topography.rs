//! Topographic correction of the 50 m wind speed.
//!
//! Reanalysis wind speeds are too smooth over complex terrain. Onshore wind
//! speeds are scaled by `min(exp(a * elevation + b), 3.5)`, with `(a, b)`
//! picked from a fixed grid so that the corrected per-country distributions
//! best match Global Wind Atlas samples.

use geo_common::{Raster, ResourceError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Upper bound of the correction factor.
pub const MAX_TOPO_FACTOR: f64 = 3.5;

/// Samples kept from each sorted country distribution.
pub const GWA_SAMPLES: usize = 50;

const A_START: f64 = 0.00046;
const A_STEP: f64 = 0.00002;
const A_STEPS: usize = 10;
const B_START: f64 = -0.3;
const B_STEP: f64 = 0.025;
const B_STEPS: usize = 12;

/// How country errors are combined when fitting the coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopoWeight {
    /// Every country counts the same.
    None,
    /// Countries weighted by their pixel count.
    Size,
    /// Countries weighted by installed onshore capacity.
    #[default]
    Capacity,
}

/// Fitted coefficients of the elevation correction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TopoFit {
    pub a: f64,
    pub b: f64,
}

impl TopoFit {
    /// Candidate coefficients, `a`-major.
    pub fn candidates() -> impl Iterator<Item = TopoFit> {
        (0..A_STEPS).flat_map(|i| {
            (0..B_STEPS).map(move |j| TopoFit {
                a: A_START + i as f64 * A_STEP,
                b: B_START + j as f64 * B_STEP,
            })
        })
    }

    /// Correction factor at `elevation` metres. Unknown elevation is left
    /// uncorrected.
    pub fn factor(&self, elevation: f64) -> f64 {
        if !elevation.is_finite() {
            return 1.0;
        }
        (self.a * elevation + self.b).exp().min(MAX_TOPO_FACTOR)
    }
}

/// Annual mean 50 m wind speed and elevation over one country's pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct CountrySample {
    pub name: String,
    pub wind_speed: Vec<f64>,
    pub elevation: Vec<f64>,
    /// Global Wind Atlas speeds, descending, one per sample.
    pub gwa: Vec<f64>,
    /// Installed onshore capacity (MW).
    pub capacity: f64,
}

impl CountrySample {
    fn error(&self, fit: &TopoFit) -> Result<f64> {
        let corrected: Vec<f64> = self
            .wind_speed
            .iter()
            .zip(&self.elevation)
            .map(|(&w, &z)| w * fit.factor(z))
            .collect();
        let sampled = sample_descending(&corrected);
        if sampled.len() != self.gwa.len() {
            return Err(ResourceError::missing_data(format!(
                "{} has {} atlas samples, expected {}",
                self.name,
                self.gwa.len(),
                sampled.len()
            )));
        }
        let sum: f64 = sampled
            .iter()
            .zip(&self.gwa)
            .map(|(s, g)| (s - g).powi(2))
            .sum();
        Ok(sum.sqrt())
    }
}

/// Every k-th value of the ascending order, largest first, with
/// `k = len / 50 + 1`.
pub fn sample_descending(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let step = sorted.len() / GWA_SAMPLES + 1;
    let mut sampled: Vec<f64> = sorted.into_iter().step_by(step).collect();
    sampled.reverse();
    sampled
}

/// Pick the candidate with the smallest weighted error over all countries.
///
/// Ties keep the first candidate in `a`-major order.
pub fn fit_topo_correction(countries: &[CountrySample], weight: TopoWeight) -> Result<TopoFit> {
    if countries.is_empty() {
        return Err(ResourceError::config("topographic fit needs at least one country"));
    }
    for country in countries {
        if country.wind_speed.is_empty() || country.wind_speed.len() != country.elevation.len() {
            return Err(ResourceError::missing_data(format!(
                "{} has {} wind pixels and {} elevation pixels",
                country.name,
                country.wind_speed.len(),
                country.elevation.len()
            )));
        }
    }

    let raw: Vec<f64> = match weight {
        TopoWeight::None => vec![1.0; countries.len()],
        TopoWeight::Size => countries.iter().map(|c| c.wind_speed.len() as f64).collect(),
        TopoWeight::Capacity => countries.iter().map(|c| c.capacity).collect(),
    };
    let total: f64 = raw.iter().sum();
    if !(total > 0.0 && total.is_finite()) || raw.iter().any(|w| *w < 0.0) {
        return Err(ResourceError::config(format!(
            "country weights for {:?} must be non-negative with a positive sum",
            weight
        )));
    }

    let mut best: Option<(TopoFit, f64)> = None;
    for fit in TopoFit::candidates() {
        let mut score = 0.0;
        for (country, w) in countries.iter().zip(&raw) {
            score += country.error(&fit)? * w / total;
        }
        if best.map_or(true, |(_, s)| score < s) {
            best = Some((fit, score));
        }
    }
    let (fit, score) = best.ok_or_else(|| ResourceError::config("no candidate coefficients"))?;
    debug!(a = fit.a, b = fit.b, score, countries = countries.len(), "Fitted topographic correction");
    Ok(fit)
}

/// Correction factor raster over an elevation raster.
pub fn topo_correction(elevation: &Raster<f32>, fit: &TopoFit) -> Raster<f32> {
    elevation.map(|z| fit.factor(z as f64) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn country(name: &str, truth: TopoFit, capacity: f64) -> CountrySample {
        let wind_speed: Vec<f64> = (0..400).map(|i| 3.0 + (i % 37) as f64 * 0.2).collect();
        let elevation: Vec<f64> = (0..400).map(|i| (i * 7 % 1500) as f64).collect();
        let corrected: Vec<f64> = wind_speed
            .iter()
            .zip(&elevation)
            .map(|(&w, &z)| w * truth.factor(z))
            .collect();
        CountrySample {
            name: name.to_string(),
            gwa: sample_descending(&corrected),
            wind_speed,
            elevation,
            capacity,
        }
    }

    fn candidate(index: usize) -> TopoFit {
        TopoFit::candidates().nth(index).unwrap()
    }

    #[test]
    fn test_candidate_grid() {
        let all: Vec<TopoFit> = TopoFit::candidates().collect();
        assert_eq!(all.len(), 120);
        assert!((all[0].a - 0.00046).abs() < 1e-12);
        assert!((all[0].b + 0.3).abs() < 1e-12);
        assert!((all[119].a - 0.00064).abs() < 1e-12);
        assert!((all[119].b + 0.025).abs() < 1e-12);
    }

    #[test]
    fn test_factor_is_capped() {
        let fit = TopoFit { a: 0.00066, b: 0.0 };
        assert_eq!(fit.factor(9000.0), MAX_TOPO_FACTOR);
        assert!((fit.factor(0.0) - 1.0).abs() < 1e-12);
        assert_eq!(fit.factor(f64::NAN), 1.0);
    }

    #[test]
    fn test_sample_descending_stride() {
        let values: Vec<f64> = (0..120).map(f64::from).collect();
        let s = sample_descending(&values);
        // 120 / 50 + 1 = 3
        assert_eq!(s.len(), 40);
        assert_eq!(s[0], 117.0);
        assert_eq!(s[39], 0.0);
        assert_eq!(sample_descending(&[2.0, 1.0]), vec![2.0, 1.0]);
    }

    #[test]
    fn test_fit_recovers_generating_coefficients() {
        let truth = candidate(5 * 12 + 8);
        let fit = fit_topo_correction(&[country("AT", truth, 3000.0)], TopoWeight::None).unwrap();
        assert_eq!(fit, truth);
    }

    #[test]
    fn test_capacity_weight_ignores_countries_without_capacity() {
        let at = candidate(2 * 12 + 3);
        let ch = candidate(7 * 12 + 9);
        let countries = [country("AT", at, 3000.0), country("CH", ch, 0.0)];
        assert_eq!(fit_topo_correction(&countries, TopoWeight::Capacity).unwrap(), at);
    }

    #[test]
    fn test_fit_rejects_bad_inputs() {
        assert!(matches!(
            fit_topo_correction(&[], TopoWeight::None),
            Err(ResourceError::Config(_))
        ));

        let mut short = country("AT", candidate(0), 1.0);
        short.gwa.truncate(10);
        assert!(matches!(
            fit_topo_correction(&[short], TopoWeight::None),
            Err(ResourceError::MissingData(_))
        ));

        let zero = country("AT", candidate(0), 0.0);
        assert!(fit_topo_correction(&[zero], TopoWeight::Capacity).is_err());
    }

    #[test]
    fn test_topo_correction_raster() {
        let fit = TopoFit { a: 0.0005, b: -0.1 };
        let elevation = Raster::new(1, 3, vec![0.0f32, 1000.0, f32::NAN]).unwrap();
        let c = topo_correction(&elevation, &fit);
        assert!((c.data()[0] as f64 - (-0.1f64).exp()).abs() < 1e-6);
        assert!((c.data()[1] as f64 - 0.4f64.exp()).abs() < 1e-6);
        assert_eq!(c.data()[2], 1.0);
    }
}
