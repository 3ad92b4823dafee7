//! Hourly series over the modelled year.

use geo_common::HOURS_PER_YEAR;
use serde::{Deserialize, Serialize};

/// One value per hour of the year; hours never processed stay 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HourlySeries(Vec<f64>);

impl HourlySeries {
    /// A series of 8760 zeros.
    pub fn zeros() -> Self {
        Self(vec![0.0; HOURS_PER_YEAR])
    }

    pub fn get(&self, hour: usize) -> Option<f64> {
        self.0.get(hour).copied()
    }

    /// Set the value at `hour`; hours beyond the year are ignored.
    pub fn set(&mut self, hour: usize, value: f64) {
        if let Some(slot) = self.0.get_mut(hour) {
            *slot = value;
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum over the year, i.e. full-load hours of the series.
    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Copy the values at `hours` from `other`.
    pub fn copy_hours(&mut self, other: &HourlySeries, hours: &[usize]) {
        for &h in hours {
            if let Some(v) = other.get(h) {
                self.set(h, v);
            }
        }
    }
}

impl Default for HourlySeries {
    fn default() -> Self {
        Self::zeros()
    }
}
