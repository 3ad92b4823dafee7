//! Regular lat/lon grids: resolutions, 2-D rasters and hourly 3-D fields.
//!
//! All grids are row-major with row 0 as the northernmost row.

use std::ops::Range;

use num_traits::Float;
use serde::{Deserialize, Serialize};

use crate::error::{ResourceError, Result};
use crate::hours::HOURS_PER_YEAR;

/// Per-axis grid resolution in degrees per pixel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// Degrees of latitude per row.
    pub lat: f64,
    /// Degrees of longitude per column.
    pub lon: f64,
}

impl Resolution {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Same resolution on both axes.
    pub fn square(deg: f64) -> Self {
        Self::new(deg, deg)
    }

    /// Check that both axes are finite and positive.
    pub fn validate(&self) -> Result<()> {
        if !(self.lat.is_finite() && self.lon.is_finite() && self.lat > 0.0 && self.lon > 0.0) {
            return Err(ResourceError::config(format!(
                "resolution must be positive, got {:?}",
                self
            )));
        }
        Ok(())
    }
}

/// A 2-D grid of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Copy> Raster<T> {
    /// Wrap row-major data, checking that its length matches the shape.
    pub fn new(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(ResourceError::missing_data(format!(
                "raster data has {} values, expected {}x{}",
                data.len(),
                rows,
                cols
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// A raster with every pixel set to `value`.
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// Build a raster by evaluating `f(row, col)` for each pixel.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                data.push(f(row, col));
            }
        }
        Self { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Value at (row, col), or None when out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    /// Apply `f` to every pixel.
    pub fn map<U: Copy>(&self, f: impl Fn(T) -> U) -> Raster<U> {
        Raster {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Copy out a rectangular block given 0-based half-open row/col ranges.
    pub fn subset(&self, rows: Range<usize>, cols: Range<usize>) -> Result<Raster<T>> {
        if rows.end > self.rows || cols.end > self.cols || rows.is_empty() || cols.is_empty() {
            return Err(ResourceError::missing_data(format!(
                "subset rows {:?} cols {:?} outside raster {}x{}",
                rows, cols, self.rows, self.cols
            )));
        }
        let mut data = Vec::with_capacity(rows.len() * cols.len());
        for row in rows.clone() {
            let start = row * self.cols;
            data.extend_from_slice(&self.data[start + cols.start..start + cols.end]);
        }
        Ok(Raster {
            rows: rows.len(),
            cols: cols.len(),
            data,
        })
    }

    /// Fail unless this raster has the given shape.
    pub fn ensure_shape(&self, rows: usize, cols: usize, what: &str) -> Result<()> {
        if self.shape() != (rows, cols) {
            return Err(ResourceError::missing_data(format!(
                "{} is {}x{}, expected {}x{}",
                what, self.rows, self.cols, rows, cols
            )));
        }
        Ok(())
    }
}

impl<T: Float> Raster<T> {
    /// Replace exact zeros with NaN ("no data").
    pub fn zero_to_nan(&mut self) {
        for v in self.data.iter_mut() {
            if v.is_zero() {
                *v = T::nan();
            }
        }
    }

    /// Mean of the finite values, or None when there are none.
    pub fn finite_mean(&self) -> Option<T> {
        let mut sum = T::zero();
        let mut count = 0usize;
        for v in self.data.iter().filter(|v| v.is_finite()) {
            sum = sum + *v;
            count += 1;
        }
        if count == 0 {
            return None;
        }
        T::from(count).map(|n| sum / n)
    }
}

/// A (row, col, hour) field for one physical quantity.
///
/// Held hour-major so that each hour is one contiguous `rows * cols` slice.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyField {
    rows: usize,
    cols: usize,
    hours: usize,
    data: Vec<f32>,
}

impl HourlyField {
    /// Wrap hour-major data (`data[hour * rows * cols + row * cols + col]`).
    pub fn from_hour_major(rows: usize, cols: usize, hours: usize, data: Vec<f32>) -> Result<Self> {
        if data.len() != rows * cols * hours {
            return Err(ResourceError::missing_data(format!(
                "hourly field has {} values, expected {}x{}x{}",
                data.len(),
                rows,
                cols,
                hours
            )));
        }
        Ok(Self {
            rows,
            cols,
            hours,
            data,
        })
    }

    /// Convert from the persisted `[row, col, hour]` layout.
    pub fn from_row_major(rows: usize, cols: usize, hours: usize, data: &[f32]) -> Result<Self> {
        if data.len() != rows * cols * hours {
            return Err(ResourceError::missing_data(format!(
                "hourly field has {} values, expected {}x{}x{}",
                data.len(),
                rows,
                cols,
                hours
            )));
        }
        let plane = rows * cols;
        let mut out = vec![0.0f32; data.len()];
        for pixel in 0..plane {
            let src = &data[pixel * hours..(pixel + 1) * hours];
            for (hour, v) in src.iter().enumerate() {
                out[hour * plane + pixel] = *v;
            }
        }
        Ok(Self {
            rows,
            cols,
            hours,
            data: out,
        })
    }

    /// Build a field by evaluating `f(row, col, hour)`.
    pub fn from_fn(
        rows: usize,
        cols: usize,
        hours: usize,
        mut f: impl FnMut(usize, usize, usize) -> f32,
    ) -> Self {
        let mut data = Vec::with_capacity(rows * cols * hours);
        for hour in 0..hours {
            for row in 0..rows {
                for col in 0..cols {
                    data.push(f(row, col, hour));
                }
            }
        }
        Self {
            rows,
            cols,
            hours,
            data,
        }
    }

    /// Convert to the persisted `[row, col, hour]` layout.
    pub fn to_row_major(&self) -> Vec<f32> {
        let plane = self.rows * self.cols;
        let mut out = vec![0.0f32; self.data.len()];
        for hour in 0..self.hours {
            for pixel in 0..plane {
                out[pixel * self.hours + hour] = self.data[hour * plane + pixel];
            }
        }
        out
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn hours(&self) -> usize {
        self.hours
    }

    /// Values of one hour, row-major.
    pub fn hour(&self, hour: usize) -> &[f32] {
        let plane = self.rows * self.cols;
        &self.data[hour * plane..(hour + 1) * plane]
    }

    /// Value at (row, col, hour), or None when out of range.
    pub fn value(&self, row: usize, col: usize, hour: usize) -> Option<f32> {
        if row < self.rows && col < self.cols && hour < self.hours {
            Some(self.data[hour * self.rows * self.cols + row * self.cols + col])
        } else {
            None
        }
    }

    /// Sum of the finite values of one hour.
    pub fn hour_sum(&self, hour: usize) -> f64 {
        self.hour(hour)
            .iter()
            .filter(|v| v.is_finite())
            .map(|&v| v as f64)
            .sum()
    }

    /// Copy out a rectangular block of every hour.
    pub fn subset(&self, rows: Range<usize>, cols: Range<usize>) -> Result<HourlyField> {
        if rows.end > self.rows || cols.end > self.cols || rows.is_empty() || cols.is_empty() {
            return Err(ResourceError::missing_data(format!(
                "subset rows {:?} cols {:?} outside field {}x{}",
                rows, cols, self.rows, self.cols
            )));
        }
        let mut data = Vec::with_capacity(rows.len() * cols.len() * self.hours);
        for hour in 0..self.hours {
            let plane = self.hour(hour);
            for row in rows.clone() {
                let start = row * self.cols;
                data.extend_from_slice(&plane[start + cols.start..start + cols.end]);
            }
        }
        Ok(HourlyField {
            rows: rows.len(),
            cols: cols.len(),
            hours: self.hours,
            data,
        })
    }

    /// Combine two fields of identical shape value by value.
    pub fn zip_with(&self, other: &HourlyField, f: impl Fn(f32, f32) -> f32) -> Result<HourlyField> {
        if (self.rows, self.cols, self.hours) != (other.rows, other.cols, other.hours) {
            return Err(ResourceError::missing_data(format!(
                "field shapes differ: {}x{}x{} vs {}x{}x{}",
                self.rows, self.cols, self.hours, other.rows, other.cols, other.hours
            )));
        }
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| f(a, b))
            .collect();
        Ok(HourlyField {
            rows: self.rows,
            cols: self.cols,
            hours: self.hours,
            data,
        })
    }

    /// Fail unless the field spans a full modelled year at the given shape.
    pub fn ensure_year(&self, rows: usize, cols: usize, what: &str) -> Result<()> {
        if (self.rows, self.cols, self.hours) != (rows, cols, HOURS_PER_YEAR) {
            return Err(ResourceError::missing_data(format!(
                "{} is {}x{}x{}, expected {}x{}x{}",
                what, self.rows, self.cols, self.hours, rows, cols, HOURS_PER_YEAR
            )));
        }
        Ok(())
    }
}
